mod common;

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use cfsload::protocols::at::{AtCommand, send_command, wait_for_token};

    use super::common::ScriptedChannel;

    #[test]
    fn test_wait_times_out_without_bytes() {
        let mut channel = ScriptedChannel::new();
        let timeout = Duration::from_millis(300);
        let poll = Duration::from_millis(50);

        let start = Instant::now();
        let wait = wait_for_token(&mut channel, "OK", timeout, poll).unwrap();
        let elapsed = start.elapsed();

        assert!(!wait.matched);
        assert!(wait.response.is_empty());
        assert!(elapsed >= timeout);
        assert!(elapsed < timeout + poll + Duration::from_millis(200));
    }

    #[test]
    fn test_wait_returns_on_token() {
        let mut channel = ScriptedChannel::new().reply("AT", b"AT\r\r\nOK\r\n");
        send_command(&mut channel, &AtCommand::Attention, Duration::from_secs(1)).unwrap();

        let start = Instant::now();
        let wait = wait_for_token(
            &mut channel,
            "OK",
            Duration::from_secs(3),
            Duration::from_millis(100),
        )
        .unwrap();

        assert!(wait.matched);
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(wait.response.as_bytes(), b"AT\r\r\nOK\r\n");
    }

    #[test]
    fn test_wait_finds_token_split_across_reads() {
        let mut channel = ScriptedChannel::new().reply("AT+CFSWFILE", b"\r\nCONNECT\r\n");
        channel.chunk_size = Some(4);
        send_command(
            &mut channel,
            &AtCommand::WriteFile {
                name: "a".to_string(),
                size: 1,
                input_timeout: Duration::from_millis(10),
            },
            Duration::from_secs(1),
        )
        .unwrap();

        let wait = wait_for_token(
            &mut channel,
            "CONNECT",
            Duration::from_secs(2),
            Duration::from_millis(10),
        )
        .unwrap();

        assert!(wait.matched);
    }

    #[test]
    fn test_wait_ignores_other_tokens() {
        let mut channel = ScriptedChannel::new().reply("AT", b"\r\nERROR\r\n");
        send_command(&mut channel, &AtCommand::Attention, Duration::from_secs(1)).unwrap();

        let wait = wait_for_token(
            &mut channel,
            "OK",
            Duration::from_millis(200),
            Duration::from_millis(10),
        )
        .unwrap();

        assert!(!wait.matched);
        assert_eq!(wait.response.as_bytes(), b"\r\nERROR\r\n");
    }

    #[test]
    fn test_send_command_terminates_with_crlf() {
        let mut channel = ScriptedChannel::new();
        let written = send_command(
            &mut channel,
            &AtCommand::FileStatus {
                name: "1.amr".to_string(),
            },
            Duration::from_secs(1),
        )
        .unwrap();

        assert_eq!(channel.writes, vec![b"AT+CFSGFIS=\"1.amr\"\r\n".to_vec()]);
        assert_eq!(written, channel.writes[0].len());
    }
}
