use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::constants::{
    FLASH_INIT_TIMEOUT, HANDSHAKE_TIMEOUT, LINE_TERMINATOR, LIVENESS_TIMEOUT, POLL_INTERVAL,
    POST_WRITE_SETTLE, QUERY_TIMEOUT, RESPONSE_BUFFER_CAPACITY, TOKEN_OK, WRITE_TIMEOUT,
};
use crate::error::{AtError, AtResult};
use crate::interface::ByteChannel;
use crate::response::ResponseBuffer;

/// Commands understood by the modem
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtCommand {
    /// Liveness check, answered with `OK`
    Attention,
    /// Initialise the flash file system
    FlashInit,
    /// Query the size of a file in flash
    FileStatus { name: String },
    /// Request a write of `size` bytes into `name`. The modem aborts if no
    /// byte arrives for `input_timeout`.
    WriteFile {
        name: String,
        size: u64,
        input_timeout: Duration,
    },
}

impl fmt::Display for AtCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtCommand::Attention => write!(f, "AT"),
            AtCommand::FlashInit => write!(f, "AT+CFSINIT"),
            AtCommand::FileStatus { name } => write!(f, "AT+CFSGFIS=\"{}\"", name),
            AtCommand::WriteFile {
                name,
                size,
                input_timeout,
            } => write!(
                f,
                "AT+CFSWFILE=\"{}\",0,{},{}",
                name,
                size,
                input_timeout.as_millis()
            ),
        }
    }
}

/// Bounds for every wait in a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub liveness: Duration,
    pub flash_init: Duration,
    pub query: Duration,
    pub handshake: Duration,
    pub write: Duration,
    pub poll_interval: Duration,
    pub settle: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Timeouts {
            liveness: LIVENESS_TIMEOUT,
            flash_init: FLASH_INIT_TIMEOUT,
            query: QUERY_TIMEOUT,
            handshake: HANDSHAKE_TIMEOUT,
            write: WRITE_TIMEOUT,
            poll_interval: POLL_INTERVAL,
            settle: POST_WRITE_SETTLE,
        }
    }
}

/// Result of waiting for a token
#[derive(Debug)]
pub struct TokenWait {
    pub matched: bool,
    pub response: ResponseBuffer,
}

/// Frame `command` for the wire
pub fn frame_command(command: &AtCommand) -> Vec<u8> {
    let text = command.to_string();
    let mut framed = Vec::with_capacity(text.len() + LINE_TERMINATOR.len());
    framed.extend_from_slice(text.as_bytes());
    framed.extend_from_slice(LINE_TERMINATOR.as_bytes());
    framed
}

/// Send `command` terminated with CR-LF. Does not wait for a reply.
pub fn send_command<C: ByteChannel + ?Sized>(
    channel: &mut C,
    command: &AtCommand,
    timeout: Duration,
) -> AtResult<usize> {
    info!("Sending: {}", command);
    let framed = frame_command(command);
    channel.write_blocking(&framed, timeout)
}

/// Poll `channel` until `token` shows up in the received bytes or `timeout`
/// has elapsed.
pub fn wait_for_token<C: ByteChannel + ?Sized>(
    channel: &mut C,
    token: &str,
    timeout: Duration,
    poll_interval: Duration,
) -> AtResult<TokenWait> {
    wait_for_any_token(channel, &[token], timeout, poll_interval)
}

/// Like `wait_for_token`, but stops at the first of several tokens
pub fn wait_for_any_token<C: ByteChannel + ?Sized>(
    channel: &mut C,
    tokens: &[&str],
    timeout: Duration,
    poll_interval: Duration,
) -> AtResult<TokenWait> {
    let start = Instant::now();
    let mut response = ResponseBuffer::new();
    let mut chunk = [0u8; RESPONSE_BUFFER_CAPACITY];

    while start.elapsed() < timeout {
        if channel.bytes_available()? > 0 {
            let size = channel.read_nonblocking(&mut chunk)?;
            if size > 0 {
                debug!("Received: {:?}", String::from_utf8_lossy(&chunk[..size]));
                response.push(&chunk[..size]);
            }
        }

        if tokens.iter().any(|token| response.contains(token)) {
            return Ok(TokenWait {
                matched: true,
                response,
            });
        }

        thread::sleep(poll_interval);
    }

    debug!("Gave up waiting for {:?} after {:?}", tokens, timeout);
    Ok(TokenWait {
        matched: false,
        response,
    })
}

/// AT command link over a byte channel. Owns the channel for the lifetime of
/// a session.
pub struct AtLink<C: ByteChannel> {
    channel: C,
    timeouts: Timeouts,
}

impl<C: ByteChannel> AtLink<C> {
    pub fn new(channel: C, timeouts: Timeouts) -> Self {
        AtLink { channel, timeouts }
    }

    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    pub fn into_channel(self) -> C {
        self.channel
    }

    pub fn send(&mut self, command: &AtCommand) -> AtResult<usize> {
        send_command(&mut self.channel, command, self.timeouts.write)
    }

    pub fn wait_for(&mut self, token: &str, timeout: Duration) -> AtResult<TokenWait> {
        wait_for_token(&mut self.channel, token, timeout, self.timeouts.poll_interval)
    }

    pub fn wait_for_any(&mut self, tokens: &[&str], timeout: Duration) -> AtResult<TokenWait> {
        wait_for_any_token(&mut self.channel, tokens, timeout, self.timeouts.poll_interval)
    }

    /// Send `command` and wait for `token`
    pub fn transact(
        &mut self,
        command: &AtCommand,
        token: &str,
        timeout: Duration,
    ) -> AtResult<TokenWait> {
        self.send(command)?;
        self.wait_for(token, timeout)
    }

    /// Check that the modem answers `AT` with `OK`
    pub fn check_communication(&mut self) -> AtResult<()> {
        let wait = self.transact(&AtCommand::Attention, TOKEN_OK, self.timeouts.liveness)?;
        if !wait.matched {
            return Err(AtError::Communication(format!(
                "no {} received within {:?}",
                TOKEN_OK, self.timeouts.liveness
            )));
        }

        info!("Modem is responding");
        Ok(())
    }

    /// Initialise the flash file system; any complete line counts as an answer
    pub fn init_flash(&mut self) -> AtResult<()> {
        let wait = self.transact(
            &AtCommand::FlashInit,
            LINE_TERMINATOR,
            self.timeouts.flash_init,
        )?;
        if !wait.matched {
            return Err(AtError::Communication(format!(
                "flash init not answered within {:?}",
                self.timeouts.flash_init
            )));
        }

        Ok(())
    }

    /// Raw payload write; a short write is an error
    pub fn write_payload(&mut self, payload: &[u8]) -> AtResult<()> {
        let written = self.channel.write_blocking(payload, self.timeouts.write)?;
        if written != payload.len() {
            return Err(AtError::Write(format!(
                "short write, {} of {} bytes accepted",
                written,
                payload.len()
            )));
        }

        thread::sleep(self.timeouts.settle);
        Ok(())
    }
}
