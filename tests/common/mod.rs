#![allow(dead_code)]

use std::collections::VecDeque;
use std::time::Duration;

use cfsload::{AtError, AtResult, Timeouts, interface::ByteChannel};

/// In-memory modem. Each write that starts with a scripted trigger queues
/// the matching reply for reading.
#[derive(Default)]
pub struct ScriptedChannel {
    replies: Vec<(Vec<u8>, Vec<Vec<u8>>)>,
    pending: VecDeque<Vec<u8>>,
    pub writes: Vec<Vec<u8>>,
    /// Largest chunk handed out per read
    pub chunk_size: Option<usize>,
    /// Accept only this many bytes of non-command writes
    pub payload_limit: Option<usize>,
    /// Number of upcoming writes that fail outright
    pub failing_writes: usize,
}

impl ScriptedChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, trigger: &str, reply: &[u8]) -> Self {
        self.reply_in_reads(trigger, &[reply])
    }

    /// Reply delivered as separate reads, one per element
    pub fn reply_in_reads(mut self, trigger: &str, reads: &[&[u8]]) -> Self {
        self.replies.push((
            trigger.as_bytes().to_vec(),
            reads.iter().map(|r| r.to_vec()).collect(),
        ));
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.writes
            .iter()
            .filter(|w| w.starts_with(b"AT"))
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .collect()
    }
}

impl ByteChannel for ScriptedChannel {
    fn bytes_available(&mut self) -> AtResult<usize> {
        Ok(self.pending.iter().map(Vec::len).sum())
    }

    fn read_nonblocking(&mut self, buf: &mut [u8]) -> AtResult<usize> {
        let Some(mut read) = self.pending.pop_front() else {
            return Ok(0);
        };

        let limit = self.chunk_size.unwrap_or(buf.len()).min(buf.len());
        if read.len() > limit {
            let rest = read.split_off(limit);
            self.pending.push_front(rest);
        }
        buf[..read.len()].copy_from_slice(&read);
        Ok(read.len())
    }

    fn write_blocking(&mut self, data: &[u8], timeout: Duration) -> AtResult<usize> {
        if self.failing_writes > 0 {
            self.failing_writes -= 1;
            return Err(AtError::WriteTimeout(timeout.as_millis()));
        }
        self.writes.push(data.to_vec());

        if let Some(i) = self
            .replies
            .iter()
            .position(|(trigger, _)| data.starts_with(trigger))
        {
            let (_, reads) = self.replies.remove(i);
            self.pending.extend(reads.into_iter().filter(|r| !r.is_empty()));
        }

        let accepted = match self.payload_limit {
            Some(limit) if !data.starts_with(b"AT") => limit.min(data.len()),
            _ => data.len(),
        };
        Ok(accepted)
    }
}

pub fn fast_timeouts() -> Timeouts {
    Timeouts {
        liveness: Duration::from_millis(300),
        flash_init: Duration::from_millis(300),
        query: Duration::from_millis(300),
        handshake: Duration::from_millis(500),
        write: Duration::from_secs(1),
        poll_interval: Duration::from_millis(10),
        settle: Duration::ZERO,
    }
}
