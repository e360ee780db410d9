use std::fmt;

use crate::constants::RESPONSE_BUFFER_CAPACITY;
use crate::error::{AtError, AtResult};

/// Case-sensitive substring test. An empty haystack never matches.
pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    if haystack.is_empty() {
        return false;
    }
    find(haystack, needle).is_some()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Bytes strictly between the first `start` marker and the first `end`
/// marker that follows it
pub fn extract<'a>(response: &'a [u8], start: &[u8], end: &[u8]) -> Option<&'a [u8]> {
    let from = find(response, start)? + start.len();
    let rest = &response[from..];
    let len = find(rest, end)?;
    Some(&rest[..len])
}

/// Parse a decimal size field such as the one reported by `AT+CFSGFIS`
pub fn parse_size(field: &[u8]) -> AtResult<u64> {
    let text = std::str::from_utf8(field)
        .map_err(|e| AtError::ParseFailure(format!("size field is not text: {}", e)))?;
    text.trim()
        .parse::<u64>()
        .map_err(|e| AtError::ParseFailure(format!("bad size field {:?}: {}", text, e)))
}

/// Bytes collected while waiting for a response. Holds at most
/// `RESPONSE_BUFFER_CAPACITY` bytes; older bytes are dropped first.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ResponseBuffer {
    data: Vec<u8>,
}

impl ResponseBuffer {
    pub fn new() -> Self {
        ResponseBuffer {
            data: Vec::with_capacity(RESPONSE_BUFFER_CAPACITY),
        }
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.data.extend_from_slice(chunk);
        if self.data.len() > RESPONSE_BUFFER_CAPACITY {
            let excess = self.data.len() - RESPONSE_BUFFER_CAPACITY;
            self.data.drain(..excess);
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        contains(&self.data, token.as_bytes())
    }

    pub fn extract(&self, start: &str, end: &str) -> Option<&[u8]> {
        extract(&self.data, start.as_bytes(), end.as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for ResponseBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(&self.data))
    }
}
