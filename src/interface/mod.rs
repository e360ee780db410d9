pub mod serialport;

use std::time::Duration;

use crate::error::AtResult;

/// Parameters used to open a serial device. Missing values fall back to
/// the defaults in `constants`.
#[derive(Debug, Clone, Default)]
pub struct SerialParams {
    pub port: Option<String>,
    pub baud: Option<u32>,
}

/// Byte-level link to the modem. Implementations never retry; waiting and
/// timeouts are handled by the protocol layer above.
pub trait ByteChannel {
    /// Number of bytes that can be read right now, 0 if none
    fn bytes_available(&mut self) -> AtResult<usize>;

    /// Read up to `buf.len()` bytes without waiting for more to arrive
    fn read_nonblocking(&mut self, buf: &mut [u8]) -> AtResult<usize>;

    /// Write `data`, blocking for at most `timeout`. Returns the number of
    /// bytes the driver accepted, which may be less than `data.len()`.
    fn write_blocking(&mut self, data: &[u8], timeout: Duration) -> AtResult<usize>;
}
