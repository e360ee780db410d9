use std::time::Duration;

pub(crate) const SERIAL_TIMEOUT_MS: u64 = 1;
pub(crate) const RESPONSE_BUFFER_CAPACITY: usize = 512;

pub const DEFAULT_PORT: &str = "/dev/ttyS2";
pub const DEFAULT_BAUD_RATE: u32 = 115200;

pub(crate) const LINE_TERMINATOR: &str = "\r\n";

pub(crate) const TOKEN_OK: &str = "OK";
pub(crate) const TOKEN_CONNECT: &str = "CONNECT";
pub(crate) const TOKEN_ERROR: &str = "ERROR";
pub(crate) const TOKEN_FILE_STATUS: &str = "CFSGFIS";
pub(crate) const FILE_SIZE_START_MARKER: &str = "+CFSGFIS: ";
pub(crate) const FILE_SIZE_END_MARKER: &str = "\r\n\r\nOK";

pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(100);
pub(crate) const LIVENESS_TIMEOUT: Duration = Duration::from_secs(3);
pub(crate) const FLASH_INIT_TIMEOUT: Duration = Duration::from_secs(3);
pub(crate) const QUERY_TIMEOUT: Duration = Duration::from_secs(3);
pub(crate) const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);
pub(crate) const WRITE_TIMEOUT: Duration = Duration::from_secs(10);
pub(crate) const POST_WRITE_SETTLE: Duration = Duration::from_secs(1);
