use thiserror::Error;

#[derive(Error, Debug)]
pub enum AtError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Could not open port: {0}")]
    PortOpen(String),

    #[error("Communication error: {0}")]
    Communication(String),

    #[error("No response to file status query for {0}")]
    QueryTimeout(String),

    #[error("Could not parse response: {0}")]
    ParseFailure(String),

    #[error("Failed to read file: {0}")]
    FileRead(String),

    #[error("Write error: {0}")]
    Write(String),

    #[error("Write timed out after {0} ms")]
    WriteTimeout(u128),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AtError {
    /// Process exit code for errors that abort a whole session
    pub fn exit_code(&self) -> i32 {
        match self {
            AtError::DeviceNotFound(_) => -1,
            AtError::PortOpen(_) => -2,
            AtError::Communication(_) => -3,
            _ => -4,
        }
    }
}

/// Stage at which a single file transfer stopped
#[derive(Error, Debug)]
pub enum TransferFailure {
    #[error("Failed to open file: {0}")]
    FileOpen(String),

    #[error("Failed to read file: {0}")]
    FileRead(String),

    #[error("Device did not accept write request for {0}")]
    HandshakeTimeout(String),

    #[error("Channel error during transfer: {0}")]
    Write(#[source] AtError),

    #[error("Size mismatch after upload: expected {expected}, device reports {reported:?}")]
    SizeMismatch { expected: u64, reported: Option<u64> },
}

impl From<AtError> for TransferFailure {
    fn from(e: AtError) -> Self {
        TransferFailure::Write(e)
    }
}

pub type AtResult<T> = std::result::Result<T, AtError>;
