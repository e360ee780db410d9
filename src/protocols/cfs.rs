use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{error, info, warn};

use crate::constants::{
    FILE_SIZE_END_MARKER, FILE_SIZE_START_MARKER, TOKEN_CONNECT, TOKEN_ERROR, TOKEN_FILE_STATUS,
};
use crate::error::{AtError, TransferFailure};
use crate::interface::ByteChannel;
use crate::protocols::at::{AtCommand, AtLink};
use crate::response::parse_size;

/// A local file to place into modem flash under `name`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub expected_size: u64,
    /// Modem-side limit on the gap between payload bytes
    pub input_timeout: Duration,
    pub source_dir: PathBuf,
}

impl UploadFile {
    pub fn new(
        source_dir: impl Into<PathBuf>,
        name: impl Into<String>,
        expected_size: u64,
        input_timeout: Duration,
    ) -> Self {
        UploadFile {
            name: name.into(),
            expected_size,
            input_timeout,
            source_dir: source_dir.into(),
        }
    }

    pub fn local_path(&self) -> PathBuf {
        self.source_dir.join(&self.name)
    }
}

/// What the modem said about a file in flash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Reported(u64),
    /// No status line arrived in time
    NoResponse,
    /// A status line arrived but the size could not be read from it
    Unparseable,
}

#[derive(Debug)]
pub enum TransferOutcome {
    AlreadyPresent,
    Uploaded,
    Failed(TransferFailure),
}

impl TransferOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, TransferOutcome::Failed(_))
    }
}

pub(crate) fn read_payload(path: &Path) -> Result<Vec<u8>, TransferFailure> {
    let mut file = File::open(path)
        .map_err(|e| TransferFailure::FileOpen(format!("{}: {}", path.display(), e)))?;
    let mut payload = Vec::new();
    file.read_to_end(&mut payload)
        .map_err(|e| TransferFailure::FileRead(format!("{}: {}", path.display(), e)))?;
    Ok(payload)
}

impl<C: ByteChannel> AtLink<C> {
    /// Ask the modem for the size of `name`. A failed or unanswered query is
    /// reported as `NoResponse`, never as an error.
    pub fn query_file_status(&mut self, name: &str) -> FileStatus {
        let query = AtCommand::FileStatus {
            name: name.to_string(),
        };
        let timeout = self.timeouts().query;

        // The echoed command already contains the status keyword, so wait for
        // the end of the command output instead
        let wait = match self
            .send(&query)
            .and_then(|_| self.wait_for_any(&[FILE_SIZE_END_MARKER, TOKEN_ERROR], timeout))
        {
            Ok(wait) => wait,
            Err(e) => {
                warn!("Status query for {} failed: {}", name, e);
                return FileStatus::NoResponse;
            }
        };

        if !wait.response.contains(TOKEN_FILE_STATUS) {
            if wait.matched {
                warn!("Status query for {} rejected: {:?}", name, wait.response);
            } else {
                warn!("{}", AtError::QueryTimeout(name.to_string()));
            }
            return FileStatus::NoResponse;
        }

        let field = wait
            .response
            .extract(FILE_SIZE_START_MARKER, FILE_SIZE_END_MARKER)
            .ok_or_else(|| AtError::ParseFailure(format!("no size field in {:?}", wait.response)))
            .and_then(parse_size);

        match field {
            Ok(size) => FileStatus::Reported(size),
            Err(e) => {
                warn!("{}", e);
                FileStatus::Unparseable
            }
        }
    }

    /// Place `file` into flash unless a file of the expected size is already
    /// there. Failures are returned as `TransferOutcome::Failed` so callers can
    /// continue with other files.
    pub fn upload_file(&mut self, file: &UploadFile, verify: bool) -> TransferOutcome {
        match self.try_upload_file(file, verify) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Transfer of {} failed: {}", file.name, e);
                TransferOutcome::Failed(e)
            }
        }
    }

    fn try_upload_file(
        &mut self,
        file: &UploadFile,
        verify: bool,
    ) -> Result<TransferOutcome, TransferFailure> {
        let status = self.query_file_status(&file.name);
        if status == FileStatus::Reported(file.expected_size) {
            info!("{} already uploaded", file.name);
            return Ok(TransferOutcome::AlreadyPresent);
        }
        info!("{} not on device ({:?}), uploading", file.name, status);

        let payload = read_payload(&file.local_path())?;
        let size = payload.len() as u64;
        if size != file.expected_size {
            warn!(
                "{} is {} bytes locally, expected {}",
                file.name, size, file.expected_size
            );
        }

        let request = AtCommand::WriteFile {
            name: file.name.clone(),
            size,
            input_timeout: file.input_timeout,
        };
        let timeout = self.timeouts().handshake;
        let wait = self.transact(&request, TOKEN_CONNECT, timeout)?;
        if !wait.matched {
            return Err(TransferFailure::HandshakeTimeout(file.name.clone()));
        }

        info!("Writing {} bytes to {}", size, file.name);
        self.write_payload(&payload)?;

        if verify {
            match self.query_file_status(&file.name) {
                FileStatus::Reported(reported) if reported == size => {}
                FileStatus::Reported(reported) => {
                    return Err(TransferFailure::SizeMismatch {
                        expected: size,
                        reported: Some(reported),
                    });
                }
                _ => {
                    return Err(TransferFailure::SizeMismatch {
                        expected: size,
                        reported: None,
                    });
                }
            }
            info!("Verified size of {}", file.name);
        }

        info!("Uploaded {}", file.name);
        Ok(TransferOutcome::Uploaded)
    }
}
