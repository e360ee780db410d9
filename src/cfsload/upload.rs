use std::path::PathBuf;
use std::time::Duration;

use cfsload::{
    SerialParams, Timeouts, TransferOutcome, UploadFile, Uploader,
    error::{AtError, AtResult},
};
use clap::Parser;
use tracing::{error, info};

/// `NAME` or `NAME:SIZE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FileArg {
    name: String,
    size: Option<u64>,
}

fn parse_file_arg(arg: &str) -> Result<FileArg, String> {
    let (name, size) = match arg.rsplit_once(':') {
        Some((name, size)) => {
            let size = size
                .parse::<u64>()
                .map_err(|e| format!("invalid size in {:?}: {}", arg, e))?;
            (name, Some(size))
        }
        None => (arg, None),
    };
    if name.is_empty() {
        return Err(format!("missing file name in {:?}", arg));
    }

    Ok(FileArg {
        name: name.to_string(),
        size,
    })
}

#[derive(Parser, Debug, Clone)]
pub(crate) struct UploadOptions {
    /// File to upload, as NAME or NAME:SIZE. SIZE defaults to the local file length.
    #[clap(short, long = "file", required = true, value_parser = parse_file_arg)]
    files: Vec<FileArg>,

    /// Directory holding the files
    #[clap(short, long, default_value = "./data/")]
    dir: PathBuf,

    /// Serial port
    #[clap(short, long)]
    serial: Option<String>,

    /// Baud rate
    #[clap(short, long)]
    baudrate: Option<u32>,

    /// Modem-side inter-byte timeout for the payload
    #[clap(short, long, default_value_t = 140000)]
    input_timeout_ms: u64,

    /// Query each file's size again after writing it
    #[clap(long, default_value_t = false)]
    verify: bool,

    #[clap(short, long, default_value_t = false)]
    pub(crate) verbose: bool,
}

fn resolve_files(opts: &UploadOptions) -> AtResult<Vec<UploadFile>> {
    let input_timeout = Duration::from_millis(opts.input_timeout_ms);

    opts.files
        .iter()
        .map(|arg| {
            let size = match arg.size {
                Some(size) => size,
                None => {
                    let path = opts.dir.join(&arg.name);
                    std::fs::metadata(&path)
                        .map_err(|e| AtError::FileRead(format!("{}: {}", path.display(), e)))?
                        .len()
                }
            };
            Ok(UploadFile::new(&opts.dir, &arg.name, size, input_timeout))
        })
        .collect()
}

pub(crate) fn handle_upload(opts: UploadOptions) -> AtResult<()> {
    let files = resolve_files(&opts)?;

    let mut uploader = Uploader::open(
        SerialParams {
            port: opts.serial.clone(),
            baud: opts.baudrate,
        },
        Timeouts::default(),
    )?;
    uploader.progress_bar(files.len() > 1);
    uploader.verify_after_upload(opts.verify);

    uploader.start()?;

    let outcomes = uploader.upload_all(&files);
    for (file, outcome) in files.iter().zip(&outcomes) {
        match outcome {
            TransferOutcome::AlreadyPresent => info!("{}: already uploaded", file.name),
            TransferOutcome::Uploaded => info!("{}: uploaded", file.name),
            TransferOutcome::Failed(e) => error!("{}: {}", file.name, e),
        }
    }

    if outcomes.iter().all(TransferOutcome::is_success) {
        info!("SUCCESS");
    } else {
        error!("Failed to send one or more files!");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file_arg() {
        assert_eq!(
            parse_file_arg("1.amr:35910").unwrap(),
            FileArg {
                name: "1.amr".to_string(),
                size: Some(35910)
            }
        );
        assert_eq!(
            parse_file_arg("1.amr").unwrap(),
            FileArg {
                name: "1.amr".to_string(),
                size: None
            }
        );
        assert!(parse_file_arg("1.amr:big").is_err());
        assert!(parse_file_arg(":12").is_err());
    }

    #[test]
    fn test_resolve_files_with_explicit_size() {
        let opts = UploadOptions::parse_from([
            "upload", "--file", "1.amr:35910", "--dir", "/tmp/data/", "-i", "1000",
        ]);
        let files = resolve_files(&opts).unwrap();

        assert_eq!(
            files,
            vec![UploadFile::new(
                "/tmp/data/",
                "1.amr",
                35910,
                Duration::from_millis(1000)
            )]
        );
    }

    #[test]
    fn test_resolve_files_missing_local_file() {
        let opts = UploadOptions::parse_from(["upload", "--file", "x.amr", "--dir", "/nonexistent/"]);
        assert!(matches!(resolve_files(&opts), Err(AtError::FileRead(_))));
    }
}
