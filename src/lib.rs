use interface::ByteChannel;
use interface::serialport::SerialPortChannel;
use tracing::info;
use util::create_progress_bar;

pub use error::{AtError, AtResult, TransferFailure};
pub use interface::SerialParams;
pub use protocols::at::{AtCommand, AtLink, Timeouts};
pub use protocols::cfs::{FileStatus, TransferOutcome, UploadFile};

pub mod constants;
pub mod error;
pub mod interface;
pub mod protocols;
pub mod response;
pub(crate) mod util;

pub struct Uploader<C: ByteChannel = SerialPortChannel> {
    link: AtLink<C>,
    verify: bool,
    progress_bar_enable: bool,
}

impl Uploader<SerialPortChannel> {
    /// Open the serial device described by `params`
    pub fn open(params: SerialParams, timeouts: Timeouts) -> AtResult<Self> {
        let channel = SerialPortChannel::from_params(params)?;
        info!("Connected to {}", channel.name());
        Ok(Self::from_channel(channel, timeouts))
    }
}

impl<C: ByteChannel> Uploader<C> {
    pub fn from_channel(channel: C, timeouts: Timeouts) -> Self {
        Uploader {
            link: AtLink::new(channel, timeouts),
            verify: false,
            progress_bar_enable: false,
        }
    }

    pub fn progress_bar(&mut self, enable: bool) {
        self.progress_bar_enable = enable;
    }

    /// Re-query each file's size after writing it
    pub fn verify_after_upload(&mut self, enable: bool) {
        self.verify = enable;
    }

    pub fn link(&mut self) -> &mut AtLink<C> {
        &mut self.link
    }

    pub fn into_channel(self) -> C {
        self.link.into_channel()
    }

    /// Liveness check followed by flash file system init
    pub fn start(&mut self) -> AtResult<()> {
        self.link.check_communication()?;
        self.link.init_flash()?;
        Ok(())
    }

    pub fn upload(&mut self, file: &UploadFile) -> TransferOutcome {
        self.link.upload_file(file, self.verify)
    }

    /// Upload every file in order. A failed file does not stop the batch.
    pub fn upload_all(&mut self, files: &[UploadFile]) -> Vec<TransferOutcome> {
        let pb = self
            .progress_bar_enable
            .then(|| create_progress_bar(files.len() as u64, "Uploading"));

        let mut outcomes = Vec::with_capacity(files.len());
        for file in files {
            if let Some(pb) = &pb {
                pb.set_message(file.name.clone());
            }
            outcomes.push(self.upload(file));
            if let Some(pb) = &pb {
                pb.inc(1);
            }
        }

        if let Some(pb) = pb {
            pb.finish_with_message("Done");
        }

        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        info!("{} of {} files in place", files.len() - failed, files.len());
        outcomes
    }
}
