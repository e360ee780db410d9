use cfsload::error::AtResult;
use clap::{Parser, command};
use ports::list_ports;
use tracing::error;
use upload::{UploadOptions, handle_upload};

mod ports;
mod upload;

#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
enum Cli {
    /// Upload files into modem flash
    #[command(name = "upload", alias = "u")]
    Upload(UploadOptions),

    /// List serial ports
    #[command(name = "list-ports", alias = "l")]
    ListPorts,
}

fn run(cli: Cli) -> AtResult<()> {
    match cli {
        Cli::Upload(opts) => handle_upload(opts),
        Cli::ListPorts => list_ports(),
    }
}

fn main() {
    let cli = Cli::parse();

    let verbose = matches!(&cli, Cli::Upload(opts) if opts.verbose);
    tracing_subscriber::fmt()
        .with_max_level(if verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    if let Err(e) = run(cli) {
        error!("{}", e);
        std::process::exit(e.exit_code());
    }
}
