//! Command-line interface.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::Parser;

/// Printed to stderr when the positional arguments are missing or invalid.
pub const USAGE: &str = "glasscoder-pad: USAGE: cmd <hostname> <port> <config>";

#[derive(Debug, Parser)]
#[command(name = "glasscoder-pad", version)]
#[command(about = "Relay Rivendell PAD updates to a GlassCoder encoder", long_about = None)]
pub struct Cli {
    /// Host running the PAD source
    pub hostname: String,

    /// PAD source port
    pub port: u16,

    /// Path to the INI configuration file
    pub config: PathBuf,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Serve Prometheus metrics on this address
    #[arg(long)]
    pub metrics_address: Option<SocketAddr>,
}

impl Cli {
    /// Parse the process arguments, exiting with status 1 and a usage
    /// message when they are incomplete.
    pub fn parse_or_exit() -> Self {
        match Self::try_parse() {
            Ok(cli) => cli,
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                e.exit()
            }
            Err(e) => {
                let _ = e.print();
                eprintln!("{USAGE}");
                std::process::exit(1);
            }
        }
    }
}
