//! Command line arguments

use clap::Parser;

use crate::config::DEFAULT_CONFIG_PATH;

/// Serve static assets bundled into this binary
#[derive(Debug, Parser)]
#[command(name = "bundle-static", version, about)]
pub struct Cli {
    /// Configuration file, with or without extension
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Validate the configuration and exit without serving
    #[arg(long)]
    pub check: bool,
}
