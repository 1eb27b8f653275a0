use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;

/// Text to MP3 behind a sign-in screen
#[derive(Debug, Parser)]
#[command(name = "voxform", about = "Authenticated text-to-speech form with MP3 downloads")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "voxform.toml", env = "VOXFORM_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "VOXFORM_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Log filter, e.g. `info` or `voxform_server=debug,info`
    #[arg(long, default_value = "info", env = "VOXFORM_LOG")]
    pub log: String,
}
