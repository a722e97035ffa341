pub use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "chaintree")]
#[command(about = "Inspect, resolve and move chain tree bundles offline")]
#[command(version)]
pub struct Args {
    /// Path to the chaintree state directory (defaults to ~/.chaintree)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// Log level, overrides the configured one (RUST_LOG still wins)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: crate::Command,
}
