//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - installs the tracing subscriber
//! - parses CLI arguments
//! - dispatches to the per-source pipelines

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `snapfeed` binary.
pub fn run() -> Result<(), AppError> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Netease => pipeline::run_netease(&cli.out_dir),
        Command::Bilibili => pipeline::run_bilibili(&cli.out_dir),
        Command::Bangumi => pipeline::run_bangumi(&cli.out_dir),
        Command::Github => pipeline::run_github(&cli.out_dir),
        Command::Steam => pipeline::run_steam(&cli.out_dir),
        Command::All => pipeline::run_all(&cli.out_dir),
    }
}

/// Initialize logging, honoring `RUST_LOG` and defaulting to `info`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
