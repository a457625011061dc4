//! Command-line parsing for the snapshot fetcher.
//!
//! Parsing stays separate from pipeline code: this module only describes the
//! surface, `crate::app` dispatches.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "snapfeed",
    version,
    about = "Fetch activity data from upstream services into JSON snapshots"
)]
pub struct Cli {
    /// Directory the JSON snapshots are written into.
    #[arg(long, value_name = "DIR", default_value = "data")]
    pub out_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands, one per upstream source plus `all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Fetch the music play record and the favorite playlist.
    Netease,
    /// Fetch the favorite video folder.
    Bilibili,
    /// Fetch anime collections, split by watch status.
    Bangumi,
    /// Fetch repos, language distribution, releases and the contribution calendar.
    Github,
    /// Fetch the player summary and the owned-games library.
    Steam,
    /// Run every source; failures are reported but do not stop the rest.
    All,
}
