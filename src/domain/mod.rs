//! Domain types used throughout the pipelines.
//!
//! This module defines:
//!
//! - contribution calendar types (`ActivityDay`, `ContributionWindow`)
//! - per-source snapshot shapes (`SongInfo`, `FavoriteVideo`, `AnimeEntry`,
//!   `LanguageInfo`, `ReleaseInfo`, `SteamSnapshot`, etc.)

pub mod types;

pub use types::*;
