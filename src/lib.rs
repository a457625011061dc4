//! `snapfeed` library crate.
//!
//! The binary (`snapfeed`) is a thin wrapper around this library so that:
//!
//! - pipeline logic is testable without spawning processes
//! - the pure parts (calendar normalization, response mapping) stay reusable
//! - code stays easy to navigate as sources get added

pub mod app;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
