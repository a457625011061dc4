//! Input/output helpers.
//!
//! - atomic JSON snapshot write + fallback read (`snapshot`)
//! - persisted id -> display-name side cache (`cache`)

pub mod cache;
pub mod snapshot;

pub use cache::*;
pub use snapshot::*;
