//! # relwatch Common Library
//!
//! Shared code for the relwatch workspace:
//! - Error type and result alias
//! - Bootstrap TOML configuration and root folder resolution
//! - Atomic file replacement (checkpoint and config writes)
//! - `ReleaseDate` calendar type used for watermark comparisons
//! - UTC calendar-day helpers

pub mod atomic_file;
pub mod config;
pub mod error;
pub mod release_date;
pub mod time;

pub use error::{Error, Result};
pub use release_date::{DatePrecision, ReleaseDate};
