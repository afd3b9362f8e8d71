//! relwatch-scan library interface
//!
//! Resumable catalog-scan engine: walks followed artists, resolves new
//! releases and appends their tracks to one target playlist, checkpointing
//! after every unit of progress.

pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use crate::clock::{Clock, SystemClock};
pub use crate::config::ScanConfig;
pub use crate::error::{CatalogError, ScanError};
