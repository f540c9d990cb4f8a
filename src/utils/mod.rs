//! Shared utilities.
//!
//! - [`app_data`] - Application data directory management (XDG-compliant)
//! - [`bloom`] - Bloom filter for fast negative lookups
//! - [`fragment`] - Byte-fragment extraction for the fuzzy pre-filter
//! - [`progress`] - Progress bar shim (no-op without the `progress` feature)

pub mod app_data;
pub mod bloom;
pub mod fragment;
pub mod progress;

pub use app_data::*;
pub use bloom::*;
pub use fragment::*;
