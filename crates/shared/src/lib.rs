//! # flatsnap-shared
//!
//! Shared result types and error handling for the flatsnap workspace.
//!
//! ## Design Principles
//!
//! 1. **No workspace dependencies** - This crate only depends on external crates
//! 2. **Serde-compatible** - Error envelopes serialize for JSON CLI output

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod errors;

pub use errors::{
    ErrorCode, ErrorEnvelope, ErrorKind, ErrorMetadata, Result, io_error_at,
};

/// Returns the shared crate version.
#[must_use]
pub const fn shared_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
