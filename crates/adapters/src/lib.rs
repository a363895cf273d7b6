//! # flatsnap-adapters
//!
//! Adapter implementations for ports (filesystem, ignore matching, logging).
//! This crate depends on `ports`, `domain`, and `shared`.

pub mod fs;
pub mod ignore;
pub mod log_sink;
pub mod logger;

pub use fs::LocalFileSystem;
pub use ignore::GlobIgnoreMatcher;
pub use log_sink::{LogSink, MemoryLogSink, StderrLogSink};
pub use logger::JsonLogger;

/// Returns the adapters crate version.
#[must_use]
pub const fn adapters_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
