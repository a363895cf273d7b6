//! # flatsnap-app
//!
//! Application use cases: create, extract, and ignore diagnostics.
//! This crate depends on `ports`, `domain`, and `shared`.

pub mod check_ignore;
pub mod create_snapshot;
pub mod extract_snapshot;
mod ignore_source;

pub use check_ignore::{CheckIgnoreDeps, CheckIgnoreInput, CheckIgnoreOutput, check_ignore};
pub use create_snapshot::{
    CreateSnapshotDeps, CreateSnapshotInput, CreateSnapshotOutput, SkipReason, SkippedFile,
    create_snapshot,
};
pub use extract_snapshot::{
    ExtractSnapshotDeps, ExtractSnapshotInput, ExtractSnapshotOutput, extract_snapshot,
};

/// Returns the app crate version.
#[must_use]
pub const fn app_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
