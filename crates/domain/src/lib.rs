//! # flatsnap-domain
//!
//! Pure model for the snapshot archiver:
//!
//! - **Paths** - `SafeRelativePath`, `CandidatePath`
//! - **Glob** - `GlobToken`, `GlobProgram`
//! - **Ignore** - `IgnorePattern`, `PatternSet`, `NegationMode`, `IgnoreMatch`
//! - **Snapshot** - `SnapshotEntry`, `render_snapshot`, `parse_snapshot`
//!
//! ## Dependency Rules
//!
//! - Depends only on `shared` crate
//! - No I/O

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub use flatsnap_shared::shared_crate_version;

// =============================================================================
// DOMAIN MODULES
// =============================================================================

pub mod glob;
pub mod ignore;
pub mod paths;
pub mod snapshot;

pub use glob::{GlobProgram, GlobToken};
pub use ignore::{DEFAULT_IGNORE_FILE_NAME, IgnoreMatch, IgnorePattern, NegationMode, PatternSet};
pub use paths::{CandidatePath, PathError, ROOT_PATH, SafeRelativePath};
pub use snapshot::{
    FILE_MARKER, MARKER_TERMINATOR, ParsedSnapshot, SNAPSHOT_HEADER, SnapshotEntry,
    parse_snapshot, render_snapshot,
};

/// Returns the domain crate version.
#[must_use]
pub const fn domain_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
