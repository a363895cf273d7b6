//! Shared types for the `create_snapshot` use case.

use flatsnap_domain::SafeRelativePath;
use flatsnap_ports::{FileSystemPort, IgnorePort, LoggerPort};
use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;

/// Input configuration for building a snapshot.
#[derive(Debug, Clone)]
pub struct CreateSnapshotInput {
    /// Tree root to archive (absolute path).
    pub source_root: PathBuf,
    /// Destination of the snapshot document.
    pub output_path: PathBuf,
    /// Output path relative to the source root, when the archive lands inside the tree.
    pub excluded_output: Option<SafeRelativePath>,
    /// Ignore file name, looked up at the source root.
    pub ignore_file_name: Box<str>,
    /// Patterns evaluated before the ignore file's own lines.
    pub extra_patterns: Vec<Box<str>>,
    /// Maximum number of files to collect.
    pub max_files: Option<NonZeroUsize>,
}

/// Dependencies required by the create use case.
#[derive(Clone)]
pub struct CreateSnapshotDeps {
    /// Filesystem adapter.
    pub filesystem: Arc<dyn FileSystemPort>,
    /// Ignore matcher adapter.
    pub ignore: Arc<dyn IgnorePort>,
    /// Optional logger.
    pub logger: Option<Arc<dyn LoggerPort>>,
}

/// Why a file (or directory) was left out of the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Content is not valid UTF-8.
    NotText,
    /// File exceeds the configured size limit.
    TooLarge,
    /// Any other read failure.
    Unreadable,
    /// Entry name cannot be stored as a relative archive path.
    UnsupportedName,
}

impl SkipReason {
    /// Stable identifier used in summaries and log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotText => "not_text",
            Self::TooLarge => "too_large",
            Self::Unreadable => "unreadable",
            Self::UnsupportedName => "unsupported_name",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A path skipped during the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    /// Path relative to the source root.
    pub path: Box<str>,
    /// Classified reason.
    pub reason: SkipReason,
    /// Underlying error message.
    pub detail: Box<str>,
}

/// Output returned by the create use case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSnapshotOutput {
    /// Where the document was written.
    pub archive_path: PathBuf,
    /// Number of files stored in the document.
    pub files_written: usize,
    /// Files and directories left out, in discovery order.
    pub skipped: Vec<SkippedFile>,
    /// Stored files whose content contains the entry marker.
    pub marker_conflicts: Vec<Box<str>>,
    /// True when `max_files` stopped the scan early.
    pub truncated: bool,
    /// Read failure of an ignore file that exists but contributed no patterns.
    pub ignore_file_error: Option<Box<str>>,
}
