//! Explain whether a single path would be excluded from a snapshot.

use crate::ignore_source::{ignore_file_path, load_pattern_set};
use flatsnap_domain::{CandidatePath, IgnoreMatch};
use flatsnap_ports::{FileSystemPort, FileSystemPortExt, IgnorePort, LoggerPort};
use flatsnap_shared::Result;
use std::path::PathBuf;
use std::sync::Arc;

/// Input payload for an ignore check.
#[derive(Debug, Clone)]
pub struct CheckIgnoreInput {
    /// Tree root whose ignore file is consulted.
    pub source_root: PathBuf,
    /// Path to evaluate, relative to the root.
    pub candidate: CandidatePath,
    /// Ignore file name at the root.
    pub ignore_file_name: Box<str>,
    /// Patterns evaluated before the ignore file's lines.
    pub extra_patterns: Vec<Box<str>>,
}

/// Dependencies required by the ignore check.
#[derive(Clone)]
pub struct CheckIgnoreDeps {
    /// Filesystem adapter (reads the ignore file).
    pub filesystem: Arc<dyn FileSystemPort>,
    /// Ignore matcher adapter.
    pub ignore: Arc<dyn IgnorePort>,
    /// Optional logger.
    pub logger: Option<Arc<dyn LoggerPort>>,
}

/// Output of the ignore check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckIgnoreOutput {
    /// Normalized candidate path.
    pub path: Box<str>,
    /// Whether the candidate was evaluated as a directory.
    pub is_directory: bool,
    /// Final decision.
    pub ignored: bool,
    /// Deciding pattern, when one matched.
    pub decision: Option<IgnoreMatch>,
    /// Number of active patterns.
    pub pattern_count: usize,
    /// Read failure of an ignore file that exists but contributed no patterns.
    pub ignore_file_error: Option<Box<str>>,
}

/// Evaluate the candidate against the tree's pattern set.
///
/// The source root is not required to exist; a missing ignore file yields an
/// empty pattern set.
pub fn check_ignore(deps: &CheckIgnoreDeps, input: CheckIgnoreInput) -> Result<CheckIgnoreOutput> {
    let ignore_file = ignore_file_path(&input.ignore_file_name)?;
    let fs = deps.filesystem.session(input.source_root.clone());
    let loaded = load_pattern_set(
        &fs,
        deps.logger.as_ref(),
        &ignore_file,
        &input.extra_patterns,
    );

    let decision = deps.ignore.explain(&input.candidate, &loaded.patterns);
    Ok(CheckIgnoreOutput {
        path: input.candidate.as_str().into(),
        is_directory: input.candidate.is_directory(),
        ignored: decision.as_ref().is_some_and(|decision| decision.ignored),
        decision,
        pattern_count: loaded.patterns.len(),
        ignore_file_error: loaded.ignore_file_error,
    })
}
