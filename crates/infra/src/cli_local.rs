//! Local CLI orchestration helpers.
//!
//! Each `run_*_local` function resolves the effective config, builds the
//! adapters, and invokes one use case.

use crate::config_check::resolve_config_path;
use crate::observability::Observability;
use crate::{InfraError, InfraResult};
use flatsnap_adapters::{GlobIgnoreMatcher, LocalFileSystem};
use flatsnap_app::{
    CheckIgnoreDeps, CheckIgnoreInput, CheckIgnoreOutput, CreateSnapshotDeps, CreateSnapshotInput,
    CreateSnapshotOutput, ExtractSnapshotDeps, ExtractSnapshotInput, ExtractSnapshotOutput,
    check_ignore, create_snapshot, extract_snapshot,
};
use flatsnap_config::{ValidatedSnapshotConfig, load_snapshot_config_std_env};
use flatsnap_domain::{CandidatePath, SafeRelativePath};
use flatsnap_shared::{ErrorCode, ErrorEnvelope};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Archive `source_root`, writing to `output` or the configured default.
pub fn run_create_local(
    config_path: Option<&Path>,
    source_root: &Path,
    output: Option<&Path>,
) -> InfraResult<CreateSnapshotOutput> {
    let config = load_config(config_path)?;
    let observability = Observability::from_std_env();

    let source_root = normalize_path(source_root);
    let output_path = normalize_path(
        output.unwrap_or_else(|| Path::new(&*config.archive.default_output)),
    );
    let input = CreateSnapshotInput {
        excluded_output: excluded_output(&source_root, &output_path),
        source_root,
        output_path,
        ignore_file_name: config.ignore.file_name.clone(),
        extra_patterns: config.ignore.patterns.clone(),
        max_files: max_files(&config)?,
    };
    let deps = CreateSnapshotDeps {
        filesystem: Arc::new(LocalFileSystem::new(Some(config.scan.max_file_size_bytes))),
        ignore: Arc::new(GlobIgnoreMatcher::new(config.ignore.negation)),
        logger: observability.scoped_logger("create"),
    };
    create_snapshot(&deps, input)
}

/// Rebuild a tree from `archive_path` under `output_root`.
pub fn run_extract_local(
    config_path: Option<&Path>,
    archive_path: &Path,
    output_root: &Path,
) -> InfraResult<ExtractSnapshotOutput> {
    // Extraction reads no settings; an invalid config is still reported.
    load_config(config_path)?;
    let observability = Observability::from_std_env();

    let deps = ExtractSnapshotDeps {
        filesystem: Arc::new(LocalFileSystem::default()),
        logger: observability.scoped_logger("extract"),
    };
    let input = ExtractSnapshotInput {
        archive_path: normalize_path(archive_path),
        output_root: normalize_path(output_root),
    };
    extract_snapshot(&deps, input)
}

/// Report whether `path` under `source_root` would be excluded, and by which pattern.
pub fn run_check_ignore_local(
    config_path: Option<&Path>,
    source_root: &Path,
    path: &str,
    is_directory: bool,
) -> InfraResult<CheckIgnoreOutput> {
    let config = load_config(config_path)?;
    let observability = Observability::from_std_env();

    let candidate = CandidatePath::parse(path, is_directory).map_err(ErrorEnvelope::from)?;
    let deps = CheckIgnoreDeps {
        filesystem: Arc::new(LocalFileSystem::new(Some(config.scan.max_file_size_bytes))),
        ignore: Arc::new(GlobIgnoreMatcher::new(config.ignore.negation)),
        logger: observability.scoped_logger("check-ignore"),
    };
    let input = CheckIgnoreInput {
        source_root: normalize_path(source_root),
        candidate,
        ignore_file_name: config.ignore.file_name.clone(),
        extra_patterns: config.ignore.patterns.clone(),
    };
    check_ignore(&deps, input)
}

/// Load the effective config using the process env and working directory.
pub fn load_config(config_path: Option<&Path>) -> InfraResult<ValidatedSnapshotConfig> {
    let cwd = std::env::current_dir().map_err(ErrorEnvelope::from)?;
    let config_path = resolve_config_path(config_path, &cwd);
    load_snapshot_config_std_env(config_path.as_deref())
}

fn max_files(config: &ValidatedSnapshotConfig) -> InfraResult<Option<NonZeroUsize>> {
    let value = usize::try_from(config.scan.max_files).map_err(|_| out_of_range("maxFiles"))?;
    Ok(NonZeroUsize::new(value))
}

fn out_of_range(field: &str) -> InfraError {
    ErrorEnvelope::expected(ErrorCode::invalid_input(), format!("{field} out of range"))
        .with_metadata("field", field.to_owned())
}

fn normalize_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Location of the archive inside the source tree, if it lands there.
///
/// Both sides are canonicalized so symlinked or `..`-laden spellings of the
/// same directory still compare equal.
fn excluded_output(source_root: &Path, output_path: &Path) -> Option<SafeRelativePath> {
    let root = std::fs::canonicalize(source_root).ok()?;
    let file_name = output_path.file_name()?;
    let parent = output_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let parent = std::fs::canonicalize(parent).ok()?;

    let full = parent.join(file_name);
    let relative = full.strip_prefix(&root).ok()?;
    let relative = relative.to_str()?.replace('\\', "/");
    SafeRelativePath::new(&relative)
        .ok()
        .filter(|path| !path.is_root())
}
