//! Rebuild a directory tree from a snapshot document.

use flatsnap_domain::parse_snapshot;
use flatsnap_ports::{FileSystemPort, FileSystemPortExt, LogFields, LoggerPort};
use flatsnap_shared::{ErrorEnvelope, Result};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Input payload for extraction.
#[derive(Debug, Clone)]
pub struct ExtractSnapshotInput {
    /// Snapshot document to read.
    pub archive_path: PathBuf,
    /// Directory that receives the files; created when missing.
    pub output_root: PathBuf,
}

/// Dependencies required by extraction.
#[derive(Clone)]
pub struct ExtractSnapshotDeps {
    /// Filesystem adapter.
    pub filesystem: Arc<dyn FileSystemPort>,
    /// Optional logger.
    pub logger: Option<Arc<dyn LoggerPort>>,
}

/// Output returned by extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractSnapshotOutput {
    /// Directory the files were written under.
    pub output_root: PathBuf,
    /// Number of entries written.
    pub files_extracted: usize,
    /// Segments dropped for lacking a marker terminator.
    pub malformed_segments: usize,
    /// Entry paths refused because they would escape the output root.
    pub rejected_paths: Vec<Box<str>>,
}

/// Read the archive, create the output root, and write every entry.
///
/// Malformed segments and unsafe paths are skipped. Any write failure is a
/// hard error.
pub fn extract_snapshot(
    deps: &ExtractSnapshotDeps,
    input: ExtractSnapshotInput,
) -> Result<ExtractSnapshotOutput> {
    let started_at = Instant::now();
    if let Some(logger) = deps.logger.as_ref() {
        logger.info(
            "snapshot.extract.start",
            "Snapshot extraction started",
            Some(log_fields_start(&input)),
        );
    }

    let result = run(deps, &input);
    match &result {
        Ok(output) => {
            if let Some(logger) = deps.logger.as_ref() {
                logger.info(
                    "snapshot.extract.completed",
                    "Snapshot extraction completed",
                    Some(log_fields_completed(output, started_at)),
                );
            }
        },
        Err(error) => {
            if let Some(logger) = deps.logger.as_ref() {
                let mut fields = log_fields_start(&input);
                fields.insert(
                    "error".to_owned().into_boxed_str(),
                    Value::String(error.to_string()),
                );
                logger.error(
                    "snapshot.extract.failed",
                    "Snapshot extraction failed",
                    Some(fields),
                );
            }
        },
    }
    result
}

fn run(deps: &ExtractSnapshotDeps, input: &ExtractSnapshotInput) -> Result<ExtractSnapshotOutput> {
    let document = deps.filesystem.read_document(&input.archive_path)?;
    let parsed = parse_snapshot(&document);

    deps.filesystem.create_dir_all(&input.output_root)?;
    let fs = deps.filesystem.session(input.output_root.clone());

    for rejected in &parsed.unsafe_paths {
        if let Some(logger) = deps.logger.as_ref() {
            logger.warn(
                "snapshot.extract.path_rejected",
                "Refusing to write entry outside the output directory",
                Some(log_fields_path(rejected)),
            );
        }
    }

    for entry in &parsed.entries {
        fs.write_file_text(&entry.path, &entry.content)
            .map_err(|error| with_entry(error, entry.path.as_str()))?;
    }

    Ok(ExtractSnapshotOutput {
        output_root: input.output_root.clone(),
        files_extracted: parsed.entries.len(),
        malformed_segments: parsed.malformed_segments,
        rejected_paths: parsed.unsafe_paths,
    })
}

fn with_entry(error: ErrorEnvelope, entry: &str) -> ErrorEnvelope {
    error.with_metadata("entry", entry.to_owned())
}

fn log_fields_start(input: &ExtractSnapshotInput) -> LogFields {
    let mut fields = LogFields::new();
    fields.insert(
        "archivePath".to_owned().into_boxed_str(),
        Value::String(input.archive_path.to_string_lossy().to_string()),
    );
    fields.insert(
        "outputRoot".to_owned().into_boxed_str(),
        Value::String(input.output_root.to_string_lossy().to_string()),
    );
    fields
}

fn log_fields_completed(output: &ExtractSnapshotOutput, started_at: Instant) -> LogFields {
    let mut fields = LogFields::new();
    fields.insert(
        "filesExtracted".to_owned().into_boxed_str(),
        Value::from(output.files_extracted),
    );
    fields.insert(
        "malformedSegments".to_owned().into_boxed_str(),
        Value::from(output.malformed_segments),
    );
    fields.insert(
        "rejectedPaths".to_owned().into_boxed_str(),
        Value::from(output.rejected_paths.len()),
    );
    fields.insert(
        "durationMs".to_owned().into_boxed_str(),
        Value::from(u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX)),
    );
    fields
}

fn log_fields_path(path: &str) -> LogFields {
    let mut fields = LogFields::new();
    fields.insert(
        "path".to_owned().into_boxed_str(),
        Value::String(path.to_owned()),
    );
    fields
}
