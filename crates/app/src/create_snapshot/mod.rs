//! Build a snapshot document from a directory tree.

mod scanner;
mod types;

pub use types::{
    CreateSnapshotDeps, CreateSnapshotInput, CreateSnapshotOutput, SkipReason, SkippedFile,
};

use crate::ignore_source::{ignore_file_path, load_pattern_set};
use flatsnap_domain::{SafeRelativePath, SnapshotEntry, render_snapshot};
use flatsnap_ports::{FileSystemEntryKind, FileSystemPortExt, LogFields};
use flatsnap_shared::{ErrorCode, ErrorEnvelope, Result};
use scanner::{classify_read_error, scan_tree, skip_fields};
use serde_json::Value;
use std::time::Instant;

/// Scan the source tree, read every admitted text file, and write the archive.
///
/// Per-file failures are recorded in the output and never abort the run.
/// Failing to write the archive is a hard error.
pub fn create_snapshot(
    deps: &CreateSnapshotDeps,
    input: CreateSnapshotInput,
) -> Result<CreateSnapshotOutput> {
    let started_at = Instant::now();
    if let Some(logger) = deps.logger.as_ref() {
        logger.info(
            "snapshot.create.start",
            "Snapshot creation started",
            Some(log_fields_start(&input)),
        );
    }

    let result = run(deps, &input);

    match &result {
        Ok(output) => {
            if let Some(logger) = deps.logger.as_ref() {
                logger.info(
                    "snapshot.create.completed",
                    "Snapshot creation completed",
                    Some(log_fields_completed(output, started_at)),
                );
            }
        },
        Err(error) => {
            if let Some(logger) = deps.logger.as_ref() {
                logger.error(
                    "snapshot.create.failed",
                    "Snapshot creation failed",
                    Some(log_fields_error(&input, started_at, error)),
                );
            }
        },
    }
    result
}

fn run(deps: &CreateSnapshotDeps, input: &CreateSnapshotInput) -> Result<CreateSnapshotOutput> {
    let fs = deps.filesystem.session(input.source_root.clone());
    let root_stat = fs.stat(&SafeRelativePath::root())?;
    if root_stat.kind != FileSystemEntryKind::Directory {
        return Err(ErrorEnvelope::expected(
            ErrorCode::invalid_input(),
            "source path is not a directory",
        )
        .with_metadata("path", input.source_root.to_string_lossy().to_string()));
    }

    let ignore_file = ignore_file_path(&input.ignore_file_name)?;
    let loaded = load_pattern_set(
        &fs,
        deps.logger.as_ref(),
        &ignore_file,
        &input.extra_patterns,
    );

    let mut excluded = vec![ignore_file];
    excluded.extend(input.excluded_output.iter().cloned());

    let scan = scan_tree(deps, &fs, &loaded.patterns, &excluded, input.max_files);
    if scan.truncated {
        if let Some(logger) = deps.logger.as_ref() {
            logger.warn(
                "snapshot.scan.limit_reached",
                "File limit reached; remaining files were not collected",
                Some(log_fields_limit(scan.files.len())),
            );
        }
    }

    let mut skipped = scan.skipped;
    let mut entries = Vec::with_capacity(scan.files.len());
    for path in scan.files {
        match fs.read_file_text(&path) {
            Ok(content) => entries.push(SnapshotEntry::new(path, content)),
            Err(error) => {
                let reason = classify_read_error(&error);
                if let Some(logger) = deps.logger.as_ref() {
                    logger.warn(
                        "snapshot.create.file_skipped",
                        "Skipping binary or unreadable file",
                        Some(skip_fields(path.as_str(), &error)),
                    );
                }
                skipped.push(SkippedFile {
                    path: path.as_str().into(),
                    reason,
                    detail: error.message.into_boxed_str(),
                });
            },
        }
    }

    let marker_conflicts: Vec<Box<str>> = entries
        .iter()
        .filter(|entry| entry.contains_marker())
        .map(|entry| Box::from(entry.path.as_str()))
        .collect();
    for path in &marker_conflicts {
        if let Some(logger) = deps.logger.as_ref() {
            logger.warn(
                "snapshot.create.marker_in_content",
                "File content contains the entry marker; extraction will split it",
                Some(log_fields_path(path)),
            );
        }
    }

    let document = render_snapshot(&entries);
    if let Some(parent) = input.output_path.parent() {
        if !parent.as_os_str().is_empty() {
            deps.filesystem.create_dir_all(parent)?;
        }
    }
    deps.filesystem
        .write_document(&input.output_path, &document)?;

    Ok(CreateSnapshotOutput {
        archive_path: input.output_path.clone(),
        files_written: entries.len(),
        skipped,
        marker_conflicts,
        truncated: scan.truncated,
        ignore_file_error: loaded.ignore_file_error,
    })
}

fn duration_ms(started_at: Instant) -> u64 {
    u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn log_fields_start(input: &CreateSnapshotInput) -> LogFields {
    let mut fields = LogFields::new();
    fields.insert(
        "sourceRoot".to_owned().into_boxed_str(),
        Value::String(input.source_root.to_string_lossy().to_string()),
    );
    fields.insert(
        "outputPath".to_owned().into_boxed_str(),
        Value::String(input.output_path.to_string_lossy().to_string()),
    );
    fields.insert(
        "ignoreFile".to_owned().into_boxed_str(),
        Value::String(input.ignore_file_name.to_string()),
    );
    fields
}

fn log_fields_completed(output: &CreateSnapshotOutput, started_at: Instant) -> LogFields {
    let mut fields = LogFields::new();
    fields.insert(
        "filesWritten".to_owned().into_boxed_str(),
        Value::from(output.files_written),
    );
    fields.insert(
        "skipped".to_owned().into_boxed_str(),
        Value::from(output.skipped.len()),
    );
    fields.insert(
        "truncated".to_owned().into_boxed_str(),
        Value::Bool(output.truncated),
    );
    fields.insert(
        "durationMs".to_owned().into_boxed_str(),
        Value::from(duration_ms(started_at)),
    );
    fields
}

fn log_fields_limit(collected: usize) -> LogFields {
    let mut fields = LogFields::new();
    fields.insert(
        "collected".to_owned().into_boxed_str(),
        Value::from(collected),
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

fn log_fields_error(
    input: &CreateSnapshotInput,
    started_at: Instant,
    error: &ErrorEnvelope,
) -> LogFields {
    let mut fields = log_fields_start(input);
    fields.insert(
        "durationMs".to_owned().into_boxed_str(),
        Value::from(duration_ms(started_at)),
    );
    fields.insert(
        "error".to_owned().into_boxed_str(),
        Value::String(error.to_string()),
    );
    fields
}
