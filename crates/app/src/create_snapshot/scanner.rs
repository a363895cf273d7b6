//! File discovery and ignore policy for `create_snapshot`.

use super::types::{CreateSnapshotDeps, SkipReason, SkippedFile};
use flatsnap_domain::{CandidatePath, PatternSet, SafeRelativePath};
use flatsnap_ports::{FileSystemEntryKind, FileSystemSession, LogFields};
use flatsnap_shared::{ErrorCode, ErrorEnvelope};
use serde_json::Value;
use std::collections::VecDeque;
use std::num::NonZeroUsize;

/// Files discovered by a scan, sorted by path.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub files: Vec<SafeRelativePath>,
    pub skipped: Vec<SkippedFile>,
    pub truncated: bool,
}

/// Breadth-first walk from the root.
///
/// Ignored directories are pruned, so nothing beneath them is visited.
/// Symlinks and special files are never followed or collected. Names that
/// cannot form a safe relative path are reported as skipped.
pub fn scan_tree(
    deps: &CreateSnapshotDeps,
    fs: &FileSystemSession<'_>,
    patterns: &PatternSet,
    excluded: &[SafeRelativePath],
    max_files: Option<NonZeroUsize>,
) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();
    let mut dirs: VecDeque<SafeRelativePath> = VecDeque::from([SafeRelativePath::root()]);

    'scan: while let Some(dir) = dirs.pop_front() {
        let entries = match fs.read_dir(&dir) {
            Ok(entries) => entries,
            Err(error) => {
                if let Some(logger) = deps.logger.as_ref() {
                    logger.warn(
                        "snapshot.scan.dir_read_failed",
                        "Cannot read directory during scan",
                        Some(skip_fields(dir.as_str(), &error)),
                    );
                }
                outcome.skipped.push(SkippedFile {
                    path: dir.as_str().into(),
                    reason: SkipReason::Unreadable,
                    detail: error.message.into_boxed_str(),
                });
                continue;
            },
        };

        let mut sorted = entries;
        sorted.sort_by(|a, b| a.name.cmp(&b.name));

        for entry in sorted {
            if entry.kind == FileSystemEntryKind::Other {
                continue;
            }
            let joined = if entry.lossy_name {
                Err("name is not valid UTF-8".to_owned())
            } else {
                dir.join(&entry.name).map_err(|error| error.to_string())
            };
            let rel = match joined {
                Ok(rel) => rel,
                Err(detail) => {
                    let path = display_path(&dir, &entry.name);
                    if let Some(logger) = deps.logger.as_ref() {
                        logger.warn(
                            "snapshot.scan.name_rejected",
                            "Entry name cannot be archived",
                            Some(name_rejected_fields(&path, &detail)),
                        );
                    }
                    outcome.skipped.push(SkippedFile {
                        path: path.into_boxed_str(),
                        reason: SkipReason::UnsupportedName,
                        detail: detail.into_boxed_str(),
                    });
                    continue;
                },
            };

            match entry.kind {
                FileSystemEntryKind::Directory => {
                    let candidate = CandidatePath::directory(rel);
                    if deps.ignore.is_ignored(&candidate, patterns) {
                        continue;
                    }
                    dirs.push_back(candidate.path().clone());
                },
                FileSystemEntryKind::File => {
                    if excluded.contains(&rel) {
                        continue;
                    }
                    let candidate = CandidatePath::file(rel);
                    if deps.ignore.is_ignored(&candidate, patterns) {
                        continue;
                    }
                    if max_files.is_some_and(|max| outcome.files.len() >= max.get()) {
                        outcome.truncated = true;
                        break 'scan;
                    }
                    outcome.files.push(candidate.path().clone());
                },
                FileSystemEntryKind::Other => {},
            }
        }
    }

    outcome.files.sort();
    outcome
}

fn display_path(dir: &SafeRelativePath, name: &str) -> String {
    if dir.is_root() {
        name.to_owned()
    } else {
        format!("{dir}/{name}")
    }
}

fn name_rejected_fields(path: &str, detail: &str) -> LogFields {
    let mut fields = LogFields::new();
    fields.insert(
        "path".to_owned().into_boxed_str(),
        Value::String(path.to_owned()),
    );
    fields.insert(
        "detail".to_owned().into_boxed_str(),
        Value::String(detail.to_owned()),
    );
    fields
}

/// Map a read failure onto a skip reason.
pub fn classify_read_error(error: &ErrorEnvelope) -> SkipReason {
    if error.code == ErrorCode::invalid_data() {
        SkipReason::NotText
    } else if error.code == ErrorCode::new("fs", "file_too_large") {
        SkipReason::TooLarge
    } else {
        SkipReason::Unreadable
    }
}

pub fn skip_fields(path: &str, error: &ErrorEnvelope) -> LogFields {
    let mut fields = LogFields::new();
    fields.insert(
        "path".to_owned().into_boxed_str(),
        Value::String(path.to_owned()),
    );
    fields.insert(
        "errorCode".to_owned().into_boxed_str(),
        Value::String(error.code.to_string()),
    );
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_errors_are_classified_by_code() {
        let not_text = ErrorEnvelope::expected(ErrorCode::invalid_data(), "not UTF-8");
        let too_large = ErrorEnvelope::expected(ErrorCode::new("fs", "file_too_large"), "too big");
        let denied = ErrorEnvelope::expected(ErrorCode::permission_denied(), "denied");

        assert_eq!(classify_read_error(&not_text), SkipReason::NotText);
        assert_eq!(classify_read_error(&too_large), SkipReason::TooLarge);
        assert_eq!(classify_read_error(&denied), SkipReason::Unreadable);
    }
}
