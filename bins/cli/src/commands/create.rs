//! Create command handler.

use crate::error::{CliError, ExitCode};
use crate::format::OutputMode;
use crate::{CliOutput, format_error_output, log_info, log_warn};
use flatsnap_app::{CreateSnapshotOutput, SkipReason};
use flatsnap_infra::run_create_local;
use std::path::Path;

/// Run the create command.
pub fn run_create(
    mode: OutputMode,
    config_path: Option<&Path>,
    source: &Path,
    output: Option<&Path>,
) -> Result<CliOutput, CliError> {
    match run_create_local(config_path, source, output) {
        Ok(summary) => format_create_output(mode, &summary),
        Err(error) => Ok(format_error_output(mode, &error)),
    }
}

fn format_create_output(
    mode: OutputMode,
    summary: &CreateSnapshotOutput,
) -> Result<CliOutput, CliError> {
    let mut stderr = String::new();
    if let Some(error) = &summary.ignore_file_error {
        log_warn(
            &mut stderr,
            &format!("cannot read ignore file ({error}); none of its patterns were applied"),
            mode.quiet,
        );
    }
    for skipped in &summary.skipped {
        let message = if skipped.reason == SkipReason::UnsupportedName {
            format!("Skipping entry with unsupported name: {}", skipped.path)
        } else {
            format!(
                "Skipping binary or unreadable file: {} ({})",
                skipped.path, skipped.reason
            )
        };
        log_warn(&mut stderr, &message, mode.quiet);
    }
    for path in &summary.marker_conflicts {
        log_warn(
            &mut stderr,
            &format!("{path} contains the file marker and will not extract cleanly"),
            mode.quiet,
        );
    }
    if summary.truncated {
        log_warn(
            &mut stderr,
            "file limit reached, archive is incomplete",
            mode.quiet,
        );
    }
    log_info(&mut stderr, "create completed", mode.quiet);

    let stdout = if mode.is_json() {
        format_create_json(summary)?
    } else {
        format_create_text(summary)
    };

    Ok(CliOutput {
        stdout,
        stderr,
        exit_code: ExitCode::Ok,
    })
}

fn format_create_json(summary: &CreateSnapshotOutput) -> Result<String, CliError> {
    let skipped: Vec<serde_json::Value> = summary
        .skipped
        .iter()
        .map(|skipped| {
            serde_json::json!({
                "path": skipped.path,
                "reason": skipped.reason.as_str(),
                "detail": skipped.detail,
            })
        })
        .collect();
    let payload = serde_json::json!({
        "status": "ok",
        "archivePath": summary.archive_path.to_string_lossy(),
        "filesWritten": summary.files_written,
        "skipped": skipped,
        "markerConflicts": summary.marker_conflicts,
        "truncated": summary.truncated,
        "ignoreFileError": summary.ignore_file_error,
    });
    let mut out = serde_json::to_string_pretty(&payload)?;
    out.push('\n');
    Ok(out)
}

fn format_create_text(summary: &CreateSnapshotOutput) -> String {
    let mut out = String::new();
    out.push_str("status: ok\n");
    out.push_str("archive: ");
    out.push_str(&summary.archive_path.to_string_lossy());
    out.push('\n');
    out.push_str("filesWritten: ");
    out.push_str(&summary.files_written.to_string());
    out.push('\n');
    out.push_str("truncated: ");
    out.push_str(if summary.truncated { "true" } else { "false" });
    out.push('\n');

    if !summary.skipped.is_empty() {
        out.push_str("skipped:\n");
        for skipped in &summary.skipped {
            out.push_str("  ");
            out.push_str(&skipped.path);
            out.push_str(": ");
            out.push_str(skipped.reason.as_str());
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::OutputFormat;
    use flatsnap_app::SkippedFile;
    use std::path::PathBuf;

    fn summary() -> CreateSnapshotOutput {
        CreateSnapshotOutput {
            archive_path: PathBuf::from("/tmp/current.snapshot"),
            files_written: 2,
            skipped: vec![SkippedFile {
                path: "logo.png".into(),
                reason: SkipReason::NotText,
                detail: "stream did not contain valid UTF-8".into(),
            }],
            marker_conflicts: Vec::new(),
            truncated: false,
            ignore_file_error: None,
        }
    }

    #[test]
    fn text_summary_lists_skipped_files() -> Result<(), CliError> {
        let mode = OutputMode {
            format: OutputFormat::Text,
            quiet: false,
        };
        let output = format_create_output(mode, &summary())?;
        assert!(output.stdout.starts_with("status: ok\n"));
        assert!(output.stdout.contains("filesWritten: 2\n"));
        assert!(output.stdout.contains("  logo.png: not_text\n"));
        assert!(
            output
                .stderr
                .contains("Skipping binary or unreadable file: logo.png (not_text)")
        );
        Ok(())
    }

    #[test]
    fn quiet_json_summary_has_no_stderr() -> Result<(), Box<dyn std::error::Error>> {
        let mode = OutputMode {
            format: OutputFormat::Json,
            quiet: true,
        };
        let output = format_create_output(mode, &summary())?;
        assert!(output.stderr.is_empty());

        let value: serde_json::Value = serde_json::from_str(output.stdout.trim())?;
        assert_eq!(value["filesWritten"], 2);
        assert_eq!(value["skipped"][0]["reason"], "not_text");
        Ok(())
    }

    #[test]
    fn unreadable_ignore_file_and_odd_names_are_warned() -> Result<(), Box<dyn std::error::Error>> {
        let mut summary = summary();
        summary.ignore_file_error = Some("Permission denied".into());
        summary.skipped.push(SkippedFile {
            path: "bad\u{fffd}name.txt".into(),
            reason: SkipReason::UnsupportedName,
            detail: "name is not valid UTF-8".into(),
        });
        let text = OutputMode {
            format: OutputFormat::Text,
            quiet: false,
        };
        let output = format_create_output(text, &summary)?;
        assert!(output.stderr.contains(
            "warning: cannot read ignore file (Permission denied); none of its patterns were applied"
        ));
        assert!(
            output
                .stderr
                .contains("Skipping entry with unsupported name: bad\u{fffd}name.txt")
        );

        let json = OutputMode {
            format: OutputFormat::Json,
            quiet: true,
        };
        let output = format_create_output(json, &summary)?;
        let value: serde_json::Value = serde_json::from_str(output.stdout.trim())?;
        assert_eq!(value["ignoreFileError"], "Permission denied");
        assert_eq!(value["skipped"][1]["reason"], "unsupported_name");
        Ok(())
    }
}
