//! Check-ignore command handler.

use crate::error::{CliError, ExitCode};
use crate::format::OutputMode;
use crate::{CliOutput, format_error_output, log_warn};
use flatsnap_app::CheckIgnoreOutput;
use flatsnap_infra::run_check_ignore_local;
use std::path::Path;

/// Run the check-ignore command.
pub fn run_check_ignore(
    mode: OutputMode,
    config_path: Option<&Path>,
    source: &Path,
    path: &str,
    is_directory: bool,
) -> Result<CliOutput, CliError> {
    let trimmed = path.trim();
    if trimmed.is_empty() || trimmed == "." {
        return Err(CliError::InvalidInput(
            "path must name an entry below the source directory".to_owned(),
        ));
    }
    match run_check_ignore_local(config_path, source, path, is_directory) {
        Ok(report) => format_check_output(mode, &report),
        Err(error) => Ok(format_error_output(mode, &error)),
    }
}

fn format_check_output(mode: OutputMode, report: &CheckIgnoreOutput) -> Result<CliOutput, CliError> {
    let mut stderr = String::new();
    if let Some(error) = &report.ignore_file_error {
        log_warn(
            &mut stderr,
            &format!("cannot read ignore file ({error}); none of its patterns were applied"),
            mode.quiet,
        );
    }
    let stdout = if mode.is_json() {
        let payload = serde_json::json!({
            "status": "ok",
            "path": report.path,
            "isDirectory": report.is_directory,
            "ignored": report.ignored,
            "decision": report.decision,
            "patternCount": report.pattern_count,
            "ignoreFileError": report.ignore_file_error,
        });
        let mut out = serde_json::to_string_pretty(&payload)?;
        out.push('\n');
        out
    } else {
        format_check_text(report)
    };

    Ok(CliOutput {
        stdout,
        stderr,
        exit_code: ExitCode::Ok,
    })
}

fn format_check_text(report: &CheckIgnoreOutput) -> String {
    let mut out = String::new();
    out.push_str("status: ok\n");
    push_kv(&mut out, "path", &report.path);
    push_kv(&mut out, "directory", bool_str(report.is_directory));
    push_kv(&mut out, "ignored", bool_str(report.ignored));
    match &report.decision {
        Some(decision) => {
            push_kv(&mut out, "pattern", &decision.pattern);
            push_kv(&mut out, "patternIndex", &decision.pattern_index.to_string());
        },
        None => push_kv(&mut out, "pattern", "<none>"),
    }
    push_kv(&mut out, "patternCount", &report.pattern_count.to_string());
    out
}

const fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

#[inline]
fn push_kv(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push_str(": ");
    out.push_str(value);
    out.push('\n');
}
