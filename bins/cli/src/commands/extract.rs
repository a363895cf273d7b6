//! Extract command handler.

use crate::error::{CliError, ExitCode};
use crate::format::OutputMode;
use crate::{CliOutput, format_error_output, log_info, log_warn};
use flatsnap_app::ExtractSnapshotOutput;
use flatsnap_infra::run_extract_local;
use std::path::Path;

/// Run the extract command.
pub fn run_extract(
    mode: OutputMode,
    config_path: Option<&Path>,
    archive: &Path,
    output_dir: &Path,
) -> Result<CliOutput, CliError> {
    match run_extract_local(config_path, archive, output_dir) {
        Ok(summary) => format_extract_output(mode, &summary),
        Err(error) => Ok(format_error_output(mode, &error)),
    }
}

fn format_extract_output(
    mode: OutputMode,
    summary: &ExtractSnapshotOutput,
) -> Result<CliOutput, CliError> {
    let mut stderr = String::new();
    for path in &summary.rejected_paths {
        log_warn(
            &mut stderr,
            &format!("refusing to write outside the output directory: {path}"),
            mode.quiet,
        );
    }
    log_info(&mut stderr, "extract completed", mode.quiet);

    let stdout = if mode.is_json() {
        let payload = serde_json::json!({
            "status": "ok",
            "outputDir": summary.output_root.to_string_lossy(),
            "filesExtracted": summary.files_extracted,
            "malformedSegments": summary.malformed_segments,
            "rejectedPaths": summary.rejected_paths,
        });
        let mut out = serde_json::to_string_pretty(&payload)?;
        out.push('\n');
        out
    } else {
        format!(
            "status: ok\noutputDir: {}\nfilesExtracted: {}\nmalformedSegments: {}\nrejectedPaths: {}\n",
            summary.output_root.display(),
            summary.files_extracted,
            summary.malformed_segments,
            summary.rejected_paths.len(),
        )
    };

    Ok(CliOutput {
        stdout,
        stderr,
        exit_code: ExitCode::Ok,
    })
}
