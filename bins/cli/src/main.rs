//! CLI binary entrypoint.

mod commands;
mod error;
mod format;

use clap::{CommandFactory, Parser, Subcommand};
use commands::{run_check_ignore, run_create, run_extract};
use error::{CliError, ExitCode};
use flatsnap_infra::{InfraError, load_effective_config_json, resolve_config_path};
use format::{OutputArgs, OutputMode};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(
    name = "flatsnap",
    version,
    about = "Flatten a directory of text files into one snapshot, and back",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    output: OutputArgs,

    /// Config file path (JSON/TOML). Defaults to `.flatsnap.toml` when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Archive every text file under a directory into one snapshot.
    Create {
        /// Directory to archive.
        source: PathBuf,
        /// Snapshot path. Defaults to `archive.defaultOutput`.
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
    /// Rebuild a directory tree from a snapshot.
    Extract {
        /// Snapshot to read.
        archive: PathBuf,
        /// Directory to write the files under.
        output_dir: PathBuf,
    },
    /// Report whether a path would be excluded, and by which pattern.
    CheckIgnore {
        /// Directory holding the ignore file.
        source: PathBuf,
        /// Path relative to the source directory.
        path: String,
        /// Evaluate the path as a directory.
        #[arg(long)]
        dir: bool,
    },
    /// Config-related commands.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Show the effective config after env overrides.
    Show,
}

pub(crate) struct CliOutput {
    stdout: String,
    stderr: String,
    exit_code: ExitCode,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let mode = OutputMode::from_args(&cli.output);

    let Some(command) = cli.command.as_ref() else {
        return print_help();
    };

    match run(command, cli.config.as_deref(), mode) {
        Ok(output) => match write_output(&output) {
            Ok(()) => std::process::ExitCode::from(output.exit_code.as_u8()),
            Err(error) => exit_with_error(&error),
        },
        Err(error) => exit_with_error(&error),
    }
}

fn print_help() -> std::process::ExitCode {
    match Cli::command().print_help() {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(error) => exit_with_error(&CliError::Io(error)),
    }
}

fn exit_with_error(error: &CliError) -> std::process::ExitCode {
    let _ = writeln!(io::stderr(), "error: {error}");
    std::process::ExitCode::from(error.exit_code().as_u8())
}

fn run(
    command: &Commands,
    config_path: Option<&Path>,
    mode: OutputMode,
) -> Result<CliOutput, CliError> {
    match command {
        Commands::Create { source, output } => {
            run_create(mode, config_path, source, output.as_deref())
        },
        Commands::Extract {
            archive,
            output_dir,
        } => run_extract(mode, config_path, archive, output_dir),
        Commands::CheckIgnore { source, path, dir } => {
            run_check_ignore(mode, config_path, source, path, *dir)
        },
        Commands::Config { command } => match command {
            ConfigCommands::Show => config_show(mode, config_path),
        },
    }
}

fn config_show(mode: OutputMode, path: Option<&Path>) -> Result<CliOutput, CliError> {
    let env = collect_scoped_env("FLATSNAP_");
    let cwd = std::env::current_dir()?;
    let path = resolve_config_path(path, &cwd);
    config_show_with_env(mode, path.as_deref(), &env)
}

fn config_show_with_env(
    mode: OutputMode,
    path: Option<&Path>,
    env: &BTreeMap<String, String>,
) -> Result<CliOutput, CliError> {
    let config_json = match load_effective_config_json(env, path) {
        Ok(config) => config,
        Err(error) => return Ok(format_error_output(mode, &error)),
    };

    let mut stderr = String::new();
    log_info(&mut stderr, "config show completed", mode.quiet);

    let stdout = if mode.is_json() {
        let config_value: serde_json::Value = serde_json::from_str(config_json.trim())?;
        let payload = serde_json::json!({
            "status": "ok",
            "configPath": path.map(|value| value.to_string_lossy().to_string()),
            "effectiveConfig": config_value,
        });
        let mut output = serde_json::to_string_pretty(&payload)?;
        output.push('\n');
        output
    } else {
        let mut out = String::new();
        out.push_str("status: ok\nconfig:\n");
        out.push_str(config_json.trim_end());
        out.push('\n');
        out
    };

    Ok(CliOutput {
        stdout,
        stderr,
        exit_code: ExitCode::Ok,
    })
}

pub(crate) fn format_error_output(mode: OutputMode, error: &InfraError) -> CliOutput {
    let exit_code = ExitCode::for_envelope(error);

    let stdout = if mode.is_json() {
        let payload = serde_json::json!({
            "status": "error",
            "error": {
                "code": error.code.to_string(),
                "message": error.message,
                "kind": error.kind.to_string(),
                "meta": error.metadata,
            },
        });

        // This is a CLI boundary, so JSON serialization errors are internal.
        let mut output = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| {
            "{\"status\":\"error\",\"error\":{\"code\":\"core:internal\",\"message\":\"internal error\",\"kind\":\"invariant\"}}".to_string()
        });
        output.push('\n');
        output
    } else {
        format_error_text(error)
    };

    let mut stderr = String::new();
    if !mode.is_json() {
        stderr.push_str("error: ");
        stderr.push_str(&error.message);
        stderr.push('\n');
    }

    CliOutput {
        stdout,
        stderr,
        exit_code,
    }
}

fn format_error_text(error: &InfraError) -> String {
    let mut out = String::new();
    out.push_str("status: error\n");
    out.push_str("code: ");
    out.push_str(&error.code.to_string());
    out.push('\n');
    out.push_str("message: ");
    out.push_str(&error.message);
    out.push('\n');
    out.push_str("kind: ");
    out.push_str(&error.kind.to_string());
    out.push('\n');

    if !error.metadata.is_empty() {
        out.push_str("meta:\n");
        for (key, value) in &error.metadata {
            out.push_str("  ");
            out.push_str(key);
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        }
    }

    out
}

pub(crate) fn log_info(stderr: &mut String, message: &str, quiet: bool) {
    if quiet {
        return;
    }
    stderr.push_str("info: ");
    stderr.push_str(message);
    stderr.push('\n');
}

pub(crate) fn log_warn(stderr: &mut String, message: &str, quiet: bool) {
    if quiet {
        return;
    }
    stderr.push_str("warning: ");
    stderr.push_str(message);
    stderr.push('\n');
}

fn write_output(output: &CliOutput) -> Result<(), CliError> {
    let mut stdout = io::stdout();
    stdout.write_all(output.stdout.as_bytes())?;

    if !output.stderr.is_empty() {
        let mut stderr = io::stderr();
        stderr.write_all(output.stderr.as_bytes())?;
        stderr.flush()?;
    }

    Ok(())
}

fn collect_scoped_env(prefix: &str) -> BTreeMap<String, String> {
    std::env::vars()
        .filter(|(key, _)| key.starts_with(prefix))
        .collect()
}
