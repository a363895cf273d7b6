//! CLI create/extract flow E2E tests.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn run_cli_in_dir(dir: &Path, args: &[&str]) -> io::Result<Output> {
    let mut command = Command::new(env!("CARGO_BIN_EXE_flatsnap"));
    command.current_dir(dir).args(args);
    for (key, _) in std::env::vars() {
        if key.starts_with("FLATSNAP_") {
            command.env_remove(key);
        }
    }
    command.output()
}

fn temp_dir(label: &str) -> io::Result<PathBuf> {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("flatsnap-cli-e2e-{label}-{unique}"));
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn write_file(root: &Path, relative: &str, contents: &[u8]) -> io::Result<()> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}

fn expect_success(output: &Output) -> io::Result<()> {
    if output.status.success() {
        return Ok(());
    }
    Err(io::Error::other(format!(
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    )))
}

#[test]
fn create_then_extract_restores_text_files() -> io::Result<()> {
    let source = temp_dir("source")?;
    let work = temp_dir("work")?;
    write_file(&source, ".snapshotignore", b"node_modules\n*.log\n")?;
    write_file(&source, "src/lib.rs", b"pub fn answer() -> u32 {\n    42\n}\n")?;
    write_file(&source, "docs/notes.md", b"notes without newline")?;
    write_file(&source, "node_modules/pkg/index.js", b"ignored\n")?;
    write_file(&source, "debug.log", b"ignored\n")?;
    write_file(&source, "image.bin", &[0x89, 0x50, 0xff, 0x00])?;

    let source_arg = source.to_string_lossy().to_string();
    let output = run_cli_in_dir(&work, &["create", &source_arg, "-o", "tree.snapshot"])?;
    expect_success(&output)?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("filesWritten: 2\n"), "unexpected summary: {stdout}");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Skipping binary or unreadable file: image.bin"));

    let output = run_cli_in_dir(&work, &["extract", "tree.snapshot", "restored"])?;
    expect_success(&output)?;

    let restored = work.join("restored");
    assert_eq!(
        fs::read_to_string(restored.join("src/lib.rs"))?,
        "pub fn answer() -> u32 {\n    42\n}\n"
    );
    assert_eq!(
        fs::read_to_string(restored.join("docs/notes.md"))?,
        "notes without newline"
    );
    assert!(!restored.join("node_modules").exists());
    assert!(!restored.join("debug.log").exists());
    assert!(!restored.join(".snapshotignore").exists());
    Ok(())
}

#[test]
fn default_output_inside_tree_is_not_archived() -> io::Result<()> {
    let source = temp_dir("self")?;
    write_file(&source, "a.txt", b"a\n")?;
    write_file(&source, "b/c.txt", b"c\n")?;

    expect_success(&run_cli_in_dir(&source, &["create", ".", "--quiet"])?)?;
    let first = fs::read(source.join("current.snapshot"))?;
    expect_success(&run_cli_in_dir(&source, &["create", ".", "--quiet"])?)?;
    let second = fs::read(source.join("current.snapshot"))?;

    assert_eq!(first, second);
    let text = String::from_utf8_lossy(&second);
    assert!(!text.contains("### FILE: current.snapshot ###"));
    Ok(())
}

#[test]
fn json_summary_reports_counts() -> Result<(), Box<dyn std::error::Error>> {
    let source = temp_dir("json")?;
    let work = temp_dir("json-work")?;
    write_file(&source, "one.txt", b"1\n")?;
    write_file(&source, "two.txt", b"2\n")?;

    let output = run_cli_in_dir(
        &work,
        &[
            "--format",
            "json",
            "create",
            source.to_str().ok_or("non-utf8 temp dir")?,
            "--output",
            "out.snapshot",
        ],
    )?;
    expect_success(&output)?;
    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["status"], "ok");
    assert_eq!(value["filesWritten"], 2);
    assert_eq!(value["truncated"], false);

    let output = run_cli_in_dir(&work, &["extract", "out.snapshot", "back", "--format", "json"])?;
    expect_success(&output)?;
    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["filesExtracted"], 2);
    assert_eq!(value["malformedSegments"], 0);
    Ok(())
}

#[test]
fn check_ignore_names_the_deciding_pattern() -> io::Result<()> {
    let source = temp_dir("check")?;
    write_file(&source, ".snapshotignore", b"# build output\nbuild/\n")?;

    let output = run_cli_in_dir(&source, &["check-ignore", ".", "pkg/build", "--dir"])?;
    expect_success(&output)?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ignored: true\n"));
    assert!(stdout.contains("pattern: build/\n"));

    let output = run_cli_in_dir(&source, &["check-ignore", ".", "pkg/build"])?;
    expect_success(&output)?;
    assert!(String::from_utf8_lossy(&output.stdout).contains("ignored: false\n"));
    Ok(())
}

#[test]
fn ignore_file_bytes_outside_utf8_do_not_leak_files() -> io::Result<()> {
    let source = temp_dir("latin1")?;
    write_file(&source, ".snapshotignore", b"secret.txt\n# caf\xe9\n")?;
    write_file(&source, "secret.txt", b"token\n")?;
    write_file(&source, "public.txt", b"hello\n")?;

    let output = run_cli_in_dir(&source, &["create", ".", "-o", "out.snapshot"])?;
    expect_success(&output)?;
    assert!(!String::from_utf8_lossy(&output.stderr).contains("cannot read ignore file"));
    let archive = fs::read_to_string(source.join("out.snapshot"))?;
    assert!(archive.contains("### FILE: public.txt ###"));
    assert!(!archive.contains("token"));
    Ok(())
}

#[test]
fn missing_source_directory_fails() -> io::Result<()> {
    let work = temp_dir("missing")?;
    let output = run_cli_in_dir(&work, &["create", "does-not-exist"])?;
    assert!(!output.status.success());
    assert!(!work.join("current.snapshot").exists());
    Ok(())
}
