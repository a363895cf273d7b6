//! End-to-end use case tests against the local filesystem.

use flatsnap_adapters::{GlobIgnoreMatcher, LocalFileSystem};
use flatsnap_app::{
    CheckIgnoreDeps, CheckIgnoreInput, CreateSnapshotDeps, CreateSnapshotInput,
    ExtractSnapshotDeps, ExtractSnapshotInput, SkipReason, check_ignore, create_snapshot,
    extract_snapshot,
};
use flatsnap_domain::{CandidatePath, NegationMode, SafeRelativePath};
use flatsnap_shared::{ErrorEnvelope, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(label: &str) -> Result<PathBuf> {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    let dir = std::env::temp_dir().join(format!("flatsnap_app_{label}_{nanos}"));
    fs::create_dir_all(&dir).map_err(ErrorEnvelope::from)?;
    Ok(dir)
}

fn write_tree(root: &Path, files: &[(&str, &str)]) -> Result<()> {
    for (path, contents) in files {
        let full = root.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(ErrorEnvelope::from)?;
        }
        fs::write(full, contents).map_err(ErrorEnvelope::from)?;
    }
    Ok(())
}

fn read_tree(root: &Path) -> Result<BTreeMap<String, String>> {
    let mut files = BTreeMap::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir).map_err(ErrorEnvelope::from)? {
            let path = entry.map_err(ErrorEnvelope::from)?.path();
            if path.is_dir() {
                pending.push(path);
            } else {
                let rel = path
                    .strip_prefix(root)
                    .map(|rel| rel.to_string_lossy().replace('\\', "/"))
                    .unwrap_or_default();
                files.insert(rel, fs::read_to_string(&path).map_err(ErrorEnvelope::from)?);
            }
        }
    }
    Ok(files)
}

fn create_deps(negation: NegationMode) -> CreateSnapshotDeps {
    CreateSnapshotDeps {
        filesystem: Arc::new(LocalFileSystem::new(Some(1024))),
        ignore: Arc::new(GlobIgnoreMatcher::new(negation)),
        logger: None,
    }
}

fn create_input(source: &Path, output: &Path) -> CreateSnapshotInput {
    CreateSnapshotInput {
        source_root: source.to_path_buf(),
        output_path: output.to_path_buf(),
        excluded_output: None,
        ignore_file_name: ".snapshotignore".into(),
        extra_patterns: Vec::new(),
        max_files: None,
    }
}

#[test]
fn extract_of_create_reproduces_the_tree() -> Result<()> {
    let source = temp_dir("roundtrip_src")?;
    let work = temp_dir("roundtrip_work")?;
    write_tree(
        &source,
        &[
            ("README.md", "# title\n"),
            ("empty.txt", ""),
            ("no_newline.txt", "last line"),
            ("src/main.rs", "fn main() {}\n\n"),
            ("src/nested/deep/data.json", "{\"a\": 1}\n"),
            ("spaces in name.txt", "  padded  \n"),
        ],
    )?;

    let archive = work.join("tree.snapshot");
    let created = create_snapshot(
        &create_deps(NegationMode::Inert),
        create_input(&source, &archive),
    )?;
    assert_eq!(created.files_written, 6);

    let restored = work.join("restored");
    let extracted = extract_snapshot(
        &ExtractSnapshotDeps {
            filesystem: Arc::new(LocalFileSystem::default()),
            logger: None,
        },
        ExtractSnapshotInput {
            archive_path: archive,
            output_root: restored.clone(),
        },
    )?;

    assert_eq!(extracted.files_extracted, 6);
    assert_eq!(extracted.malformed_segments, 0);
    assert_eq!(read_tree(&restored)?, read_tree(&source)?);
    Ok(())
}

#[test]
fn archiving_twice_is_byte_identical() -> Result<()> {
    let source = temp_dir("idempotent_src")?;
    let work = temp_dir("idempotent_work")?;
    write_tree(
        &source,
        &[("b.txt", "b\n"), ("a/c.txt", "c\n"), ("a/b/d.txt", "d\n")],
    )?;

    let first = work.join("first.snapshot");
    let second = work.join("second.snapshot");
    let deps = create_deps(NegationMode::Inert);
    create_snapshot(&deps, create_input(&source, &first))?;
    create_snapshot(&deps, create_input(&source, &second))?;

    let first_bytes = fs::read(&first).map_err(ErrorEnvelope::from)?;
    let second_bytes = fs::read(&second).map_err(ErrorEnvelope::from)?;
    assert_eq!(first_bytes, second_bytes);
    Ok(())
}

#[test]
fn ignore_rules_and_self_exclusion_apply() -> Result<()> {
    let source = temp_dir("ignore_src")?;
    write_tree(
        &source,
        &[
            (".snapshotignore", "# generated\nbuild/\n/dist\n**/*.log\n\n"),
            ("build", "a file named build\n"),
            ("pkg/build/out.txt", "ignored\n"),
            ("dist/bundle.js", "ignored\n"),
            ("pkg/dist/keep.js", "kept\n"),
            ("sub/dir/b.log", "ignored\n"),
            ("sub/dir/b.logx", "kept\n"),
            ("current.snapshot", "stale\n"),
        ],
    )?;
    fs::write(source.join("binary.bin"), [0xff, 0xfe, 0x00, 0x01]).map_err(ErrorEnvelope::from)?;
    fs::write(source.join("large.txt"), "x".repeat(2048)).map_err(ErrorEnvelope::from)?;

    let mut input = create_input(&source, &source.join("current.snapshot"));
    input.excluded_output =
        Some(SafeRelativePath::new("current.snapshot").map_err(ErrorEnvelope::from)?);
    let output = create_snapshot(&create_deps(NegationMode::Inert), input)?;
    let document =
        fs::read_to_string(source.join("current.snapshot")).map_err(ErrorEnvelope::from)?;

    assert!(document.contains("### FILE: build ###\n"));
    assert!(document.contains("### FILE: pkg/dist/keep.js ###\n"));
    assert!(document.contains("### FILE: sub/dir/b.logx ###\n"));
    assert!(!document.contains("pkg/build/out.txt"));
    assert!(!document.contains("dist/bundle.js"));
    assert!(!document.contains("### FILE: sub/dir/b.log ###"));
    assert!(!document.contains(".snapshotignore"));
    assert!(!document.contains("stale"));
    assert_eq!(output.files_written, 3);

    let reasons: BTreeMap<&str, SkipReason> = output
        .skipped
        .iter()
        .map(|skip| (skip.path.as_ref(), skip.reason))
        .collect();
    assert_eq!(reasons.get("binary.bin"), Some(&SkipReason::NotText));
    assert_eq!(reasons.get("large.txt"), Some(&SkipReason::TooLarge));
    Ok(())
}

#[test]
fn negation_mode_controls_reinclusion() -> Result<()> {
    let source = temp_dir("negation_src")?;
    write_tree(
        &source,
        &[
            (".snapshotignore", "*.log\n!keep.log\n"),
            ("keep.log", "keep\n"),
            ("drop.log", "drop\n"),
        ],
    )?;
    let check = |negation: NegationMode| -> Result<bool> {
        let output = check_ignore(
            &CheckIgnoreDeps {
                filesystem: Arc::new(LocalFileSystem::default()),
                ignore: Arc::new(GlobIgnoreMatcher::new(negation)),
                logger: None,
            },
            CheckIgnoreInput {
                source_root: source.clone(),
                candidate: CandidatePath::parse("keep.log", false).map_err(ErrorEnvelope::from)?,
                ignore_file_name: ".snapshotignore".into(),
                extra_patterns: Vec::new(),
            },
        )?;
        assert_eq!(output.pattern_count, 2);
        Ok(output.ignored)
    };

    assert!(check(NegationMode::Inert)?);
    assert!(!check(NegationMode::LastMatchWins)?);
    Ok(())
}

#[test]
fn missing_source_directory_is_a_hard_error() -> Result<()> {
    let work = temp_dir("missing_src")?;
    let error = create_snapshot(
        &create_deps(NegationMode::Inert),
        create_input(&work.join("nope"), &work.join("out.snapshot")),
    )
    .err();
    assert!(error.is_some());
    assert!(!work.join("out.snapshot").exists());
    Ok(())
}

#[test]
fn ignore_file_with_latin1_comment_still_excludes() -> Result<()> {
    let source = temp_dir("latin1_ignore")?;
    let work = temp_dir("latin1_work")?;
    write_tree(&source, &[("secret.txt", "token\n"), ("public.txt", "hello\n")])?;
    fs::write(source.join(".snapshotignore"), b"secret.txt\n# caf\xe9\n")
        .map_err(ErrorEnvelope::from)?;

    let archive = work.join("out.snapshot");
    let output = create_snapshot(
        &create_deps(NegationMode::Inert),
        create_input(&source, &archive),
    )?;
    let document = fs::read_to_string(&archive).map_err(ErrorEnvelope::from)?;

    assert_eq!(output.files_written, 1);
    assert!(output.ignore_file_error.is_none());
    assert!(!document.contains("token"));
    Ok(())
}

#[cfg(target_os = "linux")]
#[test]
fn unarchivable_names_are_skipped_with_a_reason() -> Result<()> {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let source = temp_dir("odd_names")?;
    let work = temp_dir("odd_names_work")?;
    write_tree(&source, &[("ok.txt", "ok\n"), ("\\back.txt", "rooted\n")])?;
    fs::write(source.join(OsStr::from_bytes(b"bad\xffname.txt")), "lossy\n")
        .map_err(ErrorEnvelope::from)?;

    let output = create_snapshot(
        &create_deps(NegationMode::Inert),
        create_input(&source, &work.join("out.snapshot")),
    )?;

    assert_eq!(output.files_written, 1);
    let reasons: BTreeMap<&str, SkipReason> = output
        .skipped
        .iter()
        .map(|skip| (skip.path.as_ref(), skip.reason))
        .collect();
    assert_eq!(reasons.get("\\back.txt"), Some(&SkipReason::UnsupportedName));
    assert_eq!(
        reasons.get("bad\u{fffd}name.txt"),
        Some(&SkipReason::UnsupportedName)
    );
    Ok(())
}
