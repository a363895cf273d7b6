//! Ignore-file pattern model.

use crate::glob::GlobProgram;
use crate::paths::CandidatePath;
use serde::{Deserialize, Serialize};

/// Default name of the ignore file read from the archive root.
pub const DEFAULT_IGNORE_FILE_NAME: &str = ".snapshotignore";

/// How `!`-prefixed patterns take part in decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NegationMode {
    /// Negated patterns are parsed but never match or un-ignore.
    #[default]
    Inert,
    /// The last matching pattern decides; a negated match un-ignores.
    LastMatchWins,
}

impl NegationMode {
    /// Stable config value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inert => "inert",
            Self::LastMatchWins => "lastMatchWins",
        }
    }

    /// Parse a config value (case-insensitive, `-`/`_` tolerant).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|ch| *ch != '-' && *ch != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "inert" => Some(Self::Inert),
            "lastmatchwins" => Some(Self::LastMatchWins),
            _ => None,
        }
    }
}

/// One parsed ignore line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnorePattern {
    raw: Box<str>,
    negated: bool,
    directory_only: bool,
    anchored: bool,
    program: GlobProgram,
}

impl IgnorePattern {
    /// Parse one line. Returns `None` for blank and comment-only lines.
    ///
    /// Everything from the first `#` is dropped, so `#` cannot appear inside
    /// a pattern.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let without_comment = line.split_once('#').map_or(line, |(head, _)| head);
        let raw = without_comment.trim();
        if raw.is_empty() {
            return None;
        }

        let (negated, body) = raw
            .strip_prefix('!')
            .map_or((false, raw), |rest| (true, rest));
        let (directory_only, body) = body
            .strip_suffix('/')
            .map_or((false, body), |rest| (true, rest));
        let (anchored, body) = body
            .strip_prefix('/')
            .map_or((false, body), |rest| (true, rest));

        Some(Self {
            raw: raw.into(),
            negated,
            directory_only,
            anchored,
            program: GlobProgram::compile(body),
        })
    }

    /// Pattern text after comment stripping and trimming.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Leading `!`.
    #[must_use]
    pub const fn is_negated(&self) -> bool {
        self.negated
    }

    /// Trailing `/`.
    #[must_use]
    pub const fn is_directory_only(&self) -> bool {
        self.directory_only
    }

    /// Leading `/` (after any `!`).
    #[must_use]
    pub const fn is_anchored(&self) -> bool {
        self.anchored
    }

    /// Compiled glob body.
    #[must_use]
    pub const fn program(&self) -> &GlobProgram {
        &self.program
    }

    /// Glob match for a candidate, disregarding negation.
    #[must_use]
    pub fn matches(&self, candidate: &CandidatePath) -> bool {
        if self.directory_only && !candidate.is_directory() {
            return false;
        }
        let path = candidate.as_str();
        if self.anchored {
            self.program.matches_whole(path)
        } else {
            self.program.matches_at_any_depth(path)
        }
    }
}

/// Ordered, immutable list of ignore patterns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PatternSet {
    patterns: Vec<IgnorePattern>,
}

impl PatternSet {
    /// Empty set; matches nothing.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Parse lines in declaration order.
    pub fn parse<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: lines
                .into_iter()
                .filter_map(|line| IgnorePattern::parse(line.as_ref()))
                .collect(),
        }
    }

    /// Parse the contents of an ignore file.
    #[must_use]
    pub fn from_source(source: &str) -> Self {
        Self::parse(source.lines())
    }

    /// Patterns in declaration order.
    #[must_use]
    pub fn patterns(&self) -> &[IgnorePattern] {
        &self.patterns
    }

    /// Number of patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// True when no patterns were parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// The pattern that decided a candidate's fate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IgnoreMatch {
    /// Zero-based position in the pattern set.
    pub pattern_index: usize,
    /// Pattern text as written.
    pub pattern: Box<str>,
    /// Final decision.
    pub ignored: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::PathError;
    use std::error::Error;

    type TestResult = Result<(), Box<dyn Error>>;

    fn parsed(line: &str) -> Result<IgnorePattern, Box<dyn Error>> {
        IgnorePattern::parse(line).ok_or_else(|| format!("pattern {line:?} did not parse").into())
    }

    fn file(path: &str) -> Result<CandidatePath, PathError> {
        CandidatePath::parse(path, false)
    }

    fn dir(path: &str) -> Result<CandidatePath, PathError> {
        CandidatePath::parse(path, true)
    }

    #[test]
    fn comments_and_blank_lines_are_dropped() {
        let set = PatternSet::from_source("  # comment only\n\n   \n*.tmp # trailing\n");
        assert_eq!(set.len(), 1);
        assert_eq!(set.patterns().first().map(IgnorePattern::raw), Some("*.tmp"));
    }

    #[test]
    fn parse_records_flags() -> TestResult {
        let pattern = parsed("!/build/")?;
        assert!(pattern.is_negated());
        assert!(pattern.is_anchored());
        assert!(pattern.is_directory_only());
        assert_eq!(pattern.program().to_string(), "build");
        assert_eq!(pattern.raw(), "!/build/");
        Ok(())
    }

    #[test]
    fn directory_only_patterns_skip_files() -> TestResult {
        let set = PatternSet::from_source("build/");
        let pattern = set.patterns().first().ok_or("build/ did not parse")?;
        assert!(pattern.matches(&dir("build")?));
        assert!(pattern.matches(&dir("a/b/build")?));
        assert!(!pattern.matches(&file("build")?));
        Ok(())
    }

    #[test]
    fn anchored_patterns_match_only_at_root() -> TestResult {
        let pattern = parsed("/dist")?;
        assert!(pattern.matches(&dir("dist")?));
        assert!(!pattern.matches(&dir("sub/dist")?));
        Ok(())
    }

    #[test]
    fn bare_names_match_at_any_depth() -> TestResult {
        let pattern = parsed("node_modules")?;
        for path in ["node_modules", "a/node_modules", "a/b/node_modules"] {
            assert!(pattern.matches(&dir(path)?), "{path}");
        }
        assert!(!pattern.matches(&dir("node_modules_old")?));
        Ok(())
    }

    #[test]
    fn nested_patterns_float_when_unanchored() -> TestResult {
        let pattern = parsed("src/generated")?;
        assert!(pattern.matches(&dir("src/generated")?));
        assert!(pattern.matches(&dir("pkg/src/generated")?));
        assert!(!pattern.matches(&file("src/generated/code.rs")?));
        Ok(())
    }

    #[test]
    fn negation_mode_parses_config_spellings() {
        assert_eq!(NegationMode::parse("inert"), Some(NegationMode::Inert));
        assert_eq!(
            NegationMode::parse("last-match-wins"),
            Some(NegationMode::LastMatchWins)
        );
        assert_eq!(
            NegationMode::parse(NegationMode::LastMatchWins.as_str()),
            Some(NegationMode::LastMatchWins)
        );
        assert_eq!(NegationMode::parse("sometimes"), None);
    }

    #[test]
    fn empty_source_yields_empty_set() {
        assert!(PatternSet::from_source("").is_empty());
        assert_eq!(PatternSet::empty(), PatternSet::default());
    }
}
