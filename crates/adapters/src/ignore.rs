//! Glob-based ignore matcher adapter.

use flatsnap_ports::{CandidatePath, IgnoreMatch, IgnorePort, NegationMode, PatternSet};

/// Ignore matcher evaluating compiled glob patterns in declaration order.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobIgnoreMatcher {
    negation: NegationMode,
}

impl GlobIgnoreMatcher {
    /// Build a matcher with the given negation handling.
    pub const fn new(negation: NegationMode) -> Self {
        Self { negation }
    }

    /// Negation handling in effect.
    pub const fn negation(&self) -> NegationMode {
        self.negation
    }
}

impl IgnorePort for GlobIgnoreMatcher {
    fn explain(&self, candidate: &CandidatePath, patterns: &PatternSet) -> Option<IgnoreMatch> {
        match self.negation {
            NegationMode::Inert => patterns
                .patterns()
                .iter()
                .enumerate()
                .find(|(_, pattern)| !pattern.is_negated() && pattern.matches(candidate))
                .map(|(index, pattern)| IgnoreMatch {
                    pattern_index: index,
                    pattern: pattern.raw().into(),
                    ignored: true,
                }),
            NegationMode::LastMatchWins => patterns
                .patterns()
                .iter()
                .enumerate()
                .rev()
                .find(|(_, pattern)| pattern.matches(candidate))
                .map(|(index, pattern)| IgnoreMatch {
                    pattern_index: index,
                    pattern: pattern.raw().into(),
                    ignored: !pattern.is_negated(),
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flatsnap_domain::PathError;

    fn file(path: &str) -> Result<CandidatePath, PathError> {
        CandidatePath::parse(path, false)
    }

    fn dir(path: &str) -> Result<CandidatePath, PathError> {
        CandidatePath::parse(path, true)
    }

    #[test]
    fn build_directory_is_ignored_at_any_depth() -> Result<(), PathError> {
        let matcher = GlobIgnoreMatcher::default();
        let patterns = PatternSet::from_source("build/\n");

        assert!(matcher.is_ignored(&dir("build")?, &patterns));
        assert!(matcher.is_ignored(&dir("pkg/build")?, &patterns));
        assert!(!matcher.is_ignored(&file("build")?, &patterns));
        Ok(())
    }

    #[test]
    fn recursive_extension_pattern() -> Result<(), PathError> {
        let matcher = GlobIgnoreMatcher::default();
        let patterns = PatternSet::from_source("**/*.log");

        assert!(matcher.is_ignored(&file("a.log")?, &patterns));
        assert!(matcher.is_ignored(&file("sub/dir/b.log")?, &patterns));
        assert!(!matcher.is_ignored(&file("sub/dir/b.logx")?, &patterns));
        Ok(())
    }

    #[test]
    fn anchored_pattern_only_matches_root() -> Result<(), PathError> {
        let matcher = GlobIgnoreMatcher::default();
        let patterns = PatternSet::from_source("/dist");

        assert!(matcher.is_ignored(&dir("dist")?, &patterns));
        assert!(!matcher.is_ignored(&dir("sub/dist")?, &patterns));
        Ok(())
    }

    #[test]
    fn inert_negation_never_unignores() -> Result<(), PathError> {
        let matcher = GlobIgnoreMatcher::new(NegationMode::Inert);
        let patterns = PatternSet::from_source("*.log\n!keep.log\n");

        assert!(matcher.is_ignored(&file("keep.log")?, &patterns));
        let only_negated = PatternSet::from_source("!keep.log");
        assert_eq!(matcher.explain(&file("keep.log")?, &only_negated), None);
        Ok(())
    }

    #[test]
    fn last_match_wins_honours_negation() -> Result<(), PathError> {
        let matcher = GlobIgnoreMatcher::new(NegationMode::LastMatchWins);
        let patterns = PatternSet::from_source("*.log\n!keep.log\n");

        assert!(matcher.is_ignored(&file("drop.log")?, &patterns));
        assert!(!matcher.is_ignored(&file("keep.log")?, &patterns));
        assert_eq!(
            matcher.explain(&file("keep.log")?, &patterns),
            Some(IgnoreMatch {
                pattern_index: 1,
                pattern: "!keep.log".into(),
                ignored: false,
            })
        );
        Ok(())
    }

    #[test]
    fn first_matching_pattern_is_reported() -> Result<(), PathError> {
        let matcher = GlobIgnoreMatcher::default();
        let patterns = PatternSet::from_source("# header\nsecret.txt\n*.txt\n");
        let decision = matcher.explain(&file("docs/secret.txt")?, &patterns);
        assert_eq!(decision.map(|decision| decision.pattern_index), Some(0));
        Ok(())
    }

    #[test]
    fn empty_pattern_set_ignores_nothing() -> Result<(), PathError> {
        let matcher = GlobIgnoreMatcher::default();
        assert!(!matcher.is_ignored(&file("anything")?, &PatternSet::empty()));
        Ok(())
    }
}
