//! Ignore matcher boundary contract.

use flatsnap_domain::{CandidatePath, IgnoreMatch, PatternSet};

/// Boundary contract for ignore matching.
///
/// Implementations are pure: the same candidate and pattern set always yield
/// the same answer, and no errors are raised.
pub trait IgnorePort: Send + Sync {
    /// Returns the pattern that decided the candidate, if any matched.
    fn explain(&self, candidate: &CandidatePath, patterns: &PatternSet) -> Option<IgnoreMatch>;

    /// Returns true when the path should be excluded.
    fn is_ignored(&self, candidate: &CandidatePath, patterns: &PatternSet) -> bool {
        self.explain(candidate, patterns)
            .is_some_and(|decision| decision.ignored)
    }
}
