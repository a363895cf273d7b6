//! Glob pattern compilation into a small token program.
//!
//! Only `*`, `**`, and `**/` carry meaning. Every other character, including
//! `?`, `[` and `.`, is matched literally.

use std::fmt;

/// One instruction of a compiled glob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlobToken {
    /// Exact text, never containing `/`.
    Literal(Box<str>),
    /// A single `/`.
    Separator,
    /// `*`: zero or more characters other than `/`.
    SegmentWildcard,
    /// `**` not followed by `/`: any sequence, separators included.
    AnyPath,
    /// `**/`: the empty string or any prefix ending in `/`.
    AnyDirectories,
}

impl fmt::Display for GlobToken {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => formatter.write_str(text),
            Self::Separator => formatter.write_str("/"),
            Self::SegmentWildcard => formatter.write_str("*"),
            Self::AnyPath => formatter.write_str("**"),
            Self::AnyDirectories => formatter.write_str("**/"),
        }
    }
}

/// A compiled glob that matches whole relative paths.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GlobProgram {
    tokens: Vec<GlobToken>,
}

impl GlobProgram {
    /// Compile a glob body. Compilation is total: any input yields a program.
    #[must_use]
    pub fn compile(pattern: &str) -> Self {
        Self {
            tokens: tokenize(pattern),
        }
    }

    /// Compiled tokens in order.
    #[must_use]
    pub fn tokens(&self) -> &[GlobToken] {
        &self.tokens
    }

    /// True when the program consumes the entire path.
    #[must_use]
    pub fn matches_whole(&self, path: &str) -> bool {
        Matcher::new(&self.tokens, path).matches(0, 0)
    }

    /// True when the program matches the whole path or any suffix that
    /// starts right after a `/`.
    #[must_use]
    pub fn matches_at_any_depth(&self, path: &str) -> bool {
        let mut matcher = Matcher::new(&self.tokens, path);
        if matcher.matches(0, 0) {
            return true;
        }
        path.match_indices('/')
            .any(|(index, _)| matcher.matches(0, index + 1))
    }
}

impl fmt::Display for GlobProgram {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            write!(formatter, "{token}")?;
        }
        Ok(())
    }
}

fn tokenize(pattern: &str) -> Vec<GlobToken> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut chars = pattern.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '*' | '/' => {
                if !literal.is_empty() {
                    tokens.push(GlobToken::Literal(std::mem::take(&mut literal).into()));
                }
                if ch == '/' {
                    tokens.push(GlobToken::Separator);
                } else if chars.next_if_eq(&'*').is_some() {
                    if chars.next_if_eq(&'/').is_some() {
                        tokens.push(GlobToken::AnyDirectories);
                    } else {
                        tokens.push(GlobToken::AnyPath);
                    }
                } else {
                    tokens.push(GlobToken::SegmentWildcard);
                }
            },
            other => literal.push(other),
        }
    }

    if !literal.is_empty() {
        tokens.push(GlobToken::Literal(literal.into()));
    }
    tokens
}

/// Backtracking matcher memoized on (token index, byte offset), so every
/// state is evaluated at most once.
struct Matcher<'a> {
    tokens: &'a [GlobToken],
    text: &'a str,
    memo: Vec<Option<bool>>,
}

impl<'a> Matcher<'a> {
    fn new(tokens: &'a [GlobToken], text: &'a str) -> Self {
        Self {
            tokens,
            text,
            memo: vec![None; (tokens.len() + 1) * (text.len() + 1)],
        }
    }

    fn matches(&mut self, token: usize, offset: usize) -> bool {
        let slot = token * (self.text.len() + 1) + offset;
        if let Some(Some(known)) = self.memo.get(slot) {
            return *known;
        }
        let result = self.evaluate(token, offset);
        if let Some(entry) = self.memo.get_mut(slot) {
            *entry = Some(result);
        }
        result
    }

    fn evaluate(&mut self, token: usize, offset: usize) -> bool {
        let (tokens, text) = (self.tokens, self.text);
        let Some(tail) = text.get(offset..) else {
            return false;
        };
        let Some(current) = tokens.get(token) else {
            return tail.is_empty();
        };
        let next = token + 1;

        match current {
            GlobToken::Literal(literal) => {
                tail.starts_with(&**literal) && self.matches(next, offset + literal.len())
            },
            GlobToken::Separator => tail.starts_with('/') && self.matches(next, offset + 1),
            GlobToken::SegmentWildcard => {
                for (index, ch) in tail.char_indices() {
                    if self.matches(next, offset + index) {
                        return true;
                    }
                    if ch == '/' {
                        return false;
                    }
                }
                self.matches(next, text.len())
            },
            GlobToken::AnyPath => {
                for (index, _) in tail.char_indices() {
                    if self.matches(next, offset + index) {
                        return true;
                    }
                }
                self.matches(next, text.len())
            },
            GlobToken::AnyDirectories => {
                if self.matches(next, offset) {
                    return true;
                }
                for (index, _) in tail.match_indices('/') {
                    if self.matches(next, offset + index + 1) {
                        return true;
                    }
                }
                false
            },
        }
    }
}
