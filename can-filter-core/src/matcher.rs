//! Line matching
//!
//! The matcher decides whether a single line of a trace contains any of the
//! configured identifier tokens. Patterns are compiled once per run; matching
//! a line is a pure function with no side effects.
//!
//! In exact mode a token must sit on word boundaries (word characters are
//! alphanumerics and underscore), so `123` does not match inside `a123b` but
//! does match inside `(123)` and at line start or end. Tokens are escaped
//! before pattern construction, so regex metacharacters in a token match
//! literally.

use crate::config::MatchConfig;
use crate::identifiers::IdentifierSpec;
use crate::types::Result;
use regex::{Regex, RegexBuilder};

/// Compiled matching state for one filter run
#[derive(Debug, Clone)]
pub struct Matcher {
    mode: MatchMode,
    case_sensitive: bool,
}

#[derive(Debug, Clone)]
enum MatchMode {
    /// Substring containment; tokens pre-lowercased when case-insensitive
    Substring(Vec<String>),
    /// Word-boundary patterns, one per token
    WordBoundary(Vec<Regex>),
}

impl Matcher {
    /// Compile the identifier tokens under the given configuration
    pub fn new(spec: &IdentifierSpec, config: &MatchConfig) -> Result<Self> {
        let mode = if config.exact_match {
            let mut patterns = Vec::with_capacity(spec.len());
            for token in spec.tokens() {
                let pattern = format!(r"\b{}\b", regex::escape(token));
                let regex = RegexBuilder::new(&pattern)
                    .case_insensitive(!config.case_sensitive)
                    .build()?;
                patterns.push(regex);
            }
            MatchMode::WordBoundary(patterns)
        } else if config.case_sensitive {
            MatchMode::Substring(spec.tokens().to_vec())
        } else {
            MatchMode::Substring(
                spec.tokens().iter().map(|t| t.to_lowercase()).collect(),
            )
        };

        Ok(Self {
            mode,
            case_sensitive: config.case_sensitive,
        })
    }

    /// Check whether the line contains any identifier token
    ///
    /// Short-circuits on the first token that matches.
    pub fn matches(&self, line: &str) -> bool {
        match &self.mode {
            MatchMode::Substring(tokens) => {
                if self.case_sensitive {
                    tokens.iter().any(|token| line.contains(token.as_str()))
                } else {
                    let line = line.to_lowercase();
                    tokens.iter().any(|token| line.contains(token.as_str()))
                }
            }
            MatchMode::WordBoundary(patterns) => {
                patterns.iter().any(|regex| regex.is_match(line))
            }
        }
    }
}
