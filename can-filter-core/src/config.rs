//! Match configuration
//!
//! Three independent flags control how identifier tokens are compared against
//! log lines. The flags are orthogonal; any combination is valid. Callers pass
//! an explicit `MatchConfig` into every run rather than relying on ambient
//! state.

use serde::{Deserialize, Serialize};

/// Configuration for identifier matching
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Compare identifiers case-sensitively (default: case-insensitive)
    #[serde(default)]
    pub case_sensitive: bool,

    /// Require tokens to match on word boundaries instead of as substrings
    #[serde(default)]
    pub exact_match: bool,

    /// Invert selection: lines matching no identifier are kept instead
    #[serde(default)]
    pub exclude: bool,
}

impl MatchConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: enable or disable case-sensitive matching
    pub fn with_case_sensitive(mut self, enabled: bool) -> Self {
        self.case_sensitive = enabled;
        self
    }

    /// Builder method: enable or disable word-boundary (exact) matching
    pub fn with_exact_match(mut self, enabled: bool) -> Self {
        self.exact_match = enabled;
        self
    }

    /// Builder method: enable or disable exclude (inverse) mode
    pub fn with_exclude(mut self, enabled: bool) -> Self {
        self.exclude = enabled;
        self
    }
}
