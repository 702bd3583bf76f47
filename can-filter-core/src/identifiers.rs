//! Identifier list parsing
//!
//! CAN identifiers arrive as a single comma-separated string. Tokens are
//! trimmed and empty tokens dropped; an empty result is a hard error. Tokens
//! may be decimal integers, `0x`/`0X`-prefixed hexadecimal, or arbitrary text
//! (some traces carry alphanumeric message names instead of raw IDs). A
//! `0x`-prefixed token that does not parse as hexadecimal produces a warning
//! but is kept verbatim as a literal-text match candidate.

use crate::types::{FilterError, Result};

/// An immutable, ordered list of identifier tokens for one filter run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierSpec {
    tokens: Vec<String>,
    warnings: Vec<String>,
}

impl IdentifierSpec {
    /// Parse a comma-separated identifier string
    ///
    /// # Example
    /// ```
    /// use can_filter_core::IdentifierSpec;
    ///
    /// let spec = IdentifierSpec::parse("0x100, 200, EngineStatus").unwrap();
    /// assert_eq!(spec.tokens(), ["0x100", "200", "EngineStatus"]);
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let tokens: Vec<String> = input
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(String::from)
            .collect();

        if tokens.is_empty() {
            return Err(FilterError::EmptyIdentifierList);
        }

        let mut warnings = Vec::new();
        for token in &tokens {
            if let Some(digits) = token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
            {
                // Invalid hex is kept as literal text, not dropped
                if u64::from_str_radix(digits, 16).is_err() {
                    let warning = format!("invalid hex CAN ID: {token}");
                    log::warn!("{warning} (kept as literal text)");
                    warnings.push(warning);
                }
            }
            // Non-numeric tokens without the 0x prefix are legitimate
            // free-text identifiers; no validation applies to them.
        }

        Ok(Self { tokens, warnings })
    }

    /// Identifier tokens in the order the user entered them
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Warnings collected during parsing (invalid hex tokens)
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Number of identifier tokens (always at least 1)
    pub fn len(&self) -> usize {
        self.tokens.len()
    }
}
