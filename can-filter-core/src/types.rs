//! Core types for the CAN ID filter library
//!
//! This module defines the error type shared by every operation and the
//! statistics value a full filter run produces. The library separates
//! validation failures (bad caller input, nothing touched on disk) from I/O
//! failures (the host system refused a read or write mid-operation).

use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;

/// Result type for filter operations
pub type Result<T> = std::result::Result<T, FilterError>;

/// Errors that can occur while filtering or managing presets
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("no CAN identifiers provided")]
    EmptyIdentifierList,

    #[error("preset name must not be empty")]
    EmptyPresetName,

    #[error("preset identifier list must not be empty")]
    EmptyPresetText,

    #[error("preset not found: {0}")]
    PresetNotFound(String),

    #[error("preview limit must be greater than zero")]
    InvalidPreviewLimit,

    #[error("run cancelled")]
    Cancelled,

    #[error("failed to read input file {path:?}: {source}")]
    InputIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write output file {path:?}: {source}")]
    OutputIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to access preset file {path:?}: {source}")]
    PresetIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid match pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl FilterError {
    /// True for errors caused by bad caller input rather than the host system.
    ///
    /// Validation errors are surfaced before any file is opened or written.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            FilterError::EmptyIdentifierList
                | FilterError::EmptyPresetName
                | FilterError::EmptyPresetText
                | FilterError::InvalidPreviewLimit
        )
    }
}

/// Line counts produced by a completed full filter run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterStats {
    /// Total lines read from the input file
    pub total_lines: u64,
    /// Lines selected and written to the output file
    pub selected_lines: u64,
}

impl FilterStats {
    /// Selected lines as a percentage of total lines (0.0 for an empty input)
    pub fn percentage(&self) -> f64 {
        if self.total_lines == 0 {
            0.0
        } else {
            self.selected_lines as f64 / self.total_lines as f64 * 100.0
        }
    }
}
