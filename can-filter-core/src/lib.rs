//! CAN ID Filter Library
//!
//! A stateless, reusable library for filtering lines of ASCII CAN trace logs
//! (`.asc`) by a set of CAN identifiers, with named identifier-list presets
//! persisted to a local JSON file.
//!
//! # Architecture
//!
//! This library is intentionally minimal and focused on filtering:
//! - Parses a comma-separated identifier list into an [`IdentifierSpec`]
//! - Matches lines by substring or word-boundary semantics ([`Matcher`])
//! - Streams an input file to an output file or an in-memory preview
//!   ([`Pipeline`]), with optional progress and cancellation hooks
//! - Persists presets as a flat JSON object ([`PresetStore`])
//!
//! The library does NOT:
//! - Decode binary CAN frames or interpret DBC/ARXML signals
//! - Read from a live bus
//! - Present any user interface
//!
//! All presentation (argument handling, progress display, summaries) is in
//! the application layer (can-filter-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use can_filter_core::{IdentifierSpec, MatchConfig, Pipeline};
//! use std::path::Path;
//!
//! let spec = IdentifierSpec::parse("0x100, 0x200, 500").unwrap();
//! let config = MatchConfig::new().with_exact_match(true);
//!
//! let pipeline = Pipeline::new(&spec, &config).unwrap();
//! let stats = pipeline
//!     .run(Path::new("trace.asc"), Path::new("filtered.asc"))
//!     .unwrap();
//!
//! println!(
//!     "{} of {} lines selected ({:.2}%)",
//!     stats.selected_lines,
//!     stats.total_lines,
//!     stats.percentage()
//! );
//! ```

// Public modules
pub mod config;
pub mod identifiers;
pub mod matcher;
pub mod pipeline;
pub mod presets;
pub mod types;

// Re-export main types for convenience
pub use config::MatchConfig;
pub use identifiers::IdentifierSpec;
pub use matcher::Matcher;
pub use pipeline::{Pipeline, Progress, RunControl, DEFAULT_PREVIEW_LIMIT};
pub use presets::{PresetStore, DEFAULT_PRESETS_FILE};
pub use types::{FilterError, FilterStats, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
