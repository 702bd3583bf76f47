//! Line filter pipeline
//!
//! Streams an input trace file line by line through the [`Matcher`], applying
//! the exclude polarity, and either writes selected lines to an output file
//! (full run) or collects the first N selected lines into memory (preview).
//!
//! Lines are read as raw bytes so that the original line terminators survive:
//! the full run writes selected lines back verbatim, CR/LF included. Matching
//! operates on a lossy UTF-8 decode, so undecodable byte sequences never abort
//! a run.
//!
//! Both operations are stateless, single-pass, forward-only streams. A
//! cooperative cancellation flag is checked at the per-line loop boundary; a
//! cancelled full run removes its partial output file.

use crate::config::MatchConfig;
use crate::identifiers::IdentifierSpec;
use crate::matcher::Matcher;
use crate::types::{FilterError, FilterStats, Result};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Default number of selected lines collected by a preview run
pub const DEFAULT_PREVIEW_LIMIT: usize = 250;

/// Lines between progress callback invocations
const PROGRESS_INTERVAL_LINES: u64 = 100;

/// A progress snapshot, reported by cumulative bytes consumed
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    /// Bytes consumed from the input so far
    pub bytes_read: u64,
    /// Input file size in bytes (0 if unknown)
    pub total_bytes: u64,
    /// Lines read so far
    pub lines_read: u64,
}

impl Progress {
    /// Bytes consumed as a percentage of the input size
    pub fn percent(&self) -> f64 {
        if self.total_bytes == 0 {
            100.0
        } else {
            self.bytes_read as f64 / self.total_bytes as f64 * 100.0
        }
    }
}

/// Optional observability and cancellation hooks for a run
///
/// Progress and cancellation are presentation concerns: an interactive
/// embedder runs the pipeline off its interface thread and relays these
/// signals across it. A plain CLI can ignore both.
#[derive(Default)]
pub struct RunControl<'a> {
    progress: Option<Box<dyn FnMut(Progress) + 'a>>,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a> RunControl<'a> {
    /// Create a control block with no hooks attached
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: invoke `callback` every 100 lines with a progress snapshot
    pub fn on_progress(mut self, callback: impl FnMut(Progress) + 'a) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Builder method: stop the run when `flag` becomes true
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn report(&mut self, progress: Progress) {
        if let Some(callback) = self.progress.as_mut() {
            callback(progress);
        }
    }
}

/// A matcher bound to its selection polarity, ready to stream files
pub struct Pipeline {
    matcher: Matcher,
    exclude: bool,
}

impl Pipeline {
    /// Compile the identifier tokens and bind the configuration for one run
    ///
    /// An empty identifier list is unrepresentable here: [`IdentifierSpec`]
    /// cannot be constructed without at least one token.
    pub fn new(spec: &IdentifierSpec, config: &MatchConfig) -> Result<Self> {
        Ok(Self {
            matcher: Matcher::new(spec, config)?,
            exclude: config.exclude,
        })
    }

    /// Filter `input` into `output`, returning line counts
    ///
    /// Selected lines are written verbatim, original terminators included;
    /// the output is a strict subsequence of the input's lines. The output
    /// file is truncate-created.
    pub fn run(&self, input: &Path, output: &Path) -> Result<FilterStats> {
        self.run_with(input, output, RunControl::new())
    }

    /// Filter `input` into `output` with progress/cancellation hooks
    pub fn run_with(
        &self,
        input: &Path,
        output: &Path,
        mut control: RunControl,
    ) -> Result<FilterStats> {
        let input_err = |source| FilterError::InputIo {
            path: input.to_path_buf(),
            source,
        };
        let output_err = |source| FilterError::OutputIo {
            path: output.to_path_buf(),
            source,
        };

        log::info!("filtering {:?} -> {:?}", input, output);

        let in_file = File::open(input).map_err(input_err)?;
        let total_bytes = in_file.metadata().map(|m| m.len()).unwrap_or(0);
        let mut reader = BufReader::new(in_file);
        let mut writer = BufWriter::new(File::create(output).map_err(output_err)?);

        let mut stats = FilterStats::default();
        let mut bytes_read = 0u64;
        let mut line = Vec::new();

        loop {
            if control.cancelled() {
                // Discard the partial output
                drop(writer);
                let _ = fs::remove_file(output);
                log::info!("filter run cancelled after {} lines", stats.total_lines);
                return Err(FilterError::Cancelled);
            }

            line.clear();
            let n = reader.read_until(b'\n', &mut line).map_err(input_err)?;
            if n == 0 {
                break;
            }
            stats.total_lines += 1;
            bytes_read += n as u64;

            if stats.total_lines % PROGRESS_INTERVAL_LINES == 0 {
                control.report(Progress {
                    bytes_read,
                    total_bytes,
                    lines_read: stats.total_lines,
                });
            }

            if self.selects(&line) {
                stats.selected_lines += 1;
                writer.write_all(&line).map_err(output_err)?;
            }
        }

        writer.flush().map_err(output_err)?;
        log::info!(
            "filter run complete: {} of {} lines selected ({:.2}%)",
            stats.selected_lines,
            stats.total_lines,
            stats.percentage()
        );
        Ok(stats)
    }

    /// Collect the first `limit` selected lines without writing a file
    ///
    /// Returns the lines in file order with terminators stripped. An input
    /// with no selected lines yields an empty vector, not an error.
    pub fn preview(&self, input: &Path, limit: usize) -> Result<Vec<String>> {
        self.preview_with(input, limit, RunControl::new())
    }

    /// Preview with a cancellation hook; a cancelled preview discards its buffer
    pub fn preview_with(
        &self,
        input: &Path,
        limit: usize,
        control: RunControl,
    ) -> Result<Vec<String>> {
        if limit == 0 {
            return Err(FilterError::InvalidPreviewLimit);
        }

        let input_err = |source| FilterError::InputIo {
            path: input.to_path_buf(),
            source,
        };

        let mut reader = BufReader::new(File::open(input).map_err(input_err)?);
        let mut selected = Vec::new();
        let mut line = Vec::new();

        loop {
            if control.cancelled() {
                return Err(FilterError::Cancelled);
            }

            line.clear();
            let n = reader.read_until(b'\n', &mut line).map_err(input_err)?;
            if n == 0 {
                break;
            }

            if self.selects(&line) {
                let text = String::from_utf8_lossy(&line)
                    .trim_end_matches(['\r', '\n'])
                    .to_string();
                selected.push(text);
                if selected.len() >= limit {
                    break;
                }
            }
        }

        log::debug!("preview collected {} lines (limit {})", selected.len(), limit);
        Ok(selected)
    }

    /// Selection polarity: `matches XOR exclude`
    fn selects(&self, raw: &[u8]) -> bool {
        let line = String::from_utf8_lossy(raw);
        let matched = self.matcher.matches(line.trim_end_matches(['\r', '\n']));
        matched != self.exclude
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::sync::atomic::AtomicBool;

    fn write_input(dir: &tempfile::TempDir, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join("input.asc");
        fs::write(&path, contents).unwrap();
        path
    }

    fn pipeline(ids: &str, config: MatchConfig) -> Pipeline {
        let spec = IdentifierSpec::parse(ids).unwrap();
        Pipeline::new(&spec, &config).unwrap()
    }

    #[test]
    fn test_run_counts_and_percentage() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(&dir, b"id 100 data\nid 200 data\nid 100 retry\n");
        let output = dir.path().join("out.asc");

        let stats = pipeline("100", MatchConfig::new())
            .run(&input, &output)
            .unwrap();

        assert_eq!(stats.total_lines, 3);
        assert_eq!(stats.selected_lines, 2);
        assert!((stats.percentage() - 66.67).abs() < 0.01);
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "id 100 data\nid 100 retry\n"
        );
    }

    #[test]
    fn test_exclude_selects_the_complement() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(&dir, b"id 100 data\nid 200 data\nid 100 retry\n");
        let kept = dir.path().join("kept.asc");
        let dropped = dir.path().join("dropped.asc");

        let normal = pipeline("100", MatchConfig::new())
            .run(&input, &kept)
            .unwrap();
        let inverted = pipeline("100", MatchConfig::new().with_exclude(true))
            .run(&input, &dropped)
            .unwrap();

        assert_eq!(normal.total_lines, inverted.total_lines);
        assert_eq!(
            normal.selected_lines + inverted.selected_lines,
            normal.total_lines
        );
        assert_eq!(fs::read_to_string(&dropped).unwrap(), "id 200 data\n");
    }

    #[test]
    fn test_line_terminators_preserved_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(&dir, b"id 100 a\r\nid 200 b\r\nid 100 no newline");
        let output = dir.path().join("out.asc");

        pipeline("100", MatchConfig::new())
            .run(&input, &output)
            .unwrap();

        let mut written = Vec::new();
        File::open(&output)
            .unwrap()
            .read_to_end(&mut written)
            .unwrap();
        assert_eq!(written, b"id 100 a\r\nid 100 no newline");
    }

    #[test]
    fn test_invalid_utf8_does_not_abort() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(&dir, b"id 100 \xff\xfe data\nid 200 clean\n");
        let output = dir.path().join("out.asc");

        let stats = pipeline("100", MatchConfig::new())
            .run(&input, &output)
            .unwrap();

        assert_eq!(stats.total_lines, 2);
        assert_eq!(stats.selected_lines, 1);
        // Raw bytes written back untouched
        let written = fs::read(&output).unwrap();
        assert_eq!(written, b"id 100 \xff\xfe data\n");
    }

    #[test]
    fn test_empty_input_reports_zero_percentage() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(&dir, b"");
        let output = dir.path().join("out.asc");

        let stats = pipeline("100", MatchConfig::new())
            .run(&input, &output)
            .unwrap();
        assert_eq!(stats.total_lines, 0);
        assert_eq!(stats.percentage(), 0.0);
    }

    #[test]
    fn test_missing_input_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = pipeline("100", MatchConfig::new()).run(
            &dir.path().join("nope.asc"),
            &dir.path().join("out.asc"),
        );
        assert!(matches!(result, Err(FilterError::InputIo { .. })));
    }

    #[test]
    fn test_unwritable_output_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(&dir, b"id 100\n");
        let result = pipeline("100", MatchConfig::new())
            .run(&input, &dir.path().join("missing-dir").join("out.asc"));
        assert!(matches!(result, Err(FilterError::OutputIo { .. })));
    }

    #[test]
    fn test_preview_stops_at_limit_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut contents = String::new();
        for i in 0..10 {
            contents.push_str(&format!("id 100 frame {i}\n"));
        }
        let input = write_input(&dir, contents.as_bytes());

        let lines = pipeline("100", MatchConfig::new())
            .preview(&input, 3)
            .unwrap();
        assert_eq!(
            lines,
            ["id 100 frame 0", "id 100 frame 1", "id 100 frame 2"]
        );
    }

    #[test]
    fn test_preview_returns_all_when_fewer_than_limit() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(&dir, b"id 200 a\nid 100 b\nid 200 c\n");

        let lines = pipeline("100", MatchConfig::new())
            .preview(&input, DEFAULT_PREVIEW_LIMIT)
            .unwrap();
        assert_eq!(lines, ["id 100 b"]);
    }

    #[test]
    fn test_preview_no_matches_is_empty_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(&dir, b"id 200 a\n");

        let lines = pipeline("100", MatchConfig::new())
            .preview(&input, 10)
            .unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn test_preview_zero_limit_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(&dir, b"id 100\n");

        let result = pipeline("100", MatchConfig::new()).preview(&input, 0);
        assert!(matches!(result, Err(FilterError::InvalidPreviewLimit)));
    }

    #[test]
    fn test_cancellation_removes_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(&dir, b"id 100 a\nid 100 b\n");
        let output = dir.path().join("out.asc");

        let cancel = Arc::new(AtomicBool::new(true));
        let control = RunControl::new().with_cancel_flag(Arc::clone(&cancel));
        let result = pipeline("100", MatchConfig::new()).run_with(&input, &output, control);

        assert!(matches!(result, Err(FilterError::Cancelled)));
        assert!(!output.exists());
    }

    #[test]
    fn test_progress_reports_cumulative_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let mut contents = String::new();
        for i in 0..250 {
            contents.push_str(&format!("id 100 frame {i:04}\n"));
        }
        let input = write_input(&dir, contents.as_bytes());
        let output = dir.path().join("out.asc");

        let mut snapshots = Vec::new();
        let control = RunControl::new().on_progress(|p| snapshots.push(p));
        pipeline("100", MatchConfig::new())
            .run_with(&input, &output, control)
            .unwrap();

        // Every 100 lines: after line 100 and line 200
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].lines_read, 100);
        assert_eq!(snapshots[1].lines_read, 200);
        assert!(snapshots[0].bytes_read < snapshots[1].bytes_read);
        assert!(snapshots[1].percent() <= 100.0);
    }
}
