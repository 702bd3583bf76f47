//! Human-readable summaries for terminal output.

use can_filter_core::FilterStats;
use std::path::Path;

/// Render the completion summary for a full filter run
pub fn run_summary(stats: &FilterStats, output: &Path) -> String {
    format!(
        "Filtering complete!\n\n\
         Total lines:   {}\n\
         Matched lines: {}\n\
         Percentage:    {:.2}%\n\n\
         Output saved to: {}",
        group_thousands(stats.total_lines),
        group_thousands(stats.selected_lines),
        stats.percentage(),
        output.display()
    )
}

/// Format a count with comma thousands separators
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
