use std::io::IsTerminal;
use owo_colors::OwoColorize;

use crate::catalog::{CatalogError, RangeBounds, ScoreRange};
use crate::scoring::ScoreResult;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format available ranges inline: "(31, 35], (35, 36]"
fn format_bounds_list(ranges: &[RangeBounds]) -> String {
    if ranges.is_empty() {
        return "none configured".to_string();
    }
    ranges
        .iter()
        .map(RangeBounds::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Format a scoring outcome: the score line, then one line per rejected measurement
pub fn format_score_result(result: &ScoreResult, use_colors: bool) -> String {
    if result.is_valid() {
        let score = result.total_score.to_string();
        return if use_colors {
            format!("NEWS score: {}", score.bold())
        } else {
            format!("NEWS score: {}", score)
        };
    }

    let header = format!("{} validation error(s):", result.errors.len());
    let mut lines = vec![if use_colors {
        header.red().bold().to_string()
    } else {
        header
    }];

    for error in &result.errors {
        lines.push(format!("  - {}", error.message));
        if !error.available_ranges.is_empty() {
            let ranges = format_bounds_list(&error.available_ranges);
            if use_colors {
                lines.push(format!("    Available ranges: {}", ranges.dimmed()));
            } else {
                lines.push(format!("    Available ranges: {}", ranges));
            }
        }
    }

    lines.join("\n")
}

/// Format ranges as a table with columns: Id, Type, Range, Score
pub fn format_range_table(ranges: &[ScoreRange], use_colors: bool) -> String {
    if ranges.is_empty() {
        return "No score ranges configured.".to_string();
    }

    let type_width = ranges
        .iter()
        .map(|r| r.measurement_type.len())
        .max()
        .unwrap_or(4)
        .max(4);

    let header = format!("{:>4}  {:<type_width$}  {:<16}  {:>5}", "ID", "TYPE", "RANGE", "SCORE");
    let mut lines = vec![if use_colors {
        header.dimmed().to_string()
    } else {
        header
    }];

    for range in ranges {
        let line = format!(
            "{:>4}  {:<type_width$}  {:<16}  {:>5}",
            range.id,
            range.measurement_type,
            range.bounds().to_string(),
            range.score
        );
        lines.push(line);
    }

    lines.join("\n")
}

/// Format catalog mutation errors, one per line
pub fn format_catalog_errors(errors: &[CatalogError], use_colors: bool) -> String {
    errors
        .iter()
        .map(|e| {
            if use_colors {
                format!("{} {}", "error:".red().bold(), e)
            } else {
                format!("error: {}", e)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
