//! Condenses ffmpeg diagnostics for log lines.
//!
//! The full text is still returned to the user; logs only need the part that
//! explains the failure, without the version banner and build flags.

use regex::Regex;
use std::sync::LazyLock;

static BANNER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(ffmpeg version |built with |configuration: |lib[a-z0-9]+\s+\d+\.\s*\d+)").unwrap()
});

/// Last `max_lines` non-banner lines joined with ` | `.
pub fn stderr_tail(stderr: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty() && !BANNER_RE.is_match(l))
        .collect();
    if lines.is_empty() {
        return "<no ffmpeg stderr>".to_string();
    }
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join(" | ")
}
