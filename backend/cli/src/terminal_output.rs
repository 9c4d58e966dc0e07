//! Terminal output utilities: table rendering and ANSI formatting.

use reelforge_core::UploadSummary;

// ---------------------------------------------------------------------------
// ANSI Color/Style helpers
// ---------------------------------------------------------------------------

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM")
                .map(|t| t != "dumb")
                .unwrap_or(false))
}

/// Strip ANSI escape codes from a string.
pub fn strip_ansi(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            // Skip until 'm'
            for next in chars.by_ref() {
                if next == 'm' { break; }
            }
        } else {
            result.push(c);
        }
    }
    result
}

// ---------------------------------------------------------------------------
// Formatted notes
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
enum Note {
    Info,
    Warn,
    Error,
    Success,
}

impl Note {
    fn style(self) -> (&'static str, &'static str, &'static str) {
        match self {
            Note::Info => (CYAN, "ℹ", "INFO"),
            Note::Warn => (YELLOW, "⚠", "WARN"),
            Note::Error => (RED, "✗", "ERROR"),
            Note::Success => (GREEN, "✓", "OK"),
        }
    }
}

fn note_line(note: Note, msg: &str, color: bool) -> String {
    let (color_code, symbol, label) = note.style();
    if color {
        format!("{color_code}{BOLD}{symbol}{RESET} {msg}")
    } else {
        format!("{label}: {msg}")
    }
}

pub fn note_info(msg: &str) {
    println!("{}", note_line(Note::Info, msg, supports_color()));
}

pub fn note_warn(msg: &str) {
    println!("{}", note_line(Note::Warn, msg, supports_color()));
}

/// Errors go to stderr so piped stdout stays clean.
pub fn note_error(msg: &str) {
    eprintln!("{}", note_line(Note::Error, msg, supports_color()));
}

pub fn note_success(msg: &str) {
    println!("{}", note_line(Note::Success, msg, supports_color()));
}

// ---------------------------------------------------------------------------
// Table rendering
// ---------------------------------------------------------------------------

/// Column alignment.
pub enum Align { Left, Right }

/// A table column definition.
pub struct Column {
    pub header: String,
    pub align: Align,
}

impl Column {
    pub fn left(header: impl Into<String>) -> Self {
        Self { header: header.into(), align: Align::Left }
    }
    pub fn right(header: impl Into<String>) -> Self {
        Self { header: header.into(), align: Align::Right }
    }
}

/// Render a table with given columns and rows.
pub fn render_table(columns: &[Column], rows: &[Vec<String>]) -> String {
    let num_cols = columns.len();
    let mut widths: Vec<usize> = columns.iter().map(|c| visible_width(&c.header)).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(visible_width(cell));
        }
    }

    let mut out = String::new();

    // Header.
    let header_cells: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| pad_cell(&col.header, widths[i], &col.align))
        .collect();
    out.push_str(&format!("{BOLD}  {}  {RESET}\n", header_cells.join("  ")));

    // Separator.
    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format!("  {}  \n", sep.join("  ")));

    // Rows.
    for row in rows {
        let cells: Vec<String> = (0..num_cols)
            .map(|i| {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                pad_cell(cell, widths[i], &columns[i].align)
            })
            .collect();
        out.push_str(&format!("  {}  \n", cells.join("  ")));
    }

    out
}

/// Display width in characters, ignoring escape codes.
fn visible_width(s: &str) -> usize {
    strip_ansi(s).chars().count()
}

fn pad_cell(s: &str, width: usize, align: &Align) -> String {
    let pad = width.saturating_sub(visible_width(s));
    match align {
        Align::Left => format!("{s}{}", " ".repeat(pad)),
        Align::Right => format!("{}{s}", " ".repeat(pad)),
    }
}

/// How an upload's size is shown: videos in MB, logos in KB.
#[derive(Clone, Copy)]
pub enum SizeUnit { Mb, Kb }

/// Table of uploads with name, size and type.
pub fn upload_table(uploads: &[UploadSummary], unit: SizeUnit) -> String {
    let size_header = match unit {
        SizeUnit::Mb => "Size (MB)",
        SizeUnit::Kb => "Size (KB)",
    };
    let columns = vec![
        Column::left("#"),
        Column::left("File"),
        Column::right(size_header),
        Column::left("Type"),
    ];
    let rows: Vec<Vec<String>> = uploads
        .iter()
        .enumerate()
        .map(|(i, u)| {
            let size = match unit {
                SizeUnit::Mb => u.size_mb(),
                SizeUnit::Kb => u.size_kb(),
            };
            vec![
                (i + 1).to_string(),
                u.name.clone(),
                format!("{size:.2}"),
                u.mime_type.clone(),
            ]
        })
        .collect();
    render_table(&columns, &rows)
}
