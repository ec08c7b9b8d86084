//! Validation and normalization of emitted Rust source
//!
//! Every generated `.rs` file goes through [`format_source`] before it is
//! returned. A parse failure is fatal and reported with the text that
//! failed; nothing unparseable is ever written.

use miette::{NamedSource, SourceSpan};

use crate::error::FormatError;

/// Lines shown on each side of a parse error
const LISTING_CONTEXT: usize = 3;

/// Check that `source` parses as a Rust file and normalize its layout
///
/// Normalization removes trailing whitespace, collapses runs of blank lines
/// to one, drops blank lines right after an opening brace and before a
/// closing one, and ends the file with exactly one newline.
pub fn format_source(path: &str, source: &str) -> Result<String, FormatError> {
    let normalized = normalize(source);
    match syn::parse_file(&normalized) {
        Ok(_) => Ok(normalized),
        Err(err) => {
            let start = err.span().start();
            // proc-macro2 lines are 1-based, columns 0-based
            let line = start.line.max(1);
            Err(FormatError {
                path: path.to_string(),
                message: err.to_string(),
                span: offset_of(&normalized, line, start.column).map(|o| SourceSpan::new(o.into(), 1)),
                listing: listing(&normalized, line),
                src: NamedSource::new(path, normalized),
            })
        }
    }
}

fn normalize(source: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for line in source.lines().map(str::trim_end) {
        let previous = out.last().copied();
        if line.is_empty() {
            if previous.is_none_or(|p| p.is_empty() || p.ends_with('{')) {
                continue;
            }
        } else if line.trim_start().starts_with('}') && previous == Some("") {
            out.pop();
        }
        out.push(line);
    }
    while out.last() == Some(&"") {
        out.pop();
    }
    let mut text = out.join("\n");
    text.push('\n');
    text
}

fn offset_of(source: &str, line: usize, column: usize) -> Option<usize> {
    let mut offset = 0;
    for (i, text) in source.split('\n').enumerate() {
        if i + 1 == line {
            let col = text
                .char_indices()
                .nth(column)
                .map(|(b, _)| b)
                .unwrap_or(text.len());
            return Some(offset + col);
        }
        offset += text.len() + 1;
    }
    None
}

/// Line-numbered excerpt around `line`, with the failing line marked
fn listing(source: &str, line: usize) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let first = line.saturating_sub(LISTING_CONTEXT + 1);
    let last = (line + LISTING_CONTEXT).min(lines.len());
    let width = last.to_string().len();

    lines[first.min(lines.len())..last]
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let number = first + i + 1;
            let marker = if number == line { '>' } else { ' ' };
            format!("{} {:>width$} | {}", marker, number, text, width = width)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
