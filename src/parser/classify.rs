//! Single-pass line classification.
//!
//! Every raw record becomes a [`Line`]: the leading indentation is measured
//! (tabs expanded to the tab stop) and the remaining content is scanned once,
//! left to right, to decide between paragraph text, section titles and table
//! rows. There is no lookahead; the only outside input is whether the line
//! before was a table row.

use super::stream::RawLine;

/// Classification of one input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Only whitespace (or nothing) before the terminator
    Empty,
    /// Running text
    Paragraph,
    /// No lowercase letters and no ASCII punctuation
    SectionTitle,
    /// Contains a tab or a run of whitespace inside the content
    TableRow,
}

impl LineKind {
    /// Short label used in debug output
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            LineKind::Empty => "empty",
            LineKind::Paragraph => "paragraph",
            LineKind::SectionTitle => "title",
            LineKind::TableRow => "table",
        }
    }
}

/// A classified input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub kind: LineKind,
    /// Columns of leading whitespace, tabs expanded
    pub leading_spaces: usize,
    /// Indentation stripped on output; set once by the margin stack
    pub margin: usize,
    /// Text after the leading whitespace, trailing whitespace removed
    pub content: String,
    /// Whether the source record ended with a line terminator
    pub terminated: bool,
}

/// The parts of a line the next line's processing depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineInfo {
    pub kind: LineKind,
    pub leading_spaces: usize,
    pub margin: usize,
}

impl Line {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kind == LineKind::Empty
    }

    #[must_use]
    pub fn info(&self) -> LineInfo {
        LineInfo {
            kind: self.kind,
            leading_spaces: self.leading_spaces,
            margin: self.margin,
        }
    }

    /// Indentation left on the line once the margin is stripped
    #[must_use]
    pub fn residual_indent(&self) -> usize {
        self.leading_spaces.saturating_sub(self.margin)
    }
}

/// Advance a column counter over one tab
#[must_use]
pub fn next_tab_stop(column: usize, tabstop: usize) -> usize {
    column + tabstop - (column % tabstop)
}

/// Classify a raw record
///
/// # Arguments
/// * `raw` - The record, terminator already stripped
/// * `tabstop` - Tab expansion width
/// * `previous_was_table` - Whether the line before ended up as a table row
#[must_use]
pub fn classify(raw: RawLine, tabstop: usize, previous_was_table: bool) -> Line {
    let RawLine { text, terminated } = raw;

    let mut leading_spaces = 0;
    let mut content_start = text.len();
    for (idx, ch) in text.char_indices() {
        match ch {
            ' ' => leading_spaces += 1,
            '\t' => leading_spaces = next_tab_stop(leading_spaces, tabstop),
            _ => {
                content_start = idx;
                break;
            }
        }
    }

    let content = text[content_start..].trim_end();
    if content.is_empty() {
        return Line {
            kind: LineKind::Empty,
            leading_spaces: 0,
            margin: 0,
            content: String::new(),
            terminated,
        };
    }

    Line {
        kind: scan_content(content, previous_was_table),
        leading_spaces,
        margin: 0,
        content: content.to_string(),
        terminated,
    }
}

/// Decide the kind of non-empty content
///
/// The first table trigger wins and ends the scan; until then the line is a
/// title that any lowercase letter or ASCII punctuation turns into a paragraph.
fn scan_content(content: &str, previous_was_table: bool) -> LineKind {
    let mut kind = LineKind::SectionTitle;
    let mut prev: Option<char> = None;
    let mut before_prev: Option<char> = None;

    for ch in content.chars() {
        if triggers_table(ch, prev, before_prev, previous_was_table) {
            return LineKind::TableRow;
        }
        if kind == LineKind::SectionTitle && (ch.is_lowercase() || ch.is_ascii_punctuation()) {
            kind = LineKind::Paragraph;
        }
        before_prev = prev;
        prev = Some(ch);
    }

    kind
}

fn triggers_table(
    ch: char,
    prev: Option<char>,
    before_prev: Option<char>,
    previous_was_table: bool,
) -> bool {
    if ch == '\t' {
        return true;
    }
    if !ch.is_whitespace() || !prev.is_some_and(char::is_whitespace) {
        return false;
    }
    // sentence spacing after a period, and quotes only inside an ongoing table
    match before_prev {
        Some('.') => false,
        Some('\'') => previous_was_table,
        _ => true,
    }
}
