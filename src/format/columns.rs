/// `ColumnDetector` - Infers a column grid from buffered table rows
///
/// Works position by position over all rows at once:
/// 1. A position holds content if any row has a non-delimiter there
/// 2. Its width is the widest glyph any row puts there
/// 3. A column starts wherever content follows a content-free position
///
/// Tables with few rows need a wider gap before a boundary is trusted, since
/// a lone row can't tell a column gap from a double space inside a cell.
use crate::format::metrics::GlyphMetrics;
use crate::format::table::GridRow;

/// Symbols that may open a single-row table besides ASCII punctuation and digits
const BULLETS: &[char] = &[
    '\u{2022}', // •
    '\u{00b7}', // ·
    '\u{2010}', // ‐
    '\u{2011}', // ‑
    '\u{2013}', // –
    '\u{2014}', // —
    '\u{25e6}', // ◦
    '\u{25aa}', // ▪
    '\u{25a0}', // ■
    '\u{25ba}', // ►
    '\u{25cb}', // ○
];

/// Thresholds for trusting column gaps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRules {
    /// Tables with at least this many rows accept single-position gaps
    pub trusted_rows: usize,
    /// Gap width required in tables with fewer rows
    pub min_gap: usize,
}

impl Default for ColumnRules {
    fn default() -> Self {
        Self {
            trusted_rows: 3,
            min_gap: 2,
        }
    }
}

/// One detected column of a table grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// First grid position of the column
    pub start: usize,
    /// Number of grid positions covered
    pub span: usize,
    /// Sum of the widest glyph at each covered position
    pub content_width: u32,
    /// `content_width` rounded up to the tab stop
    pub rendered_width: u32,
}

impl Column {
    /// One past the last covered position
    #[must_use]
    pub fn end(&self) -> usize {
        self.start + self.span
    }
}

/// Per-position facts gathered from all rows
#[derive(Debug, Clone, Default)]
pub struct PositionProfile {
    /// Some row has cell content at this position
    pub has_content: Vec<bool>,
    /// Widest rendering at this position
    pub widths: Vec<u32>,
}

/// Round `width` up to a multiple of `step`
#[must_use]
pub fn round_up(width: u32, step: u32) -> u32 {
    if step == 0 {
        return width;
    }
    width.div_ceil(step).saturating_mul(step)
}

/// Whether a single row starting with `content` may stand as a table
///
/// Lone rows are only believable as list items or numbered entries.
#[must_use]
pub fn is_list_marker_start(content: &str) -> bool {
    content.chars().next().is_some_and(|ch| {
        ch.is_ascii_punctuation() || ch.is_ascii_digit() || BULLETS.contains(&ch)
    })
}

/// Detects column boundaries and widths
pub struct ColumnDetector<'a> {
    metrics: &'a dyn GlyphMetrics,
    rules: ColumnRules,
    tab_width: u32,
}

impl<'a> ColumnDetector<'a> {
    /// Create a new `ColumnDetector`
    ///
    /// # Arguments
    /// * `metrics` - Glyph width provider
    /// * `rules` - Gap thresholds
    /// * `tabstop` - Tab stop in fixed columns
    #[must_use]
    pub fn new(metrics: &'a dyn GlyphMetrics, rules: ColumnRules, tabstop: usize) -> Self {
        let tabstop = u32::try_from(tabstop).unwrap_or(u32::MAX);
        Self {
            metrics,
            rules,
            tab_width: tabstop.saturating_mul(metrics.unit()),
        }
    }

    /// Width of one tab stop in width units
    #[must_use]
    pub fn tab_width(&self) -> u32 {
        self.tab_width
    }

    /// Gather content flags and widths for every position
    #[must_use]
    pub fn profile(&self, rows: &[GridRow]) -> PositionProfile {
        let max_length = rows.iter().map(GridRow::len).max().unwrap_or(0);
        let mut profile = PositionProfile {
            has_content: vec![false; max_length],
            widths: vec![0; max_length],
        };

        for row in rows {
            for (pos, cell) in row.cells().iter().enumerate() {
                if !row.is_delimiter(pos) {
                    profile.has_content[pos] = true;
                }
                let width = cell.width(self.metrics);
                if width > profile.widths[pos] {
                    profile.widths[pos] = width;
                }
            }
        }

        profile
    }

    /// Partition the grid into columns
    ///
    /// The returned columns are contiguous and cover every position of the
    /// longest row. An empty grid yields no columns.
    #[must_use]
    pub fn detect(&self, rows: &[GridRow]) -> Vec<Column> {
        let profile = self.profile(rows);
        self.partition(&profile, rows.len())
    }

    /// Split an already gathered profile of `row_count` rows into columns
    #[must_use]
    pub fn partition(&self, profile: &PositionProfile, row_count: usize) -> Vec<Column> {
        let max_length = profile.has_content.len();
        if max_length == 0 {
            return Vec::new();
        }

        let trusted = row_count >= self.rules.trusted_rows;
        let mut starts = vec![0];
        let mut gap = 0;
        for pos in 0..max_length - 1 {
            if profile.has_content[pos] {
                gap = 0;
                continue;
            }
            gap += 1;
            if profile.has_content[pos + 1] && (trusted || gap >= self.rules.min_gap) {
                log::trace!("column boundary at {} after a gap of {gap}", pos + 1);
                starts.push(pos + 1);
            }
        }

        let mut columns = Vec::with_capacity(starts.len());
        for (idx, &start) in starts.iter().enumerate() {
            let end = starts.get(idx + 1).copied().unwrap_or(max_length);
            let content_width = profile.widths[start..end]
                .iter()
                .fold(0u32, |sum, &width| sum.saturating_add(width));
            columns.push(Column {
                start,
                span: end - start,
                content_width,
                rendered_width: round_up(content_width, self.tab_width),
            });
        }
        columns
    }
}
