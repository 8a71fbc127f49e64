/// Table accumulation
///
/// A table is a run of consecutive table rows. Rows are buffered until a line
/// arrives that does not continue the run; only then is the column grid
/// inferred and the whole block rendered.
use crate::format::metrics::GlyphMetrics;
use crate::parser::{next_tab_stop, Line, LineInfo, LineKind};

/// One position of a row laid out on the table grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridCell {
    /// Visible character
    Glyph(char),
    /// Whitespace character taking a single position
    Blank(char),
    /// One of the positions covered by a tab
    Tab,
}

impl GridCell {
    #[must_use]
    pub fn is_blank(self) -> bool {
        !matches!(self, GridCell::Glyph(_))
    }

    /// Rendered width of this position
    pub fn width(self, metrics: &dyn GlyphMetrics) -> u32 {
        match self {
            GridCell::Glyph(ch) | GridCell::Blank(ch) => metrics.width_of(ch),
            GridCell::Tab => metrics.unit(),
        }
    }
}

/// A buffered row expanded into grid positions
#[derive(Debug, Clone)]
pub struct GridRow {
    cells: Vec<GridCell>,
    /// Per position: whitespace, or a `*` marker followed by a delimiter
    delimiters: Vec<bool>,
}

impl GridRow {
    /// Lay out `line` on a grid starting at absolute column `origin`
    ///
    /// Tabs are expanded against the line's absolute column so that rows with
    /// different indentation agree on where a tab lands.
    #[must_use]
    pub fn from_line(line: &Line, origin: usize, tabstop: usize) -> Self {
        let lead = line.leading_spaces.saturating_sub(origin);
        let mut cells = vec![GridCell::Blank(' '); lead];
        let mut column = origin + lead;

        for ch in line.content.chars() {
            if ch == '\t' {
                let next = next_tab_stop(column, tabstop);
                cells.extend(std::iter::repeat(GridCell::Tab).take(next - column));
                column = next;
            } else {
                cells.push(if ch.is_whitespace() {
                    GridCell::Blank(ch)
                } else {
                    GridCell::Glyph(ch)
                });
                column += 1;
            }
        }

        Self::from_cells(cells)
    }

    /// Build a row from already positioned cells
    #[must_use]
    pub fn from_cells(cells: Vec<GridCell>) -> Self {
        let mut delimiters = vec![false; cells.len()];
        for pos in (0..cells.len()).rev() {
            let followed_by_delimiter = delimiters.get(pos + 1).copied().unwrap_or(true);
            delimiters[pos] = match cells[pos] {
                GridCell::Blank(_) | GridCell::Tab => true,
                GridCell::Glyph('*') => followed_by_delimiter,
                GridCell::Glyph(_) => false,
            };
        }
        Self { cells, delimiters }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[must_use]
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    /// Whether `pos` separates columns rather than holding cell content
    #[must_use]
    pub fn is_delimiter(&self, pos: usize) -> bool {
        self.delimiters.get(pos).copied().unwrap_or(true)
    }

    /// Whether any visible glyph lies in `start..end`
    #[must_use]
    pub fn has_glyphs(&self, start: usize, end: usize) -> bool {
        let end = end.min(self.cells.len());
        start < end && self.cells[start..end].iter().any(|cell| !cell.is_blank())
    }
}

/// A run of table rows sharing one column grid
#[derive(Debug, Clone)]
pub struct Table {
    rows: Vec<Line>,
}

impl Table {
    /// Open a table with its first row
    #[must_use]
    pub fn new(first: Line) -> Self {
        Self { rows: vec![first] }
    }

    pub fn push(&mut self, row: Line) {
        self.rows.push(row);
    }

    #[must_use]
    pub fn rows(&self) -> &[Line] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Margin stripped from every row
    #[must_use]
    pub fn margin(&self) -> usize {
        self.rows.iter().map(|row| row.margin).min().unwrap_or(0)
    }

    /// Absolute column where the grid starts: the shallowest row's indentation
    #[must_use]
    pub fn origin(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.leading_spaces)
            .min()
            .unwrap_or(0)
    }

    /// Indentation kept in front of every rendered row
    #[must_use]
    pub fn common_indent(&self) -> usize {
        self.origin().saturating_sub(self.margin())
    }

    /// Lay out every row on the grid
    #[must_use]
    pub fn grid(&self, tabstop: usize) -> Vec<GridRow> {
        let origin = self.origin();
        self.rows
            .iter()
            .map(|row| GridRow::from_line(row, origin, tabstop))
            .collect()
    }

    /// Longest grid row, in positions
    #[must_use]
    pub fn max_length(grid: &[GridRow]) -> usize {
        grid.iter().map(GridRow::len).max().unwrap_or(0)
    }
}

/// Buffers the currently open table, if any
#[derive(Debug, Default)]
pub struct TableAccumulator {
    open: Option<Table>,
}

impl TableAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `line` belongs to a table opened by `previous`
    ///
    /// Table rows continue a table, and so does any non-empty line whose
    /// indentation holds or grows after a table row: wrapped cell text.
    #[must_use]
    pub fn continues(line: &Line, previous: Option<&LineInfo>) -> bool {
        let Some(prev) = previous else {
            return false;
        };
        prev.kind == LineKind::TableRow
            && match line.kind {
                LineKind::Empty => false,
                LineKind::TableRow => true,
                LineKind::Paragraph | LineKind::SectionTitle => {
                    line.leading_spaces >= prev.leading_spaces
                }
            }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Rows buffered so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.open.as_ref().map_or(0, Table::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a row, opening a table when none is open
    pub fn push(&mut self, row: Line) {
        match self.open.as_mut() {
            Some(table) => table.push(row),
            None => self.open = Some(Table::new(row)),
        }
    }

    /// Close the open table and hand it over for rendering
    pub fn take(&mut self) -> Option<Table> {
        self.open.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::metrics::FixedWidth;
    use crate::parser::{classify, RawLine};

    fn row(text: &str, margin: usize) -> Line {
        let mut line = classify(RawLine::new(text), 8, true);
        line.kind = LineKind::TableRow;
        line.margin = margin;
        line
    }

    fn info(kind: LineKind, spaces: usize) -> LineInfo {
        LineInfo {
            kind,
            leading_spaces: spaces,
            margin: 0,
        }
    }

    #[test]
    fn test_grid_expands_tabs_from_absolute_column() {
        let line = row("  a\tb", 2);
        let grid = GridRow::from_line(&line, 2, 8);
        // 'a' sits at absolute column 2, the tab runs to column 8
        assert_eq!(grid.len(), 1 + 5 + 1);
        assert_eq!(grid.cells()[0], GridCell::Glyph('a'));
        assert!(grid.cells()[1..6].iter().all(|c| *c == GridCell::Tab));
        assert_eq!(grid.cells()[6], GridCell::Glyph('b'));
    }

    #[test]
    fn test_grid_keeps_relative_indent() {
        let line = row("      more", 2);
        let grid = GridRow::from_line(&line, 2, 8);
        assert_eq!(grid.len(), 4 + 4);
        assert!(grid.cells()[..4].iter().all(|c| c.is_blank()));
    }

    #[test]
    fn test_asterisk_marker_is_a_delimiter() {
        let grid = GridRow::from_line(&row("* item", 0), 0, 8);
        assert!(grid.is_delimiter(0));
        assert!(grid.is_delimiter(1));
        assert!(!grid.is_delimiter(2));

        let grid = GridRow::from_line(&row("a*b  c", 0), 0, 8);
        assert!(!grid.is_delimiter(1));

        // trailing asterisk at end of row
        let grid = GridRow::from_line(&row("x  *", 0), 0, 8);
        assert!(grid.is_delimiter(3));

        // a run of markers collapses
        let grid = GridRow::from_line(&row("** x", 0), 0, 8);
        assert!(grid.is_delimiter(0));
        assert!(grid.is_delimiter(1));
    }

    #[test]
    fn test_has_glyphs() {
        let grid = GridRow::from_line(&row("ab   cd", 0), 0, 8);
        assert!(grid.has_glyphs(0, 2));
        assert!(!grid.has_glyphs(2, 5));
        assert!(grid.has_glyphs(4, 100));
        assert!(!grid.has_glyphs(7, 10));
    }

    #[test]
    fn test_cell_widths() {
        let metrics = FixedWidth;
        assert_eq!(GridCell::Glyph('x').width(&metrics), 1);
        assert_eq!(GridCell::Tab.width(&metrics), 1);
    }

    #[test]
    fn test_table_origin_and_indent() {
        let mut table = Table::new(row("     -a  all", 3));
        table.push(row("         wrapped", 3));
        assert_eq!(table.len(), 2);
        assert_eq!(table.margin(), 3);
        assert_eq!(table.origin(), 5);
        assert_eq!(table.common_indent(), 2);

        let grid = table.grid(8);
        assert_eq!(Table::max_length(&grid), 4 + 7);
    }

    #[test]
    fn test_continues_table_rows() {
        let prev = info(LineKind::TableRow, 4);
        let line = row("x  y", 0);
        assert!(TableAccumulator::continues(&line, Some(&prev)));
        assert!(!TableAccumulator::continues(&line, None));
    }

    #[test]
    fn test_continues_deeper_paragraph() {
        let prev = info(LineKind::TableRow, 4);
        let deeper = classify(RawLine::new("        wrapped text"), 8, true);
        assert!(TableAccumulator::continues(&deeper, Some(&prev)));

        let same = classify(RawLine::new("    wrapped text"), 8, true);
        assert!(TableAccumulator::continues(&same, Some(&prev)));

        let shallower = classify(RawLine::new("  out of table"), 8, true);
        assert!(!TableAccumulator::continues(&shallower, Some(&prev)));
    }

    #[test]
    fn test_empty_line_never_continues() {
        let prev = info(LineKind::TableRow, 0);
        let blank = classify(RawLine::new(""), 8, true);
        assert!(!TableAccumulator::continues(&blank, Some(&prev)));
    }

    #[test]
    fn test_paragraph_after_paragraph_does_not_continue() {
        let prev = info(LineKind::Paragraph, 0);
        let line = classify(RawLine::new("   text"), 8, false);
        assert!(!TableAccumulator::continues(&line, Some(&prev)));
    }

    #[test]
    fn test_accumulator_push_and_take() {
        let mut acc = TableAccumulator::new();
        assert!(!acc.is_open());
        assert!(acc.is_empty());

        acc.push(row("a  b", 0));
        acc.push(row("c  d", 0));
        acc.push(row("e  f", 0));
        assert!(acc.is_open());
        assert_eq!(acc.len(), 3);

        let table = acc.take().unwrap();
        let contents: Vec<&str> = table.rows().iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, vec!["a  b", "c  d", "e  f"]);
        assert!(!acc.is_open());
        assert!(acc.take().is_none());
    }
}
