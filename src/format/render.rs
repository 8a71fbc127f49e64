//! Output rendering for plain lines and closed tables.
//!
//! - [`LineRenderer`]: strips a line's margin and writes the rest verbatim
//! - [`TableRenderer`]: lays out a closed table on its detected column grid
//!
//! Indentation is always written as tabs first, then spaces.

use std::io::Write;

use crate::format::columns::{is_list_marker_start, Column, ColumnDetector, ColumnRules};
use crate::format::metrics::GlyphMetrics;
use crate::format::table::{GridCell, GridRow, Table};
use crate::parser::Line;
use crate::Result;

/// Write `columns` of indentation as greedy tabs plus trailing spaces
pub fn write_indent<W: Write>(output: &mut W, columns: usize, tabstop: usize) -> Result<()> {
    let tabs = columns / tabstop;
    let spaces = columns % tabstop;
    for _ in 0..tabs {
        output.write_all(b"\t")?;
    }
    for _ in 0..spaces {
        output.write_all(b" ")?;
    }
    Ok(())
}

fn write_char<W: Write>(output: &mut W, ch: char) -> Result<()> {
    let mut buf = [0u8; 4];
    output.write_all(ch.encode_utf8(&mut buf).as_bytes())?;
    Ok(())
}

/// Renders lines outside of tables
#[derive(Debug, Clone, Copy)]
pub struct LineRenderer {
    tabstop: usize,
}

impl LineRenderer {
    #[must_use]
    pub fn new(tabstop: usize) -> Self {
        Self { tabstop }
    }

    /// Write `line` with its margin removed
    pub fn render<W: Write>(&self, output: &mut W, line: &Line) -> Result<()> {
        if !line.is_empty() {
            write_indent(output, line.residual_indent(), self.tabstop)?;
            output.write_all(line.content.as_bytes())?;
        }
        if line.terminated {
            output.write_all(b"\n")?;
        }
        Ok(())
    }
}

/// Renders closed tables on their column grid
pub struct TableRenderer<'a> {
    metrics: &'a dyn GlyphMetrics,
    rules: ColumnRules,
    tabstop: usize,
}

/// Output position of one row being written, in width units
///
/// Positions saturate at `u32::MAX`; padding stops there instead of wrapping.
struct RowCursor {
    position: u32,
    tab_width: u32,
    space_width: u32,
}

impl RowCursor {
    fn next_tab_stop(&self) -> Option<u32> {
        (self.position / self.tab_width + 1).checked_mul(self.tab_width)
    }

    fn advance(&mut self, width: u32) {
        self.position = self.position.saturating_add(width);
    }

    /// Move to `target` with tabs, then spaces, never overshooting
    fn pad_to<W: Write>(&mut self, output: &mut W, target: u32) -> Result<()> {
        while let Some(stop) = self.next_tab_stop().filter(|&stop| stop <= target) {
            output.write_all(b"\t")?;
            self.position = stop;
        }
        self.pad_spaces(output, target)
    }

    fn pad_spaces<W: Write>(&mut self, output: &mut W, target: u32) -> Result<()> {
        while let Some(next) = self
            .position
            .checked_add(self.space_width)
            .filter(|&next| next <= target)
        {
            output.write_all(b" ")?;
            self.position = next;
        }
        Ok(())
    }

    fn tab<W: Write>(&mut self, output: &mut W) -> Result<()> {
        output.write_all(b"\t")?;
        self.position = self.next_tab_stop().unwrap_or(u32::MAX);
        Ok(())
    }
}

impl<'a> TableRenderer<'a> {
    /// Create a new `TableRenderer`
    ///
    /// # Arguments
    /// * `metrics` - Glyph width provider
    /// * `rules` - Column gap thresholds
    /// * `tabstop` - Tab stop in fixed columns
    #[must_use]
    pub fn new(metrics: &'a dyn GlyphMetrics, rules: ColumnRules, tabstop: usize) -> Self {
        Self {
            metrics,
            rules,
            tabstop,
        }
    }

    /// Detect the columns of `table` and write all of its rows
    ///
    /// Single rows that don't look like list items, and tables without any
    /// inner column boundary, are written as plain lines instead.
    pub fn render<W: Write>(&self, output: &mut W, table: &Table) -> Result<()> {
        let rows = table.rows();
        let lines = LineRenderer::new(self.tabstop);

        if rows.len() == 1 && !is_list_marker_start(&rows[0].content) {
            log::debug!("single row table demoted to text");
            return lines.render(output, &rows[0]);
        }

        let grid = table.grid(self.tabstop);
        let detector = ColumnDetector::new(self.metrics, self.rules, self.tabstop);
        let profile = detector.profile(&grid);
        let columns = detector.partition(&profile, grid.len());

        log::debug!(
            "table closed: {} rows, {} columns, margin {}",
            rows.len(),
            columns.len(),
            table.margin()
        );

        if columns.len() <= 1 {
            for row in rows {
                lines.render(output, row)?;
            }
            return Ok(());
        }

        let indent = table.common_indent();
        let unit = self.metrics.unit();
        let tab_width = detector.tab_width().max(1);
        let indent_width = u32::try_from(indent).unwrap_or(u32::MAX).saturating_mul(unit);
        let starts = column_starts(&columns, indent_width, tab_width);

        for (row, grid_row) in rows.iter().zip(&grid) {
            write_indent(output, indent, self.tabstop)?;
            let mut cursor = RowCursor {
                position: indent_width,
                tab_width,
                space_width: self.metrics.width_of(' '),
            };
            self.render_row(output, grid_row, &columns, &starts, &profile.widths, &mut cursor)?;
            if row.terminated {
                output.write_all(b"\n")?;
            }
        }
        Ok(())
    }

    fn render_row<W: Write>(
        &self,
        output: &mut W,
        row: &GridRow,
        columns: &[Column],
        starts: &[u32],
        widths: &[u32],
        cursor: &mut RowCursor,
    ) -> Result<()> {
        let mut wrote = false;

        for (column, &start) in columns.iter().zip(starts) {
            // empty cells only advance the grid
            if !row.has_glyphs(column.start, column.end()) {
                continue;
            }
            if wrote && cursor.position >= start {
                cursor.tab(output)?;
            }

            let mut offset = start;
            let mut cell_started = false;
            let mut pending_blank = false;
            let end = column.end().min(row.len());
            for pos in column.start..end {
                match row.cells()[pos] {
                    GridCell::Glyph(ch) => {
                        if !cell_started {
                            cursor.pad_to(output, offset)?;
                        } else if pending_blank {
                            output.write_all(b" ")?;
                            cursor.advance(cursor.space_width);
                            cursor.pad_spaces(output, offset)?;
                        }
                        write_char(output, ch)?;
                        cursor.advance(self.metrics.width_of(ch));
                        cell_started = true;
                        pending_blank = false;
                    }
                    GridCell::Blank(_) | GridCell::Tab => pending_blank = cell_started,
                }
                offset = offset.saturating_add(widths[pos]);
            }
            wrote = true;
        }
        Ok(())
    }
}

/// Absolute start of every column, each rounded up to a tab stop
fn column_starts(columns: &[Column], first: u32, tab_width: u32) -> Vec<u32> {
    let mut starts = Vec::with_capacity(columns.len());
    let mut start = first;
    for column in columns {
        starts.push(start);
        start = start
            .saturating_add(column.content_width)
            .div_ceil(tab_width)
            .saturating_mul(tab_width);
    }
    starts
}
