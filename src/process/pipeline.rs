//! Single-pass reformatting pipeline
//!
//! Every line goes through the same steps before the next one is read:
//! - Classify it (paragraph, title, table row or empty)
//! - Fold it into an open table when its indentation says it belongs there
//! - Resolve its margin on the margin stack
//! - Close and render the open table when the line ends it
//! - Optionally insert a blank line where two kinds of text meet
//! - Render it, or buffer it as a table row

use std::io::{BufRead, Cursor, Write};

use crate::config::Config;
use crate::format::{GlyphMetrics, LineRenderer, MarginStack, TableAccumulator, TableRenderer};
use crate::parser::{classify, LineInfo, LineKind, LineSource, RawLine};
use crate::Result;

/// Mutable state carried from one line to the next
pub struct EngineState<'a> {
    config: &'a Config,
    margins: MarginStack,
    /// Summary of the line just processed, empty lines included
    previous: Option<LineInfo>,
    tables: TableAccumulator,
    lines: LineRenderer,
    table_renderer: TableRenderer<'a>,
    line_number: usize,
}

impl<'a> EngineState<'a> {
    /// Create a fresh engine for one input stream
    #[must_use]
    pub fn new(config: &'a Config, metrics: &'a dyn GlyphMetrics) -> Self {
        Self {
            config,
            margins: MarginStack::new(config.levels, config.reserve_level_space()),
            previous: None,
            tables: TableAccumulator::new(),
            lines: LineRenderer::new(config.tabstop),
            table_renderer: TableRenderer::new(metrics, config.column_rules(), config.tabstop),
            line_number: 0,
        }
    }

    /// Current margin stack, for diagnostics
    #[must_use]
    pub fn margins(&self) -> &MarginStack {
        &self.margins
    }

    /// Rows waiting in the open table
    #[must_use]
    pub fn buffered_rows(&self) -> usize {
        self.tables.len()
    }

    /// Process one raw record
    pub fn process_line<W: Write>(&mut self, output: &mut W, raw: RawLine) -> Result<()> {
        self.line_number += 1;
        let previous = self.previous;
        let previous_was_table = previous.is_some_and(|p| p.kind == LineKind::TableRow);

        let mut line = classify(raw, self.config.tabstop, previous_was_table);
        if line.kind != LineKind::TableRow && TableAccumulator::continues(&line, previous.as_ref())
        {
            line.kind = LineKind::TableRow;
        }
        line.margin = self.margins.resolve(&line, previous.as_ref());

        log::debug!(
            "{:>5} {:<9} spaces={:<3} margin={:<3} stops={:?}",
            self.line_number,
            line.kind.label(),
            line.leading_spaces,
            line.margin,
            self.margins.stops()
        );

        if line.kind != LineKind::TableRow {
            self.close_table(output)?;
        }

        if self.config.blank_lines {
            if let Some(prev) = previous {
                if prev.kind != LineKind::Empty
                    && !line.is_empty()
                    && prev.kind != line.kind
                    && prev.margin == line.margin
                {
                    output.write_all(b"\n")?;
                }
            }
        }

        self.previous = Some(line.info());
        if self.config.tables && line.kind == LineKind::TableRow {
            self.tables.push(line);
        } else {
            self.lines.render(output, &line)?;
        }
        Ok(())
    }

    /// Flush whatever is still buffered at end of input
    pub fn finish<W: Write>(&mut self, output: &mut W) -> Result<()> {
        self.close_table(output)
    }

    fn close_table<W: Write>(&mut self, output: &mut W) -> Result<()> {
        if let Some(table) = self.tables.take() {
            self.table_renderer.render(output, &table)?;
        }
        Ok(())
    }
}

/// Reformat a whole stream
///
/// Output is written as soon as each line or table is resolved.
pub fn format_stream<R: BufRead, W: Write>(
    input: R,
    output: &mut W,
    config: &Config,
) -> Result<()> {
    let metrics = config.glyph_metrics()?;
    format_stream_with(input, output, config, metrics.as_ref())
}

/// Reformat a whole stream with an already built glyph width provider
///
/// `output` is flushed whenever no table is held back, so a slow producer
/// sees each resolved line (or table) right away.
pub fn format_stream_with<R: BufRead, W: Write>(
    input: R,
    output: &mut W,
    config: &Config,
    metrics: &dyn GlyphMetrics,
) -> Result<()> {
    let mut source = LineSource::new(input);
    let mut engine = EngineState::new(config, metrics);

    while let Some(raw) = source.next_line()? {
        engine.process_line(output, raw)?;
        if engine.buffered_rows() == 0 {
            output.flush()?;
        }
    }
    engine.finish(output)?;
    output.flush()?;
    Ok(())
}

/// Reformat an in-memory document
pub fn format_str(input: &str, config: &Config) -> Result<String> {
    let mut output = Vec::new();
    format_stream(Cursor::new(input.as_bytes()), &mut output, config)?;
    Ok(String::from_utf8(output)?)
}
