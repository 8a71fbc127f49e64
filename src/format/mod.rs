//! Margin resolution, table layout and rendering.
//!
//! This module contains the core reformatting logic organized into submodules:
//! - [`margin`]: Tracks nested indentation stops and resolves each line's margin
//! - [`table`]: Buffers consecutive table rows and lays them out on a grid
//! - [`columns`]: Infers column boundaries and widths from a closed table
//! - [`render`]: Writes plain lines and tables with tabs and spaces
//! - [`metrics`]: Glyph width providers for fixed, terminal and proportional text

pub mod columns;
pub mod margin;
pub mod metrics;
pub mod render;
pub mod table;

pub use columns::{is_list_marker_start, round_up, Column, ColumnDetector, ColumnRules};
pub use margin::MarginStack;
pub use metrics::{CellWidth, FixedWidth, GlyphMetrics, WidthTable};
pub use render::{write_indent, LineRenderer, TableRenderer};
pub use table::{GridCell, GridRow, Table, TableAccumulator};
