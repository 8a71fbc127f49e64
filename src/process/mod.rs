//! Stream processing.
//!
//! The engine reads one line at a time and writes output as soon as a line,
//! or a whole table, is resolved:
//! - Classification and margin resolution happen per line
//! - Table rows are held back until the table closes
//! - At most one table is buffered at any time
//!
//! The main entry point is [`format_stream`] which processes a buffered reader
//! and writes reformatted text to any `Write` implementation.

pub mod pipeline;

pub use pipeline::{format_stream, format_stream_with, format_str, EngineState};
