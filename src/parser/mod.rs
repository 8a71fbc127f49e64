//! Input reading and line classification.
//!
//! This module turns a byte stream into classified lines:
//! - [`LineSource`]: Lazily reads raw records, decoding bytes lossily
//! - [`classify`]: Measures indentation and decides each line's [`LineKind`]
//!
//! Classification is a single left-to-right scan with no lookahead. Apart from
//! the record itself it only needs the tab stop and whether the previous line
//! was a table row.

pub mod classify;
pub mod stream;

pub use classify::{classify, next_tab_stop, Line, LineInfo, LineKind};
pub use stream::{LineSource, RawLine};
