/// `LineSource` - Reads raw text records from a buffered reader
///
/// This module handles:
/// - Splitting the input at `\n` (a trailing `\r` is treated as part of the terminator)
/// - Lossy decoding so arbitrary bytes never abort a run
/// - Remembering whether the last record of the stream was terminated
use std::io::{BufRead, BufReader};

use crate::error::Result;

/// One input record with its line terminator removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    /// Text of the record without `\n` / `\r\n`
    pub text: String,
    /// Whether the record ended with a line terminator
    pub terminated: bool,
}

impl RawLine {
    /// Build a terminated record (mostly useful in tests)
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            terminated: true,
        }
    }
}

/// `LineSource` reads raw records lazily, one at a time
pub struct LineSource<R: BufRead> {
    reader: R,
    buffer: Vec<u8>,
    line_number: usize,
}

impl<R: BufRead> LineSource<R> {
    /// Create a new `LineSource`
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::new(),
            line_number: 0,
        }
    }

    /// Number of records read so far
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Read the next record
    ///
    /// Returns None at EOF
    pub fn next_line(&mut self) -> Result<Option<RawLine>> {
        self.buffer.clear();
        let read = self.reader.read_until(b'\n', &mut self.buffer)?;
        if read == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        let mut terminated = false;
        if self.buffer.last() == Some(&b'\n') {
            self.buffer.pop();
            terminated = true;
            if self.buffer.last() == Some(&b'\r') {
                self.buffer.pop();
            }
        }

        let text = String::from_utf8_lossy(&self.buffer).into_owned();
        Ok(Some(RawLine { text, terminated }))
    }
}

/// Helper to create `LineSource` from a string (for testing)
impl<'a> LineSource<BufReader<&'a [u8]>> {
    #[must_use]
    pub fn from_string(s: &'a str) -> Self {
        Self::new(BufReader::new(s.as_bytes()))
    }
}
