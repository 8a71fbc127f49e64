//! Glyph width providers.
//!
//! Table alignment is computed in abstract width units. A provider maps each
//! character to its rendered width and reports the width of one fixed
//! column (`unit`), which is what a tab position and a tab stop are measured in.
//!
//! Three providers exist:
//! - [`FixedWidth`]: every character is one unit (plain terminals, fixed fonts)
//! - [`CellWidth`]: terminal cell widths, so wide CJK glyphs take two units
//! - [`WidthTable`]: proportional widths read from a TOML width table
//!
//! The provider is picked once at startup and passed around as
//! `&dyn GlyphMetrics`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use unicode_width::UnicodeWidthChar;

use crate::error::ConfigError;

/// Maps characters to rendered widths
pub trait GlyphMetrics {
    /// Rendered width of `ch`, always positive
    fn width_of(&self, ch: char) -> u32;

    /// Width of one fixed column
    fn unit(&self) -> u32;
}

/// One unit per character
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedWidth;

impl GlyphMetrics for FixedWidth {
    fn width_of(&self, _ch: char) -> u32 {
        1
    }

    fn unit(&self) -> u32 {
        1
    }
}

/// Terminal cell widths
#[derive(Debug, Clone, Copy, Default)]
pub struct CellWidth;

impl GlyphMetrics for CellWidth {
    fn width_of(&self, ch: char) -> u32 {
        // control and combining characters still occupy a grid position
        let cells = UnicodeWidthChar::width(ch).unwrap_or(1).max(1);
        u32::try_from(cells).unwrap_or(1)
    }

    fn unit(&self) -> u32 {
        1
    }
}

/// Largest width accepted for a glyph or the unit
///
/// Keeps per-column sums far away from `u32` overflow.
pub const MAX_GLYPH_WIDTH: u32 = 65_535;

/// Raw layout of a width table file
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WidthTableFile {
    /// Width used for characters not listed anywhere
    default: u32,
    /// Width of one fixed column; falls back to the width of '0'
    unit: Option<u32>,
    #[serde(default)]
    glyphs: HashMap<String, u32>,
    #[serde(default)]
    ranges: Vec<GlyphRange>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct GlyphRange {
    first: char,
    last: char,
    width: u32,
}

/// Proportional widths loaded from a width table
///
/// ```toml
/// default = 9
/// unit = 9
///
/// [glyphs]
/// " " = 5
/// "i" = 4
///
/// [[ranges]]
/// first = "A"
/// last = "Z"
/// width = 11
/// ```
///
/// Single glyph entries take precedence over ranges; later ranges win over
/// earlier ones.
#[derive(Debug)]
pub struct WidthTable {
    default: u32,
    unit: u32,
    glyphs: HashMap<char, u32>,
    ranges: Vec<GlyphRange>,
    cache: RefCell<HashMap<char, u32>>,
}

impl WidthTable {
    /// Load a width table from a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::FontRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents, path)
    }

    /// Parse a width table; `origin` is only used in error messages
    pub fn from_toml_str(contents: &str, origin: &Path) -> Result<Self, ConfigError> {
        let file: WidthTableFile =
            toml::from_str(contents).map_err(|source| ConfigError::FontParse {
                path: origin.to_path_buf(),
                source,
            })?;

        let invalid = |reason: String| ConfigError::FontInvalid {
            path: origin.to_path_buf(),
            reason,
        };
        let check = |what: String, width: u32| {
            if width == 0 || width > MAX_GLYPH_WIDTH {
                Err(invalid(format!(
                    "{what} must be between 1 and {MAX_GLYPH_WIDTH}, got {width}"
                )))
            } else {
                Ok(width)
            }
        };

        check("default width".to_string(), file.default)?;

        let mut glyphs = HashMap::with_capacity(file.glyphs.len());
        for (key, width) in &file.glyphs {
            let mut chars = key.chars();
            let (Some(ch), None) = (chars.next(), chars.next()) else {
                return Err(invalid(format!("glyph key {key:?} is not a single character")));
            };
            glyphs.insert(ch, check(format!("width of {key:?}"), *width)?);
        }

        for range in &file.ranges {
            if range.first > range.last {
                return Err(invalid(format!(
                    "range {:?}..{:?} is reversed",
                    range.first, range.last
                )));
            }
            check(
                format!("width of range {:?}..{:?}", range.first, range.last),
                range.width,
            )?;
        }

        let mut table = Self {
            default: file.default,
            unit: 0,
            glyphs,
            ranges: file.ranges,
            cache: RefCell::new(HashMap::new()),
        };
        table.unit = match file.unit {
            Some(unit) => check("unit".to_string(), unit)?,
            None => table.lookup('0'),
        };
        Ok(table)
    }

    fn lookup(&self, ch: char) -> u32 {
        if let Some(&width) = self.glyphs.get(&ch) {
            return width;
        }
        self.ranges
            .iter()
            .rev()
            .find(|range| range.first <= ch && ch <= range.last)
            .map_or(self.default, |range| range.width)
    }
}

impl GlyphMetrics for WidthTable {
    fn width_of(&self, ch: char) -> u32 {
        if let Some(&width) = self.cache.borrow().get(&ch) {
            return width;
        }
        let width = self.lookup(ch);
        self.cache.borrow_mut().insert(ch, width);
        width
    }

    fn unit(&self) -> u32 {
        self.unit
    }
}
