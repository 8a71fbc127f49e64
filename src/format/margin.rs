/// `MarginStack` - Hierarchical indentation stop tracker
///
/// Keeps a fixed number of indentation stops, outermost first, and maps
/// each line's leading whitespace onto one of them. The margin of a line is
/// always derived from a tracked stop, never invented.
use crate::parser::{Line, LineInfo, LineKind};

/// Slot value meaning "no stop recorded at this level"
const UNSET: usize = 0;

/// `MarginStack` tracks up to `levels` nested indentation stops
#[derive(Debug, Clone)]
pub struct MarginStack {
    /// Raw indentation of each level, outermost first
    stops: Vec<usize>,
    /// Leave one column of indentation per nesting level on output
    reserve_level_space: bool,
}

impl MarginStack {
    /// Create a new `MarginStack`
    ///
    /// # Arguments
    /// * `levels` - Maximum nesting depth (at least one level is always kept)
    /// * `reserve_level_space` - Keep one output space per level below the first
    #[must_use]
    pub fn new(levels: usize, reserve_level_space: bool) -> Self {
        Self {
            stops: vec![UNSET; levels.max(1)],
            reserve_level_space,
        }
    }

    /// Number of levels tracked
    #[must_use]
    pub fn levels(&self) -> usize {
        self.stops.len()
    }

    /// Current stop values, `0` for unset levels
    #[must_use]
    pub fn stops(&self) -> &[usize] {
        &self.stops
    }

    /// Resolve the margin of `line` and update the stops
    ///
    /// Rules apply in order: blank lines leave everything alone, titles pull
    /// level 0 down to the shallowest title, table rows following a table row
    /// keep its margin, flush-left lines reset all levels, and everything else
    /// searches the stack.
    pub fn resolve(&mut self, line: &Line, previous: Option<&LineInfo>) -> usize {
        let spaces = line.leading_spaces;

        match line.kind {
            LineKind::Empty => return 0,
            LineKind::SectionTitle => {
                if self.stops[0] == UNSET || spaces < self.stops[0] {
                    self.stops[0] = spaces;
                }
            }
            LineKind::TableRow => {
                if let Some(prev) = previous.filter(|p| p.kind == LineKind::TableRow) {
                    return prev.margin.min(spaces);
                }
            }
            LineKind::Paragraph => {}
        }

        if spaces == 0 {
            self.clear_from(0);
            return 0;
        }

        self.search(spaces)
    }

    fn search(&mut self, spaces: usize) -> usize {
        let levels = self.stops.len();

        for level in 0..levels {
            let stop = self.stops[level];
            if stop == UNSET {
                self.stops[level] = spaces;
                return self.margin_at(level);
            }
            if stop > spaces {
                // shallower than a known stop: push it and the deeper ones outward
                self.stops[level..].rotate_right(1);
                self.stops[level] = spaces;
                return self.margin_at(level);
            }
            if stop == spaces {
                self.clear_from(level + 1);
                return self.margin_at(level);
            }
        }

        self.margin_at(levels - 1)
    }

    fn margin_at(&self, level: usize) -> usize {
        let stop = self.stops[level];
        if self.reserve_level_space {
            stop.saturating_sub(level)
        } else {
            stop
        }
    }

    fn clear_from(&mut self, level: usize) {
        for stop in self.stops.iter_mut().skip(level) {
            *stop = UNSET;
        }
    }
}
