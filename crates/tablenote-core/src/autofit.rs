//! Auto-fit column sizing.
//!
//! After a cell's text changes, the width of its column is derived from the text of every cell
//! in that column. Text is measured through a [`TextMeasurer`]; the default
//! [`CharWidthMeasurer`] approximates pixel width from Unicode display width (UAX #11) counted
//! per grapheme cluster, so CJK text takes two cells and combined emoji one glyph.
//!
//! Width rules for a text change in column `c`:
//!
//! - every cell in `c` blank: reset to the default width;
//! - the written text needs at least as much room as before: `max(current, fitted)`;
//! - the written text got shorter: `fitted`.
//!
//! where `fitted = max(MIN_COL_WIDTH, default_width, max(measure(text) + padding))`.

use crate::cell::Cell;
use crate::grid::{Grid, MIN_COL_WIDTH};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Measures rendered text width in pixels.
pub trait TextMeasurer {
    /// Pixel width of `text` drawn in regular or bold weight.
    fn measure(&self, text: &str, bold: bool) -> u32;
}

/// Approximate measurer: display cells times a fixed advance per cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharWidthMeasurer {
    /// Advance of one display cell in regular weight.
    pub px_per_cell: u32,
    /// Advance of one display cell in bold weight.
    pub bold_px_per_cell: u32,
}

impl Default for CharWidthMeasurer {
    fn default() -> Self {
        Self {
            px_per_cell: 9,
            bold_px_per_cell: 10,
        }
    }
}

impl TextMeasurer for CharWidthMeasurer {
    fn measure(&self, text: &str, bold: bool) -> u32 {
        let advance = if bold {
            self.bold_px_per_cell
        } else {
            self.px_per_cell
        };
        let cells = display_width(text) as u32;
        cells.saturating_mul(advance)
    }
}

/// Display width of `text` in terminal-style cells, counted per grapheme cluster.
pub fn display_width(text: &str) -> usize {
    text.graphemes(true)
        .map(|g| UnicodeWidthStr::width(g).max(usize::from(!g.trim().is_empty())))
        .sum()
}

/// Auto-fit parameters.
pub struct AutoFit<'a> {
    measurer: &'a dyn TextMeasurer,
    padding: u32,
    default_width: u32,
}

impl<'a> AutoFit<'a> {
    /// Create a policy from a measurer, fixed padding and the default column width.
    pub fn new(measurer: &'a dyn TextMeasurer, padding: u32, default_width: u32) -> Self {
        Self {
            measurer,
            padding,
            default_width,
        }
    }

    /// Width a single cell asks for; blank cells ask for nothing.
    pub fn requirement(&self, cell: &Cell) -> u32 {
        if cell.is_blank() {
            return 0;
        }
        self.measurer
            .measure(&cell.text, cell.bold)
            .saturating_add(self.padding)
    }

    /// Column width derived from the current content of `col`.
    pub fn fitted_width(&self, grid: &Grid, col: usize) -> u32 {
        grid.column(col)
            .map(|cell| self.requirement(cell))
            .fold(self.floor(), u32::max)
    }

    /// Recompute `col` after `before` was replaced by the cell now stored in `grid`.
    ///
    /// Text that got no shorter never narrows the column, even when it measures narrower.
    ///
    /// Returns the new width, or `None` when `col` is out of bounds.
    pub fn refit_after_edit(&self, grid: &mut Grid, col: usize, before: &Cell, after: &Cell) -> Option<u32> {
        let current = grid.col_width(col)?;
        let width = if grid.column_is_blank(col) {
            self.default_width.max(MIN_COL_WIDTH)
        } else if after.text.chars().count() >= before.text.chars().count()
            || self.requirement(after) >= self.requirement(before)
        {
            current.max(self.fitted_width(grid, col))
        } else {
            self.fitted_width(grid, col)
        };

        log::trace!("auto-fit column {col}: {current} -> {width}");
        grid.set_col_width(col, width);
        Some(width)
    }

    /// Grow `col` to fit its content; never shrinks.
    pub fn grow_to_fit(&self, grid: &mut Grid, col: usize) -> Option<u32> {
        let current = grid.col_width(col)?;
        let width = current.max(self.fitted_width(grid, col));
        grid.set_col_width(col, width);
        Some(width)
    }

    fn floor(&self) -> u32 {
        self.default_width.max(MIN_COL_WIDTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measurer() -> CharWidthMeasurer {
        CharWidthMeasurer::default()
    }

    #[test]
    fn display_width_handles_wide_and_combined_text() {
        assert_eq!(display_width("abc"), 3);
        assert_eq!(display_width("你好"), 4);
        assert_eq!(display_width(""), 0);
        assert_eq!(display_width("e\u{301}"), 1);
    }

    #[test]
    fn bold_text_measures_wider() {
        let m = measurer();
        assert!(m.measure("Total", true) > m.measure("Total", false));
    }

    #[test]
    fn short_text_keeps_default_width() {
        let m = measurer();
        let fit = AutoFit::new(&m, 30, 120);
        let mut grid = Grid::new(2, 1, 40, 120);
        let before = grid.cell(0, 0).cloned().unwrap_or_default();
        let after = Cell::new("abc");
        grid.set_cell(0, 0, after.clone());
        assert_eq!(fit.refit_after_edit(&mut grid, 0, &before, &after), Some(120));
    }

    #[test]
    fn long_text_grows_then_clearing_resets() {
        let m = measurer();
        let fit = AutoFit::new(&m, 30, 120);
        let mut grid = Grid::new(1, 1, 40, 120);
        let long = Cell::new("a".repeat(20));
        grid.set_cell(0, 0, long.clone());
        assert_eq!(fit.refit_after_edit(&mut grid, 0, &Cell::default(), &long), Some(20 * 9 + 30));

        let cleared = Cell::default();
        grid.set_cell(0, 0, cleared.clone());
        assert_eq!(fit.refit_after_edit(&mut grid, 0, &long, &cleared), Some(120));
    }

    #[test]
    fn out_of_bounds_column_is_ignored() {
        let m = measurer();
        let fit = AutoFit::new(&m, 30, 120);
        let mut grid = Grid::new(1, 1, 40, 120);
        assert_eq!(fit.grow_to_fit(&mut grid, 3), None);
    }
}
