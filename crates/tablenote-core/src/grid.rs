//! Rectangular cell grid with per-row heights and per-column widths.
//!
//! Rows are stored behind [`Arc`] and edited through [`Arc::make_mut`]: cloning a [`Grid`] is
//! cheap, and writing to a row that is still shared with a clone (for example a history entry)
//! copies that row first. Snapshots therefore never alias live mutable state.
//!
//! Every structural operation applies to all rows at once, so the grid is rectangular by
//! construction and `row_heights.len() == row_count`, `col_widths.len() == col_count` hold after
//! each call.

use crate::cell::Cell;
use serde::Serialize;
use std::sync::Arc;

/// Smallest width (pixels) a column may be given.
pub const MIN_COL_WIDTH: u32 = 50;

/// Grid of cells plus dimension vectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Grid {
    rows: Vec<Arc<Vec<Cell>>>,
    row_heights: Vec<u32>,
    col_widths: Vec<u32>,
}

impl Grid {
    /// Create a `rows` x `cols` grid of default cells.
    pub fn new(rows: usize, cols: usize, row_height: u32, col_width: u32) -> Self {
        Self {
            rows: (0..rows).map(|_| Arc::new(default_row(cols))).collect(),
            row_heights: vec![row_height; rows],
            col_widths: vec![col_width; cols],
        }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn col_count(&self) -> usize {
        self.col_widths.len()
    }

    /// Whether `(row, col)` addresses an existing cell.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.row_count() && col < self.col_count()
    }

    /// Cell at `(row, col)`.
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Cells of one row.
    pub fn row(&self, row: usize) -> Option<&[Cell]> {
        self.rows.get(row).map(|r| r.as_slice())
    }

    /// Iterate rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.rows.iter().map(|r| r.as_slice())
    }

    /// Iterate the cells of column `col` top to bottom.
    pub fn column(&self, col: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().filter_map(move |r| r.get(col))
    }

    /// Texts of column `col` top to bottom.
    pub fn column_texts(&self, col: usize) -> impl Iterator<Item = &str> + '_ {
        self.column(col).map(|cell| cell.text.as_str())
    }

    /// Row heights in pixels.
    pub fn row_heights(&self) -> &[u32] {
        &self.row_heights
    }

    /// Column widths in pixels.
    pub fn col_widths(&self) -> &[u32] {
        &self.col_widths
    }

    /// Width of one column.
    pub fn col_width(&self, col: usize) -> Option<u32> {
        self.col_widths.get(col).copied()
    }

    /// Check the shape invariant: equal row lengths matching both dimension vectors.
    pub fn is_rectangular(&self) -> bool {
        let cols = self.col_count();
        self.row_heights.len() == self.rows.len() && self.rows.iter().all(|r| r.len() == cols)
    }

    /// Replace the cell at `(row, col)`. Returns `false` (and changes nothing) when out of bounds.
    pub fn set_cell(&mut self, row: usize, col: usize, cell: Cell) -> bool {
        if !self.contains(row, col) {
            return false;
        }
        Arc::make_mut(&mut self.rows[row])[col] = cell;
        true
    }

    /// Append a row of default cells sized to the current column count.
    pub fn push_row(&mut self, height: u32) {
        let cols = self.col_count();
        self.rows.push(Arc::new(default_row(cols)));
        self.row_heights.push(height);
    }

    /// Insert a row of default cells at `index` (clamped to the row count).
    pub fn insert_row(&mut self, index: usize, height: u32) {
        let index = index.min(self.row_count());
        let cols = self.col_count();
        self.rows.insert(index, Arc::new(default_row(cols)));
        self.row_heights.insert(index, height);
    }

    /// Append one default cell to every row.
    pub fn push_column(&mut self, width: u32) {
        for row in &mut self.rows {
            Arc::make_mut(row).push(Cell::default());
        }
        self.col_widths.push(width.max(MIN_COL_WIDTH));
    }

    /// Set a column width, clamped to [`MIN_COL_WIDTH`]. Returns `false` when out of bounds.
    pub fn set_col_width(&mut self, col: usize, width: u32) -> bool {
        match self.col_widths.get_mut(col) {
            Some(slot) => {
                *slot = width.max(MIN_COL_WIDTH);
                true
            }
            None => false,
        }
    }

    /// Whether every cell in `col` is blank.
    pub fn column_is_blank(&self, col: usize) -> bool {
        self.column(col).all(Cell::is_blank)
    }
}

fn default_row(cols: usize) -> Vec<Cell> {
    (0..cols).map(|_| Cell::default()).collect()
}
