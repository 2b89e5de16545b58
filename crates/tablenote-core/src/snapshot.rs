//! Full document state: header plus grid.
//!
//! A [`Snapshot`] is the unit the mutation engine transforms and the history stores. Cloning is
//! cheap (rows are shared copy-on-write) and never aliases live state.

use crate::cell::Cell;
use crate::grid::Grid;
use serde::Serialize;

/// Header text plus grid, with its dimension vectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    header: String,
    grid: Grid,
}

impl Snapshot {
    /// Assemble a snapshot.
    pub fn new(header: impl Into<String>, grid: Grid) -> Self {
        Self {
            header: header.into(),
            grid,
        }
    }

    /// Header text.
    pub fn header(&self) -> &str {
        &self.header
    }

    /// The grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable access for the mutation engine.
    pub(crate) fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub(crate) fn set_header(&mut self, header: String) {
        self.header = header;
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.grid.row_count()
    }

    /// Number of columns.
    pub fn col_count(&self) -> usize {
        self.grid.col_count()
    }

    /// Row heights in pixels.
    pub fn row_heights(&self) -> &[u32] {
        self.grid.row_heights()
    }

    /// Column widths in pixels.
    pub fn col_widths(&self) -> &[u32] {
        self.grid.col_widths()
    }

    /// Cell at `(row, col)`.
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.grid.cell(row, col)
    }
}
