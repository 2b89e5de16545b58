//! Export boundary.
//!
//! The core only decides *what* is exported: rows containing at least one non-blank cell, and of
//! those rows only the columns where some retained row has text. Turning that
//! [`VisibleSnapshot`] into pixels is the job of an [`ExportAdapter`].
//!
//! Rendering can be slow, so [`ExportJob::spawn`] runs the adapter on a worker thread. The job
//! owns a frozen copy of the content; the live grid is never touched, whether the export
//! succeeds or fails.

use crate::cell::Cell;
use crate::snapshot::Snapshot;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

/// File name given to exported images.
pub const EXPORT_FILE_NAME: &str = "table.png";

/// Content handed to an export adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleSnapshot {
    /// Header text.
    pub header: String,
    /// Retained cells, row-major; every row has `col_widths.len()` cells.
    pub cells: Vec<Vec<Cell>>,
    /// Heights of the retained rows.
    pub row_heights: Vec<u32>,
    /// Widths of the retained columns.
    pub col_widths: Vec<u32>,
}

impl VisibleSnapshot {
    /// Filter `snapshot` down to its visible content.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let grid = snapshot.grid();
        let rows: Vec<usize> = grid
            .rows()
            .enumerate()
            .filter(|(_, cells)| cells.iter().any(|c| !c.is_blank()))
            .map(|(index, _)| index)
            .collect();

        let cols: Vec<usize> = (0..grid.col_count())
            .filter(|&col| {
                rows.iter()
                    .any(|&row| grid.cell(row, col).is_some_and(|c| !c.is_blank()))
            })
            .collect();

        let cells = rows
            .iter()
            .map(|&row| {
                cols.iter()
                    .filter_map(|&col| grid.cell(row, col).cloned())
                    .collect()
            })
            .collect();

        Self {
            header: snapshot.header().to_string(),
            cells,
            row_heights: rows.iter().map(|&row| grid.row_heights()[row]).collect(),
            col_widths: cols.iter().map(|&col| grid.col_widths()[col]).collect(),
        }
    }

    /// Number of retained rows.
    pub fn row_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of retained columns.
    pub fn col_count(&self) -> usize {
        self.col_widths.len()
    }

    /// Whether no cell survived filtering.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Export failures.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The adapter could not render the snapshot.
    #[error("rendering failed: {0}")]
    Render(String),
    /// Reading or writing image data failed.
    #[error("export io error: {0}")]
    Io(#[from] io::Error),
    /// The worker thread went away without reporting a result.
    #[error("export worker terminated unexpectedly")]
    WorkerLost,
}

/// Turns visible content into encoded image bytes (PNG).
pub trait ExportAdapter {
    /// Render `snapshot` to an encoded image.
    fn export(&self, snapshot: &VisibleSnapshot) -> Result<Vec<u8>, ExportError>;
}

impl<T: ExportAdapter + ?Sized> ExportAdapter for Box<T> {
    fn export(&self, snapshot: &VisibleSnapshot) -> Result<Vec<u8>, ExportError> {
        (**self).export(snapshot)
    }
}

/// A finished export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedImage {
    /// Suggested download name ([`EXPORT_FILE_NAME`]).
    pub file_name: &'static str,
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
}

impl ExportedImage {
    /// Write the image into `dir` under its file name.
    pub fn save_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ExportError> {
        save_export(&self.bytes, dir)
    }
}

/// Write image bytes to `dir/table.png`.
pub fn save_export(bytes: &[u8], dir: impl AsRef<Path>) -> Result<PathBuf, ExportError> {
    let path = dir.as_ref().join(EXPORT_FILE_NAME);
    fs::write(&path, bytes)?;
    Ok(path)
}

/// Run `adapter` on the calling thread.
pub fn export_with(
    adapter: &dyn ExportAdapter,
    snapshot: &VisibleSnapshot,
) -> Result<ExportedImage, ExportError> {
    log::info!(
        "exporting {}x{} visible cells",
        snapshot.row_count(),
        snapshot.col_count()
    );
    let result = adapter.export(snapshot);
    match &result {
        Ok(bytes) => log::info!("export finished: {} bytes", bytes.len()),
        Err(err) => log::warn!("export failed: {err}"),
    }
    result.map(|bytes| ExportedImage {
        file_name: EXPORT_FILE_NAME,
        bytes,
    })
}

/// Handle to an export running on a worker thread.
#[derive(Debug)]
pub struct ExportJob {
    rx: Receiver<Result<ExportedImage, ExportError>>,
    done: bool,
}

impl ExportJob {
    /// Start rendering `snapshot` with `adapter` on a new thread.
    pub fn spawn<A>(snapshot: VisibleSnapshot, adapter: A) -> Self
    where
        A: ExportAdapter + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            // The receiver may already be gone; nothing to report to in that case.
            let _ = tx.send(export_with(&adapter, &snapshot));
        });
        Self { rx, done: false }
    }

    /// Non-blocking poll. Returns `None` while the export is still running and after the
    /// result has been taken.
    pub fn try_result(&mut self) -> Option<Result<ExportedImage, ExportError>> {
        if self.done {
            return None;
        }
        match self.rx.try_recv() {
            Ok(result) => {
                self.done = true;
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.done = true;
                Some(Err(ExportError::WorkerLost))
            }
        }
    }

    /// Block until the export finishes.
    pub fn wait(self) -> Result<ExportedImage, ExportError> {
        if self.done {
            return Err(ExportError::WorkerLost);
        }
        self.rx.recv().unwrap_or(Err(ExportError::WorkerLost))
    }

    /// Whether the result has already been taken.
    pub fn is_finished(&self) -> bool {
        self.done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    fn snapshot_with(cells: &[(usize, usize, &str)]) -> Snapshot {
        let mut grid = Grid::new(3, 3, 40, 120);
        for &(row, col, text) in cells {
            grid.set_cell(row, col, Cell::new(text));
        }
        Snapshot::new("header", grid)
    }

    #[test]
    fn blank_grid_exports_header_only() {
        let visible = VisibleSnapshot::from_snapshot(&snapshot_with(&[]));
        assert!(visible.is_empty());
        assert_eq!(visible.col_count(), 0);
        assert_eq!(visible.header, "header");
    }

    #[test]
    fn whitespace_counts_as_blank() {
        let visible = VisibleSnapshot::from_snapshot(&snapshot_with(&[(0, 0, "  "), (2, 2, "z")]));
        assert_eq!(visible.row_count(), 1);
        assert_eq!(visible.col_count(), 1);
        assert_eq!(visible.cells[0][0].text, "z");
    }

    #[test]
    fn columns_follow_retained_rows() {
        let visible =
            VisibleSnapshot::from_snapshot(&snapshot_with(&[(0, 0, "a"), (2, 2, "b")]));
        assert_eq!(visible.row_count(), 2);
        assert_eq!(visible.col_count(), 2);
        assert_eq!(visible.cells[0][0].text, "a");
        assert_eq!(visible.cells[0][1].text, "");
        assert_eq!(visible.cells[1][1].text, "b");
    }
}
