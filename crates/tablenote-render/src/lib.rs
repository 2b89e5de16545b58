#![warn(missing_docs)]
//! PNG renderer for `tablenote-core` exports.
//!
//! [`PngRenderer`] implements [`ExportAdapter`]: it lays out the header and the visible cells,
//! draws them with `plotters` on a bitmap backend and returns the encoded PNG.
//!
//! The image mirrors the on-screen table:
//!
//! ```text
//! ┌ 1 px #cccccc border, 10 px padding ───────────┐
//! │ Header (bold, 16 px)                          │
//! │ 10 px gap                                     │
//! │ ┌────────┬──────┐  one box per visible cell,  │
//! │ │ Items  │ Get  │  sized by the source        │
//! │ └────────┴──────┘  row height / column width  │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! The bitmap backend writes to a file, so every render goes through a private staging
//! directory that is removed whether drawing succeeds or not.

mod layout;

pub use layout::{CellBox, Layout};

use plotters::prelude::*;
use plotters::style::Color as _;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tablenote_core::{Color, ExportAdapter, ExportError, VisibleSnapshot};

/// File name used inside the staging directory.
const STAGING_FILE: &str = "render.png";
/// Font family for all text.
const FONT_FAMILY: &str = "sans-serif";
/// Header font size (pixels).
pub const HEADER_FONT_SIZE: f64 = 16.0;
/// Cell font size (pixels).
pub const CELL_FONT_SIZE: f64 = 14.0;
/// Border color of the frame and every cell.
pub const BORDER_COLOR: RGBColor = RGBColor(0xcc, 0xcc, 0xcc);
/// Images larger than this in either dimension are refused.
pub const DEFAULT_MAX_DIMENSION: u32 = 16_384;

/// Render failures.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The drawing backend failed.
    #[error("drawing failed: {0}")]
    Draw(String),
    /// Creating, reading or removing staging files failed.
    #[error("staging io error: {0}")]
    Io(#[from] io::Error),
    /// The backend produced something that is not a readable PNG.
    #[error("rendered image is unreadable: {0}")]
    Decode(#[from] image::ImageError),
    /// The layout exceeds the size limit.
    #[error("image of {width}x{height} px exceeds the {max} px limit")]
    TooLarge {
        /// Layout width.
        width: u32,
        /// Layout height.
        height: u32,
        /// Configured limit.
        max: u32,
    },
}

impl From<RenderError> for ExportError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Io(err) => ExportError::Io(err),
            other => ExportError::Render(other.to_string()),
        }
    }
}

fn draw_error<E: std::error::Error + Send + Sync>(err: DrawingAreaErrorKind<E>) -> RenderError {
    RenderError::Draw(err.to_string())
}

fn rgb(color: Color) -> RGBColor {
    RGBColor(color.r, color.g, color.b)
}

/// Renders visible snapshots to PNG.
#[derive(Debug, Clone)]
pub struct PngRenderer {
    staging_root: Option<PathBuf>,
    max_dimension: u32,
}

impl Default for PngRenderer {
    fn default() -> Self {
        Self {
            staging_root: None,
            max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }
}

impl PngRenderer {
    /// Renderer staging in the system temp directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create staging directories under `root` instead of the system temp directory.
    pub fn with_staging_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.staging_root = Some(root.into());
        self
    }

    /// Refuse images wider or taller than `max` pixels (at most `i32::MAX`).
    pub fn with_max_dimension(mut self, max: u32) -> Self {
        self.max_dimension = max.min(i32::MAX as u32);
        self
    }

    /// Render `snapshot` to PNG bytes.
    pub fn render(&self, snapshot: &VisibleSnapshot) -> Result<Vec<u8>, RenderError> {
        let layout = Layout::compute(snapshot);
        if layout.width > self.max_dimension || layout.height > self.max_dimension {
            return Err(RenderError::TooLarge {
                width: layout.width,
                height: layout.height,
                max: self.max_dimension,
            });
        }

        self.with_staging(|dir| {
            let path = dir.join(STAGING_FILE);
            log::debug!(
                "rendering {}x{} px into {}",
                layout.width,
                layout.height,
                path.display()
            );
            draw(&path, snapshot, &layout)?;
            read_back(&path, &layout)
        })
    }

    /// Run `work` inside a fresh staging directory, removing it whatever `work` returns.
    fn with_staging<T>(
        &self,
        work: impl FnOnce(&Path) -> Result<T, RenderError>,
    ) -> Result<T, RenderError> {
        let staging = self.staging_dir()?;
        let result = work(staging.path());
        let closed = staging.close();
        let value = result?;
        closed?;
        Ok(value)
    }

    fn staging_dir(&self) -> io::Result<tempfile::TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("tablenote-render-");
        match &self.staging_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
    }
}

impl ExportAdapter for PngRenderer {
    fn export(&self, snapshot: &VisibleSnapshot) -> Result<Vec<u8>, ExportError> {
        Ok(self.render(snapshot)?)
    }
}

/// Load the rendered file and check it is a PNG of the laid-out size.
fn read_back(path: &Path, layout: &Layout) -> Result<Vec<u8>, RenderError> {
    let bytes = fs::read(path)?;
    let decoded = image::load_from_memory_with_format(&bytes, image::ImageFormat::Png)?;
    if decoded.width() != layout.width || decoded.height() != layout.height {
        return Err(RenderError::Draw(format!(
            "backend produced {}x{} px, expected {}x{}",
            decoded.width(),
            decoded.height(),
            layout.width,
            layout.height
        )));
    }
    Ok(bytes)
}

fn draw(path: &Path, snapshot: &VisibleSnapshot, layout: &Layout) -> Result<(), RenderError> {
    let root = BitMapBackend::new(path, (layout.width, layout.height)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_error)?;

    let (w, h) = (layout.width as i32, layout.height as i32);
    root.draw(&Rectangle::new([(0, 0), (w - 1, h - 1)], BORDER_COLOR.stroke_width(1)))
        .map_err(draw_error)?;

    let mut text_failures = 0usize;

    let header_style = (FONT_FAMILY, HEADER_FONT_SIZE)
        .into_font()
        .style(FontStyle::Bold)
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Top));
    if !snapshot.header.trim().is_empty()
        && root
            .draw_text(&snapshot.header, &header_style, layout.header_origin)
            .is_err()
    {
        text_failures += 1;
    }

    for cell_box in &layout.cells {
        let Some(cell) = snapshot
            .cells
            .get(cell_box.row)
            .and_then(|row| row.get(cell_box.col))
        else {
            continue;
        };

        let (x0, y0) = (cell_box.x, cell_box.y);
        let (x1, y1) = (x0 + cell_box.width as i32 - 1, y0 + cell_box.height as i32 - 1);
        root.draw(&Rectangle::new([(x0, y0), (x1, y1)], rgb(cell.bg_color).filled()))
            .map_err(draw_error)?;
        root.draw(&Rectangle::new([(x0, y0), (x1, y1)], BORDER_COLOR.stroke_width(1)))
            .map_err(draw_error)?;

        if cell.is_blank() {
            continue;
        }
        let weight = if cell.bold {
            FontStyle::Bold
        } else {
            FontStyle::Normal
        };
        let style = (FONT_FAMILY, CELL_FONT_SIZE)
            .into_font()
            .style(weight)
            .color(&rgb(cell.text_color))
            .pos(Pos::new(HPos::Center, VPos::Center));
        if root.draw_text(&cell.text, &style, cell_box.center()).is_err() {
            text_failures += 1;
        }
    }

    // Missing system fonts should not block an export of the table layout.
    if text_failures > 0 {
        log::warn!("{text_failures} text runs could not be drawn; is a sans-serif font installed?");
    }

    root.present().map_err(draw_error)?;
    Ok(())
}
