//! Pixel layout of an exported table.

use tablenote_core::{VisibleSnapshot, display_width};

/// Frame border width.
pub const BORDER: u32 = 1;
/// Space between the frame and the content.
pub const PADDING: u32 = 10;
/// Height reserved for the header line.
pub const HEADER_HEIGHT: u32 = 20;
/// Space between the header and the table.
pub const HEADER_MARGIN: u32 = 10;
/// Approximate advance of one bold header character.
pub const HEADER_ADVANCE: u32 = 10;

/// Position and size of one cell, in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellBox {
    /// Row in the visible snapshot.
    pub row: usize,
    /// Column in the visible snapshot.
    pub col: usize,
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width (the column width).
    pub width: u32,
    /// Height (the row height).
    pub height: u32,
}

impl CellBox {
    /// Center point, where the text is anchored.
    pub fn center(&self) -> (i32, i32) {
        (
            self.x + (self.width / 2) as i32,
            self.y + (self.height / 2) as i32,
        )
    }
}

/// Image size and element positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Image width.
    pub width: u32,
    /// Image height.
    pub height: u32,
    /// Top-left corner of the header text.
    pub header_origin: (i32, i32),
    /// Cell boxes, row-major.
    pub cells: Vec<CellBox>,
}

impl Layout {
    /// Lay out `snapshot`. Cells are placed edge to edge, rows top to bottom.
    ///
    /// Sizes saturate at `u32::MAX` instead of overflowing; callers reject such layouts by size.
    pub fn compute(snapshot: &VisibleSnapshot) -> Self {
        let inset = BORDER + PADDING;
        let table_width = saturating_sum(&snapshot.col_widths);
        let table_height = saturating_sum(&snapshot.row_heights);
        let header_width = u32::try_from(display_width(&snapshot.header))
            .unwrap_or(u32::MAX)
            .saturating_mul(HEADER_ADVANCE);

        let content_width = table_width.max(header_width);
        let table_top = inset + HEADER_HEIGHT + HEADER_MARGIN;

        let mut cells = Vec::with_capacity(snapshot.row_count() * snapshot.col_count());
        let mut y = table_top;
        for (row, &height) in snapshot.row_heights.iter().enumerate() {
            let mut x = inset;
            for (col, &width) in snapshot.col_widths.iter().enumerate() {
                cells.push(CellBox {
                    row,
                    col,
                    x: to_coord(x),
                    y: to_coord(y),
                    width,
                    height,
                });
                x = x.saturating_add(width);
            }
            y = y.saturating_add(height);
        }

        Self {
            width: content_width.saturating_add(2 * inset),
            height: table_top.saturating_add(table_height).saturating_add(inset),
            header_origin: (inset as i32, inset as i32),
            cells,
        }
    }
}

fn saturating_sum(values: &[u32]) -> u32 {
    values.iter().fold(0u32, |acc, &v| acc.saturating_add(v))
}

fn to_coord(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tablenote_core::Cell;

    #[test]
    fn cells_follow_widths_and_heights() {
        let visible = VisibleSnapshot {
            header: String::new(),
            cells: vec![
                vec![Cell::new("a"), Cell::new("b")],
                vec![Cell::new("c"), Cell::new("d")],
            ],
            row_heights: vec![40, 60],
            col_widths: vec![120, 80],
        };
        let layout = Layout::compute(&visible);

        assert_eq!(layout.width, 200 + 22);
        assert_eq!(layout.height, 11 + 30 + 100 + 11);
        assert_eq!(
            layout.cells[3],
            CellBox {
                row: 1,
                col: 1,
                x: 11 + 120,
                y: 41 + 40,
                width: 80,
                height: 60,
            }
        );
        assert_eq!(layout.cells[3].center(), (171, 111));
    }

    #[test]
    fn huge_widths_saturate() {
        let visible = VisibleSnapshot {
            header: String::new(),
            cells: vec![vec![Cell::new("a"), Cell::new("b")]],
            row_heights: vec![40],
            col_widths: vec![u32::MAX, u32::MAX],
        };
        let layout = Layout::compute(&visible);
        assert_eq!(layout.width, u32::MAX);
        assert_eq!(layout.cells[1].x, i32::MAX);
    }

    #[test]
    fn long_header_widens_image() {
        let visible = VisibleSnapshot {
            header: "x".repeat(50),
            cells: vec![vec![Cell::new("a")]],
            row_heights: vec![40],
            col_widths: vec![120],
        };
        assert_eq!(Layout::compute(&visible).width, 500 + 22);
    }
}
