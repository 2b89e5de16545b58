//! Single-slot format clipboard.
//!
//! Holds the visual attributes of one copied cell. Copying overwrites the slot; applying takes
//! the value out, so each copy is good for exactly one target cell.

use crate::cell::CellFormat;

/// Format clipboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatClipboard {
    slot: Option<CellFormat>,
}

impl FormatClipboard {
    /// Empty clipboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `format`, replacing any previous content.
    pub fn copy(&mut self, format: CellFormat) {
        self.slot = Some(format);
    }

    /// Remove and return the stored format.
    pub fn take(&mut self) -> Option<CellFormat> {
        self.slot.take()
    }

    /// Stored format without consuming it.
    pub fn peek(&self) -> Option<&CellFormat> {
        self.slot.as_ref()
    }

    /// Whether a format is waiting to be applied.
    pub fn is_filled(&self) -> bool {
        self.slot.is_some()
    }

    /// Drop the stored format.
    pub fn clear(&mut self) {
        self.slot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Color;

    #[test]
    fn take_empties_the_slot() {
        let mut clipboard = FormatClipboard::new();
        assert!(clipboard.take().is_none());

        let format = CellFormat {
            bold: true,
            ..CellFormat::default()
        };
        clipboard.copy(format);
        assert!(clipboard.is_filled());
        assert_eq!(clipboard.take(), Some(format));
        assert!(clipboard.take().is_none());
    }

    #[test]
    fn last_copy_wins() {
        let mut clipboard = FormatClipboard::new();
        clipboard.copy(CellFormat::default());
        let blue = CellFormat {
            bg_color: Color::BLUE,
            ..CellFormat::default()
        };
        clipboard.copy(blue);
        assert_eq!(clipboard.peek(), Some(&blue));
    }
}
