//! # Decoded Raster Image
//!
//! Rows are stored exactly as received: each byte is 8 horizontal pixels,
//! most significant bit leftmost, set bit = black.
//!
//! ```text
//! Byte value 0xF0 = 11110000 = ████░░░░
//! Byte value 0x0F = 00001111 = ░░░░████
//! ```

/// One raster row as sent by the instrument.
pub type Row = Vec<u8>;

/// Ordered rows decoded from one capture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Image {
    rows: Vec<Row>,
}

impl Image {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Rows in arrival order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Width in bytes of the widest row.
    pub fn width_bytes(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Width in pixels of the widest row.
    pub fn width_pixels(&self) -> usize {
        self.width_bytes() * 8
    }

    /// True when every row has the same length.
    ///
    /// A raster-data command with a new byte count in the middle of a block
    /// can produce rows of different lengths.
    pub fn is_uniform(&self) -> bool {
        match self.rows.first() {
            Some(first) => self.rows.iter().all(|r| r.len() == first.len()),
            None => true,
        }
    }

    /// Pixel at (`x`, `y`). Out of range reads as white.
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.rows
            .get(y)
            .and_then(|row| row.get(x / 8))
            .is_some_and(|byte| (byte >> (7 - (x % 8))) & 1 == 1)
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

impl From<Vec<Row>> for Image {
    fn from(rows: Vec<Row>) -> Self {
        Self { rows }
    }
}
