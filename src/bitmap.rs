//! 1-bit raster produced by the label renderer.

use crate::error::Error;

/// Row-major monochrome bitmap, 8 pixels per byte, most significant bit first.
///
/// A set bit is a black dot. Rows are `ceil(width_dots / 8)` bytes long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonochromeBitmap {
    pub width_dots: u32,
    pub height_dots: u32,
    pub packed_bits: Vec<u8>,
}

pub fn bytes_per_line(width_dots: u32) -> usize {
    (width_dots as usize + 7) / 8
}

impl MonochromeBitmap {
    /// Wrap already packed data. Short data is accepted and read as white.
    pub fn new(width_dots: u32, height_dots: u32, packed_bits: Vec<u8>) -> Self {
        MonochromeBitmap {
            width_dots,
            height_dots,
            packed_bits,
        }
    }

    pub fn blank(width_dots: u32, height_dots: u32) -> Self {
        let len = bytes_per_line(width_dots) * height_dots as usize;
        Self::new(width_dots, height_dots, vec![0x00; len])
    }

    /// Build from one packed `Vec<u8>` per row.
    pub fn from_rows(width_dots: u32, rows: &[Vec<u8>]) -> Result<Self, Error> {
        let bpl = bytes_per_line(width_dots);
        let mut packed_bits = Vec::with_capacity(bpl * rows.len());

        for row in rows {
            if row.len() > bpl {
                return Err(Error::InvalidConfig(format!(
                    "row of {} bytes is wider than {} dots",
                    row.len(),
                    width_dots
                )));
            }
            packed_bits.extend_from_slice(row);
            packed_bits.resize(packed_bits.len() + bpl - row.len(), 0x00);
        }

        Ok(Self::new(width_dots, rows.len() as u32, packed_bits))
    }

    /// Threshold 8-bit grayscale pixels. Pixels at or below `threshold` turn black.
    pub fn from_luma(width: u32, height: u32, pixels: &[u8], threshold: u8) -> Result<Self, Error> {
        if pixels.len() != (width as usize) * (height as usize) {
            return Err(Error::InvalidConfig(
                "luma data size doesn't match width * height".to_string(),
            ));
        }

        let mut bitmap = Self::blank(width, height);
        for y in 0..height {
            for x in 0..width {
                if pixels[(y * width + x) as usize] <= threshold {
                    bitmap.set(x, y, true);
                }
            }
        }
        Ok(bitmap)
    }

    pub fn is_empty(&self) -> bool {
        self.width_dots == 0 || self.height_dots == 0
    }

    pub fn bytes_per_line(&self) -> usize {
        bytes_per_line(self.width_dots)
    }

    /// Row `y` as exactly `bytes_per_line` bytes, zero filled past the end of the data.
    pub fn row(&self, y: u32) -> Vec<u8> {
        let bpl = self.bytes_per_line();
        let start = (y as usize * bpl).min(self.packed_bits.len());
        let end = (start + bpl).min(self.packed_bits.len());

        let mut row = self.packed_bits[start..end].to_vec();
        row.resize(bpl, 0x00);
        row
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width_dots || y >= self.height_dots {
            return false;
        }
        let index = y as usize * self.bytes_per_line() + x as usize / 8;
        match self.packed_bits.get(index) {
            Some(byte) => byte & (0x80 >> (x % 8)) != 0,
            None => false,
        }
    }

    pub fn set(&mut self, x: u32, y: u32, black: bool) {
        if x >= self.width_dots || y >= self.height_dots {
            return;
        }
        let index = y as usize * self.bytes_per_line() + x as usize / 8;
        if index >= self.packed_bits.len() {
            self.packed_bits.resize(self.bytes_per_line() * self.height_dots as usize, 0x00);
        }
        let mask = 0x80 >> (x % 8);
        if black {
            self.packed_bits[index] |= mask;
        } else {
            self.packed_bits[index] &= !mask;
        }
    }

    /// Turn the bitmap a quarter turn clockwise.
    pub fn rotate_90(&self) -> Self {
        let mut rotated = Self::blank(self.height_dots, self.width_dots);
        for y in 0..self.height_dots {
            for x in 0..self.width_dots {
                if self.get(x, y) {
                    rotated.set(self.height_dots - 1 - y, x, true);
                }
            }
        }
        rotated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_per_line() {
        assert_eq!(bytes_per_line(0), 0);
        assert_eq!(bytes_per_line(1), 1);
        assert_eq!(bytes_per_line(8), 1);
        assert_eq!(bytes_per_line(9), 2);
        assert_eq!(bytes_per_line(232), 29);
        assert_eq!(bytes_per_line(720), 90);
    }

    #[test]
    fn test_msb_first_packing() {
        let mut bitmap = MonochromeBitmap::blank(10, 2);
        bitmap.set(0, 0, true);
        bitmap.set(9, 1, true);
        assert_eq!(bitmap.row(0), vec![0x80, 0x00]);
        assert_eq!(bitmap.row(1), vec![0x00, 0x40]);
        assert!(bitmap.get(0, 0));
        assert!(!bitmap.get(1, 0));
    }

    #[test]
    fn test_short_data_reads_as_white() {
        let bitmap = MonochromeBitmap::new(16, 3, vec![0xFF, 0xFF, 0xAA]);
        assert_eq!(bitmap.row(0), vec![0xFF, 0xFF]);
        assert_eq!(bitmap.row(1), vec![0xAA, 0x00]);
        assert_eq!(bitmap.row(2), vec![0x00, 0x00]);
        assert!(!bitmap.get(0, 2));
    }

    #[test]
    fn test_from_luma() {
        let pixels = [0, 255, 255, 80, 200, 10, 255, 255, 255];
        let bitmap = MonochromeBitmap::from_luma(9, 1, &pixels, 80).unwrap();
        assert_eq!(bitmap.row(0), vec![0b1001_0100, 0x00]);
        assert!(MonochromeBitmap::from_luma(9, 2, &pixels, 80).is_err());
    }

    #[test]
    fn test_from_rows_pads() {
        let bitmap = MonochromeBitmap::from_rows(16, &[vec![0x01], vec![0x02, 0x03]]).unwrap();
        assert_eq!(bitmap.height_dots, 2);
        assert_eq!(bitmap.packed_bits, vec![0x01, 0x00, 0x02, 0x03]);
        assert!(MonochromeBitmap::from_rows(8, &[vec![0x01, 0x02]]).is_err());
    }

    #[test]
    fn test_rotate_clockwise() {
        // 3 x 2, black at top-left and bottom-right
        let mut bitmap = MonochromeBitmap::blank(3, 2);
        bitmap.set(0, 0, true);
        bitmap.set(2, 1, true);

        let rotated = bitmap.rotate_90();
        assert_eq!((rotated.width_dots, rotated.height_dots), (2, 3));
        // top-left moves to top-right, bottom-right to bottom-left
        assert!(rotated.get(1, 0));
        assert!(rotated.get(0, 2));
        assert!(!rotated.get(0, 0));
        assert_eq!(rotated.rotate_90().rotate_90().rotate_90(), bitmap);
    }
}
