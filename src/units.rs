//! Millimeter, inch and dot conversions.
//!
//! Label geometry is carried in millimeters everywhere and turned into dots only
//! at the encoder boundary. [`snap_mm`] forces a dimension onto the dot grid so
//! that the bitmap and the declared media size never disagree by a fraction of a
//! dot.

use crate::error::Error;

pub const MM_PER_INCH: f64 = 25.4;

/// Resolutions the QL series is driven at.
pub const DPI_203: u32 = 203;
pub const DPI_300: u32 = 300;
pub const DPI_600: u32 = 600;

pub fn mm_to_dots(mm: f64, dpi: u32) -> u32 {
    (mm * dpi as f64 / MM_PER_INCH).round() as u32
}

pub fn dots_to_mm(dots: u32, dpi: u32) -> f64 {
    dots as f64 * MM_PER_INCH / dpi as f64
}

pub fn mm_to_inches(mm: f64) -> f64 {
    mm / MM_PER_INCH
}

pub fn inches_to_mm(inches: f64) -> f64 {
    inches * MM_PER_INCH
}

/// Round a length to the nearest whole dot at `dpi`.
pub fn snap_mm(mm: f64, dpi: u32) -> f64 {
    dots_to_mm(mm_to_dots(mm, dpi), dpi)
}

/// Width and height of a label in millimeters.
///
/// A height of `0` marks a continuous roll with no fixed length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimension {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl Dimension {
    pub fn new(width_mm: f64, height_mm: f64) -> Result<Self, Error> {
        let dimension = Dimension {
            width_mm,
            height_mm,
        };
        dimension.validate()?;
        Ok(dimension)
    }

    pub fn continuous(width_mm: f64) -> Result<Self, Error> {
        Self::new(width_mm, 0.0)
    }

    /// Width must be strictly positive, height positive or exactly zero.
    pub fn validate(&self) -> Result<(), Error> {
        let valid = self.width_mm.is_finite()
            && self.height_mm.is_finite()
            && self.width_mm > 0.0
            && self.height_mm >= 0.0;

        if valid {
            Ok(())
        } else {
            Err(Error::InvalidDimension {
                width_mm: self.width_mm,
                height_mm: self.height_mm,
            })
        }
    }

    pub fn is_continuous(&self) -> bool {
        self.height_mm == 0.0
    }

    pub fn snapped(&self, dpi: u32) -> Self {
        Dimension {
            width_mm: snap_mm(self.width_mm, dpi),
            height_mm: snap_mm(self.height_mm, dpi),
        }
    }

    /// Size in dots. Continuous labels report a height of `0`.
    pub fn to_dots(&self, dpi: u32) -> (u32, u32) {
        (
            mm_to_dots(self.width_mm, dpi),
            mm_to_dots(self.height_mm, dpi),
        )
    }

    pub fn rotated(&self) -> Self {
        Dimension {
            width_mm: self.height_mm,
            height_mm: self.width_mm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dots_round_trip() {
        for dpi in [DPI_203, DPI_300, DPI_600].iter() {
            for dots in 0..5000 {
                assert_eq!(mm_to_dots(dots_to_mm(dots, *dpi), *dpi), dots);
            }
        }
    }

    #[test]
    fn test_snap_is_idempotent() {
        for dpi in [DPI_203, DPI_300, DPI_600].iter() {
            let mut mm = 0.0;
            while mm < 120.0 {
                let once = snap_mm(mm, *dpi);
                assert_eq!(snap_mm(once, *dpi), once);
                mm += 0.37;
            }
        }
    }

    #[test]
    fn test_known_label_sizes() {
        // 29 x 90 mm at 203 dpi
        assert_eq!(mm_to_dots(29.0, DPI_203), 232);
        assert_eq!(mm_to_dots(90.0, DPI_203), 719);
        // 62 mm at 300 dpi
        assert_eq!(mm_to_dots(62.0, DPI_300), 732);
        assert!((inches_to_mm(mm_to_inches(62.0)) - 62.0).abs() < 1e-9);
    }

    #[test]
    fn test_snapped_lands_on_dot_grid() {
        let snapped = Dimension::new(29.0, 90.0).unwrap().snapped(DPI_203);
        assert!((snapped.width_mm - 232.0 * 25.4 / 203.0).abs() < 1e-9);
        assert_eq!(snapped.to_dots(DPI_203), (232, 719));
    }

    #[test]
    fn test_dimension_validation() {
        assert!(Dimension::new(0.0, 10.0).is_err());
        assert!(Dimension::new(-3.0, 10.0).is_err());
        assert!(Dimension::new(29.0, -1.0).is_err());
        assert!(Dimension::new(f64::NAN, 10.0).is_err());
        assert!(Dimension::continuous(62.0).unwrap().is_continuous());
        assert!(!Dimension::new(62.0, 100.0).unwrap().is_continuous());
    }
}
