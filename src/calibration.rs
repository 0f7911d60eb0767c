//! Per-station correction of nominal label sizes.
//!
//! Each print station carries a linear correction measured against real
//! output. Scales apply to the label size; offsets only move content and are
//! handed to the renderer untouched.

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Warning},
    units::Dimension,
};

/// Scales outside this band usually mean a typo rather than real drift.
const SANE_SCALE: (f64, f64) = (0.9, 1.1);
const SANE_OFFSET_MM: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationRecord {
    pub scale_x: f64,
    pub scale_y: f64,
    pub offset_x_mm: f64,
    pub offset_y_mm: f64,
}

impl Default for CalibrationRecord {
    fn default() -> Self {
        CalibrationRecord {
            scale_x: 1.0,
            scale_y: 1.0,
            offset_x_mm: 0.0,
            offset_y_mm: 0.0,
        }
    }
}

impl CalibrationRecord {
    pub fn new(scale_x: f64, scale_y: f64) -> Self {
        CalibrationRecord {
            scale_x,
            scale_y,
            ..Default::default()
        }
    }

    pub fn offsets(self, offset_x_mm: f64, offset_y_mm: f64) -> Self {
        CalibrationRecord {
            offset_x_mm,
            offset_y_mm,
            ..self
        }
    }

    /// Reject records that cannot describe a printer, and flag suspicious ones.
    pub fn validate(&self) -> Result<Vec<Warning>, Error> {
        let offsets = [
            ("offset_x_mm", self.offset_x_mm),
            ("offset_y_mm", self.offset_y_mm),
        ];
        for (axis, scale) in [("scale_x", self.scale_x), ("scale_y", self.scale_y)].iter() {
            if !scale.is_finite() || *scale <= 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{} must be a positive number, got {}",
                    axis, scale
                )));
            }
        }
        for (axis, offset) in offsets.iter() {
            if !offset.is_finite() {
                return Err(Error::InvalidConfig(format!("{} must be finite", axis)));
            }
        }

        let mut warnings = Vec::new();
        for (axis, scale) in [("scale_x", self.scale_x), ("scale_y", self.scale_y)].iter() {
            if *scale < SANE_SCALE.0 || *scale > SANE_SCALE.1 {
                warnings.push(Warning::CalibrationOutOfRange(format!(
                    "{} of {} is outside {}..{}",
                    axis, scale, SANE_SCALE.0, SANE_SCALE.1
                )));
            }
        }
        for (axis, offset) in offsets.iter() {
            if offset.abs() > SANE_OFFSET_MM {
                warnings.push(Warning::CalibrationOutOfRange(format!(
                    "{} of {} mm moves content more than {} mm",
                    axis, offset, SANE_OFFSET_MM
                )));
            }
        }
        Ok(warnings)
    }
}

/// Scale a nominal size by the station correction.
///
/// Apply once, before snapping to dots and before any media matching.
/// A continuous height of `0` stays `0`.
pub fn apply_calibration(nominal: Dimension, record: &CalibrationRecord) -> Dimension {
    Dimension {
        width_mm: nominal.width_mm * record.scale_x,
        height_mm: nominal.height_mm * record.scale_y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scales_size_only() {
        let record = CalibrationRecord::new(1.02, 1.0).offsets(1.5, -0.5);
        let adjusted = apply_calibration(Dimension::new(29.0, 90.0).unwrap(), &record);
        assert!((adjusted.width_mm - 29.58).abs() < 1e-9);
        assert!((adjusted.height_mm - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_identity_and_continuous() {
        let nominal = Dimension::continuous(62.0).unwrap();
        let adjusted = apply_calibration(nominal, &CalibrationRecord::default());
        assert_eq!(adjusted, nominal);

        let adjusted = apply_calibration(nominal, &CalibrationRecord::new(0.98, 1.03));
        assert!(adjusted.is_continuous());
    }

    #[test]
    fn test_validation() {
        assert!(CalibrationRecord::default().validate().unwrap().is_empty());
        assert!(CalibrationRecord::new(1.02, 0.99).validate().unwrap().is_empty());
        assert_eq!(CalibrationRecord::new(1.25, 1.0).validate().unwrap().len(), 1);
        assert_eq!(
            CalibrationRecord::default()
                .offsets(7.0, -6.0)
                .validate()
                .unwrap()
                .len(),
            2
        );
        assert!(CalibrationRecord::new(0.0, 1.0).validate().is_err());
        assert!(CalibrationRecord::new(1.0, f64::NAN).validate().is_err());
        assert!(CalibrationRecord::default().offsets(f64::INFINITY, 0.0).validate().is_err());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let record: CalibrationRecord = serde_json::from_str(r#"{"scale_x": 1.02}"#).unwrap();
        assert_eq!(record, CalibrationRecord::new(1.02, 1.0));
    }
}
