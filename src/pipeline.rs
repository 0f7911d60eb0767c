//! Station level entry points.
//!
//! A [`Station`] bundles everything one physical print station needs: its
//! resolution, calibration, matching tolerances and encoder options. Nothing is
//! read from the environment; callers build the station and pass it around.
//!
//! Labels go through two steps. [`Station::prepare`] calibrates and snaps the
//! nominal size and resolves the media, giving the renderer the exact dot size
//! to draw at. [`Station::encode`] then packages the rendered bitmap.

use log::{debug, warn};

use crate::{
    bitmap::MonochromeBitmap,
    calibration::{apply_calibration, CalibrationRecord},
    capabilities::PrinterCapabilities,
    encoder::{self, EncoderConfig, RasterJob},
    error::{Error, Warning},
    matcher::{find_paper_match, PaperMatch, Rotation, Tolerances},
    media::{detect_media_type, validate_brother_profile, Media, ProfileValidation},
    units::{Dimension, DPI_300},
};

#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    dpi: u32,
    calibration: CalibrationRecord,
    tolerances: Tolerances,
    encoder: EncoderConfig,
}

impl Default for Station {
    fn default() -> Self {
        Station::new(DPI_300)
    }
}

impl Station {
    pub fn new(dpi: u32) -> Self {
        Station {
            dpi,
            calibration: CalibrationRecord::default(),
            tolerances: Tolerances::default(),
            encoder: EncoderConfig::default(),
        }
    }

    pub fn calibration(self, calibration: CalibrationRecord) -> Self {
        Station {
            calibration,
            ..self
        }
    }

    pub fn tolerances(self, tolerances: Tolerances) -> Self {
        Station { tolerances, ..self }
    }

    pub fn encoder(self, encoder: EncoderConfig) -> Self {
        Station { encoder, ..self }
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    /// Resolve geometry and media for a label of `nominal` size.
    ///
    /// Size and shape problems are fatal. Anything about the fit between the
    /// label and the available media only produces warnings.
    pub fn prepare(
        &self,
        nominal: Dimension,
        capabilities: Option<&PrinterCapabilities>,
    ) -> Result<PreparedLabel, Error> {
        if self.dpi == 0 {
            return Err(Error::InvalidConfig("dpi must be positive".to_string()));
        }
        nominal.validate()?;

        let mut warnings = self.calibration.validate()?;

        let adjusted = apply_calibration(nominal, &self.calibration);
        adjusted.validate()?;
        let size = adjusted.snapped(self.dpi);
        let (width_dots, height_dots) = size.to_dots(self.dpi);
        if width_dots == 0 {
            return Err(Error::InvalidDimension {
                width_mm: size.width_mm,
                height_mm: size.height_mm,
            });
        }

        let paper_match = match capabilities {
            Some(caps) => {
                if !caps.supports_dpi(self.dpi) {
                    warnings.push(Warning::UnsupportedDpi(self.dpi));
                }
                let found = find_paper_match(
                    &caps.papers,
                    size.width_mm,
                    size.height_mm,
                    self.tolerances.paper_tenths_mm,
                );
                if found.is_none() {
                    warnings.push(Warning::MediaMatchFailed {
                        width_mm: size.width_mm,
                        height_mm: size.height_mm,
                    });
                }
                found
            }
            None => None,
        };

        // a quarter-turned label feeds the stock in the paper's orientation
        let fed = match paper_match.as_ref().map(|m| m.rotation) {
            Some(Rotation::Deg90) => size.rotated(),
            _ => size,
        };
        let media = detect_media_type(fed.width_mm, fed.height_mm, &self.tolerances);
        let validation = validate_brother_profile(fed.width_mm, fed.height_mm);
        if let Some(message) = validation.warning.clone() {
            if validation.is_valid {
                warnings.push(Warning::InexactPreset(message));
            } else {
                warnings.push(Warning::CustomSize(message));
            }
        }

        debug!(
            "prepared {} x {} mm as {} x {} dots on {}",
            size.width_mm,
            size.height_mm,
            width_dots,
            height_dots,
            media.id()
        );

        Ok(PreparedLabel {
            nominal,
            size,
            width_dots,
            height_dots,
            offset_x_mm: self.calibration.offset_x_mm,
            offset_y_mm: self.calibration.offset_y_mm,
            media,
            paper_match,
            validation,
            warnings,
        })
    }

    /// Encode a rendered bitmap for a prepared label.
    ///
    /// A bitmap whose size disagrees with the prepared dot size is still
    /// encoded, with a warning. Labels matched to a rotated paper are turned
    /// a quarter turn clockwise first.
    pub fn encode(
        &self,
        label: &PreparedLabel,
        bitmap: &MonochromeBitmap,
    ) -> Result<EncodedLabel, Error> {
        let mut warnings = label.warnings.clone();

        let expected_height = if label.size.is_continuous() {
            bitmap.height_dots
        } else {
            label.height_dots
        };
        if bitmap.width_dots != label.width_dots || bitmap.height_dots != expected_height {
            warn!(
                "bitmap {}x{} does not match prepared {}x{}",
                bitmap.width_dots, bitmap.height_dots, label.width_dots, expected_height
            );
            warnings.push(Warning::BitmapSizeMismatch {
                expected_width: label.width_dots,
                expected_height,
                actual_width: bitmap.width_dots,
                actual_height: bitmap.height_dots,
            });
        }

        let rotated;
        let bitmap = match label.rotation() {
            Rotation::Deg90 => {
                rotated = bitmap.rotate_90();
                &rotated
            }
            Rotation::Deg0 => bitmap,
        };

        let job = RasterJob::new(bitmap, label.media.id(), self.dpi)?;
        let bytes = encoder::encode(&job, &self.encoder)?;

        Ok(EncodedLabel {
            bytes,
            media_id: label.media.id(),
            paper_name: label.paper_match.as_ref().map(|m| m.paper_name.clone()),
            warnings,
        })
    }
}

/// Geometry and media resolved for one label.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedLabel {
    pub nominal: Dimension,
    /// Calibrated size snapped to the dot grid.
    pub size: Dimension,
    pub width_dots: u32,
    /// `0` for continuous labels, whose length comes from the bitmap.
    pub height_dots: u32,
    /// Content offsets for the renderer, straight from the calibration record.
    pub offset_x_mm: f64,
    pub offset_y_mm: f64,
    pub media: Media,
    pub paper_match: Option<PaperMatch>,
    pub validation: ProfileValidation,
    pub warnings: Vec<Warning>,
}

impl PreparedLabel {
    pub fn rotation(&self) -> Rotation {
        self.paper_match
            .as_ref()
            .map_or(Rotation::Deg0, |m| m.rotation)
    }
}

/// Output handed to the print transport.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedLabel {
    pub bytes: Vec<u8>,
    pub media_id: &'static str,
    pub paper_name: Option<String>,
    pub warnings: Vec<Warning>,
}
