//! Error and warning types for label encoding.
//!
//! Fatal problems are reported through [`Error`] and stop the operation before
//! any output is produced. Geometry and fitting problems that still allow a
//! best-effort label are reported as [`Warning`] values next to the result.

use thiserror::Error;

/// Main error type for encoding operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The media id has no entry in the protocol code table.
    ///
    /// Raised by the raster encoder before a single byte is emitted.
    #[error("Unknown media id: {0:?}")]
    UnknownMediaCode(String),

    /// Width or height is non-positive or not a finite number.
    #[error("Invalid label dimension: {width_mm} x {height_mm} mm")]
    InvalidDimension { width_mm: f64, height_mm: f64 },

    #[error("Bitmap has no pixels")]
    EmptyBitmap,

    /// A scanline does not fit the one-byte length field of the transfer command.
    #[error("Raster line of {bytes_per_line} bytes exceeds the protocol limit of 255")]
    LineTooWide { bytes_per_line: usize },

    /// Invalid configuration parameter provided.
    ///
    /// Calibration scales that are zero, negative or not finite end up here.
    #[error("Invalid configuration parameter: {0}")]
    InvalidConfig(String),

    /// The capability payload is not a JSON object at all.
    #[error(transparent)]
    MalformedCapabilities(#[from] serde_json::Error),
}

/// Advisory conditions that degrade the label but never block it.
///
/// `Display` yields the human readable message shown to operators.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Warning {
    /// No catalog preset and no printer paper within tolerance.
    #[error("No printer paper matches {width_mm} x {height_mm} mm, printing with a custom size")]
    MediaMatchFailed { width_mm: f64, height_mm: f64 },

    #[error("Minimum font size reached ({size_pt}pt), content may be clipped")]
    MinimumFontSize { size_pt: f64 },

    #[error("Text box has no area, using the minimum font size")]
    DegenerateTextBox,

    #[error("{0}")]
    InexactPreset(String),

    #[error("{0}")]
    CustomSize(String),

    #[error("Calibration looks suspicious: {0}")]
    CalibrationOutOfRange(String),

    /// The rendered bitmap disagrees with the dot size the label was prepared for.
    #[error(
        "Bitmap is {actual_width}x{actual_height} dots, expected {expected_width}x{expected_height}"
    )]
    BitmapSizeMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("Printer does not advertise {0} dpi")]
    UnsupportedDpi(u32),
}
