//! Brother QL label encoding
//!
//! This crate turns a label's geometry and a rendered 1-bit bitmap into the
//! raster command stream a Brother QL series label printer consumes. It also
//! picks the matching DK stock or printer paper for a label size, applies
//! per-station calibration, and chooses font sizes that fit text boxes.
//!
//! Nothing here talks to a device. The byte stream is handed to whatever
//! transport delivers jobs to the printer.
//!
//! # Example
//!
//! ```rust,no_run
//! use ql_encode::{CalibrationRecord, Dimension, MonochromeBitmap, Station};
//!
//! let station = Station::new(300).calibration(CalibrationRecord::new(1.02, 1.0));
//! let label = station.prepare(Dimension::new(29.0, 90.0).unwrap(), None).unwrap();
//!
//! // render at label.width_dots x label.height_dots
//! let bitmap = MonochromeBitmap::blank(label.width_dots, label.height_dots);
//! let encoded = station.encode(&label, &bitmap).unwrap();
//! assert_eq!(encoded.media_id, "29x90");
//! ```

mod bitmap;
mod calibration;
mod capabilities;
mod encoder;
mod error;
mod matcher;
mod media;
mod pipeline;
mod text_fit;
mod units;

pub use crate::{
    bitmap::{bytes_per_line, MonochromeBitmap},
    calibration::{apply_calibration, CalibrationRecord},
    capabilities::{PaperSize, PrinterCapabilities},
    encoder::{
        encode, pack_bits, EncoderConfig, RasterJob, FINALIZE_LEN, LINE_OVERHEAD, PREAMBLE_LEN,
    },
    error::{Error, Warning},
    matcher::{find_paper_match, mm_to_tenths, PaperMatch, Rotation, Tolerances},
    media::{
        detect_media_type, validate_brother_profile, Media, MediaKind, MediaSpec,
        ProfileValidation,
    },
    pipeline::{EncodedLabel, PreparedLabel, Station},
    text_fit::{
        fit_text, FitResult, FontDescriptor, HeuristicMetrics, MeasureText, Measurement,
        OverflowMode, OverflowPolicy, TextBox,
    },
    units::{
        dots_to_mm, inches_to_mm, mm_to_dots, mm_to_inches, snap_mm, Dimension, DPI_203,
        DPI_300, DPI_600, MM_PER_INCH,
    },
};

/// Type alias for 1-bit bitmap rows.
///
/// Each inner `Vec<u8>` is one packed row, 8 pixels per byte, most
/// significant bit first. See [`MonochromeBitmap::from_rows`].
pub type Matrix = Vec<Vec<u8>>;
