//! Static catalog of Brother DK label stocks.
//!
//! Every stock the encoder knows is a [`Media`] variant. Its physical size, the
//! protocol media type byte and the names printer services use for it all come
//! from one table in [`Media::spec`], so matching and encoding never disagree.

use log::debug;
use std::fmt;

use crate::{error::Error, matcher::Tolerances};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Media {
    Continuous12,
    Continuous29,
    Continuous38,
    Continuous50,
    Continuous54,
    Continuous62,
    Continuous102,

    DieCut17x54,
    DieCut17x87,
    DieCut23x23,
    DieCut29x42,
    DieCut29x90,
    DieCut38x90,
    DieCut39x48,
    DieCut52x29,
    DieCut60x86,
    DieCut62x29,
    DieCut62x100,
    DieCut102x51,
    DieCut102x152,
    DieCut12Dia,
    DieCut24Dia,
    DieCut58Dia,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Continuous,
    DieCut,
    RoundDieCut,
}

/// Catalog entry for one physical stock.
#[derive(Debug, Clone, Copy)]
pub struct MediaSpec {
    pub id: &'static str,
    pub kind: MediaKind,
    pub width_mm: f64,
    /// `0.0` for continuous rolls.
    pub height_mm: f64,
    /// Brother part number, when the stock has one.
    pub dk_code: Option<&'static str>,
}

impl MediaSpec {
    /// Names a printer's capability list may use for this stock, best first.
    pub fn preferred_names(&self) -> Vec<String> {
        let (w, h) = (self.width_mm, self.height_mm);
        let sizes = match self.kind {
            MediaKind::Continuous => [format!("{}mm", w), format!("{}mm Continuous", w)],
            MediaKind::DieCut => [format!("{}mm x {}mm", w, h), format!("{} x {}mm", w, h)],
            MediaKind::RoundDieCut => [format!("{}mm Round", w), format!("{}mm Dia", w)],
        };
        self.dk_code
            .map(str::to_string)
            .into_iter()
            .chain(sizes.iter().cloned())
            .collect()
    }
}

/// Continuous rolls used when nothing in the catalog is close enough.
const NARROW_FALLBACK: Media = Media::Continuous29;
const WIDE_FALLBACK: Media = Media::Continuous62;

/// Deviation treated as an exact preset hit by [`validate_brother_profile`].
const EXACT_EPSILON_MM: f64 = 0.05;
const VALIDATION_BAND_MM: f64 = 1.0;

fn roll(id: &'static str, width_mm: f64, dk_code: Option<&'static str>) -> MediaSpec {
    MediaSpec {
        id,
        kind: MediaKind::Continuous,
        width_mm,
        height_mm: 0.0,
        dk_code,
    }
}

fn die_cut(
    id: &'static str,
    width_mm: f64,
    height_mm: f64,
    dk_code: Option<&'static str>,
) -> MediaSpec {
    MediaSpec {
        id,
        kind: MediaKind::DieCut,
        width_mm,
        height_mm,
        dk_code,
    }
}

fn round(id: &'static str, diameter_mm: f64, dk_code: Option<&'static str>) -> MediaSpec {
    MediaSpec {
        id,
        kind: MediaKind::RoundDieCut,
        width_mm: diameter_mm,
        height_mm: diameter_mm,
        dk_code,
    }
}

impl Media {
    pub const ALL: [Media; 23] = [
        Self::Continuous12,
        Self::Continuous29,
        Self::Continuous38,
        Self::Continuous50,
        Self::Continuous54,
        Self::Continuous62,
        Self::Continuous102,
        Self::DieCut17x54,
        Self::DieCut17x87,
        Self::DieCut23x23,
        Self::DieCut29x42,
        Self::DieCut29x90,
        Self::DieCut38x90,
        Self::DieCut39x48,
        Self::DieCut52x29,
        Self::DieCut60x86,
        Self::DieCut62x29,
        Self::DieCut62x100,
        Self::DieCut102x51,
        Self::DieCut102x152,
        Self::DieCut12Dia,
        Self::DieCut24Dia,
        Self::DieCut58Dia,
    ];

    pub fn spec(&self) -> MediaSpec {
        match self {
            Self::Continuous12 => roll("12", 12.0, Some("DK-22214")),
            Self::Continuous29 => roll("29", 29.0, Some("DK-22210")),
            Self::Continuous38 => roll("38", 38.0, Some("DK-22225")),
            Self::Continuous50 => roll("50", 50.0, Some("DK-22223")),
            Self::Continuous54 => roll("54", 54.0, Some("DK-N55224")),
            Self::Continuous62 => roll("62", 62.0, Some("DK-22205")),
            Self::Continuous102 => roll("102", 102.0, Some("DK-22243")),
            Self::DieCut17x54 => die_cut("17x54", 17.0, 54.0, Some("DK-11204")),
            Self::DieCut17x87 => die_cut("17x87", 17.0, 87.0, Some("DK-11203")),
            Self::DieCut23x23 => die_cut("23x23", 23.0, 23.0, Some("DK-11221")),
            Self::DieCut29x42 => die_cut("29x42", 29.0, 42.0, None),
            Self::DieCut29x90 => die_cut("29x90", 29.0, 90.0, Some("DK-11201")),
            Self::DieCut38x90 => die_cut("38x90", 38.0, 90.0, Some("DK-11208")),
            Self::DieCut39x48 => die_cut("39x48", 39.0, 48.0, None),
            Self::DieCut52x29 => die_cut("52x29", 52.0, 29.0, None),
            Self::DieCut60x86 => die_cut("60x86", 60.0, 86.0, Some("DK-11234")),
            Self::DieCut62x29 => die_cut("62x29", 62.0, 29.0, Some("DK-11209")),
            Self::DieCut62x100 => die_cut("62x100", 62.0, 100.0, Some("DK-11202")),
            Self::DieCut102x51 => die_cut("102x51", 102.0, 51.0, Some("DK-11240")),
            Self::DieCut102x152 => die_cut("102x152", 102.0, 152.0, Some("DK-11241")),
            Self::DieCut12Dia => round("12r", 12.0, Some("DK-11219")),
            Self::DieCut24Dia => round("24r", 24.0, Some("DK-11218")),
            Self::DieCut58Dia => round("58r", 58.0, Some("DK-11207")),
        }
    }

    pub fn id(&self) -> &'static str {
        self.spec().id
    }

    pub fn kind(&self) -> MediaKind {
        self.spec().kind
    }

    pub fn is_continuous(&self) -> bool {
        self.kind() == MediaKind::Continuous
    }

    /// Media type byte sent in the `ESC i z` print information command.
    pub fn code(&self) -> u8 {
        match self.kind() {
            MediaKind::Continuous => 0x0A,
            MediaKind::DieCut | MediaKind::RoundDieCut => 0x0B,
        }
    }

    /// Look up a catalog entry by id. Unknown ids are a caller error.
    pub fn from_id(id: &str) -> Result<Self, Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|media| media.id() == id)
            .ok_or_else(|| Error::UnknownMediaCode(id.to_string()))
    }

    fn die_cuts() -> impl Iterator<Item = Media> {
        Self::ALL.iter().copied().filter(|m| !m.is_continuous())
    }

    fn continuous_rolls() -> impl Iterator<Item = Media> {
        Self::ALL.iter().copied().filter(|m| m.is_continuous())
    }

    /// Closest die-cut stock within the given per-axis tolerances.
    pub(crate) fn nearest_die_cut(
        width_mm: f64,
        height_mm: f64,
        width_tolerance: f64,
        height_tolerance: f64,
    ) -> Option<Self> {
        if height_mm <= 0.0 {
            return None;
        }

        Self::die_cuts()
            .filter_map(|media| {
                let spec = media.spec();
                let dw = (spec.width_mm - width_mm).abs();
                let dh = (spec.height_mm - height_mm).abs();
                if dw <= width_tolerance && dh <= height_tolerance {
                    Some((media, dw + dh))
                } else {
                    None
                }
            })
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(media, _)| media)
    }

    /// Closest continuous roll whose width is within `tolerance`.
    pub(crate) fn nearest_continuous(width_mm: f64, tolerance: f64) -> Option<Self> {
        Self::continuous_rolls()
            .filter_map(|media| {
                let dw = (media.spec().width_mm - width_mm).abs();
                if dw <= tolerance {
                    Some((media, dw))
                } else {
                    None
                }
            })
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(media, _)| media)
    }
}

impl fmt::Display for Media {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let spec = self.spec();
        match spec.kind {
            MediaKind::Continuous => write!(f, "{}mm continuous", spec.width_mm),
            MediaKind::DieCut => write!(f, "{}x{}mm die-cut", spec.width_mm, spec.height_mm),
            MediaKind::RoundDieCut => write!(f, "{}mm round die-cut", spec.width_mm),
        }
    }
}

/// Classify a label size as a catalog stock.
///
/// Never fails: a die-cut hit wins, then a continuous width hit, and anything
/// else falls back to the narrow or the wide continuous roll depending on
/// `tolerances.wide_roll_cutoff_mm`.
pub fn detect_media_type(width_mm: f64, height_mm: f64, tolerances: &Tolerances) -> Media {
    let media = Media::nearest_die_cut(
        width_mm,
        height_mm,
        tolerances.die_cut_width_mm,
        tolerances.die_cut_height_mm,
    )
    .or_else(|| Media::nearest_continuous(width_mm, tolerances.continuous_width_mm))
    .unwrap_or(if width_mm >= tolerances.wide_roll_cutoff_mm {
        WIDE_FALLBACK
    } else {
        NARROW_FALLBACK
    });

    debug!("detected media {} for {} x {} mm", media.id(), width_mm, height_mm);
    media
}

/// Outcome of [`validate_brother_profile`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileValidation {
    pub is_valid: bool,
    pub matched_preset: Option<Media>,
    pub warning: Option<String>,
    pub is_continuous: bool,
}

/// Check a requested size against the catalog without blocking anything.
///
/// Inexact hits stay valid but carry a warning for the operator.
pub fn validate_brother_profile(width_mm: f64, height_mm: f64) -> ProfileValidation {
    let continuous_request = height_mm <= 0.0;

    if continuous_request {
        if let Some(media) = Media::nearest_continuous(width_mm, EXACT_EPSILON_MM) {
            return ProfileValidation {
                is_valid: true,
                matched_preset: Some(media),
                warning: None,
                is_continuous: true,
            };
        }
    } else if let Some(media) =
        Media::nearest_die_cut(width_mm, height_mm, EXACT_EPSILON_MM, EXACT_EPSILON_MM)
    {
        return ProfileValidation {
            is_valid: true,
            matched_preset: Some(media),
            warning: None,
            is_continuous: false,
        };
    }

    // close die-cut is tried before the roll band, in the same order as
    // detect_media_type, so both agree on the preset for a near-preset label
    if let Some(media) =
        Media::nearest_die_cut(width_mm, height_mm, VALIDATION_BAND_MM, VALIDATION_BAND_MM)
    {
        return ProfileValidation {
            is_valid: true,
            matched_preset: Some(media),
            warning: Some(format!(
                "{} x {} mm is close to the {} preset, the printer will use the preset size",
                width_mm, height_mm, media
            )),
            is_continuous: false,
        };
    }

    if let Some(media) = Media::nearest_continuous(width_mm, VALIDATION_BAND_MM) {
        let warning = if continuous_request {
            format!(
                "{} mm is close to the {} roll, the printer will use the roll width",
                width_mm, media
            )
        } else {
            format!(
                "{} x {} mm is not a die-cut preset, it will be cut from the {} roll",
                width_mm, height_mm, media
            )
        };
        return ProfileValidation {
            is_valid: true,
            matched_preset: Some(media),
            warning: Some(warning),
            is_continuous: true,
        };
    }

    ProfileValidation {
        is_valid: false,
        matched_preset: None,
        warning: Some(format!(
            "{} x {} mm does not match any Brother preset, the printer may reject it",
            width_mm, height_mm
        )),
        is_continuous: continuous_request,
    }
}
