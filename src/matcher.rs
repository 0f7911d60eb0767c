//! Matching a label size against the papers a printer advertises.

use log::debug;

use crate::{
    capabilities::PaperSize,
    media::Media,
};

/// Every tolerance used while classifying and matching label sizes.
///
/// Field installations drift, so the defaults are deliberately loose.
/// [`Tolerances::tight`] is available for stations with well calibrated heads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub die_cut_width_mm: f64,
    pub die_cut_height_mm: f64,
    pub continuous_width_mm: f64,
    /// Unmatched sizes at least this wide fall back to the wide roll.
    pub wide_roll_cutoff_mm: f64,
    /// Allowed deviation from an advertised paper, in tenths of a millimeter.
    pub paper_tenths_mm: u32,
}

impl Default for Tolerances {
    fn default() -> Self {
        Tolerances {
            die_cut_width_mm: 2.0,
            die_cut_height_mm: 5.0,
            continuous_width_mm: 2.0,
            wide_roll_cutoff_mm: 50.0,
            paper_tenths_mm: 10,
        }
    }
}

impl Tolerances {
    pub fn tight() -> Self {
        Tolerances {
            die_cut_width_mm: 1.0,
            die_cut_height_mm: 1.0,
            continuous_width_mm: 1.0,
            wide_roll_cutoff_mm: 45.0,
            paper_tenths_mm: 5,
        }
    }

    pub fn paper_tenths_mm(self, paper_tenths_mm: u32) -> Self {
        Tolerances {
            paper_tenths_mm,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Deg0,
    Deg90,
}

impl Rotation {
    pub fn degrees(&self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
        }
    }
}

/// An advertised paper chosen for a label, and how the label sits on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperMatch {
    pub paper_name: String,
    pub rotation: Rotation,
}

pub fn mm_to_tenths(mm: f64) -> u32 {
    (mm * 10.0).round() as u32
}

fn within(paper: Option<u32>, target: u32, tolerance: u32) -> bool {
    match paper {
        None => true,
        Some(p) => p.max(target) - p.min(target) <= tolerance,
    }
}

/// Continuous targets (height `0`) only fit papers without a length.
fn fits(paper: &PaperSize, width: u32, height: u32, tolerance: u32) -> bool {
    if height == 0 {
        return paper.height_tenths_mm.is_none()
            && within(paper.width_tenths_mm, width, tolerance);
    }

    within(paper.width_tenths_mm, width, tolerance)
        && within(paper.height_tenths_mm, height, tolerance)
}

fn orientation(paper: &PaperSize, width: u32, height: u32, tolerance: u32) -> Option<Rotation> {
    if fits(paper, width, height, tolerance) {
        Some(Rotation::Deg0)
    } else if height != 0 && fits(paper, height, width, tolerance) {
        Some(Rotation::Deg90)
    } else {
        None
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn find_named<'a>(
    papers: &'a [(String, PaperSize)],
    name: &str,
) -> Option<&'a (String, PaperSize)> {
    papers
        .iter()
        .find(|(paper_name, _)| paper_name == name)
        .or_else(|| {
            let wanted = normalize(name);
            papers
                .iter()
                .find(|(paper_name, _)| normalize(paper_name) == wanted)
        })
}

/// Choose the advertised paper for a label of `width_mm` by `height_mm`.
///
/// When the size is a catalog stock the printer's own name for that stock
/// wins. Otherwise papers are scanned in reported order, each tried upright
/// and then turned by 90 degrees. `None` means nothing is within `tolerance`
/// tenths of a millimeter.
pub fn find_paper_match(
    papers: &[(String, PaperSize)],
    width_mm: f64,
    height_mm: f64,
    tolerance: u32,
) -> Option<PaperMatch> {
    let width = mm_to_tenths(width_mm);
    let height = mm_to_tenths(height_mm);
    let tolerance_mm = tolerance as f64 / 10.0;

    let preset = if height == 0 {
        Media::nearest_continuous(width_mm, tolerance_mm)
    } else {
        Media::nearest_die_cut(width_mm, height_mm, tolerance_mm, tolerance_mm)
    };

    if let Some(media) = preset {
        for name in media.spec().preferred_names() {
            let (paper_name, size) = match find_named(papers, &name) {
                Some(found) => found,
                None => continue,
            };
            match orientation(size, width, height, tolerance) {
                Some(rotation) => {
                    debug!("paper {:?} matched by preset {}", paper_name, media.id());
                    return Some(PaperMatch {
                        paper_name: paper_name.clone(),
                        rotation,
                    });
                }
                None => debug!(
                    "paper {:?} is named for {} but sized differently",
                    paper_name,
                    media.id()
                ),
            }
        }
    }

    for (paper_name, size) in papers {
        if let Some(rotation) = orientation(size, width, height, tolerance) {
            debug!(
                "paper {:?} matched at {} degrees",
                paper_name,
                rotation.degrees()
            );
            return Some(PaperMatch {
                paper_name: paper_name.clone(),
                rotation,
            });
        }
    }

    debug!("no paper within {} tenths of {} x {} mm", tolerance, width_mm, height_mm);
    None
}
