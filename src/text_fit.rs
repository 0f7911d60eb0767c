//! Choosing the largest font size that keeps a text block inside its box.
//!
//! Text is never measured here. A [`MeasureText`] implementation supplied by
//! the caller reports rendered extents, so the fitter can run against a
//! shaping library, a canvas, or the [`HeuristicMetrics`] estimate below.

use log::debug;

use crate::error::Warning;

const MAX_ITERATIONS: usize = 8;
const PRECISION_PT: f64 = 0.1;
const ELLIPSIS: char = '…';

#[derive(Debug, Clone, PartialEq)]
pub struct FontDescriptor {
    pub family: String,
    pub weight: u16,
    pub size_pt: f64,
}

impl FontDescriptor {
    pub fn new(family: &str, weight: u16, size_pt: f64) -> Self {
        FontDescriptor {
            family: family.to_string(),
            weight,
            size_pt,
        }
    }

    pub fn with_size(&self, size_pt: f64) -> Self {
        FontDescriptor {
            size_pt,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextBox {
    pub width_px: f64,
    pub height_px: f64,
}

impl TextBox {
    pub fn new(width_px: f64, height_px: f64) -> Self {
        TextBox {
            width_px,
            height_px,
        }
    }

    fn is_degenerate(&self) -> bool {
        !(self.width_px > 0.0 && self.height_px > 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowMode {
    /// Single line, shrink until it fits.
    ShrinkToFit,
    /// Wrap at the box width, shrink until all lines fit.
    WrapLines,
    /// Single line, shrink, and cut the text with an ellipsis if the floor is still too big.
    Ellipsis,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverflowPolicy {
    pub mode: OverflowMode,
    pub min_font_size_pt: f64,
    pub max_lines: Option<u32>,
}

impl OverflowPolicy {
    pub fn new(mode: OverflowMode, min_font_size_pt: f64) -> Self {
        OverflowPolicy {
            mode,
            min_font_size_pt,
            max_lines: None,
        }
    }

    pub fn max_lines(self, max_lines: u32) -> Self {
        OverflowPolicy {
            max_lines: Some(max_lines),
            ..self
        }
    }
}

/// Rendered extent of a text block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub width_px: f64,
    pub height_px: f64,
    pub line_count: u32,
}

/// Measurement oracle used by the fitter.
///
/// `max_width_px` is `Some` when the text may wrap at that width.
pub trait MeasureText {
    fn measure(&self, text: &str, font: &FontDescriptor, max_width_px: Option<f64>) -> Measurement;
}

#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    pub font_size_pt: f64,
    pub warning: Option<Warning>,
    /// Shortened text when the ellipsis policy had to cut it.
    pub truncated_text: Option<String>,
}

impl FitResult {
    fn fitted(font_size_pt: f64) -> Self {
        FitResult {
            font_size_pt,
            warning: None,
            truncated_text: None,
        }
    }
}

/// Binary search for the largest size in `[min_font_size_pt, font.size_pt]`
/// at which `text` fits `text_box`.
///
/// Never fails. When even the minimum does not fit the minimum is returned
/// with a [`Warning::MinimumFontSize`].
pub fn fit_text<M: MeasureText + ?Sized>(
    text: &str,
    text_box: TextBox,
    font: &FontDescriptor,
    overflow: &OverflowPolicy,
    oracle: &M,
) -> FitResult {
    let min = overflow.min_font_size_pt;

    if text.is_empty() {
        return FitResult::fitted(min);
    }
    if text_box.is_degenerate() {
        return FitResult {
            warning: Some(Warning::DegenerateTextBox),
            ..FitResult::fitted(min)
        };
    }

    let fits = |size: f64| -> bool {
        let m = oracle.measure(text, &font.with_size(size), wrap_width(text_box, overflow));
        fits_box(&m, text_box, overflow)
    };

    let nominal = font.size_pt;
    if nominal > min {
        if fits(nominal) {
            debug!("{:?} fits at nominal {}pt", text, nominal);
            return FitResult::fitted(nominal);
        }

        let mut low = min;
        let mut high = nominal;
        let mut best_fit: Option<f64> = None;

        for _ in 0..MAX_ITERATIONS {
            if high - low < PRECISION_PT {
                break;
            }
            let mid = (low + high) / 2.0;
            if fits(mid) {
                best_fit = Some(mid);
                low = mid;
            } else {
                high = mid;
            }
        }

        if let Some(size) = best_fit {
            debug!("{:?} fitted at {}pt", text, size);
            return FitResult::fitted(size);
        }
    }

    if fits(min) {
        return FitResult::fitted(min);
    }

    debug!("{:?} does not fit at the minimum {}pt", text, min);
    let truncated_text = match overflow.mode {
        OverflowMode::Ellipsis => Some(truncate_with_ellipsis(
            text,
            text_box,
            &font.with_size(min),
            overflow,
            oracle,
        )),
        _ => None,
    };

    FitResult {
        font_size_pt: min,
        warning: Some(Warning::MinimumFontSize { size_pt: min }),
        truncated_text,
    }
}

fn wrap_width(text_box: TextBox, overflow: &OverflowPolicy) -> Option<f64> {
    match overflow.mode {
        OverflowMode::WrapLines => Some(text_box.width_px),
        OverflowMode::ShrinkToFit | OverflowMode::Ellipsis => None,
    }
}

fn fits_box(m: &Measurement, text_box: TextBox, overflow: &OverflowPolicy) -> bool {
    m.width_px <= text_box.width_px
        && m.height_px <= text_box.height_px
        && overflow.max_lines.map_or(true, |max| m.line_count <= max)
}

/// Longest prefix of `text` that fits with an ellipsis appended.
fn truncate_with_ellipsis<M: MeasureText + ?Sized>(
    text: &str,
    text_box: TextBox,
    font: &FontDescriptor,
    overflow: &OverflowPolicy,
    oracle: &M,
) -> String {
    let chars: Vec<char> = text.chars().collect();
    let candidate = |n: usize| -> String {
        let mut s: String = chars[..n].iter().collect::<String>().trim_end().to_string();
        s.push(ELLIPSIS);
        s
    };

    let mut low = 0;
    let mut high = chars.len();
    while low < high {
        let mid = (low + high + 1) / 2;
        let m = oracle.measure(&candidate(mid), font, wrap_width(text_box, overflow));
        if fits_box(&m, text_box, overflow) {
            low = mid;
        } else {
            high = mid - 1;
        }
    }
    candidate(low)
}

/// Width estimate from average glyph proportions, for callers without a shaper.
///
/// Sizes are in points and converted to pixels at `px_per_pt`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeuristicMetrics {
    pub px_per_pt: f64,
    pub line_height: f64,
}

impl Default for HeuristicMetrics {
    fn default() -> Self {
        // 96 px per inch, 72 pt per inch
        HeuristicMetrics {
            px_per_pt: 96.0 / 72.0,
            line_height: 1.2,
        }
    }
}

impl HeuristicMetrics {
    /// Width of a character in em.
    fn char_em(ch: char, bold: bool) -> f64 {
        let em = match ch {
            ' ' => 0.28,
            'i' | 'j' | 'l' | '!' | '|' | '.' | ',' | ':' | ';' | '\'' => 0.25,
            'f' | 'r' | 't' | 'I' | '(' | ')' | '[' | ']' | '-' => 0.35,
            'm' | 'w' | 'M' | 'W' | '@' => 0.85,
            '0'..='9' => 0.55,
            c if c.is_ascii_uppercase() => 0.66,
            c if c.is_ascii() => 0.52,
            // CJK and other wide scripts
            _ => 1.0,
        };
        if bold {
            em * 1.06
        } else {
            em
        }
    }

    fn text_width(&self, text: &str, font: &FontDescriptor) -> f64 {
        let bold = font.weight >= 600;
        let em: f64 = text.chars().map(|c| Self::char_em(c, bold)).sum();
        em * font.size_pt * self.px_per_pt
    }

    /// Greedy word wrap; words wider than the line stay on a line of their own.
    fn wrap(&self, text: &str, font: &FontDescriptor, max_width_px: f64) -> Vec<String> {
        let mut lines = Vec::new();
        for paragraph in text.split('\n') {
            let mut line = String::new();
            for word in paragraph.split_whitespace() {
                let candidate = if line.is_empty() {
                    word.to_string()
                } else {
                    format!("{} {}", line, word)
                };
                if line.is_empty() || self.text_width(&candidate, font) <= max_width_px {
                    line = candidate;
                } else {
                    lines.push(std::mem::replace(&mut line, word.to_string()));
                }
            }
            lines.push(line);
        }
        lines
    }
}

impl MeasureText for HeuristicMetrics {
    fn measure(&self, text: &str, font: &FontDescriptor, max_width_px: Option<f64>) -> Measurement {
        let lines: Vec<String> = match max_width_px {
            Some(width) => self.wrap(text, font, width),
            None => text.split('\n').map(str::to_string).collect(),
        };
        let width_px = lines
            .iter()
            .map(|line| self.text_width(line, font))
            .fold(0.0, f64::max);
        let line_count = lines.len() as u32;

        Measurement {
            width_px,
            height_px: line_count as f64 * font.size_pt * self.px_per_pt * self.line_height,
            line_count,
        }
    }
}
