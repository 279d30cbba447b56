//! Text measurement.
//!
//! Glyph metrics come from whatever font stack the host renders with, so the
//! crate only sees them through [`TextMeasure`]. [`ApproxTextMeasure`] is a
//! deterministic stand-in used by the CLI and by tests.

#[cfg(test)]
#[path = "text_test.rs"]
mod text_test;

use crate::consts::{DEFAULT_FONT_SIZE, LINE_HEIGHT_FACTOR, MIN_FONT_SIZE};
use crate::doc::{Body, DrawableObject};

/// Font description passed to a [`TextMeasure`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec<'a> {
    pub size: f64,
    pub family: &'a str,
    pub weight: f64,
}

/// Source of rendered line widths.
pub trait TextMeasure {
    /// Advance width of `line` when drawn in `font`.
    fn line_width(&self, line: &str, font: &FontSpec<'_>) -> f64;
}

/// Fixed-advance approximation: every character is a fraction of the font size wide.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxTextMeasure;

/// Average advance of a glyph relative to the font size.
const APPROX_ADVANCE: f64 = 0.56;

/// Extra width applied to bold (weight ≥ 600) text.
const BOLD_WIDEN: f64 = 1.06;

impl TextMeasure for ApproxTextMeasure {
    #[allow(clippy::cast_precision_loss)]
    fn line_width(&self, line: &str, font: &FontSpec<'_>) -> f64 {
        let widen = if font.weight >= 600.0 { BOLD_WIDEN } else { 1.0 };
        line.chars().count() as f64 * font.size * APPROX_ADVANCE * widen
    }
}

/// Measured layout of a block of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMetrics {
    /// Widest line, never below 1.
    pub max_width: f64,
    pub line_height: f64,
    pub lines: Vec<String>,
}

impl TextMetrics {
    /// Total block height.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn height(&self) -> f64 {
        self.line_height * self.lines.len() as f64
    }
}

/// Effective font size: non-positive or non-finite sizes fall back to the
/// default, and everything is floored at [`MIN_FONT_SIZE`].
#[must_use]
pub fn effective_font_size(size: f64) -> f64 {
    let size = if size.is_finite() && size > 0.0 { size } else { DEFAULT_FONT_SIZE };
    size.max(MIN_FONT_SIZE)
}

/// Line height for a font size, rounded to whole units.
#[must_use]
pub fn line_height(font_size: f64) -> f64 {
    (effective_font_size(font_size) * LINE_HEIGHT_FACTOR).round()
}

/// Split `text` on newlines and measure every line.
#[must_use]
pub fn measure(text: &str, font: &FontSpec<'_>, measure: &dyn TextMeasure) -> TextMetrics {
    let font = FontSpec { size: effective_font_size(font.size), ..*font };
    let lines: Vec<String> = text.split('\n').map(str::to_owned).collect();
    let max_width = lines
        .iter()
        .map(|line| measure.line_width(line, &font))
        .fold(1.0, f64::max);
    TextMetrics { max_width, line_height: line_height(font.size), lines }
}

/// Metrics for a text object, or `None` when `obj` is not text.
#[must_use]
pub fn object_metrics(obj: &DrawableObject, measurer: &dyn TextMeasure) -> Option<TextMetrics> {
    let Body::Text { text, font_size, font_family, font_weight } = &obj.body else {
        return None;
    };
    let font = FontSpec { size: *font_size, family: font_family, weight: *font_weight };
    Some(measure(text, &font, measurer))
}
