#![allow(clippy::float_cmp)]

use super::*;
use crate::consts::DEFAULT_FONT_FAMILY;

/// Every character is exactly one unit wide, regardless of font.
struct UnitMeasure;

impl TextMeasure for UnitMeasure {
    #[allow(clippy::cast_precision_loss)]
    fn line_width(&self, line: &str, _font: &FontSpec<'_>) -> f64 {
        line.chars().count() as f64
    }
}

fn font(size: f64) -> FontSpec<'static> {
    FontSpec { size, family: DEFAULT_FONT_FAMILY, weight: 700.0 }
}

#[test]
fn effective_font_size_defaults_and_floors() {
    assert_eq!(effective_font_size(20.0), 20.0);
    assert_eq!(effective_font_size(3.0), 8.0);
    assert_eq!(effective_font_size(0.0), 36.0);
    assert_eq!(effective_font_size(f64::NAN), 36.0);
}

#[test]
fn line_height_rounds() {
    assert_eq!(line_height(36.0), 43.0);
    assert_eq!(line_height(10.0), 12.0);
    assert_eq!(line_height(1.0), 10.0);
}

#[test]
fn measure_takes_widest_line() {
    let m = measure("ab\nabcdef\n", &font(10.0), &UnitMeasure);
    assert_eq!(m.lines, vec!["ab", "abcdef", ""]);
    assert_eq!(m.max_width, 6.0);
    assert_eq!(m.height(), 36.0);
}

#[test]
fn measure_empty_text_is_at_least_one_wide() {
    let m = measure("", &font(10.0), &UnitMeasure);
    assert_eq!(m.max_width, 1.0);
    assert_eq!(m.lines.len(), 1);
}

#[test]
fn approx_measure_widens_bold() {
    let regular = FontSpec { weight: 400.0, ..font(10.0) };
    let bold = font(10.0);
    let a = ApproxTextMeasure.line_width("abcd", &regular);
    let b = ApproxTextMeasure.line_width("abcd", &bold);
    assert!((a - 22.4).abs() < 1e-9);
    assert!(b > a);
}

#[test]
fn object_metrics_only_for_text() {
    let text = DrawableObject::text("hey", 20.0);
    assert!(object_metrics(&text, &UnitMeasure).is_some());
    let stroke = DrawableObject::stroke(Vec::new());
    assert!(object_metrics(&stroke, &UnitMeasure).is_none());
}
