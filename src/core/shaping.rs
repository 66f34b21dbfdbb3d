//! Text shaping and measurement.
//!
//! The line breaker never measures raw logical text: joined Arabic glyphs
//! are narrower than unshaped base letters, so measuring unshaped text
//! overestimates every line. Everything goes through a [`TextShaper`].

use ar_reshaper::ArabicReshaper;
use thiserror::Error;
use unicode_bidi::{BidiInfo, Level};

use crate::core::rules::is_ignorable_mark;

const TATWEEL: char = '\u{0640}';

#[derive(Debug, Error)]
pub enum ShapingError {
    #[error("shaper unavailable: {0}")]
    Unavailable(String),
    #[error("failed to measure '{text}': {reason}")]
    Measure { text: String, reason: String },
}

/// Extent of a shaped run, in rendering units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextMetrics {
    pub width: f32,
    /// Distance from the baseline to the top of the tallest glyph.
    pub ascent: f32,
    /// Distance from the baseline to the bottom of the lowest glyph.
    pub descent: f32,
}

impl TextMetrics {
    /// Height of the bounding box.
    pub fn height(&self) -> f32 {
        self.ascent + self.descent
    }
}

/// Converts logical text into a drawable visual run and measures it.
///
/// Implementations are shared between threads composing pages in parallel.
pub trait TextShaper: Send + Sync {
    /// Apply contextual joining and bidi reordering.
    fn shape(&self, logical: &str) -> Result<String, ShapingError>;

    /// Measure text previously returned by [`TextShaper::shape`].
    fn measure(&self, visual: &str) -> Result<TextMetrics, ShapingError>;
}

/// Advance widths, in em, per glyph class.
///
/// The defaults approximate a naskh face: a contextual glyph from the
/// presentation-form blocks is narrower than the same letter left unshaped.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphMetrics {
    pub font_size: f32,
    pub ascent: f32,
    pub descent: f32,
    /// Any glyph from Arabic Presentation Forms-A or -B.
    pub joined: f32,
    pub lam_alef: f32,
    /// Base letters (U+0600 block) that were never shaped.
    pub unshaped: f32,
    pub space: f32,
    pub digit: f32,
    pub latin: f32,
    pub punctuation: f32,
}

impl Default for GlyphMetrics {
    fn default() -> Self {
        Self {
            font_size: 40.0,
            ascent: 1.05,
            descent: 0.55,
            joined: 0.40,
            lam_alef: 0.50,
            unshaped: 0.58,
            space: 0.25,
            digit: 0.50,
            latin: 0.52,
            punctuation: 0.30,
        }
    }
}

fn is_zero_width(c: char) -> bool {
    (is_ignorable_mark(c) && c != TATWEEL)
        || matches!(c, '\u{FE70}'..='\u{FE7F}' | '\u{FEFF}' | '\u{200B}'..='\u{200F}')
}

impl GlyphMetrics {
    pub fn with_font_size(font_size: f32) -> Self {
        Self {
            font_size,
            ..Self::default()
        }
    }

    /// Advance of a single character, in em.
    pub fn advance(&self, c: char) -> f32 {
        if is_zero_width(c) {
            return 0.0;
        }
        match c {
            '\u{FEF5}'..='\u{FEFC}' => self.lam_alef,
            '\u{FB50}'..='\u{FDFF}' | '\u{FE80}'..='\u{FEFC}' | TATWEEL => self.joined,
            ' ' | '\u{00A0}' => self.space,
            c if c.is_numeric() => self.digit,
            '\u{0600}'..='\u{06FF}' if c.is_alphabetic() => self.unshaped,
            c if c.is_alphabetic() => self.latin,
            c if c.is_whitespace() => self.space,
            _ => self.punctuation,
        }
    }
}

/// Reference shaper: contextual joining with `ar_reshaper`, then the
/// Unicode bidirectional algorithm with a right-to-left paragraph direction,
/// measured against a [`GlyphMetrics`] table.
#[derive(Debug, Clone, Default)]
pub struct ArabicShaper {
    metrics: GlyphMetrics,
}

impl ArabicShaper {
    pub fn new(metrics: GlyphMetrics) -> Self {
        Self { metrics }
    }

    pub fn metrics(&self) -> &GlyphMetrics {
        &self.metrics
    }
}

/// Reorder logical text into visual order, one paragraph at a time, with a
/// right-to-left base direction.
pub fn reorder_rtl(logical: &str) -> String {
    if logical.is_empty() {
        return String::new();
    }
    let bidi = BidiInfo::new(logical, Some(Level::rtl()));
    let mut out = String::with_capacity(logical.len());
    for para in &bidi.paragraphs {
        let line = para.range.clone();
        out.push_str(&bidi.reorder_line(para, line));
    }
    out
}

impl TextShaper for ArabicShaper {
    fn shape(&self, logical: &str) -> Result<String, ShapingError> {
        let joined = ArabicReshaper::default().reshape(logical);
        Ok(reorder_rtl(&joined))
    }

    fn measure(&self, visual: &str) -> Result<TextMetrics, ShapingError> {
        if !(self.metrics.font_size > 0.0) {
            return Err(ShapingError::Measure {
                text: visual.to_string(),
                reason: format!("font size must be positive, got {}", self.metrics.font_size),
            });
        }
        let em: f32 = visual.chars().map(|c| self.metrics.advance(c)).sum();
        Ok(TextMetrics {
            width: em * self.metrics.font_size,
            ascent: self.metrics.ascent * self.metrics.font_size,
            descent: self.metrics.descent * self.metrics.font_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reorder_reverses_pure_rtl() {
        assert_eq!(reorder_rtl("ابت"), "تبا");
        assert_eq!(reorder_rtl(""), "");
    }

    #[test]
    fn reorder_keeps_embedded_latin_run_ltr() {
        let visual = reorder_rtl("قال OK");
        assert!(visual.contains("OK"));
        assert!(visual.ends_with("لاق"));
    }

    #[test]
    fn shaped_text_is_narrower_than_unshaped() {
        let shaper = ArabicShaper::default();
        let raw = shaper.measure("بطلتنا").unwrap();
        let shaped = shaper.measure(&shaper.shape("بطلتنا").unwrap()).unwrap();
        assert!(shaped.width < raw.width, "{} !< {}", shaped.width, raw.width);
    }

    fn has_unshaped_letters(visual: &str) -> bool {
        visual
            .chars()
            .any(|c| ('\u{0600}'..='\u{06FF}').contains(&c) && c.is_alphabetic())
    }

    #[test]
    fn lam_alef_ligature_survives_a_mark_between() {
        let shaper = ArabicShaper::default();
        for word in ["لا", "لَا"] {
            let visual = shaper.shape(word).unwrap();
            assert!(
                visual.chars().any(|c| ('\u{FEF5}'..='\u{FEFC}').contains(&c)),
                "no ligature in {:?} for '{word}'",
                visual.chars().map(|c| format!("{:04X}", c as u32)).collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn extended_letters_are_joined() {
        let shaper = ArabicShaper::default();
        for word in ["گالت", "چاي", "پابا", "قال"] {
            let visual = shaper.shape(word).unwrap();
            assert!(!has_unshaped_letters(&visual), "'{word}' left unshaped");
        }
    }

    #[test]
    fn ligature_is_narrower_than_its_letters() {
        let shaper = ArabicShaper::default();
        let ligature = shaper.measure(&shaper.shape("لا").unwrap()).unwrap();
        assert!(ligature.width < shaper.measure("لا").unwrap().width);
    }

    #[test]
    fn marks_have_no_advance() {
        let shaper = ArabicShaper::default();
        let plain = shaper.measure(&shaper.shape("قال").unwrap()).unwrap();
        let voweled = shaper.measure(&shaper.shape("قَالَ").unwrap()).unwrap();
        assert!((plain.width - voweled.width).abs() < 1e-4);
    }

    #[test]
    fn metrics_scale_with_font_size() {
        let small = ArabicShaper::new(GlyphMetrics::with_font_size(20.0));
        let large = ArabicShaper::new(GlyphMetrics::with_font_size(40.0));
        let text = small.shape("قال الولد").unwrap();
        let a = small.measure(&text).unwrap();
        let b = large.measure(&text).unwrap();
        assert!((b.width - 2.0 * a.width).abs() < 1e-3);
        assert!((b.height() - 2.0 * a.height()).abs() < 1e-3);
    }

    #[test]
    fn empty_text_has_zero_width_but_line_height() {
        let shaper = ArabicShaper::default();
        let m = shaper.measure("").unwrap();
        assert_eq!(m.width, 0.0);
        assert!(m.height() > 0.0);
    }

    #[test]
    fn zero_font_size_is_a_measure_error() {
        let shaper = ArabicShaper::new(GlyphMetrics::with_font_size(0.0));
        assert!(matches!(
            shaper.measure("x"),
            Err(ShapingError::Measure { .. })
        ));
    }
}
