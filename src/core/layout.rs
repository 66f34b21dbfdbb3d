//! Greedy line breaking and text-box sizing.

use thiserror::Error;
use tracing::{debug, warn};

use crate::core::shaping::{ShapingError, TextShaper};
use crate::schema::geometry::{BoxGeometry, PackedLayout};

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("max_width must be positive, got {0}")]
    InvalidMaxWidth(f32),
    #[error("shaping failed: {0}")]
    Shaping(#[from] ShapingError),
    #[error("shaper measured '{text}' with non-positive width {width}")]
    NonPositiveWidth { text: String, width: f32 },
}

/// Shape and measure `logical`, rejecting widths no real font produces.
fn shaped_width(shaper: &dyn TextShaper, logical: &str) -> Result<f32, LayoutError> {
    let visual = shaper.shape(logical)?;
    let metrics = shaper.measure(&visual)?;
    if !(metrics.width > 0.0) {
        return Err(LayoutError::NonPositiveWidth {
            text: logical.to_string(),
            width: metrics.width,
        });
    }
    Ok(metrics.width)
}

/// Greedily wrap the words of `text` into logical-order lines no wider than
/// `limit` once shaped.
///
/// A word is always accepted into an empty line, so a word wider than
/// `limit` ends up alone on its own line rather than being split.
pub fn wrap_words(
    text: &str,
    limit: f32,
    shaper: &dyn TextShaper,
) -> Result<Vec<String>, LayoutError> {
    let mut lines = Vec::new();
    let mut buffer = String::new();

    for word in text.split_whitespace() {
        let candidate = if buffer.is_empty() {
            word.to_string()
        } else {
            format!("{buffer} {word}")
        };
        let width = shaped_width(shaper, &candidate)?;

        if buffer.is_empty() || width <= limit {
            buffer = candidate;
        } else {
            lines.push(std::mem::replace(&mut buffer, word.to_string()));
        }
    }

    if !buffer.is_empty() {
        lines.push(buffer);
    }
    Ok(lines)
}

/// Wrap `text` into the box described by `geometry` and size the box.
///
/// Fails only when `max_width` is not positive or the shaper cannot
/// produce a usable measurement. Empty or whitespace-only text yields a
/// layout with no lines and a zero-height box.
pub fn pack(
    text: &str,
    geometry: &BoxGeometry,
    shaper: &dyn TextShaper,
) -> Result<PackedLayout, LayoutError> {
    if !(geometry.max_width > 0.0) {
        return Err(LayoutError::InvalidMaxWidth(geometry.max_width));
    }

    let limit = geometry.text_width();
    let logical_lines = wrap_words(text, limit, shaper)?;
    if logical_lines.is_empty() {
        return Ok(PackedLayout::empty(geometry));
    }

    let mut lines = Vec::with_capacity(logical_lines.len());
    let mut line_height = 0.0;
    for (i, logical) in logical_lines.iter().enumerate() {
        let visual = shaper.shape(logical)?;
        let metrics = shaper.measure(&visual)?;
        if i == 0 {
            line_height = metrics.height();
        }
        if metrics.width > limit {
            warn!(
                line = %logical,
                width = metrics.width,
                limit,
                "word wider than the text box, emitting overflowing line"
            );
        }
        lines.push(visual);
    }

    let extra_lines = (lines.len() - 1) as f32;
    let box_height = 2.0 * geometry.padding_y
        + line_height
        + extra_lines * line_height * geometry.line_spacing_factor;
    let box_top = geometry.panel_height - geometry.bottom_margin - box_height;

    debug!(
        lines = lines.len(),
        line_height, box_height, box_top, "packed text box"
    );

    Ok(PackedLayout {
        lines,
        logical_lines,
        line_height,
        box_height,
        box_top,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shaping::TextMetrics;

    /// Identity shaping, ten units per character, 30 units tall.
    struct FixedAdvance;

    impl TextShaper for FixedAdvance {
        fn shape(&self, logical: &str) -> Result<String, ShapingError> {
            Ok(logical.to_string())
        }

        fn measure(&self, visual: &str) -> Result<TextMetrics, ShapingError> {
            Ok(TextMetrics {
                width: visual.chars().count() as f32 * 10.0,
                ascent: 20.0,
                descent: 10.0,
            })
        }
    }

    struct Unavailable;

    impl TextShaper for Unavailable {
        fn shape(&self, _: &str) -> Result<String, ShapingError> {
            Err(ShapingError::Unavailable("no font loaded".to_string()))
        }

        fn measure(&self, _: &str) -> Result<TextMetrics, ShapingError> {
            Err(ShapingError::Unavailable("no font loaded".to_string()))
        }
    }

    struct ZeroWidth;

    impl TextShaper for ZeroWidth {
        fn shape(&self, logical: &str) -> Result<String, ShapingError> {
            Ok(logical.to_string())
        }

        fn measure(&self, _: &str) -> Result<TextMetrics, ShapingError> {
            Ok(TextMetrics::default())
        }
    }

    fn geometry(max_width: f32) -> BoxGeometry {
        BoxGeometry {
            max_width,
            padding_x: 10.0,
            padding_y: 5.0,
            line_spacing_factor: 1.5,
            bottom_margin: 20.0,
            panel_height: 500.0,
        }
    }

    #[test]
    fn two_words_per_line() {
        // "كان بيحب" is 8 chars = 80 units, exactly the text width.
        let layout = pack("كان بيحب يلعب", &geometry(100.0), &FixedAdvance).unwrap();
        assert_eq!(layout.lines, vec!["كان بيحب", "يلعب"]);
        assert_eq!(layout.logical_lines, layout.lines);
    }

    #[test]
    fn empty_text_packs_to_nothing() {
        let layout = pack("", &geometry(900.0), &FixedAdvance).unwrap();
        assert!(layout.lines.is_empty());
        assert_eq!(layout.box_height, 0.0);

        let layout = pack("  \n\t ", &geometry(900.0), &FixedAdvance).unwrap();
        assert!(layout.is_empty());
    }

    #[test]
    fn overflowing_word_is_kept_whole() {
        let word = "استيقظت".repeat(6);
        let layout = pack(&word, &geometry(50.0), &FixedAdvance).unwrap();
        assert_eq!(layout.lines, vec![word]);
    }

    #[test]
    fn overflow_word_between_fitting_words() {
        let long = "ب".repeat(20);
        let text = format!("قال {long} هو");
        let layout = pack(&text, &geometry(100.0), &FixedAdvance).unwrap();
        assert_eq!(layout.lines, vec!["قال".to_string(), long, "هو".to_string()]);
    }

    #[test]
    fn box_height_and_top() {
        let g = geometry(100.0);
        let layout = pack("كان بيحب يلعب", &g, &FixedAdvance).unwrap();
        assert_eq!(layout.line_height, 30.0);
        // 2*5 + 30 + 1*30*1.5
        assert!((layout.box_height - 85.0).abs() < 1e-4);
        assert!((layout.box_top - (500.0 - 20.0 - 85.0)).abs() < 1e-4);
        assert!((layout.box_bottom() - 480.0).abs() < 1e-4);
    }

    #[test]
    fn each_extra_line_adds_spaced_line_height() {
        let g = geometry(60.0);
        let one = pack("أنا", &g, &FixedAdvance).unwrap();
        let two = pack("أنا هو", &g, &FixedAdvance).unwrap();
        let three = pack("أنا هو هي", &g, &FixedAdvance).unwrap();
        assert_eq!((one.line_count(), two.line_count(), three.line_count()), (1, 2, 3));
        let step = 30.0 * 1.5;
        assert!((two.box_height - one.box_height - step).abs() < 1e-4);
        assert!((three.box_height - two.box_height - step).abs() < 1e-4);
    }

    #[test]
    fn non_positive_max_width_is_rejected() {
        for width in [0.0, -5.0, f32::NAN] {
            let err = pack("قال", &geometry(width), &FixedAdvance).unwrap_err();
            assert!(matches!(err, LayoutError::InvalidMaxWidth(_)));
        }
    }

    #[test]
    fn unavailable_shaper_is_fatal() {
        let err = pack("قال الولد", &geometry(900.0), &Unavailable).unwrap_err();
        assert!(matches!(err, LayoutError::Shaping(ShapingError::Unavailable(_))));
    }

    #[test]
    fn zero_width_measurement_is_fatal() {
        let err = pack("قال", &geometry(900.0), &ZeroWidth).unwrap_err();
        match err {
            LayoutError::NonPositiveWidth { text, width } => {
                assert_eq!(text, "قال");
                assert_eq!(width, 0.0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn wrap_words_collapses_whitespace_runs() {
        let lines = wrap_words("قال   الولد\n\nهو", 1000.0, &FixedAdvance).unwrap();
        assert_eq!(lines, vec!["قال الولد هو"]);
    }
}
