use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Caller-supplied geometry for the text box at the bottom of a panel.
///
/// All values are in rendering units (pixels for the reference shaper).
/// `max_width` is the full box width; text is wrapped to
/// `max_width - 2 * padding_x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxGeometry {
    pub max_width: f32,
    pub padding_x: f32,
    pub padding_y: f32,
    /// Multiplier applied to the line height between consecutive lines.
    pub line_spacing_factor: f32,
    /// Gap between the bottom of the box and the bottom of the panel.
    pub bottom_margin: f32,
    /// Height of the panel; its bottom edge anchors the box.
    pub panel_height: f32,
}

impl Default for BoxGeometry {
    fn default() -> Self {
        Self {
            max_width: 944.0,
            padding_x: 26.0,
            padding_y: 20.0,
            line_spacing_factor: 1.4,
            bottom_margin: 30.0,
            panel_height: 1024.0,
        }
    }
}

impl BoxGeometry {
    /// Width available to a line of text once horizontal padding is removed.
    pub fn text_width(&self) -> f32 {
        self.max_width - 2.0 * self.padding_x
    }

    /// Check every field constraint. Packing itself only rejects a
    /// non-positive `max_width`; this is the stricter load-time check.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_width > 0.0) {
            return Err(invalid("max_width", "must be > 0", self.max_width));
        }
        if !(self.padding_x >= 0.0) {
            return Err(invalid("padding_x", "must be >= 0", self.padding_x));
        }
        if !(self.padding_y >= 0.0) {
            return Err(invalid("padding_y", "must be >= 0", self.padding_y));
        }
        if !(self.line_spacing_factor > 1.0) {
            return Err(invalid(
                "line_spacing_factor",
                "must be > 1.0",
                self.line_spacing_factor,
            ));
        }
        if !(self.bottom_margin >= 0.0) {
            return Err(invalid("bottom_margin", "must be >= 0", self.bottom_margin));
        }
        if !(self.panel_height > 0.0) {
            return Err(invalid("panel_height", "must be > 0", self.panel_height));
        }
        Ok(())
    }
}

fn invalid(field: &str, rule: &str, value: f32) -> ConfigError {
    ConfigError::InvalidGeometry(format!("{field} {rule}, got {value}"))
}

/// The result of packing one page of text into a box.
///
/// Computed fresh for every call and never shared between pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackedLayout {
    /// Lines in visual order (shaped and bidi-reordered), ready to draw.
    pub lines: Vec<String>,
    /// The same lines in logical order, before shaping.
    pub logical_lines: Vec<String>,
    pub line_height: f32,
    pub box_height: f32,
    pub box_top: f32,
}

impl PackedLayout {
    /// A layout with no lines and a zero-height box resting on the margin.
    pub fn empty(geometry: &BoxGeometry) -> Self {
        Self {
            lines: Vec::new(),
            logical_lines: Vec::new(),
            line_height: 0.0,
            box_height: 0.0,
            box_top: geometry.panel_height - geometry.bottom_margin,
        }
    }

    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Bottom edge of the box.
    pub fn box_bottom(&self) -> f32 {
        self.box_top + self.box_height
    }
}
