//! Placement and painting of the packed text box.
//!
//! [`TextBoxRenderer::plan`] turns a [`PackedLayout`] into absolute
//! positions; [`TextBoxRenderer::paint`] replays that plan against any
//! [`PanelCanvas`]. The canvas owns fonts and pixels.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::shaping::{ShapingError, TextShaper};
use crate::schema::geometry::{BoxGeometry, PackedLayout};

/// An sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// `#RRGGBB` form.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// Visual styling of the panel and its text box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelStyle {
    pub panel_width: f32,
    pub horizontal_margin: f32,
    pub radius: f32,
    pub background: Rgb,
    pub text_color: Rgb,
    pub font_size: f32,
}

impl Default for PanelStyle {
    fn default() -> Self {
        Self {
            panel_width: 1024.0,
            horizontal_margin: 40.0,
            radius: 16.0,
            background: Rgb(255, 248, 240),
            text_color: Rgb(44, 24, 16),
            font_size: 40.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl BoxRect {
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// One visual line at its final position. `(x, y)` is the top-left corner
/// of the line's bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedLine {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBoxPlan {
    pub rect: BoxRect,
    pub radius: f32,
    pub lines: Vec<PlacedLine>,
}

/// A drawing surface for story panels.
pub trait PanelCanvas {
    fn fill_rounded_rect(&mut self, rect: &BoxRect, radius: f32, color: Rgb);

    fn draw_text(&mut self, text: &str, x: f32, y: f32, font_size: f32, color: Rgb);
}

/// Positions packed lines inside the panel and paints them.
#[derive(Debug, Clone, Default)]
pub struct TextBoxRenderer {
    style: PanelStyle,
}

impl TextBoxRenderer {
    pub fn new(style: PanelStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &PanelStyle {
        &self.style
    }

    /// Compute where the box and each line go.
    ///
    /// The box is centred horizontally and spans `geometry.max_width`. Lines
    /// are right-aligned against `box_right - padding_x` since the script
    /// runs right to left. Returns `None` for an empty layout: nothing is
    /// drawn, not even the background.
    pub fn plan(
        &self,
        layout: &PackedLayout,
        geometry: &BoxGeometry,
        shaper: &dyn TextShaper,
    ) -> Result<Option<TextBoxPlan>, ShapingError> {
        if layout.is_empty() {
            return Ok(None);
        }

        let rect = BoxRect {
            left: (self.style.panel_width - geometry.max_width) / 2.0,
            top: layout.box_top,
            width: geometry.max_width,
            height: layout.box_height,
        };
        let x_right = rect.right() - geometry.padding_x;
        let advance = layout.line_height * geometry.line_spacing_factor;

        let mut lines = Vec::with_capacity(layout.lines.len());
        let mut y = rect.top + geometry.padding_y;
        for text in &layout.lines {
            let width = shaper.measure(text)?.width;
            lines.push(PlacedLine {
                text: text.clone(),
                x: x_right - width,
                y,
                width,
            });
            y += advance;
        }

        debug!(
            left = rect.left,
            top = rect.top,
            lines = lines.len(),
            "planned text box"
        );
        Ok(Some(TextBoxPlan {
            rect,
            radius: self.style.radius,
            lines,
        }))
    }

    /// Paint the background box, then every line.
    pub fn paint(&self, plan: &TextBoxPlan, canvas: &mut dyn PanelCanvas) {
        canvas.fill_rounded_rect(&plan.rect, plan.radius, self.style.background);
        for line in &plan.lines {
            canvas.draw_text(
                &line.text,
                line.x,
                line.y,
                self.style.font_size,
                self.style.text_color,
            );
        }
    }
}
