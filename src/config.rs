use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::core::render::{PanelStyle, Rgb};
use crate::core::shaping::GlyphMetrics;
use crate::schema::geometry::BoxGeometry;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid panel geometry: {0}")]
    InvalidGeometry(String),
}

/// Layout and styling of a story panel, as loaded from `config/panel.ron`.
///
/// Missing fields fall back to the production defaults: a 1024x1024 panel
/// with a cream box and dark-brown 40px text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub panel_width: f32,
    pub panel_height: f32,
    /// Gap between each side of the text box and the panel edge.
    pub horizontal_margin: f32,
    pub padding_x: f32,
    pub padding_y: f32,
    pub line_spacing_factor: f32,
    pub bottom_margin: f32,
    pub radius: f32,
    pub background: Rgb,
    pub text_color: Rgb,
    pub font_size: f32,
}

impl Default for PanelConfig {
    fn default() -> Self {
        let geometry = BoxGeometry::default();
        let style = PanelStyle::default();
        Self {
            panel_width: style.panel_width,
            panel_height: geometry.panel_height,
            horizontal_margin: style.horizontal_margin,
            padding_x: geometry.padding_x,
            padding_y: geometry.padding_y,
            line_spacing_factor: geometry.line_spacing_factor,
            bottom_margin: geometry.bottom_margin,
            radius: style.radius,
            background: style.background,
            text_color: style.text_color,
            font_size: style.font_size,
        }
    }
}

impl PanelConfig {
    /// Load and validate a panel config from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<PanelConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse and validate a panel config from a RON string.
    pub fn parse_ron(input: &str) -> Result<PanelConfig, ConfigError> {
        let config: PanelConfig = ron::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.panel_width > 0.0) {
            return Err(ConfigError::InvalidGeometry(format!(
                "panel_width must be > 0, got {}",
                self.panel_width
            )));
        }
        if !(self.horizontal_margin >= 0.0) {
            return Err(ConfigError::InvalidGeometry(format!(
                "horizontal_margin must be >= 0, got {}",
                self.horizontal_margin
            )));
        }
        if !(self.font_size > 0.0) {
            return Err(ConfigError::InvalidGeometry(format!(
                "font_size must be > 0, got {}",
                self.font_size
            )));
        }
        self.geometry().validate()
    }

    /// The text box geometry: the box spans the panel minus both margins.
    pub fn geometry(&self) -> BoxGeometry {
        BoxGeometry {
            max_width: self.panel_width - 2.0 * self.horizontal_margin,
            padding_x: self.padding_x,
            padding_y: self.padding_y,
            line_spacing_factor: self.line_spacing_factor,
            bottom_margin: self.bottom_margin,
            panel_height: self.panel_height,
        }
    }

    pub fn style(&self) -> PanelStyle {
        PanelStyle {
            panel_width: self.panel_width,
            horizontal_margin: self.horizontal_margin,
            radius: self.radius,
            background: self.background,
            text_color: self.text_color,
            font_size: self.font_size,
        }
    }

    /// Glyph metrics for the reference shaper at this config's font size.
    pub fn glyph_metrics(&self) -> GlyphMetrics {
        GlyphMetrics::with_font_size(self.font_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_box_geometry_default() {
        let config = PanelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.geometry(), BoxGeometry::default());
        assert_eq!(config.style(), PanelStyle::default());
    }

    #[test]
    fn partial_ron_uses_defaults() {
        let config = PanelConfig::parse_ron("(font_size: 32.0, padding_x: 12.0)").unwrap();
        assert_eq!(config.font_size, 32.0);
        assert_eq!(config.geometry().padding_x, 12.0);
        assert_eq!(config.panel_height, 1024.0);
        assert_eq!(config.glyph_metrics().font_size, 32.0);
    }

    #[test]
    fn colours_parse_as_tuples() {
        let config = PanelConfig::parse_ron("(background: (0, 0, 0))").unwrap();
        assert_eq!(config.background, Rgb(0, 0, 0));
    }

    #[test]
    fn margins_wider_than_panel_are_rejected() {
        let err = PanelConfig::parse_ron("(panel_width: 60.0, horizontal_margin: 40.0)").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidGeometry(msg) if msg.contains("max_width")));
    }

    #[test]
    fn line_spacing_must_exceed_one() {
        let err = PanelConfig::parse_ron("(line_spacing_factor: 0.9)").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidGeometry(_)));
    }

    #[test]
    fn malformed_ron_is_a_parse_error() {
        assert!(matches!(
            PanelConfig::parse_ron("(font_size: )"),
            Err(ConfigError::Ron(_))
        ));
    }
}
