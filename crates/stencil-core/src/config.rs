//! Editor configuration.

use crate::camera::{MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};
use crate::placement::{AnchorMode, DEFAULT_MAX_ATTEMPTS, SHIFT_STEP};
use crate::shapes::SerializableColor;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canvas surface width in world units.
pub const DEFAULT_CANVAS_WIDTH: f64 = 800.0;

/// Canvas surface height in world units.
pub const DEFAULT_CANVAS_HEIGHT: f64 = 1200.0;

/// Canvas background (#f3f3f3).
pub const DEFAULT_BACKGROUND: SerializableColor = SerializableColor::rgb(0xf3, 0xf3, 0xf3);

/// Tunables for an editor session.
///
/// Every field has a default, so a partial JSON object is a valid override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub background: SerializableColor,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub zoom_step: f64,
    /// Offset applied per overlap shift, on both axes.
    pub shift_step: f64,
    /// Overlap shifts tried before a drop is rejected.
    pub max_placement_attempts: usize,
    pub anchor: AnchorMode,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            background: DEFAULT_BACKGROUND,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            zoom_step: ZOOM_STEP,
            shift_step: SHIFT_STEP,
            max_placement_attempts: DEFAULT_MAX_ATTEMPTS,
            anchor: AnchorMode::default(),
        }
    }
}

/// Errors raised while reading editor settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn require_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{} must be finite and positive", value)))
    }
}

impl EditorConfig {
    /// Parse overrides from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value can drive a session.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("canvas_width", self.canvas_width)?;
        require_positive("canvas_height", self.canvas_height)?;
        require_positive("min_zoom", self.min_zoom)?;
        require_positive("max_zoom", self.max_zoom)?;
        if self.min_zoom > self.max_zoom {
            return Err(invalid(
                "min_zoom",
                format!("{} exceeds max_zoom {}", self.min_zoom, self.max_zoom),
            ));
        }
        require_positive("zoom_step", self.zoom_step)?;
        require_positive("shift_step", self.shift_step)?;
        match self.anchor {
            AnchorMode::Stacked { origin, step }
                if !(origin.x.is_finite() && origin.y.is_finite() && step.is_finite()) =>
            {
                Err(invalid("anchor", "stacked origin and step must be finite"))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.canvas_width, 800.0);
        assert_eq!(config.canvas_height, 1200.0);
        assert_eq!(config.background.to_hex(), "#f3f3f3");
        assert_eq!(config.anchor, AnchorMode::Pointer);
        assert_eq!(config.max_placement_attempts, 1000);
    }

    #[test]
    fn test_partial_override() {
        let config = EditorConfig::from_json(
            r#"{ "max_zoom": 3.0, "anchor": { "stacked": { "origin": { "x": 400.0, "y": 200.0 }, "step": 50.0 } } }"#,
        )
        .unwrap();
        assert_eq!(config.max_zoom, 3.0);
        assert_eq!(config.min_zoom, 0.5);
        assert_eq!(
            config.anchor,
            AnchorMode::Stacked { origin: Point::new(400.0, 200.0), step: 50.0 }
        );
    }

    #[test]
    fn test_inverted_zoom_limits_rejected() {
        let result = EditorConfig::from_json(r#"{ "min_zoom": 3.0, "max_zoom": 2.0 }"#);
        assert!(matches!(result, Err(ConfigError::Invalid { field: "min_zoom", .. })));
    }

    #[test]
    fn test_non_positive_values_rejected() {
        for json in [
            r#"{ "min_zoom": 0.0 }"#,
            r#"{ "zoom_step": -0.1 }"#,
            r#"{ "shift_step": 0.0 }"#,
            r#"{ "canvas_width": 0.0 }"#,
            r#"{ "canvas_height": -5.0 }"#,
        ] {
            assert!(
                matches!(EditorConfig::from_json(json), Err(ConfigError::Invalid { .. })),
                "{} should be rejected",
                json
            );
        }
        assert!(matches!(EditorConfig::from_json("{ nope"), Err(ConfigError::Parse(_))));
        assert!(EditorConfig::default().validate().is_ok());
    }
}
