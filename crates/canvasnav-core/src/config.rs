//! Canvas configuration.

use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid zoom range: min {min} max {max}")]
    ZoomRange { min: f64, max: f64 },
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: f64 },
}

/// Camera limits and canvas dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Minimum allowed zoom level.
    pub min_zoom: f64,
    /// Maximum allowed zoom level.
    pub max_zoom: f64,
    /// Factor applied by a single zoom-in / zoom-out step.
    pub zoom_step: f64,
    pub canvas_width: f64,
    pub canvas_height: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.1,
            max_zoom: 5.0,
            zoom_step: 1.2,
            canvas_width: 800.0,
            canvas_height: 600.0,
        }
    }
}

impl ViewportConfig {
    pub fn canvas_size(&self) -> Size {
        Size::new(self.canvas_width, self.canvas_height)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) || !self.max_zoom.is_finite() {
            return Err(ConfigError::ZoomRange {
                min: self.min_zoom,
                max: self.max_zoom,
            });
        }
        positive("viewport.zoom_step", self.zoom_step)?;
        non_negative("viewport.canvas_width", self.canvas_width)?;
        non_negative("viewport.canvas_height", self.canvas_height)?;
        Ok(())
    }
}

/// Navigation and creation behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Perpendicular slack when deciding whether an element lies in a direction.
    pub direction_tolerance: f64,
    /// Horizontal distance between a selection and an element created from it.
    pub spawn_offset: f64,
    pub default_element_width: f64,
    pub default_element_height: f64,
    /// Screen-space margin kept around an auto-focused element.
    pub focus_padding: f64,
    pub focus_duration_ms: u64,
    /// Number of previously selected ids remembered.
    pub history_limit: usize,
    /// Distance an element moves per nudge.
    pub move_step: f64,
    /// Animate the camera onto every new selection.
    pub follow_selection: bool,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            direction_tolerance: 30.0,
            spawn_offset: 200.0,
            default_element_width: 120.0,
            default_element_height: 80.0,
            focus_padding: 100.0,
            focus_duration_ms: 300,
            history_limit: 10,
            move_step: 20.0,
            follow_selection: true,
        }
    }
}

impl NavigationConfig {
    pub fn default_element_size(&self) -> Size {
        Size::new(self.default_element_width, self.default_element_height)
    }

    pub fn focus_duration(&self) -> Duration {
        Duration::from_millis(self.focus_duration_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("navigation.direction_tolerance", self.direction_tolerance)?;
        positive("navigation.default_element_width", self.default_element_width)?;
        positive("navigation.default_element_height", self.default_element_height)?;
        non_negative("navigation.focus_padding", self.focus_padding)?;
        positive("navigation.move_step", self.move_step)?;
        if self.history_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "navigation.history_limit",
                value: 0.0,
            });
        }
        Ok(())
    }
}

/// Complete configuration for one canvas instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub viewport: ViewportConfig,
    pub navigation: NavigationConfig,
}

impl CanvasConfig {
    /// Parse and validate a JSON configuration. Missing keys take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            log::warn!("Rejected canvas config: {}", e);
            return Err(e);
        }
        Ok(config)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.viewport.validate()?;
        self.navigation.validate()
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = CanvasConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.viewport.min_zoom - 0.1).abs() < f64::EPSILON);
        assert!((config.viewport.max_zoom - 5.0).abs() < f64::EPSILON);
        assert_eq!(config.navigation.history_limit, 10);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = CanvasConfig::from_json(r#"{"viewport": {"max_zoom": 8.0}}"#).unwrap();
        assert!((config.viewport.max_zoom - 8.0).abs() < f64::EPSILON);
        assert!((config.viewport.min_zoom - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.navigation, NavigationConfig::default());
    }

    #[test]
    fn test_rejects_inverted_zoom_range() {
        let err = CanvasConfig::from_json(r#"{"viewport": {"min_zoom": 4.0, "max_zoom": 2.0}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::ZoomRange { .. }));
    }

    #[test]
    fn test_rejects_zero_history() {
        let err = CanvasConfig::from_json(r#"{"navigation": {"history_limit": 0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "navigation.history_limit", .. }));
    }

    #[test]
    fn test_rejects_bad_json() {
        let err = CanvasConfig::from_json("{").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_json_roundtrip() {
        let mut config = CanvasConfig::default();
        config.navigation.follow_selection = false;
        let parsed = CanvasConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
