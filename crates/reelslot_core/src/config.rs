use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables for the overlay editor. Every field has a default so a config
/// file only needs to name what it overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    /// Pointer-driven positions are kept within `[margin, 100 - margin]`.
    pub edge_margin: f64,
    pub nudge_step: f64,
    pub nudge_step_fast: f64,
    /// Half-width in pixels of the square hit box around each resize handle.
    pub handle_hit_size: f64,
    /// Pixels added to the measured text box for hit testing.
    pub text_padding: f64,
    pub min_font_size: f64,
    pub max_font_size: f64,
    pub min_resize_scale: f64,
    pub max_resize_scale: f64,
    /// Pixels of combined pointer travel that double the font size.
    pub resize_sensitivity: f64,
    /// Seconds a newly created overlay stays on screen.
    pub default_overlay_duration: f64,
    pub history_limit: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            edge_margin: 5.0,
            nudge_step: 1.0,
            nudge_step_fast: 5.0,
            handle_hit_size: 12.0,
            text_padding: 8.0,
            min_font_size: 2.0,
            max_font_size: 20.0,
            min_resize_scale: 0.5,
            max_resize_scale: 3.0,
            resize_sensitivity: 200.0,
            default_overlay_duration: 3.0,
            history_limit: 100,
        }
    }
}

impl EditorConfig {
    /// Load a config from a JSON file and validate it.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: EditorConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let finite = [
            self.edge_margin,
            self.nudge_step,
            self.nudge_step_fast,
            self.handle_hit_size,
            self.text_padding,
            self.min_font_size,
            self.max_font_size,
            self.min_resize_scale,
            self.max_resize_scale,
            self.resize_sensitivity,
            self.default_overlay_duration,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(CoreError::InvalidConfig("values must be finite".into()));
        }
        if !(0.0..50.0).contains(&self.edge_margin) {
            return Err(CoreError::InvalidConfig(format!(
                "edge_margin {} must be in [0, 50)",
                self.edge_margin
            )));
        }
        if self.min_font_size <= 0.0 || self.min_font_size > self.max_font_size {
            return Err(CoreError::InvalidConfig(format!(
                "font size range [{}, {}] is empty",
                self.min_font_size, self.max_font_size
            )));
        }
        if self.min_resize_scale <= 0.0 || self.min_resize_scale > self.max_resize_scale {
            return Err(CoreError::InvalidConfig(format!(
                "resize scale range [{}, {}] is empty",
                self.min_resize_scale, self.max_resize_scale
            )));
        }
        if self.resize_sensitivity <= 0.0 {
            return Err(CoreError::InvalidConfig(
                "resize_sensitivity must be positive".into(),
            ));
        }
        if self.default_overlay_duration <= 0.0 {
            return Err(CoreError::InvalidConfig(
                "default_overlay_duration must be positive".into(),
            ));
        }
        if self.handle_hit_size < 0.0 || self.text_padding < 0.0 {
            return Err(CoreError::InvalidConfig(
                "hit sizes must not be negative".into(),
            ));
        }
        if self.history_limit == 0 {
            return Err(CoreError::InvalidConfig(
                "history_limit must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn clamp_font_size(&self, size: f64) -> f64 {
        size.clamp(self.min_font_size, self.max_font_size)
    }
}
