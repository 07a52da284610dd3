use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse pipeline config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid pipeline config: {0}")]
    Invalid(String),
}

/// Tuning constants for the extraction pipeline.
///
/// The defaults are the values the form layout was tuned against. Region
/// percentages are not configurable here; see [`crate::regions`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Every image is resized to this width before any region is cropped.
    pub target_width: u32,
    /// Contrast factor applied to the whole page (1.0 = unchanged).
    pub contrast_factor: f32,
    /// Regions scoring below this (0–100) are flagged and, for numeric
    /// field types, retried inverted.
    pub confidence_bar: f32,
    pub min_region_width: u32,
    pub min_region_height: u32,
    pub region_padding: u32,
    pub skew_range_degrees: f32,
    pub skew_step_degrees: f32,
    pub skew_deadband_degrees: f32,
    /// Radius of the square structuring element used for opening.
    pub opening_radius: u8,
    /// Tesseract language code.
    pub language: String,
    /// Directory containing `tessdata`; `None` uses the system default.
    pub tessdata_dir: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_width: 1700,
            contrast_factor: 2.6,
            confidence_bar: 70.0,
            min_region_width: 200,
            min_region_height: 50,
            region_padding: 4,
            skew_range_degrees: 10.0,
            skew_step_degrees: 0.5,
            skew_deadband_degrees: 0.3,
            opening_radius: 1,
            language: "eng".to_string(),
            tessdata_dir: None,
        }
    }
}

impl PipelineConfig {
    /// Load overrides from TOML; keys that are absent keep their defaults.
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = toml::from_str(toml_content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_width == 0 {
            return Err(ConfigError::Invalid("target_width must be positive".into()));
        }
        if self.skew_step_degrees <= 0.0 {
            return Err(ConfigError::Invalid("skew_step_degrees must be positive".into()));
        }
        if self.skew_range_degrees < 0.0 || self.skew_range_degrees >= 45.0 {
            return Err(ConfigError::Invalid(format!(
                "skew_range_degrees must be in [0, 45), got {}",
                self.skew_range_degrees
            )));
        }
        if !(0.0..=100.0).contains(&self.confidence_bar) {
            return Err(ConfigError::Invalid(format!(
                "confidence_bar must be in [0, 100], got {}",
                self.confidence_bar
            )));
        }
        if self.min_region_width == 0 || self.min_region_height == 0 {
            return Err(ConfigError::Invalid("minimum region size must be positive".into()));
        }
        Ok(())
    }
}
