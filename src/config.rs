//! Configuration types for the pipeline controller

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the controller responds to a non-image submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputRejection {
    /// Ignore the submission without surfacing anything (file-picker variant,
    /// where the picker already filters to images)
    Silent,
    /// Return an error to the caller (drag-drop variant, where arbitrary
    /// payloads can arrive)
    Error,
}

impl Default for InputRejection {
    fn default() -> Self {
        Self::Silent
    }
}

impl std::fmt::Display for InputRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Silent => write!(f, "silent"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Configuration for a [`crate::controller::PipelineController`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Cadence of simulated progress ticks while a request is in flight
    pub progress_tick: Duration,
    /// Asymptotic ceiling the simulated progress climbs toward (1-99)
    pub progress_ceiling: f32,
    /// Non-image submission handling
    pub input_rejection: InputRejection,
    /// Suffix appended after the epoch-millis prefix in download names
    pub download_suffix: String,
}

impl PipelineConfig {
    /// Create a new configuration builder
    #[must_use]
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            progress_tick: Duration::from_millis(200),
            progress_ceiling: 90.0,
            input_rejection: InputRejection::default(),
            download_suffix: "bg-removed.png".to_owned(),
        }
    }
}

/// Builder for [`PipelineConfig`]
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Create a builder seeded with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the simulated progress tick cadence
    #[must_use]
    pub fn progress_tick(mut self, tick: Duration) -> Self {
        self.config.progress_tick = tick;
        self
    }

    /// Set the asymptotic progress ceiling (1-99)
    #[must_use]
    pub fn progress_ceiling(mut self, ceiling: f32) -> Self {
        self.config.progress_ceiling = ceiling;
        self
    }

    /// Set the non-image submission handling variant
    #[must_use]
    pub fn input_rejection(mut self, rejection: InputRejection) -> Self {
        self.config.input_rejection = rejection;
        self
    }

    /// Set the download-name suffix
    #[must_use]
    pub fn download_suffix<S: Into<String>>(mut self, suffix: S) -> Self {
        self.config.download_suffix = suffix.into();
        self
    }

    /// Validate and build the configuration
    pub fn build(self) -> Result<PipelineConfig> {
        if self.config.progress_tick.is_zero() {
            return Err(PipelineError::invalid_config(
                "progress_tick must be non-zero",
            ));
        }
        if !(1.0..=99.0).contains(&self.config.progress_ceiling) {
            return Err(PipelineError::config_value_error(
                "progress_ceiling",
                self.config.progress_ceiling,
                "1-99",
            ));
        }
        if self.config.download_suffix.is_empty() {
            return Err(PipelineError::invalid_config(
                "download_suffix must not be empty",
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::builder().build().unwrap();
        assert_eq!(config.progress_tick, Duration::from_millis(200));
        assert!((config.progress_ceiling - 90.0).abs() < f32::EPSILON);
        assert_eq!(config.input_rejection, InputRejection::Silent);
        assert_eq!(config.download_suffix, "bg-removed.png");
    }

    #[test]
    fn test_builder_rejects_out_of_range_ceiling() {
        let err = PipelineConfig::builder()
            .progress_ceiling(100.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig(_)));

        assert!(PipelineConfig::builder().progress_ceiling(0.5).build().is_err());
        assert!(PipelineConfig::builder().progress_ceiling(99.0).build().is_ok());
    }

    #[test]
    fn test_builder_rejects_zero_tick_and_empty_suffix() {
        assert!(PipelineConfig::builder()
            .progress_tick(Duration::ZERO)
            .build()
            .is_err());
        assert!(PipelineConfig::builder().download_suffix("").build().is_err());
    }
}
