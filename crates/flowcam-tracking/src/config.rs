//! Update loop configuration.

use crate::error::{TrackingError, TrackingResult};
use flowcam_vision::DetectParams;
use serde::{Deserialize, Serialize};

/// How often and how aggressively features are re-seeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Discard all tracks and detect afresh every this many frames.
    pub reseed_interval: u64,
    /// Maximum number of features per detection.
    pub max_features: usize,
    /// Minimum corner quality relative to the best corner.
    pub quality_level: f32,
    /// Minimum pixel distance between detected features.
    pub min_distance: f32,
    /// Run flow estimation on the re-seed frame too, pairing the fresh
    /// features with the previous frame. When false, re-seed frames only
    /// detect.
    pub track_after_reseed: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            reseed_interval: 300,
            max_features: 300,
            quality_level: 0.005,
            min_distance: 3.0,
            track_after_reseed: true,
        }
    }
}

impl TrackerConfig {
    pub fn detect_params(&self) -> DetectParams {
        DetectParams {
            max_count: self.max_features,
            quality_level: self.quality_level,
            min_distance: self.min_distance,
        }
    }

    pub fn validate(&self) -> TrackingResult<()> {
        if self.reseed_interval == 0 {
            return Err(TrackingError::InvalidConfig {
                field: "reseed_interval",
                reason: "must be at least 1".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.quality_level) {
            return Err(TrackingError::InvalidConfig {
                field: "quality_level",
                reason: format!("{} is outside [0, 1]", self.quality_level),
            });
        }
        if !self.min_distance.is_finite() || self.min_distance < 0.0 {
            return Err(TrackingError::InvalidConfig {
                field: "min_distance",
                reason: format!("{} is not a non-negative distance", self.min_distance),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = TrackerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.detect_params(), DetectParams::default());
        assert!(config.track_after_reseed);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = TrackerConfig {
            reseed_interval: 0,
            ..TrackerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TrackingError::InvalidConfig {
                field: "reseed_interval",
                ..
            })
        ));
    }

    #[test]
    fn test_quality_out_of_range_rejected() {
        let config = TrackerConfig {
            quality_level: 1.5,
            ..TrackerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json() {
        let config: TrackerConfig = serde_json::from_str(r#"{ "reseed_interval": 60 }"#).unwrap();
        assert_eq!(config.reseed_interval, 60);
        assert_eq!(config.max_features, 300);
    }
}
