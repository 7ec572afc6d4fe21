//! Scan and pyramid configuration.

use serde::{Deserialize, Serialize};

// ── Error type ─────────────────────────────────────────────────────────────

/// Errors raised when a configuration is rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Stride is zero or exceeds the crop size.
    InvalidScanParameters { crop_size: u32, stride: u32 },
    /// Batch size is zero; the scan would never emit a batch.
    InvalidBatchSize,
    /// Pyramid rescaling ratio is outside the open interval (0, 1).
    InvalidRescalingRatio { ratio: f32 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidScanParameters { crop_size, stride } => write!(
                f,
                "stride must satisfy 1 <= stride <= crop_size, got stride {} for crop size {}",
                stride, crop_size
            ),
            Self::InvalidBatchSize => write!(f, "batch size must be at least 1"),
            Self::InvalidRescalingRatio { ratio } => write!(
                f,
                "image rescaling ratio must lie strictly between 0 and 1, got {}",
                ratio
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

// ── Scan configuration ─────────────────────────────────────────────────────

/// Sliding-window scan parameters for a single image scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Side length of the square crops handed to the scorer (pixels).
    pub crop_size: u32,
    /// Distance between successive crop origins (pixels); controls overlap.
    pub stride: u32,
    /// Number of crops per scorer invocation. Explicit — the engine never
    /// derives it from host machine properties.
    pub batch_size: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            crop_size: 224,
            stride: 112,
            batch_size: 8,
        }
    }
}

impl ScanConfig {
    /// Build a validated scan configuration.
    pub fn new(crop_size: u32, stride: u32, batch_size: usize) -> Result<Self, ConfigError> {
        let config = Self {
            crop_size,
            stride,
            batch_size,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the parameter invariants. Fields are public, so callers that
    /// mutate a configuration re-validate here; candidate generation also
    /// validates before scanning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stride == 0 || self.stride > self.crop_size {
            return Err(ConfigError::InvalidScanParameters {
                crop_size: self.crop_size,
                stride: self.stride,
            });
        }
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize);
        }
        Ok(())
    }
}

// ── Pyramid configuration ──────────────────────────────────────────────────

/// Multi-scale search parameters: how far zoomed-in the search starts and how
/// quickly it zooms out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PyramidConfig {
    /// Per-scale scan parameters.
    pub scan: ScanConfig,
    /// Absolute lower bound on the face size searched for (pixels in the
    /// working frame).
    pub min_face_size: u32,
    /// Lower bound on face size as a fraction of the image's smaller
    /// dimension.
    pub min_face_to_image_ratio: f32,
    /// Factor applied to the image scale between pyramid levels; each level
    /// shrinks the image, searching for progressively larger faces.
    pub image_rescaling_ratio: f32,
}

impl Default for PyramidConfig {
    fn default() -> Self {
        Self {
            scan: ScanConfig::default(),
            min_face_size: 50,
            min_face_to_image_ratio: 0.15,
            image_rescaling_ratio: 0.8,
        }
    }
}

impl PyramidConfig {
    /// Build a validated pyramid configuration.
    pub fn new(
        scan: ScanConfig,
        min_face_size: u32,
        min_face_to_image_ratio: f32,
        image_rescaling_ratio: f32,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            scan,
            min_face_size,
            min_face_to_image_ratio,
            image_rescaling_ratio,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the parameter invariants, including the nested scan config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scan.validate()?;
        if !(self.image_rescaling_ratio > 0.0 && self.image_rescaling_ratio < 1.0) {
            return Err(ConfigError::InvalidRescalingRatio {
                ratio: self.image_rescaling_ratio,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_defaults_are_stable() {
        let scan = ScanConfig::default();
        assert_eq!(scan.crop_size, 224);
        assert_eq!(scan.stride, 112);
        assert_eq!(scan.batch_size, 8);
        assert!(scan.validate().is_ok());
    }

    #[test]
    fn pyramid_defaults_are_stable() {
        let config = PyramidConfig::default();
        assert_eq!(config.min_face_size, 50);
        assert!((config.min_face_to_image_ratio - 0.15).abs() < 1e-6);
        assert!((config.image_rescaling_ratio - 0.8).abs() < 1e-6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn stride_larger_than_crop_is_rejected() {
        assert_eq!(
            ScanConfig::new(4, 5, 8),
            Err(ConfigError::InvalidScanParameters {
                crop_size: 4,
                stride: 5
            })
        );
    }

    #[test]
    fn stride_equal_to_crop_is_accepted() {
        assert!(ScanConfig::new(4, 4, 8).is_ok());
    }

    #[test]
    fn zero_stride_is_rejected() {
        assert!(matches!(
            ScanConfig::new(4, 0, 8),
            Err(ConfigError::InvalidScanParameters { .. })
        ));
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        assert_eq!(ScanConfig::new(4, 2, 0), Err(ConfigError::InvalidBatchSize));
    }

    #[test]
    fn rescaling_ratio_bounds_are_exclusive() {
        let scan = ScanConfig::default();
        assert!(PyramidConfig::new(scan, 50, 0.15, 1.0).is_err());
        assert!(PyramidConfig::new(scan, 50, 0.15, 0.0).is_err());
        assert!(PyramidConfig::new(scan, 50, 0.15, 0.99).is_ok());
    }

    #[test]
    fn config_json_round_trip() {
        let config = PyramidConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: PyramidConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: PyramidConfig = serde_json::from_str(r#"{"min_face_size": 30}"#).unwrap();
        assert_eq!(config.min_face_size, 30);
        assert_eq!(config.scan, ScanConfig::default());
        assert!((config.image_rescaling_ratio - 0.8).abs() < 1e-6);
    }
}
