//! High-level detection API.
//!
//! [`FaceDetector`] is the primary entry point: it pairs a pyramid
//! configuration and score threshold with the caller's scorer. Create once,
//! detect on many images.

use image::Rgb32FImage;

use crate::config::PyramidConfig;
use crate::detect::{detect_faces, detect_faces_single_scale, DetectError, Detection};
use crate::heatmap::{compute_heatmap, compute_multiscale_heatmap, Heatmap};
use crate::scorer::CropScorer;

/// Default score threshold; production values range 0.2–0.9 depending on the
/// precision/recall trade-off wanted.
pub const DEFAULT_SCORE_THRESHOLD: f32 = 0.5;

/// Primary detection interface.
///
/// # Examples
///
/// ```
/// use facescan::{FaceDetector, ScorerError};
/// use image::Rgb32FImage;
///
/// fn score(crops: &[Rgb32FImage]) -> Result<Vec<f32>, ScorerError> {
///     Ok(vec![0.0; crops.len()]) // stand-in for the real classifier
/// }
///
/// let detector = FaceDetector::new(Box::new(score));
/// let image = Rgb32FImage::new(320, 240);
/// let faces = detector.detect(&image).unwrap();
/// assert!(faces.is_empty());
/// ```
pub struct FaceDetector {
    config: PyramidConfig,
    score_threshold: f32,
    scorer: Box<dyn CropScorer>,
}

impl FaceDetector {
    /// Create a detector around the given scorer with default configuration.
    pub fn new(scorer: Box<dyn CropScorer>) -> Self {
        Self {
            config: PyramidConfig::default(),
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            scorer,
        }
    }

    /// Create with full config control.
    pub fn with_config(scorer: Box<dyn CropScorer>, config: PyramidConfig) -> Self {
        Self {
            config,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            scorer,
        }
    }

    /// Set the score threshold above which a candidate becomes a detection.
    pub fn with_score_threshold(mut self, score_threshold: f32) -> Self {
        self.score_threshold = score_threshold;
        self
    }

    /// Access the current configuration.
    pub fn config(&self) -> &PyramidConfig {
        &self.config
    }

    /// Mutable access to configuration for post-construction tuning.
    pub fn config_mut(&mut self) -> &mut PyramidConfig {
        &mut self.config
    }

    /// Detect faces across the full scale pyramid, in input coordinates.
    pub fn detect(&self, image: &Rgb32FImage) -> Result<Vec<Detection>, DetectError> {
        detect_faces(image, &self.config, self.scorer.as_ref(), self.score_threshold)
    }

    /// Detect faces at the image's native scale only.
    pub fn detect_single_scale(&self, image: &Rgb32FImage) -> Result<Vec<Detection>, DetectError> {
        detect_faces_single_scale(
            image,
            &self.config.scan,
            self.scorer.as_ref(),
            self.score_threshold,
        )
    }

    /// Compute the single-scale score heatmap.
    pub fn heatmap(&self, image: &Rgb32FImage) -> Result<Heatmap, DetectError> {
        compute_heatmap(image, &self.config.scan, self.scorer.as_ref())
    }

    /// Compute the max-combined heatmap across the scale pyramid.
    pub fn multiscale_heatmap(&self, image: &Rgb32FImage) -> Result<Heatmap, DetectError> {
        compute_multiscale_heatmap(image, &self.config, self.scorer.as_ref())
    }
}
