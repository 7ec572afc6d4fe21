//! Detection pipeline: threshold candidate scores, deduplicate per scale,
//! reconcile coordinates across the pyramid, deduplicate once more.

use image::Rgb32FImage;
use serde::{Deserialize, Serialize};

use crate::candidates::CandidateBatches;
use crate::config::{ConfigError, PyramidConfig, ScanConfig};
use crate::dedup::suppress;
use crate::geometry::{BoundingBox, GeometryError};
use crate::pyramid::{
    rescale_by_factor, scale_to_fit_smaller_side, working_scale, ScaleSequence, MAX_WORKING_SIZE,
};
use crate::scorer::{score_batch_checked, CropScorer, ScorerError};

/// IOU overlap above which two detections are considered duplicates of one
/// face, both within a scale and across scales.
pub const DEDUP_IOU_THRESHOLD: f32 = 0.2;

// ── Error type ─────────────────────────────────────────────────────────────

/// Errors that abort a detection run.
#[derive(Debug)]
pub enum DetectError {
    /// Scan or pyramid parameters were rejected.
    Config(ConfigError),
    /// Box geometry failed while merging detections.
    Geometry(GeometryError),
    /// The external scorer failed; the inner error is passed through
    /// unmodified and exposed via `source()`.
    Scorer(ScorerError),
    /// The scorer broke the one-score-per-crop contract.
    ScoreCountMismatch { expected: usize, got: usize },
}

impl std::fmt::Display for DetectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid configuration: {}", e),
            Self::Geometry(e) => write!(f, "geometry failure: {}", e),
            Self::Scorer(e) => write!(f, "scorer failed: {}", e),
            Self::ScoreCountMismatch { expected, got } => write!(
                f,
                "scorer returned {} scores for {} crops",
                got, expected
            ),
        }
    }
}

impl std::error::Error for DetectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Geometry(e) => Some(e),
            Self::Scorer(e) => {
                let inner: &(dyn std::error::Error + 'static) = e.as_ref();
                Some(inner)
            }
            Self::ScoreCountMismatch { .. } => None,
        }
    }
}

impl From<ConfigError> for DetectError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<GeometryError> for DetectError {
    fn from(e: GeometryError) -> Self {
        Self::Geometry(e)
    }
}

// ── Detection ──────────────────────────────────────────────────────────────

/// One detected face: a bounding box and the classifier score that kept it.
///
/// Two detections are equal when their scores match and their boxes are
/// geometrically equal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Face location, in the coordinate frame of the scanned image (or the
    /// original input frame after a multi-scale run).
    pub bounding_box: BoundingBox,
    /// Classifier score in [0, 1].
    pub score: f32,
}

// ── Pipeline ───────────────────────────────────────────────────────────────

/// Detect faces at a single image scale.
///
/// Candidates scoring strictly above `score_threshold` become detections
/// (bounding box = crop region) and are deduplicated in scan order.
pub fn detect_faces_single_scale(
    image: &Rgb32FImage,
    config: &ScanConfig,
    scorer: &dyn CropScorer,
    score_threshold: f32,
) -> Result<Vec<Detection>, DetectError> {
    let mut detections = Vec::new();
    let mut scored = 0usize;
    for batch in CandidateBatches::new(image, config)? {
        let (regions, crops): (Vec<BoundingBox>, Vec<Rgb32FImage>) = batch
            .into_iter()
            .map(|candidate| (candidate.crop_region, candidate.pixels))
            .unzip();
        let scores = score_batch_checked(scorer, &crops)?;
        scored += crops.len();
        for (region, score) in regions.into_iter().zip(scores) {
            if score > score_threshold {
                detections.push(Detection {
                    bounding_box: region,
                    score,
                });
            }
        }
    }
    tracing::debug!(
        "{} of {} candidates above threshold {}",
        detections.len(),
        scored,
        score_threshold
    );
    suppress(detections, DEDUP_IOU_THRESHOLD).map_err(DetectError::from)
}

/// Detect faces across the full scale pyramid.
///
/// Oversized inputs are pre-shrunk so the smaller side is
/// [`MAX_WORKING_SIZE`]; every per-scale detection is lifted back into the
/// original input frame before the final cross-scale deduplication.
pub fn detect_faces(
    image: &Rgb32FImage,
    config: &PyramidConfig,
    scorer: &dyn CropScorer,
    score_threshold: f32,
) -> Result<Vec<Detection>, DetectError> {
    config.validate()?;

    let preshrink = working_scale(image.width(), image.height());
    let shrunk;
    let working: &Rgb32FImage = match preshrink {
        Some(_) => {
            shrunk = scale_to_fit_smaller_side(image, MAX_WORKING_SIZE);
            &shrunk
        }
        None => image,
    };

    let mut collected = Vec::new();
    for scale in ScaleSequence::new(working.width(), working.height(), config) {
        let level = rescale_by_factor(working, scale);
        let found = detect_faces_single_scale(&level, &config.scan, scorer, score_threshold)?;
        tracing::debug!("{} detections at scale {:.3}", found.len(), scale);
        let lift = 1.0 / scale;
        collected.extend(found.into_iter().map(|detection| Detection {
            bounding_box: detection.bounding_box.scaled(lift),
            score: detection.score,
        }));
    }

    let mut merged = suppress(collected, DEDUP_IOU_THRESHOLD)?;
    if let Some(factor) = preshrink {
        let lift = 1.0 / factor;
        for detection in &mut merged {
            detection.bounding_box = detection.bounding_box.scaled(lift);
        }
    }
    tracing::info!("{} detections after dedup", merged.len());
    Ok(merged)
}
