//! The scorer seam: the externally supplied crop classifier.
//!
//! The engine drives an already-trained binary classifier and never looks
//! inside it — scores are only compared against thresholds. Errors raised by
//! the scorer abort the scan and surface to the caller untouched; any
//! retry/backoff policy belongs on the scorer's side of the seam.

use image::Rgb32FImage;

use crate::detect::DetectError;

/// Error type produced by a scorer implementation, passed through verbatim.
pub type ScorerError = Box<dyn std::error::Error + Send + Sync>;

/// Pluggable crop classification backend.
///
/// Implementations take a batch of `crop_size` × `crop_size` crops with
/// values normalized the way the model was trained, and return one score in
/// `[0, 1]` per crop, in input order.
///
/// Any `Fn(&[Rgb32FImage]) -> Result<Vec<f32>, ScorerError>` is a scorer, so
/// plain functions and closures work directly:
///
/// ```
/// use facescan::{CropScorer, ScorerError};
/// use image::Rgb32FImage;
///
/// fn constant(crops: &[Rgb32FImage]) -> Result<Vec<f32>, ScorerError> {
///     Ok(vec![0.5; crops.len()])
/// }
///
/// let scorer: &dyn CropScorer = &constant;
/// assert_eq!(scorer.score_batch(&[]).unwrap(), Vec::<f32>::new());
/// ```
pub trait CropScorer {
    /// Score one batch of crops. Must be length- and order-preserving.
    fn score_batch(&self, crops: &[Rgb32FImage]) -> Result<Vec<f32>, ScorerError>;
}

impl<F> CropScorer for F
where
    F: Fn(&[Rgb32FImage]) -> Result<Vec<f32>, ScorerError>,
{
    fn score_batch(&self, crops: &[Rgb32FImage]) -> Result<Vec<f32>, ScorerError> {
        self(crops)
    }
}

/// Invoke the scorer and enforce the length contract; a mismatch would
/// otherwise silently misattribute scores to crops.
pub(crate) fn score_batch_checked(
    scorer: &dyn CropScorer,
    crops: &[Rgb32FImage],
) -> Result<Vec<f32>, DetectError> {
    let scores = scorer.score_batch(crops).map_err(DetectError::Scorer)?;
    if scores.len() != crops.len() {
        return Err(DetectError::ScoreCountMismatch {
            expected: crops.len(),
            got: scores.len(),
        });
    }
    Ok(scores)
}
