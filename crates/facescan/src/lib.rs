//! facescan — multi-scale sliding-window face localization.
//!
//! Drives an externally supplied crop classifier over an image pyramid and
//! turns its scores into deduplicated face detections. The pipeline stages
//! are:
//!
//! 1. **Candidates** – row-major sliding-window enumeration of fixed-size
//!    crops, grouped into scoring batches.
//! 2. **Scoring** – one classifier call per batch through the [`CropScorer`]
//!    seam; the engine never looks inside the model.
//! 3. **Thresholding** – candidates scoring above a caller-chosen threshold
//!    become detections; alternatively, scores are painted into a
//!    [`Heatmap`].
//! 4. **Pyramid** – the scan repeats over a geometric sequence of image
//!    scales so faces of unknown size are found with one crop window.
//! 5. **Dedup** – overlapping detections are merged by IOU clustering,
//!    either keeping the best box ([`suppress`]) or averaging the cluster
//!    ([`average`]).
//!
//! # Public API
//! - [`FaceDetector`] as the primary entry point
//! - [`ScanConfig`] / [`PyramidConfig`] for tuning
//! - free functions ([`detect_faces`], [`compute_heatmap`], …) for callers
//!   that drive single stages themselves
//!
//! The engine is single-threaded and synchronous; the only blocking external
//! call is the scorer. Nothing is shared between runs, so independent
//! detectors may serve separate threads.

mod candidates;
mod config;
mod dedup;
mod detect;
mod detector;
mod geometry;
mod heatmap;
mod pyramid;
mod scorer;

pub use candidates::{CandidateBatches, CandidateGrid, FaceCandidate};
pub use config::{ConfigError, PyramidConfig, ScanConfig};
pub use dedup::{average, suppress};
pub use detect::{
    detect_faces, detect_faces_single_scale, DetectError, Detection, DEDUP_IOU_THRESHOLD,
};
pub use detector::{FaceDetector, DEFAULT_SCORE_THRESHOLD};
pub use geometry::{iou, smallest_expected_face_size, BoundingBox, GeometryError};
pub use heatmap::{compute_heatmap, compute_multiscale_heatmap, Heatmap};
pub use pyramid::{
    rescale_by_factor, scale_to_fit_smaller_side, ScaleSequence, MAX_WORKING_SIZE,
};
pub use scorer::{CropScorer, ScorerError};
