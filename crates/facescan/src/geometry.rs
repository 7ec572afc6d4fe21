//! Bounding-box primitives shared by the scanning and deduplication stages.
//!
//! Boxes are axis-aligned with `f32` edges: coordinates stay fractional while
//! detections move between pyramid scales and are only rounded where a box
//! indexes pixels.

use serde::{Deserialize, Serialize};

// ── Error type ─────────────────────────────────────────────────────────────

/// Errors raised by box geometry operations.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// IOU requested between two zero-area boxes; the union area is zero and
    /// the ratio undefined. Signals a malformed box upstream.
    DegenerateBoxes,
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DegenerateBoxes => write!(f, "IOU of two zero-area boxes is undefined"),
        }
    }
}

impl std::error::Error for GeometryError {}

// ── Types ──────────────────────────────────────────────────────────────────

/// Axis-aligned box in pixel coordinates.
///
/// Used for crop regions, focus regions, detection bounding boxes, and image
/// bounds. Every box the engine constructs is non-degenerate
/// (`right > left`, `bottom > top`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// X coordinate of the left edge.
    pub left: f32,
    /// Y coordinate of the top edge.
    pub top: f32,
    /// X coordinate of the right edge.
    pub right: f32,
    /// Y coordinate of the bottom edge.
    pub bottom: f32,
}

impl BoundingBox {
    /// Construct from the four edges.
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Construct from the top-left corner and a size.
    pub fn from_origin(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self::new(left, top, left + width, top + height)
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// All four edges multiplied by `factor`, scaling about the coordinate
    /// origin. Callers moving boxes between pyramid levels scale the whole
    /// coordinate frame with the same factor.
    pub fn scaled(&self, factor: f32) -> Self {
        Self::new(
            self.left * factor,
            self.top * factor,
            self.right * factor,
            self.bottom * factor,
        )
    }

    /// Reflect across the vertical centerline of a frame `frame_width` wide.
    pub fn flipped_horizontal(&self, frame_width: f32) -> Self {
        Self::new(
            frame_width - self.right,
            self.top,
            frame_width - self.left,
            self.bottom,
        )
    }
}

// ── Operations ─────────────────────────────────────────────────────────────

/// Intersection over union of two boxes.
///
/// Returns 0 for non-overlapping boxes and for a zero-area box paired with a
/// regular one. Fails only when both boxes have zero area.
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> Result<f32, GeometryError> {
    let a_area = a.area();
    let b_area = b.area();
    if a_area <= 0.0 && b_area <= 0.0 {
        return Err(GeometryError::DegenerateBoxes);
    }
    if a_area <= 0.0 || b_area <= 0.0 {
        return Ok(0.0);
    }

    let overlap_w = (a.right.min(b.right) - a.left.max(b.left)).max(0.0);
    let overlap_h = (a.bottom.min(b.bottom) - a.top.max(b.top)).max(0.0);
    let intersection = overlap_w * overlap_h;
    let union = a_area + b_area - intersection;
    Ok(intersection / union)
}

/// Smallest face size, in pixels, worth searching for in an image whose
/// smaller dimension is `min_dimension`: the larger of an absolute floor and
/// a fraction of the image.
pub fn smallest_expected_face_size(
    min_dimension: u32,
    min_face_size: u32,
    min_face_to_image_ratio: f32,
) -> u32 {
    min_face_size.max((min_dimension as f32 * min_face_to_image_ratio).round() as u32)
}
