//! Duplicate-detection merging via IOU clustering.
//!
//! Both policies make a single greedy left-to-right pass over the input and
//! attach each detection to the first sufficiently-overlapping cluster, so
//! the result depends on input order. Callers preserve scan order for
//! reproducible output; the input is deliberately not re-sorted by score.

use crate::detect::Detection;
use crate::geometry::{iou, BoundingBox, GeometryError};

/// Reduce overlapping detections by keeping the best of each cluster.
///
/// Each incoming detection is compared against the surviving representatives
/// in order; the first one overlapping above `iou_threshold` is replaced by
/// whichever of the two scores higher (ties keep the incumbent), and the scan
/// stops there. Detections that overlap nothing start a new cluster.
pub fn suppress(
    detections: Vec<Detection>,
    iou_threshold: f32,
) -> Result<Vec<Detection>, GeometryError> {
    let mut kept: Vec<Detection> = Vec::new();
    'outer: for detection in detections {
        for survivor in kept.iter_mut() {
            if iou(&survivor.bounding_box, &detection.bounding_box)? > iou_threshold {
                if detection.score > survivor.score {
                    *survivor = detection;
                }
                continue 'outer;
            }
        }
        kept.push(detection);
    }
    Ok(kept)
}

/// Reduce overlapping detections by merging each cluster geometrically.
///
/// Clustering uses the same greedy first-match rule as [`suppress`], but a
/// detection joins a cluster when it overlaps *any* current member above
/// `iou_threshold`, not only the representative. Each cluster collapses to
/// the coordinate-wise mean of its member boxes, rounded to the nearest
/// integer, carrying the maximum member score.
pub fn average(
    detections: Vec<Detection>,
    iou_threshold: f32,
) -> Result<Vec<Detection>, GeometryError> {
    let mut clusters: Vec<Vec<Detection>> = Vec::new();
    'outer: for detection in detections {
        for cluster in clusters.iter_mut() {
            if overlaps_any(cluster, &detection, iou_threshold)? {
                cluster.push(detection);
                continue 'outer;
            }
        }
        clusters.push(vec![detection]);
    }
    Ok(clusters.into_iter().map(merge_cluster).collect())
}

fn overlaps_any(
    cluster: &[Detection],
    detection: &Detection,
    iou_threshold: f32,
) -> Result<bool, GeometryError> {
    for member in cluster {
        if iou(&member.bounding_box, &detection.bounding_box)? > iou_threshold {
            return Ok(true);
        }
    }
    Ok(false)
}

fn merge_cluster(cluster: Vec<Detection>) -> Detection {
    let n = cluster.len() as f32;
    let mut left = 0.0;
    let mut top = 0.0;
    let mut right = 0.0;
    let mut bottom = 0.0;
    let mut score = f32::NEG_INFINITY;
    for member in &cluster {
        left += member.bounding_box.left;
        top += member.bounding_box.top;
        right += member.bounding_box.right;
        bottom += member.bounding_box.bottom;
        score = score.max(member.score);
    }
    Detection {
        bounding_box: BoundingBox::new(
            (left / n).round(),
            (top / n).round(),
            (right / n).round(),
            (bottom / n).round(),
        ),
        score,
    }
}
