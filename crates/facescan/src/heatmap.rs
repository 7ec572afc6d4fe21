//! Face-likelihood score surfaces.
//!
//! A heatmap is an f32 surface shaped like the scanned image. Each scored
//! candidate paints its score over its focus region; overlapping writes
//! overwrite rather than blend, so in raster order the last writer wins and
//! every painted pixel reflects the most locally-relevant crop.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma, Rgb32FImage};

use crate::candidates::CandidateBatches;
use crate::config::{PyramidConfig, ScanConfig};
use crate::detect::DetectError;
use crate::geometry::BoundingBox;
use crate::pyramid::{
    rescale_by_factor, scale_to_fit_smaller_side, working_scale, ScaleSequence, MAX_WORKING_SIZE,
};
use crate::scorer::{score_batch_checked, CropScorer};

/// Per-pixel face score surface, same dimensions as the scanned image.
pub type Heatmap = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Assign `score` to every surface pixel inside the region, clamped to the
/// surface bounds. Plain overwrite, no blending.
pub(crate) fn paint(surface: &mut Heatmap, region: &BoundingBox, score: f32) {
    let (width, height) = surface.dimensions();
    let x0 = region.left.round().clamp(0.0, width as f32) as u32;
    let y0 = region.top.round().clamp(0.0, height as f32) as u32;
    let x1 = region.right.round().clamp(0.0, width as f32) as u32;
    let y1 = region.bottom.round().clamp(0.0, height as f32) as u32;
    for y in y0..y1 {
        for x in x0..x1 {
            surface.put_pixel(x, y, Luma([score]));
        }
    }
}

/// Scan the image at a single scale and paint candidate scores into a
/// zero-initialized surface.
pub fn compute_heatmap(
    image: &Rgb32FImage,
    config: &ScanConfig,
    scorer: &dyn CropScorer,
) -> Result<Heatmap, DetectError> {
    let mut surface = Heatmap::new(image.width(), image.height());
    for batch in CandidateBatches::new(image, config)? {
        let (regions, crops): (Vec<BoundingBox>, Vec<Rgb32FImage>) = batch
            .into_iter()
            .map(|candidate| (candidate.focus_region, candidate.pixels))
            .unzip();
        let scores = score_batch_checked(scorer, &crops)?;
        for (region, score) in regions.iter().zip(scores) {
            paint(&mut surface, region, score);
        }
    }
    Ok(surface)
}

/// Scan the image across the whole scale pyramid and combine the per-level
/// surfaces by pointwise maximum.
///
/// Each level's surface is resized back to the base dimensions before
/// combining, so a face visible at one scale is never suppressed by low
/// scores at another. Oversized inputs are pre-shrunk like the detection
/// path; the combined surface is resized back to the input dimensions.
pub fn compute_multiscale_heatmap(
    image: &Rgb32FImage,
    config: &PyramidConfig,
    scorer: &dyn CropScorer,
) -> Result<Heatmap, DetectError> {
    config.validate()?;

    let shrunk;
    let working: &Rgb32FImage = match working_scale(image.width(), image.height()) {
        Some(_) => {
            shrunk = scale_to_fit_smaller_side(image, MAX_WORKING_SIZE);
            &shrunk
        }
        None => image,
    };
    let (base_width, base_height) = working.dimensions();

    let mut combined = Heatmap::new(base_width, base_height);
    for scale in ScaleSequence::new(base_width, base_height, config) {
        let level = rescale_by_factor(working, scale);
        let surface = compute_heatmap(&level, &config.scan, scorer)?;
        let lifted = imageops::resize(&surface, base_width, base_height, FilterType::Triangle);
        for (acc, px) in combined.pixels_mut().zip(lifted.pixels()) {
            acc.0[0] = acc.0[0].max(px.0[0]);
        }
        tracing::debug!(
            "heatmap level {}x{} at scale {:.3}",
            level.width(),
            level.height(),
            scale
        );
    }

    if combined.dimensions() != image.dimensions() {
        combined = imageops::resize(&combined, image.width(), image.height(), FilterType::Triangle);
    }
    Ok(combined)
}
