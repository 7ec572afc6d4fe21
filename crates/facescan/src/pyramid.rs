//! Image pyramid construction for the multi-scale search.
//!
//! The search starts at the largest scale — the one that maps the smallest
//! expected face onto exactly one crop window — and zooms out geometrically
//! until the image no longer holds a single crop. Levels are plain bilinear
//! resamples; detections found on a level are lifted back to the base frame
//! by dividing through the level's scale factor.

use image::imageops::{self, FilterType};
use image::Rgb32FImage;

use crate::config::PyramidConfig;
use crate::geometry::smallest_expected_face_size;

/// Images whose smaller side exceeds this are pre-shrunk before the pyramid
/// is built; final detections are scaled back as the very last step.
pub const MAX_WORKING_SIZE: u32 = 500;

/// Geometric sequence of pyramid scale factors for one image.
///
/// The first factor maps [`smallest_expected_face_size`] onto `crop_size`
/// pixels; each following factor is the previous one times
/// `image_rescaling_ratio`. The sequence ends once the rescaled image's
/// smaller dimension would not exceed the crop size.
pub struct ScaleSequence {
    scale: f32,
    ratio: f32,
    crop_size: u32,
    min_dimension: u32,
}

impl ScaleSequence {
    pub fn new(width: u32, height: u32, config: &PyramidConfig) -> Self {
        let min_dimension = width.min(height);
        let face_size = smallest_expected_face_size(
            min_dimension,
            config.min_face_size,
            config.min_face_to_image_ratio,
        )
        .max(1);
        Self {
            scale: config.scan.crop_size as f32 / face_size as f32,
            ratio: config.image_rescaling_ratio,
            crop_size: config.scan.crop_size,
            min_dimension,
        }
    }
}

impl Iterator for ScaleSequence {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let rescaled = (self.min_dimension as f32 * self.scale).round() as u32;
        if rescaled <= self.crop_size {
            return None;
        }
        let current = self.scale;
        self.scale *= self.ratio;
        Some(current)
    }
}

/// Resample to `round(dimension * factor)` per axis, bilinear.
pub fn rescale_by_factor(image: &Rgb32FImage, factor: f32) -> Rgb32FImage {
    let width = (image.width() as f32 * factor).round().max(1.0) as u32;
    let height = (image.height() as f32 * factor).round().max(1.0) as u32;
    imageops::resize(image, width, height, FilterType::Triangle)
}

/// Rescale so the smaller side becomes `size`, keeping the aspect ratio.
pub fn scale_to_fit_smaller_side(image: &Rgb32FImage, size: u32) -> Rgb32FImage {
    let min_dimension = image.width().min(image.height());
    rescale_by_factor(image, size as f32 / min_dimension as f32)
}

/// Pre-shrink factor for an oversized image, `None` when the image is
/// already within the working size.
pub(crate) fn working_scale(width: u32, height: u32) -> Option<f32> {
    let min_dimension = width.min(height);
    (min_dimension > MAX_WORKING_SIZE).then(|| MAX_WORKING_SIZE as f32 / min_dimension as f32)
}
