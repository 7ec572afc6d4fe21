//! Sliding-window candidate enumeration.
//!
//! [`CandidateGrid`] walks crop origins in row-major order and yields one
//! [`FaceCandidate`] per grid position; [`CandidateBatches`] groups them for
//! batched scoring. Both are finite single-pass iterators — once exhausted
//! they keep returning `None`, and rescanning requires a fresh constructor
//! call.

use image::{imageops, Rgb32FImage};

use crate::config::{ConfigError, ScanConfig};
use crate::geometry::BoundingBox;

/// One crop to be examined for face presence.
#[derive(Debug, Clone)]
pub struct FaceCandidate {
    /// Location of the crop in its source image.
    pub crop_region: BoundingBox,
    /// The cropped pixels, `crop_size` × `crop_size`.
    pub pixels: Rgb32FImage,
    /// Sub-region of `crop_region` that receives this candidate's score when
    /// a heatmap is painted. Focus regions of neighboring candidates tile the
    /// image without double-attribution: the margin on each side is
    /// `(crop_size - stride) / 2` and the side length is `stride`, so the
    /// focus region equals the crop region exactly when `stride == crop_size`.
    pub focus_region: BoundingBox,
}

/// Row-major iterator over all candidate crops of an image.
pub struct CandidateGrid<'a> {
    image: &'a Rgb32FImage,
    crop_size: u32,
    stride: u32,
    x: u32,
    y: u32,
}

impl<'a> CandidateGrid<'a> {
    /// Start a scan. Fails if `stride` is zero or exceeds `crop_size`.
    pub fn new(image: &'a Rgb32FImage, crop_size: u32, stride: u32) -> Result<Self, ConfigError> {
        if stride == 0 || stride > crop_size {
            return Err(ConfigError::InvalidScanParameters { crop_size, stride });
        }
        Ok(Self {
            image,
            crop_size,
            stride,
            x: 0,
            y: 0,
        })
    }

    fn candidate_at(&self, x: u32, y: u32) -> FaceCandidate {
        let pixels = imageops::crop_imm(self.image, x, y, self.crop_size, self.crop_size).to_image();
        let crop_region = BoundingBox::from_origin(
            x as f32,
            y as f32,
            self.crop_size as f32,
            self.crop_size as f32,
        );
        let margin = ((self.crop_size - self.stride) / 2) as f32;
        let side = self.stride as f32;
        let focus_region = BoundingBox::from_origin(x as f32 + margin, y as f32 + margin, side, side);
        FaceCandidate {
            crop_region,
            pixels,
            focus_region,
        }
    }
}

impl Iterator for CandidateGrid<'_> {
    type Item = FaceCandidate;

    fn next(&mut self) -> Option<FaceCandidate> {
        while self.y + self.crop_size <= self.image.height() {
            if self.x + self.crop_size <= self.image.width() {
                let (x, y) = (self.x, self.y);
                self.x += self.stride;
                return Some(self.candidate_at(x, y));
            }
            self.x = 0;
            self.y += self.stride;
        }
        None
    }
}

/// Candidates grouped into scoring batches, in generation order.
///
/// The final batch may be smaller than `batch_size`; an image too small to
/// hold a single crop yields no batches at all.
pub struct CandidateBatches<'a> {
    grid: CandidateGrid<'a>,
    batch_size: usize,
}

impl<'a> CandidateBatches<'a> {
    /// Start a batched scan with the given configuration.
    pub fn new(image: &'a Rgb32FImage, config: &ScanConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            grid: CandidateGrid::new(image, config.crop_size, config.stride)?,
            batch_size: config.batch_size,
        })
    }
}

impl Iterator for CandidateBatches<'_> {
    type Item = Vec<FaceCandidate>;

    fn next(&mut self) -> Option<Vec<FaceCandidate>> {
        let batch: Vec<FaceCandidate> = self.grid.by_ref().take(self.batch_size).collect();
        (!batch.is_empty()).then_some(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    /// Image whose pixel at (x, y) holds the value `y * width + x` in every
    /// channel, so crop contents can be probed with min/max.
    fn gradient_image(width: u32, height: u32) -> Rgb32FImage {
        Rgb32FImage::from_fn(width, height, |x, y| {
            let v = (y * width + x) as f32;
            Rgb([v, v, v])
        })
    }

    fn pixel_min(image: &Rgb32FImage) -> f32 {
        image.pixels().map(|p| p.0[0]).fold(f32::INFINITY, f32::min)
    }

    fn pixel_max(image: &Rgb32FImage) -> f32 {
        image
            .pixels()
            .map(|p| p.0[0])
            .fold(f32::NEG_INFINITY, f32::max)
    }

    #[test]
    fn stride_larger_than_crop_fails() {
        let image = gradient_image(10, 10);
        assert!(matches!(
            CandidateGrid::new(&image, 4, 5),
            Err(ConfigError::InvalidScanParameters {
                crop_size: 4,
                stride: 5
            })
        ));
    }

    #[test]
    fn single_row_of_crops() {
        let image = gradient_image(10, 4);
        let candidates: Vec<_> = CandidateGrid::new(&image, 4, 3).unwrap().collect();
        assert_eq!(candidates.len(), 3);

        assert_eq!(candidates[0].crop_region, BoundingBox::new(0.0, 0.0, 4.0, 4.0));
        assert_eq!(candidates[0].focus_region, BoundingBox::new(0.0, 0.0, 3.0, 3.0));
        assert_eq!(pixel_min(&candidates[0].pixels), 0.0);
        assert_eq!(pixel_max(&candidates[0].pixels), 33.0);

        assert_eq!(candidates[1].crop_region, BoundingBox::new(3.0, 0.0, 7.0, 4.0));
        assert_eq!(candidates[1].focus_region, BoundingBox::new(3.0, 0.0, 6.0, 3.0));
        assert_eq!(pixel_min(&candidates[1].pixels), 3.0);
        assert_eq!(pixel_max(&candidates[1].pixels), 36.0);

        assert_eq!(candidates[2].crop_region, BoundingBox::new(6.0, 0.0, 10.0, 4.0));
        assert_eq!(candidates[2].focus_region, BoundingBox::new(6.0, 0.0, 9.0, 3.0));
        assert_eq!(pixel_min(&candidates[2].pixels), 6.0);
        assert_eq!(pixel_max(&candidates[2].pixels), 39.0);
    }

    #[test]
    fn single_column_of_crops() {
        let image = gradient_image(5, 15);
        let candidates: Vec<_> = CandidateGrid::new(&image, 5, 4).unwrap().collect();
        assert_eq!(candidates.len(), 3);

        assert_eq!(candidates[0].crop_region, BoundingBox::new(0.0, 0.0, 5.0, 5.0));
        assert_eq!(candidates[0].focus_region, BoundingBox::new(0.0, 0.0, 4.0, 4.0));
        assert_eq!(candidates[1].crop_region, BoundingBox::new(0.0, 4.0, 5.0, 9.0));
        assert_eq!(candidates[1].focus_region, BoundingBox::new(0.0, 4.0, 4.0, 8.0));
        assert_eq!(candidates[2].crop_region, BoundingBox::new(0.0, 8.0, 5.0, 13.0));
        assert_eq!(candidates[2].focus_region, BoundingBox::new(0.0, 8.0, 4.0, 12.0));

        assert_eq!(pixel_min(&candidates[1].pixels), 20.0);
        assert_eq!(pixel_max(&candidates[1].pixels), 44.0);
    }

    #[test]
    fn simple_grid_is_row_major() {
        let image = gradient_image(10, 10);
        let candidates: Vec<_> = CandidateGrid::new(&image, 5, 4).unwrap().collect();
        assert_eq!(candidates.len(), 4);

        let origins: Vec<(f32, f32)> = candidates
            .iter()
            .map(|c| (c.crop_region.left, c.crop_region.top))
            .collect();
        assert_eq!(origins, vec![(0.0, 0.0), (4.0, 0.0), (0.0, 4.0), (4.0, 4.0)]);

        // (5 - 4) / 2 floors to zero margin; focus side equals the stride.
        for c in &candidates {
            assert_eq!(c.focus_region.left, c.crop_region.left);
            assert_eq!(c.focus_region.width(), 4.0);
            assert_eq!(c.focus_region.height(), 4.0);
        }

        assert_eq!(pixel_min(&candidates[3].pixels), 44.0);
        assert_eq!(pixel_max(&candidates[3].pixels), 88.0);
    }

    #[test]
    fn candidate_count_matches_grid_formula() {
        let image = gradient_image(33, 21);
        let (crop, stride) = (8, 5);
        let count = CandidateGrid::new(&image, crop, stride).unwrap().count();
        let per_row = (33 - crop) / stride + 1;
        let per_col = (21 - crop) / stride + 1;
        assert_eq!(count, (per_row * per_col) as usize);
    }

    #[test]
    fn focus_equals_crop_when_stride_equals_crop_size() {
        let image = gradient_image(12, 12);
        for c in CandidateGrid::new(&image, 4, 4).unwrap() {
            assert_eq!(c.focus_region, c.crop_region);
        }
    }

    #[test]
    fn odd_margin_floors() {
        let image = gradient_image(10, 10);
        let first = CandidateGrid::new(&image, 5, 2).unwrap().next().unwrap();
        // (5 - 2) / 2 = 1
        assert_eq!(first.focus_region, BoundingBox::new(1.0, 1.0, 3.0, 3.0));
    }

    #[test]
    fn batches_group_in_generation_order() {
        let image = gradient_image(10, 10);
        let config = ScanConfig::new(5, 4, 3).unwrap();
        let batches: Vec<_> = CandidateBatches::new(&image, &config).unwrap().collect();
        // 4 candidates in batches of 3: one full batch and one partial.
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 3);
        assert_eq!(batches[1].len(), 1);
        assert_eq!(
            batches[1][0].crop_region,
            BoundingBox::new(4.0, 4.0, 9.0, 9.0)
        );
    }

    #[test]
    fn image_smaller_than_crop_yields_no_batches() {
        let image = gradient_image(4, 4);
        let config = ScanConfig::new(5, 4, 8).unwrap();
        assert_eq!(CandidateBatches::new(&image, &config).unwrap().count(), 0);
    }

    #[test]
    fn exhausted_grid_stays_exhausted() {
        let image = gradient_image(6, 6);
        let mut grid = CandidateGrid::new(&image, 6, 6).unwrap();
        assert!(grid.next().is_some());
        assert!(grid.next().is_none());
        assert!(grid.next().is_none());
    }
}
