use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_PREPROCESS_HEIGHT;
use crate::filters::contrast_stretch;
use crate::frame::{ColorImage, Plane};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Images taller than this are downscaled to it before matching.
    pub height: u32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            height: DEFAULT_PREPROCESS_HEIGHT,
        }
    }
}

/// Downscale `plane` to `target_height` (keeping aspect) with Catmull-Rom
/// filtering. Planes at or below the target height are returned unchanged.
pub fn downscale_to_height(plane: &Plane, target_height: u32) -> Plane {
    let (h, w) = plane.data.dim();
    if target_height == 0 || h as u32 <= target_height {
        return plane.clone();
    }
    let new_w = ((w as f64 * target_height as f64 / h as f64).round() as u32).max(1);

    let buffer: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_fn(w as u32, h as u32, |x, y| {
            Luma([plane.data[[y as usize, x as usize]]])
        });
    let resized = imageops::resize(&buffer, new_w, target_height, FilterType::CatmullRom);

    Plane::new(Array2::from_shape_fn(
        (target_height as usize, new_w as usize),
        |(row, col)| resized.get_pixel(col as u32, row as u32).0[0],
    ))
}

/// Matching input: luminance, downscaled, contrast-stretched to [0, 1].
pub fn preprocess(image: &ColorImage, config: &PreprocessConfig) -> Plane {
    let luma = image.luminance();
    let small = downscale_to_height(&luma, config.height);
    contrast_stretch(&small)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_image(w: usize, h: usize) -> ColorImage {
        let plane = || {
            Plane::new(Array2::from_shape_fn((h, w), |(r, c)| {
                0.25 + 0.5 * (r + c) as f32 / (h + w) as f32
            }))
        };
        ColorImage::opaque(plane(), plane(), plane())
    }

    #[test]
    fn test_tall_image_downscaled() {
        let img = gradient_image(300, 200);
        let out = preprocess(&img, &PreprocessConfig { height: 100 });
        assert_eq!(out.height(), 100);
        assert_eq!(out.width(), 150);
    }

    #[test]
    fn test_short_image_keeps_size() {
        let img = gradient_image(64, 48);
        let out = preprocess(&img, &PreprocessConfig::default());
        assert_eq!((out.width(), out.height()), (64, 48));
    }

    #[test]
    fn test_output_is_stretched() {
        let img = gradient_image(64, 48);
        let out = preprocess(&img, &PreprocessConfig::default());
        let lo = out.data.iter().copied().fold(f32::INFINITY, f32::min);
        let hi = out.data.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        assert!(lo.abs() < 1e-6);
        assert!((hi - 1.0).abs() < 1e-6);
    }
}
