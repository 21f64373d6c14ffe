use std::path::Path;

use image::{ImageFormat, Rgba};
use ndarray::Array2;

use crate::error::{LapseError, Result};
use crate::frame::{ColorImage, Plane, Size};

/// Pixel dimensions without decoding the whole image.
pub fn image_size(path: &Path) -> Result<Size> {
    let (width, height) = image::image_dimensions(path)?;
    if width == 0 || height == 0 {
        return Err(LapseError::InvalidDimensions { width, height });
    }
    Ok(Size::new(width, height))
}

/// Load any supported image as an opaque color image with channels in [0, 1].
pub fn load_color(path: &Path) -> Result<ColorImage> {
    let img = image::open(path)?.to_rgb32f();
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return Err(LapseError::InvalidDimensions {
            width: w,
            height: h,
        });
    }
    let shape = (h as usize, w as usize);
    let channel = |c: usize| {
        Plane::new(Array2::from_shape_fn(shape, |(row, col)| {
            img.get_pixel(col as u32, row as u32).0[c].clamp(0.0, 1.0)
        }))
    };
    Ok(ColorImage::opaque(channel(0), channel(1), channel(2)))
}

/// Save as 8-bit RGBA PNG; the alpha channel carries warp coverage.
pub fn save_color_png(image: &ColorImage, path: &Path) -> Result<()> {
    let h = image.height();
    let w = image.width();
    let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;

    let mut img = image::RgbaImage::new(w as u32, h as u32);
    for row in 0..h {
        for col in 0..w {
            img.put_pixel(
                col as u32,
                row as u32,
                Rgba([
                    to_u8(image.red.data[[row, col]]),
                    to_u8(image.green.data[[row, col]]),
                    to_u8(image.blue.data[[row, col]]),
                    to_u8(image.alpha.data[[row, col]]),
                ]),
            );
        }
    }

    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}
