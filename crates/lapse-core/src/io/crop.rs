use ndarray::s;

use crate::error::{LapseError, Result};
use crate::frame::{ColorImage, Plane};
use crate::geometry::Rect;

/// Integer pixel window `(x, y, width, height)` of a composite-space rect,
/// shrunk inward to whole pixels and clamped to the image.
pub fn pixel_window(
    rect: &Rect,
    width: usize,
    height: usize,
) -> Result<(usize, usize, usize, usize)> {
    let left = rect.left().ceil().max(0.0) as usize;
    let top = rect.top().ceil().max(0.0) as usize;
    let right = (rect.right().floor().max(0.0) as usize).min(width);
    let bottom = (rect.bottom().floor().max(0.0) as usize).min(height);
    if right <= left || bottom <= top {
        return Err(LapseError::InvalidDimensions {
            width: right.saturating_sub(left) as u32,
            height: bottom.saturating_sub(top) as u32,
        });
    }
    Ok((left, top, right - left, bottom - top))
}

/// Crop every channel of `image` to `rect`.
pub fn crop_color(image: &ColorImage, rect: &Rect) -> Result<ColorImage> {
    let (x, y, w, h) = pixel_window(rect, image.width(), image.height())?;
    let cut = |p: &Plane| Plane::new(p.data.slice(s![y..y + h, x..x + w]).to_owned());
    Ok(ColorImage {
        red: cut(&image.red),
        green: cut(&image.green),
        blue: cut(&image.blue),
        alpha: cut(&image.alpha),
    })
}
