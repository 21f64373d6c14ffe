use ndarray::Array2;
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::frame::{ColorImage, Plane, Size};
use crate::geometry::Point;
use crate::homography::Homography;

/// Bilinear sample at fractional `(y, x)`; neighbours outside the array read 0.
pub fn bilinear_sample(data: &Array2<f32>, y: f64, x: f64) -> f32 {
    let (h, w) = data.dim();

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let fx = (x - x0 as f64) as f32;
    let fy = (y - y0 as f64) as f32;

    let sample = |r: i64, c: i64| -> f32 {
        if r >= 0 && r < h as i64 && c >= 0 && c < w as i64 {
            data[[r as usize, c as usize]]
        } else {
            0.0
        }
    };

    sample(y0, x0) * (1.0 - fx) * (1.0 - fy)
        + sample(y0, x0 + 1) * fx * (1.0 - fy)
        + sample(y0 + 1, x0) * (1.0 - fx) * fy
        + sample(y0 + 1, x0 + 1) * fx * fy
}

/// Resample `image` into a `canvas`-sized composite frame.
///
/// `homography` maps canvas coordinates to source coordinates: output pixel
/// `p` reads the source at `H·p`. Pixels whose source position falls outside
/// the image are black with zero alpha.
pub fn warp_perspective(
    image: &ColorImage,
    homography: &Homography,
    canvas: Size,
) -> ColorImage {
    let (w, h) = (canvas.width as usize, canvas.height as usize);
    let (src_w, src_h) = (image.width() as f64, image.height() as f64);

    let warp_row = |row: usize| -> Vec<[f32; 4]> {
        (0..w)
            .map(|col| {
                let src = homography.project(Point::new(col as f64, row as f64));
                let inside = src.is_finite()
                    && src.x >= 0.0
                    && src.y >= 0.0
                    && src.x <= src_w - 1.0
                    && src.y <= src_h - 1.0;
                if !inside {
                    return [0.0; 4];
                }
                [
                    bilinear_sample(&image.red.data, src.y, src.x),
                    bilinear_sample(&image.green.data, src.y, src.x),
                    bilinear_sample(&image.blue.data, src.y, src.x),
                    bilinear_sample(&image.alpha.data, src.y, src.x),
                ]
            })
            .collect()
    };

    let rows: Vec<Vec<[f32; 4]>> = if h * w >= PARALLEL_PIXEL_THRESHOLD {
        (0..h).into_par_iter().map(warp_row).collect()
    } else {
        (0..h).map(warp_row).collect()
    };

    let channel =
        |c: usize| Plane::new(Array2::from_shape_fn((h, w), |(r, col)| rows[r][col][c]));
    ColorImage {
        red: channel(0),
        green: channel(1),
        blue: channel(2),
        alpha: channel(3),
    }
}
