use ndarray::Array2;

use crate::consts::{HARRIS_K, HARRIS_WINDOW_SIGMA};
use crate::filters::gaussian_blur::gaussian_blur_array;
use crate::filters::gradient::sobel;
use crate::frame::Plane;

/// A detected corner at integer pixel position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Corner {
    pub col: usize,
    pub row: usize,
    pub response: f32,
}

/// Harris response `det(M) - k * trace(M)^2` of the Gaussian-weighted
/// structure tensor.
pub fn harris_response(data: &Array2<f32>) -> Array2<f32> {
    let (gx, gy) = sobel(data);
    let ixx = gaussian_blur_array(&(&gx * &gx), HARRIS_WINDOW_SIGMA);
    let iyy = gaussian_blur_array(&(&gy * &gy), HARRIS_WINDOW_SIGMA);
    let ixy = gaussian_blur_array(&(&gx * &gy), HARRIS_WINDOW_SIGMA);

    let mut response = Array2::<f32>::zeros(data.dim());
    ndarray::Zip::from(&mut response)
        .and(&ixx)
        .and(&iyy)
        .and(&ixy)
        .for_each(|r, &a, &b, &c| {
            let trace = a + b;
            *r = a * b - c * c - HARRIS_K * trace * trace;
        });
    response
}

/// Strongest local maxima of the Harris response.
///
/// A corner must be a 3x3 local maximum, exceed `relative_threshold` times
/// the strongest response, and lie at least `border` pixels from the edge.
/// At most `max_corners` are returned, strongest first.
pub fn detect_corners(
    plane: &Plane,
    max_corners: usize,
    relative_threshold: f32,
    border: usize,
) -> Vec<Corner> {
    let (h, w) = plane.data.dim();
    let border = border.max(1);
    if h <= 2 * border || w <= 2 * border {
        return Vec::new();
    }

    let response = harris_response(&plane.data);
    let peak = response.iter().copied().fold(0.0f32, f32::max);
    if peak <= 0.0 {
        return Vec::new();
    }
    let threshold = peak * relative_threshold;

    let mut corners = Vec::new();
    for row in border..h - border {
        for col in border..w - border {
            let r = response[[row, col]];
            if r <= threshold {
                continue;
            }
            let is_max = (row - 1..=row + 1)
                .flat_map(|nr| (col - 1..=col + 1).map(move |nc| (nr, nc)))
                .filter(|&(nr, nc)| (nr, nc) != (row, col))
                .all(|(nr, nc)| {
                    let n = response[[nr, nc]];
                    // Plateau ties go to the first pixel in scan order.
                    n < r || (n == r && (nr, nc) > (row, col))
                });
            if is_max {
                corners.push(Corner {
                    col,
                    row,
                    response: r,
                });
            }
        }
    }

    corners.sort_by(|a, b| b.response.total_cmp(&a.response));
    corners.truncate(max_corners);
    corners
}
