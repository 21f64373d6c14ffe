use ndarray::Array2;
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::frame::Plane;

/// Gaussian blur via separable 1D convolution, replicating edge pixels.
pub fn gaussian_blur(plane: &Plane, sigma: f32) -> Plane {
    Plane::new(gaussian_blur_array(&plane.data, sigma))
}

pub fn gaussian_blur_array(data: &Array2<f32>, sigma: f32) -> Array2<f32> {
    if sigma <= 0.0 {
        return data.clone();
    }
    let kernel = make_gaussian_kernel(sigma);
    let row_pass = convolve(data, &kernel, Axis::Row);
    convolve(&row_pass, &kernel, Axis::Col)
}

fn make_gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (sigma * 3.0).ceil() as usize;
    let s2 = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (0..2 * radius + 1)
        .map(|i| {
            let x = i as f32 - radius as f32;
            (-x * x / s2).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }
    kernel
}

#[derive(Clone, Copy)]
enum Axis {
    Row,
    Col,
}

fn convolve(data: &Array2<f32>, kernel: &[f32], axis: Axis) -> Array2<f32> {
    let (h, w) = data.dim();
    let radius = kernel.len() as isize / 2;

    let sample_row = |row: usize| -> Vec<f32> {
        (0..w)
            .map(|col| {
                kernel
                    .iter()
                    .enumerate()
                    .map(|(ki, &kv)| {
                        let offset = ki as isize - radius;
                        let v = match axis {
                            Axis::Row => {
                                let c = (col as isize + offset).clamp(0, w as isize - 1);
                                data[[row, c as usize]]
                            }
                            Axis::Col => {
                                let r = (row as isize + offset).clamp(0, h as isize - 1);
                                data[[r as usize, col]]
                            }
                        };
                        v * kv
                    })
                    .sum()
            })
            .collect()
    };

    let rows: Vec<Vec<f32>> = if h * w >= PARALLEL_PIXEL_THRESHOLD {
        (0..h).into_par_iter().map(sample_row).collect()
    } else {
        (0..h).map(sample_row).collect()
    };

    Array2::from_shape_vec((h, w), rows.into_iter().flatten().collect())
        .unwrap_or_else(|_| Array2::zeros((h, w)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_kernel_is_normalized() {
        let k = make_gaussian_kernel(1.5);
        assert_eq!(k.len(), 11);
        assert_relative_eq!(k.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_constant_plane_unchanged() {
        let plane = Plane::new(Array2::from_elem((12, 9), 0.4));
        let out = gaussian_blur(&plane, 2.0);
        for &v in out.data.iter() {
            assert_relative_eq!(v, 0.4, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_impulse_spreads_and_preserves_mass() {
        let mut data = Array2::<f32>::zeros((21, 21));
        data[[10, 10]] = 1.0;
        let out = gaussian_blur_array(&data, 1.0);
        assert!(out[[10, 10]] < 1.0);
        assert!(out[[10, 11]] > 0.0);
        assert_relative_eq!(out.sum(), 1.0, epsilon = 1e-4);
    }
}
