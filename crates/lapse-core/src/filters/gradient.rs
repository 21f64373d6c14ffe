use ndarray::Array2;

/// Sobel derivatives `(gx, gy)`.
///
///   Gx = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]]
///   Gy = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]]
///
/// The 1-pixel border is zero.
pub fn sobel(data: &Array2<f32>) -> (Array2<f32>, Array2<f32>) {
    let (h, w) = data.dim();
    let mut gx = Array2::<f32>::zeros((h, w));
    let mut gy = Array2::<f32>::zeros((h, w));

    if h < 3 || w < 3 {
        return (gx, gy);
    }

    for row in 1..h - 1 {
        for col in 1..w - 1 {
            let p = |dr: usize, dc: usize| data[[row + dr - 1, col + dc - 1]];
            gx[[row, col]] =
                -p(0, 0) + p(0, 2) - 2.0 * p(1, 0) + 2.0 * p(1, 2) - p(2, 0) + p(2, 2);
            gy[[row, col]] =
                -p(0, 0) - 2.0 * p(0, 1) - p(0, 2) + p(2, 0) + 2.0 * p(2, 1) + p(2, 2);
        }
    }

    (gx, gy)
}
