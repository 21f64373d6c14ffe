//! Direct Linear Transform with Hartley normalization.

use nalgebra::{DMatrix, Matrix3, SymmetricEigen};

use crate::geometry::Point;

use super::Homography;

/// Collinearity tolerance for minimal samples, as a fraction of the
/// squared sample extent.
const COLLINEAR_TOLERANCE: f64 = 1e-6;

/// Translate the centroid to the origin and scale so the mean distance from
/// the origin is sqrt(2). Returns the normalizing transform and the points.
fn normalize_points(pts: &[Point]) -> (Matrix3<f64>, Vec<Point>) {
    let n = pts.len() as f64;
    let cx: f64 = pts.iter().map(|p| p.x).sum::<f64>() / n;
    let cy: f64 = pts.iter().map(|p| p.y).sum::<f64>() / n;

    let mean_dist: f64 = pts
        .iter()
        .map(|p| ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt())
        .sum::<f64>()
        / n;

    let s = if mean_dist > 1e-15 {
        std::f64::consts::SQRT_2 / mean_dist
    } else {
        1.0
    };

    let t = Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0);
    let normalized = pts
        .iter()
        .map(|p| Point::new(s * (p.x - cx), s * (p.y - cy)))
        .collect();

    (t, normalized)
}

/// Estimate `H` with `dst ≈ H(src)` from at least four correspondences.
///
/// Returns `None` for fewer than four points, mismatched lengths, or a
/// numerically singular configuration.
pub fn fit_homography(src: &[Point], dst: &[Point]) -> Option<Homography> {
    let n = src.len();
    if n < 4 || dst.len() != n {
        return None;
    }

    let (t_src, src_n) = normalize_points(src);
    let (t_dst, dst_n) = normalize_points(dst);

    // 2n x 9 system A h = 0.
    let mut a = DMatrix::zeros(2 * n, 9);
    for i in 0..n {
        let (sx, sy) = (src_n[i].x, src_n[i].y);
        let (dx, dy) = (dst_n[i].x, dst_n[i].y);

        a[(2 * i, 3)] = -sx;
        a[(2 * i, 4)] = -sy;
        a[(2 * i, 5)] = -1.0;
        a[(2 * i, 6)] = dy * sx;
        a[(2 * i, 7)] = dy * sy;
        a[(2 * i, 8)] = dy;

        a[(2 * i + 1, 0)] = sx;
        a[(2 * i + 1, 1)] = sy;
        a[(2 * i + 1, 2)] = 1.0;
        a[(2 * i + 1, 6)] = -dx * sx;
        a[(2 * i + 1, 7)] = -dx * sy;
        a[(2 * i + 1, 8)] = -dx;
    }

    // h is the eigenvector of A^T A with the smallest eigenvalue.
    let ata = a.transpose() * &a;
    let eig = SymmetricEigen::new(ata);
    let min_idx = eig
        .eigenvalues
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
        .map(|(i, _)| i)?;
    let h = |j: usize| eig.eigenvectors[(j, min_idx)];
    let h_norm = Matrix3::new(h(0), h(1), h(2), h(3), h(4), h(5), h(6), h(7), h(8));

    // Denormalize: H = T_dst^-1 * H_norm * T_src
    let t_dst_inv = t_dst.try_inverse()?;
    let matrix = t_dst_inv * h_norm * t_src;

    if matrix[(2, 2)].abs() < 1e-12 || !matrix.iter().all(|v| v.is_finite()) {
        return None;
    }
    let homography = Homography::from_matrix(matrix);
    if homography.matrix.determinant().abs() < 1e-12 {
        return None;
    }
    Some(homography)
}

/// True when any three of the points are (nearly) collinear.
pub fn is_degenerate_sample(points: &[Point]) -> bool {
    let extent = points
        .iter()
        .flat_map(|a| points.iter().map(move |b| a.distance(b)))
        .fold(0.0f64, f64::max);
    if extent <= 1e-12 {
        return true;
    }
    let tolerance = COLLINEAR_TOLERANCE * extent * extent;

    let n = points.len();
    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                let (a, b, c) = (points[i], points[j], points[k]);
                let area2 = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
                if area2.abs() <= tolerance {
                    return true;
                }
            }
        }
    }
    false
}
