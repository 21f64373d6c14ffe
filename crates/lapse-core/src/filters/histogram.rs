use crate::consts::EPSILON;
use crate::frame::Plane;

/// Linear stretch mapping `[black_point, white_point]` onto `[0, 1]`.
pub fn histogram_stretch(plane: &Plane, black_point: f32, white_point: f32) -> Plane {
    let range = white_point - black_point;
    let range = if range.abs() < EPSILON { 1.0 } else { range };
    Plane::new(
        plane
            .data
            .mapv(|v| ((v - black_point) / range).clamp(0.0, 1.0)),
    )
}

/// Stretch the plane's own min/max to the full `[0, 1]` range.
/// A flat plane is returned unchanged.
pub fn contrast_stretch(plane: &Plane) -> Plane {
    let (lo, hi) = plane
        .data
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() || hi - lo < EPSILON {
        return plane.clone();
    }
    histogram_stretch(plane, lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_contrast_stretch_full_range() {
        let plane = Plane::new(array![[0.2, 0.4], [0.3, 0.6]]);
        let out = contrast_stretch(&plane);
        assert_relative_eq!(out.data[[0, 0]], 0.0);
        assert_relative_eq!(out.data[[1, 1]], 1.0);
        assert_relative_eq!(out.data[[0, 1]], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_flat_plane_unchanged() {
        let plane = Plane::new(array![[0.5, 0.5], [0.5, 0.5]]);
        let out = contrast_stretch(&plane);
        assert_eq!(out.data, plane.data);
    }
}
