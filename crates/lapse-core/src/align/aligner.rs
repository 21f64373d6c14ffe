use tracing::debug;

use crate::error::Result;
use crate::features::CorrespondenceProvider;
use crate::frame::{FailureReason, Plane, Size};
use crate::geometry::{Quad, Rect};
use crate::homography::{select_best_homography, Homography, RansacConfig};

/// Result of aligning one frame onto the reference.
#[derive(Clone, Debug)]
pub enum AlignOutcome {
    Aligned {
        /// Maps reference coordinates to this frame's coordinates.
        homography: Homography,
        /// Frame corners in composite space.
        corners: Quad,
        rect: Rect,
        inliers: usize,
    },
    Failed(FailureReason),
}

impl AlignOutcome {
    pub fn is_aligned(&self) -> bool {
        matches!(self, Self::Aligned { .. })
    }
}

/// Place a frame of `size` into composite space.
///
/// The corners `(0,0), (0,h), (w,h), (w,0)` go through the inverse of
/// `homography`. A non-invertible matrix, non-finite corners, or corners
/// whose left/right or top/bottom ordering flips are rejected.
pub fn frame_placement(
    homography: &Homography,
    size: Size,
) -> std::result::Result<(Quad, Rect), FailureReason> {
    let inverse = homography
        .inverse()
        .ok_or(FailureReason::DegenerateHomography)?;
    let corners = inverse.project_quad(&size.to_rect().to_quad());
    if !corners.preserves_orientation() {
        return Err(FailureReason::DegenerateHomography);
    }
    Ok((corners, corners.bounding_rect()))
}

fn scale_factors(original: Size, plane: &Plane) -> (f64, f64) {
    (
        original.width as f64 / plane.width().max(1) as f64,
        original.height as f64 / plane.height().max(1) as f64,
    )
}

/// Align `target` onto `reference`.
///
/// Matching runs on the preprocessed planes; the correspondences are scaled
/// back to each frame's original resolution before estimation, so the
/// resulting homography and corners are in original pixels.
pub fn align_frame(
    reference: &Plane,
    reference_size: Size,
    target: &Plane,
    target_size: Size,
    provider: &dyn CorrespondenceProvider,
    config: &RansacConfig,
) -> Result<AlignOutcome> {
    let matches = provider.correspondences(reference, target)?;
    let matches = matches.scaled(
        scale_factors(reference_size, reference),
        scale_factors(target_size, target),
    );

    let Some(best) = select_best_homography(&matches, config) else {
        debug!(matches = matches.len(), "No homography found");
        return Ok(AlignOutcome::Failed(FailureReason::NoCorrespondences));
    };

    match frame_placement(&best.homography, target_size) {
        Ok((corners, rect)) => {
            debug!(
                matches = matches.len(),
                inliers = best.inlier_count(),
                rect = %rect,
                "Frame placed"
            );
            Ok(AlignOutcome::Aligned {
                homography: best.homography,
                corners,
                rect,
                inliers: best.inlier_count(),
            })
        }
        Err(reason) => Ok(AlignOutcome::Failed(reason)),
    }
}
