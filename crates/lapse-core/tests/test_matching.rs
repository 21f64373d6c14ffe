use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use lapse_core::align::{align_frame, AlignOutcome};
use lapse_core::features::{CorrelationMatcher, CorrespondenceProvider};
use lapse_core::filters::gaussian_blur;
use lapse_core::frame::{FailureReason, Plane, Size};
use lapse_core::homography::RansacConfig;

/// Random overlapping rectangles of distinct brightness.
fn texture(width: usize, height: usize, seed: u64) -> Plane {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = Array2::<f32>::from_elem((height, width), 0.1);
    for _ in 0..40 {
        let x0 = rng.gen_range(0..width - 12);
        let y0 = rng.gen_range(0..height - 12);
        let w = rng.gen_range(6..30).min(width - x0);
        let h = rng.gen_range(6..30).min(height - y0);
        let value = rng.gen_range(0.2..1.0);
        for row in y0..y0 + h {
            for col in x0..x0 + w {
                data[[row, col]] = value;
            }
        }
    }
    gaussian_blur(&Plane::new(data), 0.8)
}

/// `target[r][c] = base[r - dy][c - dx]`, zero where nothing maps.
fn shifted(base: &Plane, dx: usize, dy: usize) -> Plane {
    let (h, w) = base.data.dim();
    Plane::new(Array2::from_shape_fn((h, w), |(r, c)| {
        if r >= dy && c >= dx {
            base.data[[r - dy, c - dx]]
        } else {
            0.0
        }
    }))
}

fn config() -> RansacConfig {
    RansacConfig {
        trials: 4,
        seed: Some(3),
        ..RansacConfig::default()
    }
}

#[test]
fn test_matches_follow_shift() {
    let base = texture(200, 160, 1);
    let target = shifted(&base, 6, 4);
    let corr = CorrelationMatcher::default()
        .correspondences(&base, &target)
        .unwrap();

    assert!(corr.len() >= 10, "only {} matches", corr.len());
    let consistent = corr
        .base()
        .iter()
        .zip(corr.target())
        .filter(|(b, t)| (t.x - b.x - 6.0).abs() < 0.5 && (t.y - b.y - 4.0).abs() < 0.5)
        .count();
    assert!(consistent * 10 >= corr.len() * 8, "{consistent}/{}", corr.len());
}

#[test]
fn test_align_shifted_frame() {
    let base = texture(200, 160, 2);
    let target = shifted(&base, 6, 4);
    let size = Size::new(200, 160);

    let outcome = align_frame(
        &base,
        size,
        &target,
        size,
        &CorrelationMatcher::default(),
        &config(),
    )
    .unwrap();

    let rect = match outcome {
        AlignOutcome::Aligned { rect, .. } => rect,
        other => panic!("expected alignment, got {other:?}"),
    };
    assert!((rect.x + 6.0).abs() < 0.5, "{rect}");
    assert!((rect.y + 4.0).abs() < 0.5, "{rect}");
    assert!((rect.width - 200.0).abs() < 1.0);
}

#[test]
fn test_align_scales_to_original_resolution() {
    let base = texture(200, 160, 4);
    let target = shifted(&base, 6, 4);
    // Preprocessed planes are half the original resolution.
    let size = Size::new(400, 320);

    let outcome = align_frame(
        &base,
        size,
        &target,
        size,
        &CorrelationMatcher::default(),
        &config(),
    )
    .unwrap();

    let rect = match outcome {
        AlignOutcome::Aligned { rect, .. } => rect,
        other => panic!("expected alignment, got {other:?}"),
    };
    assert!((rect.x + 12.0).abs() < 1.0, "{rect}");
    assert!((rect.y + 8.0).abs() < 1.0, "{rect}");
}

#[test]
fn test_featureless_frame_fails() {
    let base = texture(120, 100, 3);
    let flat = Plane::new(Array2::from_elem((100, 120), 0.5));
    let size = Size::new(120, 100);

    let outcome = align_frame(
        &base,
        size,
        &flat,
        size,
        &CorrelationMatcher::default(),
        &config(),
    )
    .unwrap();
    assert!(matches!(
        outcome,
        AlignOutcome::Failed(FailureReason::NoCorrespondences)
    ));
}
