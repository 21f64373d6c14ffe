mod common;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use common::*;
use lapse_core::align::frame_placement;
use lapse_core::features::Correspondences;
use lapse_core::frame::{FailureReason, Size};
use lapse_core::geometry::{Point, Rect};
use lapse_core::homography::{select_best_homography, Homography, RansacConfig};

fn random_near_identity(rng: &mut StdRng) -> Homography {
    Homography::from_rows([
        [
            1.0 + rng.gen_range(-0.05..0.05),
            rng.gen_range(-0.05..0.05),
            rng.gen_range(-30.0..30.0),
        ],
        [
            rng.gen_range(-0.05..0.05),
            1.0 + rng.gen_range(-0.05..0.05),
            rng.gen_range(-30.0..30.0),
        ],
        [
            rng.gen_range(-1e-5..1e-5),
            rng.gen_range(-1e-5..1e-5),
            1.0,
        ],
    ])
}

#[test]
fn test_corner_round_trip_law() {
    let mut rng = StdRng::seed_from_u64(2024);
    let size = Size::new(4000, 3000);
    for _ in 0..100 {
        let h = random_near_identity(&mut rng);
        let (corners, _) = frame_placement(&h, size).unwrap();
        let back = h.project_quad(&corners);
        for (a, b) in back.corners.iter().zip(size.to_rect().to_quad().corners.iter()) {
            assert!(a.distance(b) < 1e-6, "{a:?} vs {b:?}");
        }
    }
}

#[test]
fn test_flipped_transforms_rejected() {
    let mut rng = StdRng::seed_from_u64(7);
    let size = Size::new(640, 480);
    for i in 0..200 {
        let base = random_near_identity(&mut rng);
        let flip = match i % 3 {
            0 => [[-1.0, 0.0, 640.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            1 => [[1.0, 0.0, 0.0], [0.0, -1.0, 480.0], [0.0, 0.0, 1.0]],
            _ => [[-1.0, 0.0, 640.0], [0.0, -1.0, 480.0], [0.0, 0.0, 1.0]],
        };
        let h = base.compose(&Homography::from_rows(flip));
        assert_eq!(
            frame_placement(&h, size),
            Err(FailureReason::DegenerateHomography)
        );
    }
}

#[test]
fn test_unflipped_transforms_accepted() {
    let mut rng = StdRng::seed_from_u64(8);
    for _ in 0..200 {
        let h = random_near_identity(&mut rng);
        let (corners, rect) = frame_placement(&h, Size::new(640, 480)).unwrap();
        assert!(corners.preserves_orientation());
        assert_eq!(rect, corners.bounding_rect());
    }
}

#[test]
fn test_selector_recovers_transform_with_outliers() {
    let h = perspective();
    let base = grid(800.0, 600.0, 10);
    let mut rng = StdRng::seed_from_u64(99);
    let target: Vec<Point> = base
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            let q = h.project(p);
            if i % 5 == 0 {
                Point::new(q.x + rng.gen_range(20.0..80.0), q.y - rng.gen_range(20.0..80.0))
            } else {
                q
            }
        })
        .collect();
    let corr = Correspondences::new(base.clone(), target).unwrap();

    let config = RansacConfig {
        trials: 6,
        seed: Some(5),
        ..RansacConfig::default()
    };
    let best = select_best_homography(&corr, &config).unwrap();
    assert_eq!(best.inlier_count(), 80);
    assert!(best.inliers.iter().all(|i| i % 5 != 0));
    for p in &base {
        assert!(best.homography.project(*p).distance(&h.project(*p)) < 1e-3);
    }
}

#[test]
fn test_selector_is_deterministic_with_seed() {
    let h = perspective();
    let base = grid(500.0, 400.0, 8);
    let mut rng = StdRng::seed_from_u64(3);
    let target: Vec<Point> = base
        .iter()
        .map(|&p| {
            let q = h.project(p);
            Point::new(q.x + rng.gen_range(-1.0..1.0), q.y + rng.gen_range(-1.0..1.0))
        })
        .collect();
    let corr = Correspondences::new(base, target).unwrap();
    let config = RansacConfig {
        trials: 8,
        seed: Some(42),
        ..RansacConfig::default()
    };

    let a = select_best_homography(&corr, &config).unwrap();
    let b = select_best_homography(&corr, &config).unwrap();
    assert_eq!(a.trial, b.trial);
    assert_eq!(a.inliers, b.inliers);
    assert_eq!(a.homography, b.homography);
}

#[test]
fn test_selector_without_enough_points() {
    let corr = Correspondences::new(
        vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
        vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
    )
    .unwrap();
    assert!(select_best_homography(&corr, &RansacConfig::default()).is_none());
}

#[test]
fn test_translation_places_rect() {
    let (_, rect) = frame_placement(&translation(12.0, -8.0), Size::new(100, 50)).unwrap();
    let expected = Rect::new(-12.0, 8.0, 100.0, 50.0);
    assert!((rect.x - expected.x).abs() < 1e-9);
    assert!((rect.y - expected.y).abs() < 1e-9);
    assert!((rect.width - expected.width).abs() < 1e-9);
    assert!((rect.height - expected.height).abs() < 1e-9);
}
