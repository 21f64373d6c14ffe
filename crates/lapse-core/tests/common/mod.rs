#![allow(dead_code)]

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;

use ndarray::Array2;

use lapse_core::align::WarpSink;
use lapse_core::error::{LapseError, Result};
use lapse_core::features::{CorrespondenceProvider, Correspondences};
use lapse_core::frame::{ColorImage, Frame, FrameId, Plane, Size};
use lapse_core::geometry::Point;
use lapse_core::homography::Homography;
use lapse_core::io::FrameSource;
use lapse_core::pipeline::{LapseConfig, PipelineStage, ProgressReporter};
use lapse_core::sequence::Sequence;

pub fn translation(dx: f64, dy: f64) -> Homography {
    Homography::from_rows([[1.0, 0.0, dx], [0.0, 1.0, dy], [0.0, 0.0, 1.0]])
}

/// Mild perspective transform used across tests.
pub fn perspective() -> Homography {
    Homography::from_rows([
        [1.02, 0.015, 6.0],
        [-0.01, 0.985, -4.0],
        [0.00003, -0.00002, 1.0],
    ])
}

/// Regular grid of points inside a `width` x `height` image.
pub fn grid(width: f64, height: f64, steps: usize) -> Vec<Point> {
    let mut pts = Vec::with_capacity(steps * steps);
    for i in 0..steps {
        for j in 0..steps {
            let fx = (i as f64 + 0.5) / steps as f64;
            let fy = (j as f64 + 0.5) / steps as f64;
            // Slight stagger keeps rows from being perfectly collinear.
            pts.push(Point::new(fx * width + (j % 3) as f64, fy * height + (i % 2) as f64));
        }
    }
    pts
}

pub fn correspondences_for(h: &Homography, width: f64, height: f64) -> Correspondences {
    let base = grid(width, height, 8);
    let target = base.iter().map(|&p| h.project(p)).collect();
    Correspondences::new(base, target).unwrap()
}

/// Config small enough for fast, reproducible tests.
pub fn test_config() -> LapseConfig {
    let mut config = LapseConfig::default();
    config.ransac.trials = 4;
    config.ransac.seed = Some(1);
    config.optimizer.population_size = 200;
    config.optimizer.max_generations = 200;
    config.optimizer.seed = Some(2);
    config
}

/// Planes carry their frame index in pixel (0, 0) so the provider can look
/// up the homography it should report.
fn tagged_plane(size: Size, index: usize) -> Plane {
    let mut data = Array2::<f32>::zeros((size.height as usize, size.width as usize));
    data[[0, 0]] = index as f32;
    Plane::new(data)
}

/// Reports exact correspondences for a known homography per frame index.
/// `None` entries yield no correspondences.
pub struct ScriptedProvider {
    pub homographies: Vec<Option<Homography>>,
}

impl CorrespondenceProvider for ScriptedProvider {
    fn correspondences(&self, base: &Plane, target: &Plane) -> Result<Correspondences> {
        let index = target.data[[0, 0]] as usize;
        match self.homographies.get(index).copied().flatten() {
            Some(h) => Ok(correspondences_for(
                &h,
                base.width() as f64,
                base.height() as f64,
            )),
            None => Ok(Correspondences::default()),
        }
    }
}

/// In-memory frames; ids listed in `broken` fail to load.
pub struct MemorySource {
    pub broken: HashSet<usize>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self {
            broken: HashSet::new(),
        }
    }
}

impl FrameSource for MemorySource {
    fn preprocessed(&self, frame: &Frame) -> Result<Plane> {
        if self.broken.contains(&frame.id.0) {
            return Err(LapseError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "missing frame",
            )));
        }
        Ok(tagged_plane(frame.original_size, frame.id.0))
    }

    fn original(&self, frame: &Frame) -> Result<ColorImage> {
        let plane = tagged_plane(frame.original_size, frame.id.0);
        Ok(ColorImage::opaque(plane.clone(), plane.clone(), plane))
    }
}

pub fn sequence_of(count: usize, size: Size) -> Sequence {
    let mut seq = Sequence::new();
    for i in 0..count {
        seq.push(PathBuf::from(format!("frame_{i:03}.jpg")), size);
    }
    seq
}

#[derive(Debug, PartialEq)]
pub enum Event {
    Begin(PipelineStage, Option<usize>),
    Advance(usize),
    Finish,
}

#[derive(Default)]
pub struct RecordingReporter {
    pub events: Mutex<Vec<Event>>,
}

impl ProgressReporter for RecordingReporter {
    fn begin_stage(&self, stage: PipelineStage, total_items: Option<usize>) {
        self.events.lock().unwrap().push(Event::Begin(stage, total_items));
    }

    fn advance(&self, items_done: usize) {
        self.events.lock().unwrap().push(Event::Advance(items_done));
    }

    fn finish_stage(&self) {
        self.events.lock().unwrap().push(Event::Finish);
    }
}

#[derive(Default)]
pub struct CollectingSink {
    pub received: Mutex<Vec<(FrameId, Size)>>,
}

impl WarpSink for CollectingSink {
    fn accept(&self, frame: &Frame, warped: ColorImage) -> Result<()> {
        self.received.lock().unwrap().push((frame.id, warped.size()));
        Ok(())
    }
}

/// Sink whose writes fail for the listed frames and succeed otherwise.
#[derive(Default)]
pub struct FailingSink {
    pub fail_on: HashSet<usize>,
    pub received: Mutex<Vec<FrameId>>,
}

impl WarpSink for FailingSink {
    fn accept(&self, frame: &Frame, _warped: ColorImage) -> Result<()> {
        if self.fail_on.contains(&frame.id.0) {
            return Err(LapseError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only output",
            )));
        }
        self.received.lock().unwrap().push(frame.id);
        Ok(())
    }
}
