use tracing::debug;

use crate::error::Result;
use crate::frame::{ColorImage, Frame, Plane};

use super::image_io::load_color;
use super::preprocess::{preprocess, PreprocessConfig};

/// Supplies pixel data for the frames of a sequence.
pub trait FrameSource: Send + Sync {
    /// Reduced, contrast-normalized luminance used for matching.
    fn preprocessed(&self, frame: &Frame) -> Result<Plane>;

    /// Full-resolution color image.
    fn original(&self, frame: &Frame) -> Result<ColorImage>;
}

/// Reads frames from their paths on every request. Nothing is retained
/// between calls, so memory stays flat over long sequences.
pub struct DiskFrameSource {
    config: PreprocessConfig,
}

impl DiskFrameSource {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }
}

impl FrameSource for DiskFrameSource {
    fn preprocessed(&self, frame: &Frame) -> Result<Plane> {
        let plane = preprocess(&load_color(&frame.path)?, &self.config);
        debug!(
            frame = %frame.id,
            width = plane.width(),
            height = plane.height(),
            "Preprocessed frame"
        );
        Ok(plane)
    }

    fn original(&self, frame: &Frame) -> Result<ColorImage> {
        load_color(&frame.path)
    }
}
