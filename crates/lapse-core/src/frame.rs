use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::consts::{LUMINANCE_B, LUMINANCE_G, LUMINANCE_R};
use crate::geometry::{Quad, Rect};
use crate::homography::Homography;

/// A single-channel image plane.
/// Pixel values are f32 in [0.0, 1.0].
#[derive(Clone, Debug)]
pub struct Plane {
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<f32>,
}

impl Plane {
    pub fn new(data: Array2<f32>) -> Self {
        Self { data }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn size(&self) -> Size {
        Size::new(self.width() as u32, self.height() as u32)
    }
}

/// Color image composed of separate channel planes, plus a coverage mask
/// that is 0.0 where a warp had no source pixel.
#[derive(Clone, Debug)]
pub struct ColorImage {
    pub red: Plane,
    pub green: Plane,
    pub blue: Plane,
    pub alpha: Plane,
}

impl ColorImage {
    /// Build an opaque image from three channels of equal shape.
    pub fn opaque(red: Plane, green: Plane, blue: Plane) -> Self {
        let alpha = Plane::new(Array2::from_elem(red.data.dim(), 1.0));
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    pub fn width(&self) -> usize {
        self.red.width()
    }

    pub fn height(&self) -> usize {
        self.red.height()
    }

    pub fn size(&self) -> Size {
        self.red.size()
    }

    /// ITU-R BT.601 luminance plane.
    pub fn luminance(&self) -> Plane {
        let mut data = self.red.data.mapv(|r| r * LUMINANCE_R);
        data.zip_mut_with(&self.green.data, |l, &g| *l += g * LUMINANCE_G);
        data.zip_mut_with(&self.blue.data, |l, &b| *l += b * LUMINANCE_B);
        Plane::new(data)
    }
}

/// Pixel dimensions of an image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn to_rect(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Opaque frame identity, unique within a sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FrameId(pub usize);

impl std::fmt::Display for FrameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Why a frame could not be aligned. Recoverable: the pass continues.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FailureReason {
    /// Too few correspondences, or no RANSAC trial found a model.
    NoCorrespondences,
    /// The projected corners are flipped or otherwise out of order.
    DegenerateHomography,
    /// The frame's images could not be loaded or decoded.
    Io(String),
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoCorrespondences => write!(f, "no usable correspondences"),
            Self::DegenerateHomography => write!(f, "degenerate homography"),
            Self::Io(msg) => write!(f, "I/O failure: {msg}"),
        }
    }
}

/// Alignment state machine: `Pending -> Aligned | Failed`.
#[derive(Clone, Debug, Default)]
pub enum AlignmentState {
    #[default]
    Pending,
    Aligned { homography: Homography },
    Failed(FailureReason),
}

/// One photograph of the time-lapse.
#[derive(Clone, Debug)]
pub struct Frame {
    pub id: FrameId,
    pub path: PathBuf,
    /// Original pixel dimensions.
    pub original_size: Size,
    pub state: AlignmentState,
    /// Corners in composite space, ordered top-left, bottom-left,
    /// bottom-right, top-right.
    pub corners: Quad,
    /// Axis-aligned bounds of `corners`.
    pub rect: Rect,
}

impl Frame {
    pub fn new(id: FrameId, path: PathBuf, original_size: Size) -> Self {
        let rect = original_size.to_rect();
        Self {
            id,
            path,
            original_size,
            state: AlignmentState::Pending,
            corners: rect.to_quad(),
            rect,
        }
    }

    pub fn is_aligned(&self) -> bool {
        matches!(self.state, AlignmentState::Aligned { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, AlignmentState::Failed(_))
    }

    pub fn homography(&self) -> Option<&Homography> {
        match &self.state {
            AlignmentState::Aligned { homography } => Some(homography),
            _ => None,
        }
    }
}
