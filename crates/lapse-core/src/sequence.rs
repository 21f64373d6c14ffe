use std::path::PathBuf;

use crate::align::AlignOutcome;
use crate::error::{LapseError, Result};
use crate::frame::{AlignmentState, FailureReason, Frame, FrameId, Size};
use crate::geometry::{Quad, Rect};
use crate::homography::Homography;

/// An ordered time-lapse. The first frame is the alignment reference.
#[derive(Clone, Debug, Default)]
pub struct Sequence {
    frames: Vec<Frame>,
    total_rect: Option<Rect>,
    valid_rect: Option<Rect>,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame; ids are assigned in ingestion order.
    pub fn push(&mut self, path: PathBuf, original_size: Size) -> FrameId {
        let id = FrameId(self.frames.len());
        self.frames.push(Frame::new(id, path, original_size));
        id
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame(&self, id: FrameId) -> Option<&Frame> {
        self.frames.get(id.0)
    }

    pub fn reference(&self) -> Option<&Frame> {
        self.frames.first()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Union of the bounding rects of every aligned frame.
    pub fn total_rect(&self) -> Option<Rect> {
        self.total_rect
    }

    /// Largest axis-aligned rect inside every aligned frame; `None` when empty.
    pub fn valid_rect(&self) -> Option<Rect> {
        self.valid_rect
    }

    pub fn set_valid_rect(&mut self, rect: Option<Rect>) {
        self.valid_rect = rect;
    }

    /// Forget all alignment results and mark the reference as aligned with
    /// the identity transform.
    pub fn reset_alignment(&mut self) -> Result<()> {
        self.total_rect = None;
        self.valid_rect = None;
        for frame in &mut self.frames {
            let rect = frame.original_size.to_rect();
            frame.state = AlignmentState::Pending;
            frame.corners = rect.to_quad();
            frame.rect = rect;
        }

        let reference = self.frames.first_mut().ok_or(LapseError::EmptySequence)?;
        reference.state = AlignmentState::Aligned {
            homography: Homography::identity(),
        };
        self.total_rect = Some(reference.rect);
        Ok(())
    }

    /// Record the result of aligning one frame.
    ///
    /// Success stores the transform, corners and rect and grows the total
    /// rect; failure leaves the frame's geometry untouched. Failing a frame
    /// that was aligned drops its rect from the total.
    pub fn apply_alignment(&mut self, id: FrameId, outcome: AlignOutcome) -> Result<()> {
        let frame = self
            .frames
            .get_mut(id.0)
            .ok_or(LapseError::UnknownFrame(id.0))?;

        match outcome {
            AlignOutcome::Aligned {
                homography,
                corners,
                rect,
                ..
            } => {
                frame.state = AlignmentState::Aligned { homography };
                frame.corners = corners;
                frame.rect = rect;
                self.total_rect = Some(match self.total_rect {
                    Some(total) => total.union(&rect),
                    None => rect,
                });
            }
            AlignOutcome::Failed(reason) => {
                let was_aligned = frame.is_aligned();
                frame.state = AlignmentState::Failed(reason);
                if was_aligned {
                    self.total_rect = self
                        .frames
                        .iter()
                        .filter(|f| f.is_aligned())
                        .map(|f| f.rect)
                        .reduce(|a, b| a.union(&b));
                }
            }
        }
        Ok(())
    }

    /// Corners of every aligned frame, in sequence order.
    pub fn aligned_quads(&self) -> Vec<Quad> {
        self.frames
            .iter()
            .filter(|f| f.is_aligned())
            .map(|f| f.corners)
            .collect()
    }

    pub fn failures(&self) -> Vec<(FrameId, FailureReason)> {
        self.frames
            .iter()
            .filter_map(|f| match &f.state {
                AlignmentState::Failed(reason) => Some((f.id, reason.clone())),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence(n: usize) -> Sequence {
        let mut seq = Sequence::new();
        for i in 0..n {
            seq.push(PathBuf::from(format!("frame_{i:03}.jpg")), Size::new(100, 80));
        }
        seq
    }

    #[test]
    fn test_reset_marks_reference() {
        let mut seq = sequence(3);
        seq.reset_alignment().unwrap();
        assert!(seq.frames()[0].is_aligned());
        assert!(!seq.frames()[1].is_aligned());
        assert_eq!(seq.total_rect(), Some(Rect::new(0.0, 0.0, 100.0, 80.0)));
        assert_eq!(seq.valid_rect(), None);
    }

    #[test]
    fn test_reset_empty_sequence_fails() {
        assert!(matches!(
            Sequence::new().reset_alignment(),
            Err(LapseError::EmptySequence)
        ));
    }

    #[test]
    fn test_failure_leaves_total_rect() {
        let mut seq = sequence(2);
        seq.reset_alignment().unwrap();
        seq.apply_alignment(
            FrameId(1),
            AlignOutcome::Failed(FailureReason::DegenerateHomography),
        )
        .unwrap();
        assert!(seq.frames()[1].is_failed());
        assert_eq!(seq.total_rect(), Some(Rect::new(0.0, 0.0, 100.0, 80.0)));
        assert_eq!(seq.aligned_quads().len(), 1);
        assert_eq!(seq.failures().len(), 1);
    }

    #[test]
    fn test_success_grows_total_rect() {
        let mut seq = sequence(2);
        seq.reset_alignment().unwrap();
        let rect = Rect::new(5.0, -3.0, 100.0, 80.0);
        seq.apply_alignment(
            FrameId(1),
            AlignOutcome::Aligned {
                homography: Homography::identity(),
                corners: rect.to_quad(),
                rect,
                inliers: 10,
            },
        )
        .unwrap();
        assert_eq!(seq.total_rect(), Some(Rect::from_edges(0.0, -3.0, 105.0, 80.0)));
    }

    #[test]
    fn test_failing_aligned_frame_shrinks_total_rect() {
        let mut seq = sequence(2);
        seq.reset_alignment().unwrap();
        let rect = Rect::new(5.0, -3.0, 100.0, 80.0);
        seq.apply_alignment(
            FrameId(1),
            AlignOutcome::Aligned {
                homography: Homography::identity(),
                corners: rect.to_quad(),
                rect,
                inliers: 10,
            },
        )
        .unwrap();
        seq.apply_alignment(FrameId(1), AlignOutcome::Failed(FailureReason::Io("disk".into())))
            .unwrap();
        assert_eq!(seq.total_rect(), Some(Rect::new(0.0, 0.0, 100.0, 80.0)));

        seq.apply_alignment(FrameId(0), AlignOutcome::Failed(FailureReason::Io("disk".into())))
            .unwrap();
        assert_eq!(seq.total_rect(), None);
    }

    #[test]
    fn test_unknown_frame() {
        let mut seq = sequence(1);
        let err = seq
            .apply_alignment(FrameId(5), AlignOutcome::Failed(FailureReason::NoCorrespondences))
            .unwrap_err();
        assert!(matches!(err, LapseError::UnknownFrame(5)));
    }
}
