use tracing::{debug, info, warn};

use crate::crop::optimize_valid_rect;
use crate::error::{LapseError, Result};
use crate::features::CorrespondenceProvider;
use crate::frame::{ColorImage, FailureReason, Frame, FrameId};
use crate::geometry::Rect;
use crate::io::FrameSource;
use crate::pipeline::{CancelToken, LapseConfig, PipelineStage, ProgressReporter};
use crate::sequence::Sequence;

use super::aligner::{align_frame, AlignOutcome};
use super::warp::warp_perspective;

/// Receives each aligned frame resampled into the reference canvas.
pub trait WarpSink: Send + Sync {
    fn accept(&self, frame: &Frame, warped: ColorImage) -> Result<()>;
}

/// What an alignment pass produced.
#[derive(Clone, Debug, Default)]
pub struct AlignmentSummary {
    /// Frames aligned, the reference included.
    pub aligned: usize,
    pub failed: Vec<(FrameId, FailureReason)>,
    pub total_rect: Option<Rect>,
    pub valid_rect: Option<Rect>,
}

/// Record an I/O failure on one frame; the pass carries on without it.
fn fail_io(sequence: &mut Sequence, frame: &Frame, error: &LapseError) -> Result<()> {
    warn!(frame = %frame.id, path = %frame.path.display(), %error, "Frame failed");
    sequence.apply_alignment(frame.id, AlignOutcome::Failed(FailureReason::Io(error.to_string())))
}

/// Align every frame of `sequence` onto its first frame, then search for the
/// largest rectangle covered by all aligned frames.
///
/// Per-frame failures, including I/O and sink errors, are recorded on the
/// frame and the pass continues.
/// Cancellation between frames aborts with [`LapseError::Cancelled`];
/// results recorded so far stay on the sequence.
pub fn align_sequence(
    sequence: &mut Sequence,
    source: &dyn FrameSource,
    provider: &dyn CorrespondenceProvider,
    config: &LapseConfig,
    reporter: &dyn ProgressReporter,
    sink: Option<&dyn WarpSink>,
    cancel: &CancelToken,
) -> Result<AlignmentSummary> {
    if sequence.len() < 2 {
        return Ok(AlignmentSummary::default());
    }

    sequence.reset_alignment()?;
    let reference = sequence.frames()[0].clone();
    reporter.begin_stage(PipelineStage::Preprocessing, Some(1));
    let reference_plane = source.preprocessed(&reference);
    reporter.advance(1);
    reporter.finish_stage();
    let reference_plane = reference_plane?;
    let total = sequence.len();

    info!(
        frames = total,
        reference = %reference.path.display(),
        trials = config.ransac.trials,
        "Aligning sequence"
    );

    reporter.begin_stage(PipelineStage::Aligning, Some(total));
    if let Some(sink) = sink {
        let delivered = source
            .original(&reference)
            .and_then(|image| sink.accept(&reference, image));
        if let Err(e) = delivered {
            fail_io(sequence, &reference, &e)?;
        }
    }
    reporter.advance(1);

    for index in 1..total {
        if cancel.is_cancelled() {
            info!(done = index, "Alignment cancelled");
            reporter.finish_stage();
            return Err(LapseError::Cancelled);
        }

        let frame = sequence.frames()[index].clone();
        let outcome = match source.preprocessed(&frame) {
            Ok(plane) => match align_frame(
                &reference_plane,
                reference.original_size,
                &plane,
                frame.original_size,
                provider,
                &config.ransac,
            ) {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(frame = %frame.id, error = %e, "Correspondence search failed");
                    AlignOutcome::Failed(FailureReason::NoCorrespondences)
                }
            },
            Err(e) => AlignOutcome::Failed(FailureReason::Io(e.to_string())),
        };

        let warped = match (&outcome, sink) {
            (AlignOutcome::Aligned { homography, .. }, Some(_)) => {
                match source.original(&frame) {
                    Ok(image) => Some(warp_perspective(
                        &image,
                        homography,
                        reference.original_size,
                    )),
                    Err(e) => {
                        fail_io(sequence, &frame, &e)?;
                        reporter.advance(index + 1);
                        continue;
                    }
                }
            }
            _ => None,
        };

        match &outcome {
            AlignOutcome::Aligned { rect, inliers, .. } => {
                debug!(frame = %frame.id, inliers, rect = %rect, "Frame aligned");
            }
            AlignOutcome::Failed(reason) => {
                warn!(frame = %frame.id, path = %frame.path.display(), %reason, "Frame failed");
            }
        }
        sequence.apply_alignment(frame.id, outcome)?;

        if let (Some(sink), Some(warped)) = (sink, warped) {
            if let Err(e) = sink.accept(&sequence.frames()[index], warped) {
                fail_io(sequence, &frame, &e)?;
            }
        }
        reporter.advance(index + 1);
    }
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::Optimizing, None);
    let quads = sequence.aligned_quads();
    let valid_rect = optimize_valid_rect(&quads, &config.optimizer, cancel);
    sequence.set_valid_rect(valid_rect);
    reporter.finish_stage();

    let summary = AlignmentSummary {
        aligned: quads.len(),
        failed: sequence.failures(),
        total_rect: sequence.total_rect(),
        valid_rect,
    };
    info!(
        aligned = summary.aligned,
        failed = summary.failed.len(),
        valid = %valid_rect.map_or_else(|| "empty".to_string(), |r| r.to_string()),
        "Alignment complete"
    );
    Ok(summary)
}
