//! Per-frame alignment onto the reference frame and the sequence-wide pass.

pub mod aligner;
pub mod orchestrator;
pub mod warp;

pub use aligner::{align_frame, frame_placement, AlignOutcome};
pub use orchestrator::{align_sequence, AlignmentSummary, WarpSink};
pub use warp::{bilinear_sample, warp_perspective};
