use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{bail, Context, Result};
use clap::Args;
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use lapse_core::align::{align_sequence, warp_perspective, WarpSink};
use lapse_core::features::CorrelationMatcher;
use lapse_core::frame::{AlignmentState, ColorImage, Frame, Size};
use lapse_core::geometry::Rect;
use lapse_core::io::{crop_color, image_size, load_color, save_color_png, DiskFrameSource};
use lapse_core::pipeline::{CancelToken, LapseConfig, PipelineStage, ProgressReporter};
use lapse_core::sequence::Sequence;

use crate::inputs::collect_inputs;
use crate::progress::BarReporter;
use crate::summary::{print_align_summary, print_result_summary};

#[derive(Args)]
pub struct AlignArgs {
    /// Input images, or directories of images
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Order frames by modification time instead of file name
    #[arg(long)]
    pub sort_by_time: bool,

    /// TOML config file (see `lapse config`)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for the cropped, aligned frames
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory for full-canvas warped frames, written during alignment
    #[arg(long)]
    pub warped: Option<PathBuf>,

    /// Alignment report path (default: <output>/report.toml)
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Number of independent RANSAC trials per frame
    #[arg(long)]
    pub trials: Option<usize>,

    /// Seed for RANSAC and the crop search
    #[arg(long)]
    pub seed: Option<u64>,

    /// Height of the preprocessed matching images in pixels
    #[arg(long)]
    pub height: Option<u32>,
}

/// Writes each warped frame as a PNG with its coverage in the alpha channel.
struct PngSink {
    dir: PathBuf,
}

impl WarpSink for PngSink {
    fn accept(&self, frame: &Frame, warped: ColorImage) -> lapse_core::error::Result<()> {
        save_color_png(&warped, &self.dir.join(output_name(frame)))
    }
}

#[derive(Serialize)]
struct FrameReport {
    index: usize,
    path: String,
    status: &'static str,
    reason: Option<String>,
    rect: Option<Rect>,
    homography: Option<[[f64; 3]; 3]>,
}

#[derive(Serialize)]
struct AlignmentReport {
    reference: String,
    total_rect: Option<Rect>,
    valid_rect: Option<Rect>,
    frames: Vec<FrameReport>,
}

fn output_name(frame: &Frame) -> String {
    let stem = frame
        .path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".to_string());
    format!("{:04}_{}.png", frame.id.0, stem)
}

fn build_config(args: &AlignArgs) -> Result<LapseConfig> {
    let mut config = match args.config {
        Some(ref path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            toml::from_str::<LapseConfig>(&text)
                .with_context(|| format!("Failed to parse config {}", path.display()))?
        }
        None => LapseConfig::default(),
    };

    if let Some(trials) = args.trials {
        config.ransac.trials = trials;
    }
    if let Some(seed) = args.seed {
        config.ransac.seed = Some(seed);
        config.optimizer.seed = Some(seed);
    }
    if let Some(height) = args.height {
        config.preprocess.height = height;
    }
    config.validate()?;
    Ok(config)
}

fn build_sequence(paths: Vec<PathBuf>) -> Result<Sequence> {
    let mut sequence = Sequence::new();
    for path in paths {
        let size = image_size(&path)
            .with_context(|| format!("Failed to read image header of {}", path.display()))?;
        sequence.push(path, size);
    }
    Ok(sequence)
}

fn frame_report(frame: &Frame) -> FrameReport {
    let (status, reason, rect, homography) = match &frame.state {
        AlignmentState::Pending => ("pending", None, None, None),
        AlignmentState::Aligned { homography } => (
            "aligned",
            None,
            Some(frame.rect),
            Some(homography.to_rows()),
        ),
        AlignmentState::Failed(reason) => ("failed", Some(reason.to_string()), None, None),
    };
    FrameReport {
        index: frame.id.0,
        path: frame.path.display().to_string(),
        status,
        reason,
        rect,
        homography,
    }
}

fn write_report(sequence: &Sequence, path: &Path) -> Result<()> {
    let report = AlignmentReport {
        reference: sequence
            .reference()
            .map(|f| f.path.display().to_string())
            .unwrap_or_default(),
        total_rect: sequence.total_rect(),
        valid_rect: sequence.valid_rect(),
        frames: sequence.frames().iter().map(frame_report).collect(),
    };
    let text = toml::to_string_pretty(&report)?;
    std::fs::write(path, text)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    Ok(())
}

/// Warp every aligned frame into the reference canvas, crop it to the valid
/// rect and save it under `dir`.
fn export_frames(
    sequence: &Sequence,
    valid: &Rect,
    canvas: Size,
    dir: &Path,
    reporter: &dyn ProgressReporter,
) -> Result<usize> {
    let frames: Vec<&Frame> = sequence.frames().iter().filter(|f| f.is_aligned()).collect();
    reporter.begin_stage(PipelineStage::Exporting, Some(frames.len()));
    let done = AtomicUsize::new(0);

    frames.par_iter().try_for_each(|frame| -> Result<()> {
        let Some(homography) = frame.homography() else {
            return Ok(());
        };
        let image = load_color(&frame.path)
            .with_context(|| format!("Failed to load {}", frame.path.display()))?;
        let warped = warp_perspective(&image, homography, canvas);
        let cropped = crop_color(&warped, valid)?;
        save_color_png(&cropped, &dir.join(output_name(frame)))?;
        let n = done.fetch_add(1, Ordering::Relaxed) + 1;
        reporter.advance(n);
        Ok(())
    })?;

    reporter.finish_stage();
    Ok(frames.len())
}

pub fn run(args: &AlignArgs) -> Result<()> {
    let config = build_config(args)?;
    let paths = collect_inputs(&args.inputs, args.sort_by_time)?;
    if paths.len() < 2 {
        bail!("Need at least two frames to align, found {}", paths.len());
    }
    let mut sequence = build_sequence(paths)?;

    print_align_summary(
        &config,
        &sequence,
        args.output.as_deref(),
        args.warped.as_deref(),
    );

    for dir in [&args.output, &args.warped].into_iter().flatten() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let source = DiskFrameSource::new(config.preprocess.clone());
    let matcher = CorrelationMatcher::new(config.matching.clone());
    let reporter = BarReporter::new();
    let cancel = CancelToken::new();
    let sink = args.warped.as_ref().map(|dir| PngSink { dir: dir.clone() });

    let summary = align_sequence(
        &mut sequence,
        &source,
        &matcher,
        &config,
        &reporter,
        sink.as_ref().map(|s| s as &dyn WarpSink),
        &cancel,
    )?;

    print_result_summary(&sequence, &summary);

    if let Some(ref dir) = args.output {
        let canvas = sequence
            .reference()
            .map(|f| f.original_size)
            .unwrap_or_default();
        match summary.valid_rect {
            Some(valid) => {
                let count = export_frames(&sequence, &valid, canvas, dir, &reporter)?;
                info!(frames = count, output = %dir.display(), "Export complete");
                println!("Exported {} frames to {}", count, dir.display());
            }
            None => println!("No common area; nothing exported"),
        }
    }

    let report_path = args
        .report
        .clone()
        .or_else(|| args.output.as_ref().map(|d| d.join("report.toml")));
    if let Some(path) = report_path {
        write_report(&sequence, &path)?;
        println!("Report saved to {}", path.display());
    }

    Ok(())
}
