use std::path::{Path, PathBuf};

use chrono::{Local, Utc};
use image::RgbImage;
use tracing::{info, warn};

use crate::config::KeolapseConfig;
use crate::consts::{FRAME_PREVIEW_FILE_NAME, RING_PREVIEW_FILE_NAME};
use crate::encode::{
    finalize_video, partial_path, raw_path, EncodeOutcome, EncodeParams, FfmpegEncoder, FfmpegRawWriter,
    RawVideoSpec, RawWriter, VideoEncoder,
};
use crate::error::{KeolapseError, Result};
use crate::frame::{FrameSet, SessionDate};
use crate::io::discovery::{discover_frames, find_keogram, output_video_path};
use crate::io::image_io::{load_frame, save_png_atomic};
use crate::io::status::{read_status, write_status, RunStatus};
use crate::schedule::{schedule, ScheduleDecision};

use super::assembler::{assemble, AssemblyReport, RingCompositor};
use super::types::{NoOpReporter, PipelineStage, ProgressReporter, RunSummary};

fn session_date(config: &KeolapseConfig) -> SessionDate {
    SessionDate::from_dir_name(&config.images_dir)
        .unwrap_or_else(|| SessionDate(Local::now().date_naive()))
}

/// Load the keogram unless the run only draws calibration circles.
fn load_keogram(config: &KeolapseConfig, date: SessionDate) -> Result<Option<RgbImage>> {
    if config.debug.circles_only {
        return Ok(None);
    }
    let path = match config.keogram {
        Some(ref p) if p.is_file() => p.clone(),
        Some(ref p) => return Err(KeolapseError::KeogramNotFound(p.clone())),
        None => find_keogram(&config.resolved_keogram_dir(), Some(date), &config.extensions)?,
    };
    info!(path = %path.display(), "Using keogram");
    Ok(Some(load_frame(&path)?))
}

/// Decode the first readable scheduled frame.
///
/// Returns its position in the schedule, the image, and the skipped frames
/// before it recorded in a report.
fn first_readable(
    frames: &FrameSet,
    decision: &ScheduleDecision,
) -> Result<(usize, RgbImage, AssemblyReport)> {
    let mut report = AssemblyReport::default();
    for (pos, &index) in decision.selected.iter().enumerate() {
        let Some(path) = frames.get(index) else {
            continue;
        };
        match load_frame(path) {
            Ok(img) => return Ok((pos, img, report)),
            Err(e) => report.skip(path.to_path_buf(), e),
        }
    }
    Err(KeolapseError::EmptySequence)
}

fn log_previous_status(output_dir: &Path) {
    match read_status(output_dir) {
        Ok(Some(prev)) => info!(
            last_run = %prev.last_run,
            frame_count = prev.frame_count,
            output_fps = prev.output_fps,
            "Previous run"
        ),
        Ok(None) => {}
        Err(e) => warn!(error = %e, "Ignoring unreadable status file"),
    }
}

/// Run with the default `ffmpeg` writer and encoder and no progress output.
pub fn run_keolapse(config: &KeolapseConfig) -> Result<RunSummary> {
    let writer = FfmpegRawWriter::new(&config.encoder.program);
    let encoder = FfmpegEncoder::new(&config.encoder.program);
    let encoder: Option<&dyn VideoEncoder> = if config.encoder.enabled {
        Some(&encoder)
    } else {
        None
    };
    run_keolapse_reported(config, &writer, encoder, &NoOpReporter)
}

/// Run and describe the result in one line. Never fails.
pub fn run_keolapse_status(config: &KeolapseConfig) -> String {
    match run_keolapse(config) {
        Ok(summary) => summary.to_string(),
        Err(e) => format!("Keolapse failed: {e}"),
    }
}

/// Run the whole keolapse pipeline for one session.
///
/// Fatal errors (configuration, no images, no keogram) return before the
/// output directory is touched. Unreadable frames are skipped and an
/// encoder failure falls back to the raw video; both surface as warnings,
/// as do failed preview or status writes once the video is under way.
pub fn run_keolapse_reported(
    config: &KeolapseConfig,
    writer: &dyn RawWriter,
    encoder: Option<&dyn VideoEncoder>,
    reporter: &dyn ProgressReporter,
) -> Result<RunSummary> {
    config.validate()?;
    let frames = discover_frames(&config.images_dir, &config.extensions)?;
    let date = session_date(config);
    let keogram = load_keogram(config, date)?;
    info!(frames = frames.len(), session = %date.compact(), "Starting keolapse");

    reporter.begin_stage(PipelineStage::Scheduling, None);
    let decision = schedule(frames.len(), &config.schedule_params());
    info!(
        selected = decision.selected.len(),
        stride = decision.stride,
        fps = decision.output_fps,
        "Frame schedule"
    );
    reporter.finish_stage();

    let (start_pos, first_image, mut report) = first_readable(&frames, &decision)?;
    let compositor = RingCompositor::new(&first_image, keogram.as_ref(), config, reporter)?;
    let ring_preview = if config.debug.save_previews {
        Some(compositor.calibration_preview(&first_image)?)
    } else {
        None
    };

    std::fs::create_dir_all(&config.output_dir)?;
    log_previous_status(&config.output_dir);

    let target = output_video_path(
        &config.output_dir,
        &config.output.prefix,
        date,
        &config.output.extension,
    );
    let raw = raw_path(&target);
    // Leftovers of an interrupted or failed earlier run.
    discard(&raw);
    discard(&partial_path(&target));
    let (width, height) = compositor.canvas_size();
    let spec = RawVideoSpec {
        path: raw.clone(),
        width,
        height,
        fps: decision.output_fps,
    };

    let assembled = write_raw(
        writer,
        &spec,
        &frames,
        &decision,
        &compositor,
        (start_pos, first_image),
        config.debug.save_previews,
        reporter,
    );
    let assembled = match assembled {
        Ok(r) if r.frames_written > 0 => r,
        Ok(_) => {
            discard(&raw);
            return Err(KeolapseError::EmptySequence);
        }
        Err(e) => {
            discard(&raw);
            return Err(e);
        }
    };
    report.frames_written = assembled.frames_written;
    report.skipped.extend(assembled.skipped);
    report.warnings.extend(assembled.warnings);
    report.preview = assembled.preview;

    if let Some(ref img) = ring_preview {
        save_preview(img, &config.output_dir.join(RING_PREVIEW_FILE_NAME), &mut report);
    }
    if let Some(img) = report.preview.take() {
        save_preview(&img, &config.output_dir.join(FRAME_PREVIEW_FILE_NAME), &mut report);
    }

    reporter.begin_stage(PipelineStage::Encoding, None);
    let params = EncodeParams::resolve(&config.encoder);
    let outcome = finalize_video(encoder, &raw, &target, &params)?;
    if let EncodeOutcome::RawFallback { ref reason } = outcome {
        report
            .warnings
            .push(format!("Encoder failed, kept unencoded video: {reason}"));
    }
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::Status, None);
    let status = RunStatus {
        last_run: Utc::now(),
        frame_count: report.frames_written,
        output_fps: decision.output_fps,
        warnings: report.warnings.clone(),
    };
    if let Err(e) = write_status(&config.output_dir, &status) {
        warn!(error = %e, "Failed to write status file");
        report.warnings.push(format!("Could not write status file: {e}"));
    }
    reporter.finish_stage();

    let summary = RunSummary {
        output: target,
        frames_written: report.frames_written,
        skipped: report.skipped,
        output_fps: decision.output_fps,
        outcome,
        warnings: report.warnings,
    };
    info!(partial = summary.is_partial(), "{summary}");
    Ok(summary)
}

#[allow(clippy::too_many_arguments)]
fn write_raw(
    writer: &dyn RawWriter,
    spec: &RawVideoSpec,
    frames: &FrameSet,
    decision: &ScheduleDecision,
    compositor: &RingCompositor,
    start: (usize, RgbImage),
    keep_preview: bool,
    reporter: &dyn ProgressReporter,
) -> Result<AssemblyReport> {
    let mut sink = writer.open(spec)?;
    let assembled = assemble(
        frames,
        decision,
        compositor,
        sink.as_mut(),
        start,
        keep_preview,
        reporter,
    );
    let finished = sink.finish();
    let report = assembled?;
    finished?;
    Ok(report)
}

fn discard(path: &Path) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            warn!(path = %path.display(), error = %e, "Failed to remove intermediate video");
        }
    }
}

/// Debug stills are optional; a failed save only adds a warning.
fn save_preview(img: &RgbImage, path: &Path, report: &mut AssemblyReport) {
    if let Err(e) = save_png_atomic(img, path) {
        warn!(path = %path.display(), error = %e, "Failed to save preview");
        report
            .warnings
            .push(format!("Could not save preview {}: {e}", path.display()));
    }
}

/// Files written by [`render_preview`].
#[derive(Clone, Debug)]
pub struct PreviewOutput {
    pub ring_preview: PathBuf,
    pub frame_preview: PathBuf,
}

/// Render the calibration preview and one composited frame as PNG stills,
/// without producing a video.
///
/// `frame_index` indexes the full frame set; the progress marker is placed
/// as it would be for that frame.
pub fn render_preview(config: &KeolapseConfig, frame_index: usize) -> Result<PreviewOutput> {
    config.validate()?;
    let frames = discover_frames(&config.images_dir, &config.extensions)?;
    let keogram = load_keogram(config, session_date(config))?;

    let path = frames
        .get(frame_index)
        .ok_or_else(|| {
            KeolapseError::InvalidConfig(format!(
                "frame index {frame_index} out of range (total: {})",
                frames.len()
            ))
        })?
        .to_path_buf();
    let image = load_frame(&path)?;

    let compositor = RingCompositor::new(&image, keogram.as_ref(), config, &NoOpReporter)?;
    let ring = compositor.calibration_preview(&image)?;
    let composited = compositor.composite(&image, frame_index, frames.len())?;

    std::fs::create_dir_all(&config.output_dir)?;
    let out = PreviewOutput {
        ring_preview: config.output_dir.join(RING_PREVIEW_FILE_NAME),
        frame_preview: config.output_dir.join(FRAME_PREVIEW_FILE_NAME),
    };
    save_png_atomic(&ring, &out.ring_preview)?;
    save_png_atomic(&composited, &out.frame_preview)?;
    info!(frame = %path.display(), "Preview written");
    Ok(out)
}
