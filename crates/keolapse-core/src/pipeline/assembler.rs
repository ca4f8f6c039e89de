use std::path::PathBuf;

use image::RgbImage;
use tracing::{debug, info, warn};

use crate::config::{DebugConfig, KeolapseConfig, PaddingConfig};
use crate::encode::FrameSink;
use crate::error::Result;
use crate::frame::FrameSet;
use crate::io::image_io::{apply_padding, letterbox, load_frame, scale_to_fit};
use crate::ring::calibration::draw_calibration;
use crate::ring::strip::strip_width;
use crate::ring::warp::warp_frame;
use crate::ring::{prepare_strips, resolve, RingGeometry, RingMap, RingStrips};
use crate::schedule::ScheduleDecision;

use super::types::{PipelineStage, ProgressReporter};

/// Ring state frozen from the first frame and reused for every frame.
pub struct RingCompositor {
    geometry: RingGeometry,
    strips: RingStrips,
    map: RingMap,
    scale_box: (u32, u32),
    padding: PaddingConfig,
    fill: [u8; 3],
    debug: DebugConfig,
}

impl RingCompositor {
    /// Resolve geometry from the first frame and prepare the strips.
    ///
    /// `keogram` may only be `None` in circles-only mode.
    pub fn new(
        first_frame: &RgbImage,
        keogram: Option<&RgbImage>,
        config: &KeolapseConfig,
        reporter: &dyn ProgressReporter,
    ) -> Result<Self> {
        let scale_box = (config.output.width, config.output.height);
        let fill = config.ring.fill;
        let scaled = scale_to_fit(first_frame, scale_box.0, scale_box.1);
        let padded = apply_padding(&scaled, &config.padding, fill);

        reporter.begin_stage(PipelineStage::Geometry, None);
        let geometry = resolve(padded.width(), padded.height(), &config.ring)?;
        info!(
            center_x = geometry.center_x,
            center_y = geometry.center_y,
            radius = geometry.radius,
            canvas_width = geometry.canvas_width(),
            canvas_height = geometry.canvas_height(),
            "Ring geometry resolved"
        );
        reporter.finish_stage();

        reporter.begin_stage(PipelineStage::Strips, None);
        let strips = match keogram {
            Some(k) if !config.debug.circles_only => prepare_strips(k, &geometry, &config.ring)?,
            _ => RingStrips::placeholder(),
        };
        let map = RingMap::build(&geometry, strip_width(&geometry));
        debug!(ring_pixels = map.len(), strip_width = map.strip_width(), "Ring lookup built");
        reporter.finish_stage();

        Ok(Self {
            geometry,
            strips,
            map,
            scale_box,
            padding: config.padding.clone(),
            fill,
            debug: config.debug,
        })
    }

    pub fn geometry(&self) -> &RingGeometry {
        &self.geometry
    }

    pub fn strips(&self) -> &RingStrips {
        &self.strips
    }

    /// Size of composited frames.
    pub fn canvas_size(&self) -> (u32, u32) {
        (self.geometry.canvas_width(), self.geometry.canvas_height())
    }

    /// Scale and pad a frame onto the canvas the geometry was resolved for.
    fn prepare(&self, frame: &RgbImage) -> RgbImage {
        let scaled = scale_to_fit(frame, self.scale_box.0, self.scale_box.1);
        let padded = apply_padding(&scaled, &self.padding, self.fill);
        letterbox(
            &padded,
            self.geometry.source_width,
            self.geometry.source_height,
            self.fill,
        )
    }

    /// Scale, pad, expand and warp one frame.
    pub fn composite(
        &self,
        frame: &RgbImage,
        frame_index: usize,
        total_frames: usize,
    ) -> Result<RgbImage> {
        let expanded = self.geometry.expand(&self.prepare(frame), self.fill)?;
        warp_frame(
            expanded,
            &self.geometry,
            &self.map,
            &self.strips,
            frame_index,
            total_frames,
            &self.debug,
        )
    }

    /// The expanded frame with only the calibration overlay.
    pub fn calibration_preview(&self, frame: &RgbImage) -> Result<RgbImage> {
        let mut canvas = self.geometry.expand(&self.prepare(frame), self.fill)?;
        draw_calibration(&mut canvas, &self.geometry);
        Ok(canvas)
    }
}

/// Outcome of the per-frame loop.
#[derive(Debug, Default)]
pub struct AssemblyReport {
    pub frames_written: usize,
    pub skipped: Vec<PathBuf>,
    pub warnings: Vec<String>,
    /// First composited frame, kept when previews are requested.
    pub preview: Option<RgbImage>,
}

impl AssemblyReport {
    pub(super) fn skip(&mut self, path: PathBuf, reason: impl std::fmt::Display) {
        warn!(path = %path.display(), error = %reason, "Skipping unreadable frame");
        self.warnings
            .push(format!("Skipped frame {}: {reason}", path.display()));
        self.skipped.push(path);
    }
}

/// Composite the scheduled frames into `sink`, in order.
///
/// `start` is the position in `decision.selected` to begin at, with its
/// already decoded image; earlier positions are left to the caller.
/// Unreadable frames are skipped and recorded; any other error aborts.
pub fn assemble(
    frames: &FrameSet,
    decision: &ScheduleDecision,
    compositor: &RingCompositor,
    sink: &mut dyn FrameSink,
    start: (usize, RgbImage),
    keep_preview: bool,
    reporter: &dyn ProgressReporter,
) -> Result<AssemblyReport> {
    let total = decision.selected.len();
    let (start_pos, first_image) = start;
    let mut cached = Some(first_image);
    let mut report = AssemblyReport::default();

    reporter.begin_stage(PipelineStage::Compositing, Some(total));
    for (pos, &index) in decision.selected.iter().enumerate().skip(start_pos) {
        let Some(path) = frames.get(index) else {
            continue;
        };
        let image = match cached.take() {
            Some(img) => img,
            None => match load_frame(path) {
                Ok(img) => img,
                Err(e) => {
                    report.skip(path.to_path_buf(), e);
                    reporter.advance(pos + 1);
                    continue;
                }
            },
        };

        let composited = compositor.composite(&image, pos, total)?;
        sink.write_frame(&composited)?;
        if keep_preview && report.preview.is_none() {
            report.preview = Some(composited);
        }
        report.frames_written += 1;
        reporter.advance(pos + 1);
    }
    reporter.finish_stage();

    info!(
        written = report.frames_written,
        skipped = report.skipped.len(),
        "Compositing finished"
    );
    Ok(report)
}
