use tracing::debug;

/// Timing constraints for the output video.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduleParams {
    pub framerate: f64,
    pub max_length_seconds: f64,
    pub min_fps: f64,
    pub max_fps: f64,
}

/// Which input frames to use and at what rate to play them.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduleDecision {
    /// Indices into the frame set, ascending.
    pub selected: Vec<usize>,
    pub output_fps: f64,
    /// Distance between selected frames; 1 when nothing is skipped.
    pub stride: usize,
}

impl ScheduleDecision {
    pub fn is_subsampled(&self) -> bool {
        self.stride > 1
    }

    pub fn duration_seconds(&self) -> f64 {
        if self.output_fps <= 0.0 {
            return 0.0;
        }
        self.selected.len() as f64 / self.output_fps
    }
}

fn every_nth(frame_count: usize, stride: usize) -> Vec<usize> {
    (0..frame_count).step_by(stride.max(1)).collect()
}

/// Fit `frame_count` frames into the duration ceiling.
///
/// When the natural duration fits, every frame plays at the configured
/// framerate. Otherwise every `stride`-th frame is kept and the rate is
/// recomputed from the kept count, clamped to `[min_fps, max_fps]`. If the
/// clamp would still overrun the ceiling the stride is widened until it
/// fits. Pure: depends on nothing but its arguments.
pub fn schedule(frame_count: usize, params: &ScheduleParams) -> ScheduleDecision {
    let clamp_fps = |fps: f64| fps.clamp(params.min_fps, params.max_fps);

    let natural = frame_count as f64 / params.framerate;
    if natural <= params.max_length_seconds {
        return ScheduleDecision {
            selected: every_nth(frame_count, 1),
            output_fps: clamp_fps(params.framerate),
            stride: 1,
        };
    }

    let ideal = ((params.max_length_seconds * params.framerate).floor() as usize).max(1);
    let mut stride = (frame_count / ideal).max(1);
    let mut selected = every_nth(frame_count, stride);
    let mut fps = clamp_fps(selected.len() as f64 / params.max_length_seconds);

    if selected.len() as f64 / fps > params.max_length_seconds + 1.0 {
        let capacity = ((params.max_length_seconds * fps).floor() as usize).max(1);
        stride = frame_count.div_ceil(capacity);
        selected = every_nth(frame_count, stride);
        fps = clamp_fps(selected.len() as f64 / params.max_length_seconds);
    }

    debug!(
        frame_count,
        natural_seconds = natural,
        stride,
        selected = selected.len(),
        fps,
        "Subsampled frame schedule"
    );

    ScheduleDecision {
        selected,
        output_fps: fps,
        stride,
    }
}
