use std::fmt;
use std::path::PathBuf;

use crate::encode::EncodeOutcome;

/// Pipeline processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Scheduling,
    Geometry,
    Strips,
    Compositing,
    Encoding,
    Status,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scheduling => write!(f, "Scheduling frames"),
            Self::Geometry => write!(f, "Resolving ring geometry"),
            Self::Strips => write!(f, "Preparing keogram strip"),
            Self::Compositing => write!(f, "Compositing frames"),
            Self::Encoding => write!(f, "Encoding video"),
            Self::Status => write!(f, "Writing status"),
        }
    }
}

/// Progress reporting for the pipeline.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter {
    /// A new pipeline stage has started. `total_items` is the number of
    /// work items in this stage (e.g., frame count), if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// One work item within the current stage has completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// Reporter that ignores every event.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// What a completed run produced.
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub output: PathBuf,
    pub frames_written: usize,
    pub skipped: Vec<PathBuf>,
    pub output_fps: f64,
    pub outcome: EncodeOutcome,
    pub warnings: Vec<String>,
}

impl RunSummary {
    /// True when the deliverable exists but something was degraded.
    pub fn is_partial(&self) -> bool {
        self.outcome.is_fallback() || !self.skipped.is_empty()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let how = match self.outcome {
            EncodeOutcome::Encoded => "encoded",
            EncodeOutcome::RawFallback { .. } => "unencoded, encoder failed",
            EncodeOutcome::RawOnly => "unencoded",
        };
        write!(
            f,
            "Keolapse created {} ({} frames at {:.2} fps, {how})",
            self.output.display(),
            self.frames_written,
            self.output_fps
        )?;
        if !self.warnings.is_empty() {
            write!(f, " with {} warning(s)", self.warnings.len())?;
        }
        Ok(())
    }
}
