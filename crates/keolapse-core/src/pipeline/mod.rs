mod assembler;
mod orchestrator;
mod types;

pub use assembler::{assemble, AssemblyReport, RingCompositor};
pub use orchestrator::{
    render_preview, run_keolapse, run_keolapse_reported, run_keolapse_status, PreviewOutput,
};
pub use types::{NoOpReporter, PipelineStage, ProgressReporter, RunSummary};
