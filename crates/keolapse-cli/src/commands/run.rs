use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use keolapse_core::encode::{FfmpegEncoder, FfmpegRawWriter, VideoEncoder};
use keolapse_core::pipeline::{run_keolapse_reported, PipelineStage, ProgressReporter};

use super::{QualityArg, SessionArgs};
use crate::summary::{print_run_result, print_run_summary};

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Encoding quality preset
    #[arg(long, value_enum)]
    pub quality: Option<QualityArg>,

    /// Keep the unencoded intermediate video instead of running the encoder
    #[arg(long)]
    pub no_encode: bool,

    /// Draw calibration circles only, without the keogram
    #[arg(long)]
    pub circles_only: bool,

    /// Draw calibration circles over the ring
    #[arg(long)]
    pub draw_circles: bool,

    /// Save ring and first-frame preview stills next to the video
    #[arg(long)]
    pub previews: bool,
}

/// Drives one indicatif bar, restyled for every stage.
struct BarReporter {
    pb: ProgressBar,
}

impl BarReporter {
    fn new() -> Result<Self> {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg:24} [{bar:40}] {pos}/{len}")?
                .progress_chars("=> "),
        );
        Ok(Self { pb })
    }
}

impl ProgressReporter for BarReporter {
    fn begin_stage(&self, stage: PipelineStage, total_items: Option<usize>) {
        self.pb.set_message(stage.to_string());
        self.pb.set_length(total_items.unwrap_or(1) as u64);
        self.pb.set_position(0);
    }

    fn advance(&self, items_done: usize) {
        self.pb.set_position(items_done as u64);
    }

    fn finish_stage(&self) {
        if let Some(len) = self.pb.length() {
            self.pb.set_position(len);
        }
    }
}

pub fn run(args: &RunArgs) -> Result<()> {
    let mut config = args.session.load()?;
    if let Some(quality) = args.quality {
        config.encoder.quality = quality.into();
    }
    if args.no_encode {
        config.encoder.enabled = false;
    }
    config.debug.circles_only |= args.circles_only;
    config.debug.draw_circles |= args.draw_circles;
    config.debug.save_previews |= args.previews;

    print_run_summary(&config);

    let writer = FfmpegRawWriter::new(&config.encoder.program);
    let encoder = FfmpegEncoder::new(&config.encoder.program);
    let encoder: Option<&dyn VideoEncoder> = if config.encoder.enabled {
        Some(&encoder)
    } else {
        None
    };

    let reporter = BarReporter::new()?;
    let result = run_keolapse_reported(&config, &writer, encoder, &reporter);
    reporter.pb.finish_with_message("Done");

    let summary = result?;
    print_run_result(&summary);
    Ok(())
}
