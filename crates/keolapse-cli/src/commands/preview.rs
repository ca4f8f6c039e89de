use anyhow::Result;
use clap::Args;
use keolapse_core::pipeline::render_preview;

use super::SessionArgs;

#[derive(Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Index of the frame to composite
    #[arg(long, default_value = "0")]
    pub frame: usize,

    /// Draw calibration circles over the ring
    #[arg(long)]
    pub draw_circles: bool,
}

pub fn run(args: &PreviewArgs) -> Result<()> {
    let mut config = args.session.load()?;
    config.debug.draw_circles |= args.draw_circles;

    let out = render_preview(&config, args.frame)?;
    println!("Ring preview saved to {}", out.ring_preview.display());
    println!("Frame preview saved to {}", out.frame_preview.display());
    Ok(())
}
