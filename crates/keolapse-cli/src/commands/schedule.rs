use anyhow::Result;
use clap::Args;
use keolapse_core::io::discovery::discover_frames;
use keolapse_core::schedule::schedule;

use super::SessionArgs;

#[derive(Args)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// List every selected frame
    #[arg(long)]
    pub list: bool,
}

pub fn run(args: &ScheduleArgs) -> Result<()> {
    let config = args.session.load()?;
    config.validate()?;
    let frames = discover_frames(&config.images_dir, &config.extensions)?;
    let decision = schedule(frames.len(), &config.schedule_params());

    println!("Images:      {}", frames.dir().display());
    println!("Frames:      {}", frames.len());
    println!("Selected:    {}", decision.selected.len());
    println!("Stride:      {}", decision.stride);
    println!("Output fps:  {:.2}", decision.output_fps);
    println!(
        "Duration:    {:.1} s (limit {} s)",
        decision.duration_seconds(),
        config.output.max_length_seconds
    );

    if args.list {
        println!();
        for &index in &decision.selected {
            if let Some(path) = frames.get(index) {
                println!("{:>6}  {}", index, path.display());
            }
        }
    }

    Ok(())
}
