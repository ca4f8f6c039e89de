use console::Style;
use keolapse_core::config::KeolapseConfig;
use keolapse_core::encode::{EncodeOutcome, EncodeParams};
use keolapse_core::pipeline::RunSummary;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
    warning: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
            warning: Style::new().yellow(),
        }
    }
}

pub fn print_run_summary(config: &KeolapseConfig) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Keolapse"));
    println!("  {}", s.title.apply_to("\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}"));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Images"),
        s.path.apply_to(config.images_dir.display())
    );
    match config.keogram {
        Some(ref path) => println!(
            "  {:<14}{}",
            s.label.apply_to("Keogram"),
            s.path.apply_to(path.display())
        ),
        None => println!(
            "  {:<14}{}",
            s.label.apply_to("Keogram dir"),
            s.path.apply_to(config.resolved_keogram_dir().display())
        ),
    }
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(config.output_dir.display())
    );
    println!();

    // Video
    let out = &config.output;
    println!("  {}", s.header.apply_to("Video"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Size"),
        s.value.apply_to(format!("{}x{}", out.width, out.height))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Framerate"),
        s.value.apply_to(format!(
            "{} fps ({}-{})",
            out.framerate, out.min_fps, out.max_fps
        ))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Max length"),
        s.value.apply_to(format!("{} s", out.max_length_seconds))
    );
    println!();

    // Ring
    let ring = &config.ring;
    println!("  {}", s.header.apply_to("Ring"));
    if config.debug.circles_only {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Keogram"),
            s.disabled.apply_to("circles only")
        );
    }
    println!(
        "    {:<12}{}",
        s.label.apply_to("Radius"),
        s.value.apply_to(format!("{:.0}%", ring.circle_radius_factor * 100.0))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Height"),
        s.value.apply_to(format!("{} px", ring.ring_height))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Start"),
        s.method.apply_to(ring.start_position)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Blend"),
        s.value.apply_to(format!("{:.0}% keogram", ring.keogram_weight * 100.0))
    );
    println!();

    // Encoder
    if config.encoder.enabled {
        let params = EncodeParams::resolve(&config.encoder);
        println!("  {}", s.header.apply_to("Encoder"));
        println!(
            "    {:<12}{}",
            s.label.apply_to("Codec"),
            s.method.apply_to(&params.codec)
        );
        println!(
            "    {:<12}{}",
            s.label.apply_to("Quality"),
            s.value.apply_to(format!(
                "{} ({} kbps, crf {})",
                config.encoder.quality, params.bitrate_kbps, params.crf
            ))
        );
    } else {
        println!(
            "  {:<14}{}",
            s.header.apply_to("Encoder"),
            s.disabled.apply_to("disabled")
        );
    }
    println!();
}

pub fn print_run_result(summary: &RunSummary) {
    let s = Styles::new();

    println!();
    println!(
        "  {:<14}{}",
        s.label.apply_to("Video"),
        s.path.apply_to(summary.output.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Frames"),
        s.value.apply_to(format!(
            "{} at {:.2} fps",
            summary.frames_written, summary.output_fps
        ))
    );
    let encoded = match summary.outcome {
        EncodeOutcome::Encoded => s.method.apply_to("encoded"),
        EncodeOutcome::RawFallback { .. } => s.warning.apply_to("unencoded (encoder failed)"),
        EncodeOutcome::RawOnly => s.disabled.apply_to("unencoded"),
    };
    println!("  {:<14}{}", s.label.apply_to("Encoding"), encoded);

    if !summary.warnings.is_empty() {
        println!();
        println!("  {}", s.header.apply_to("Warnings"));
        for warning in &summary.warnings {
            println!("    {}", s.warning.apply_to(warning));
        }
    }
    println!();
}
