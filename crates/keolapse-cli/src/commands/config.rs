use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use keolapse_core::config::KeolapseConfig;

#[derive(Args)]
pub struct ConfigArgs {
    /// Write config to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Print or save a full default KeolapseConfig as TOML.
pub fn run(args: &ConfigArgs) -> Result<()> {
    let config = KeolapseConfig::new("/var/allsky/images/20240115", "/var/allsky/videos");
    let toml_str = toml::to_string_pretty(&config)?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &toml_str)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        println!("Default config saved to {}", path.display());
    } else {
        print!("{}", toml_str);
    }

    Ok(())
}
