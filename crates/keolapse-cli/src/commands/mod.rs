pub mod config;
pub mod preview;
pub mod run;
pub mod schedule;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use keolapse_core::config::{KeolapseConfig, StartPosition};
use keolapse_core::encode::QualityTier;

#[derive(Clone, Copy, ValueEnum)]
pub enum StartArg {
    #[value(name = "12")]
    Twelve,
    #[value(name = "3")]
    Three,
    #[value(name = "6")]
    Six,
    #[value(name = "9")]
    Nine,
}

impl From<StartArg> for StartPosition {
    fn from(arg: StartArg) -> Self {
        match arg {
            StartArg::Twelve => StartPosition::Twelve,
            StartArg::Three => StartPosition::Three,
            StartArg::Six => StartPosition::Six,
            StartArg::Nine => StartPosition::Nine,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum QualityArg {
    Low,
    Medium,
    High,
    Ultra,
}

impl From<QualityArg> for QualityTier {
    fn from(arg: QualityArg) -> Self {
        match arg {
            QualityArg::Low => QualityTier::Low,
            QualityArg::Medium => QualityTier::Medium,
            QualityArg::High => QualityTier::High,
            QualityArg::Ultra => QualityTier::Ultra,
        }
    }
}

/// Session selection shared by `run`, `schedule` and `preview`.
///
/// A config file, when given, supplies everything; the flags below only
/// override the fields they name.
#[derive(Args)]
pub struct SessionArgs {
    /// Directory with the night's frames (usually named YYYYMMDD)
    pub images: Option<PathBuf>,

    /// Keolapse config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory the video, previews and status file go to
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Keogram file to use instead of searching for one
    #[arg(long)]
    pub keogram: Option<PathBuf>,

    /// Directory searched for the keogram
    #[arg(long)]
    pub keogram_dir: Option<PathBuf>,

    /// Clock position of the keogram start
    #[arg(long, value_enum)]
    pub start: Option<StartArg>,

    /// Keogram share of the ring blend (0-1)
    #[arg(long)]
    pub keogram_weight: Option<f32>,

    /// Width of the box frames are scaled into
    #[arg(long)]
    pub width: Option<u32>,

    /// Height of the box frames are scaled into
    #[arg(long)]
    pub height: Option<u32>,

    /// Target framerate
    #[arg(long)]
    pub fps: Option<f64>,

    /// Longest allowed video, in seconds
    #[arg(long)]
    pub max_length: Option<f64>,
}

impl SessionArgs {
    pub fn load(&self) -> Result<KeolapseConfig> {
        let mut config = match self.config {
            Some(ref path) => read_config(path)?,
            None => {
                let images = self
                    .images
                    .clone()
                    .context("Either an images directory or --config is required")?;
                let output = self.output.clone().unwrap_or_else(|| PathBuf::from("."));
                KeolapseConfig::new(images, output)
            }
        };

        if let Some(ref images) = self.images {
            config.images_dir = images.clone();
        }
        if let Some(ref output) = self.output {
            config.output_dir = output.clone();
        }
        if let Some(ref keogram) = self.keogram {
            config.keogram = Some(keogram.clone());
        }
        if let Some(ref dir) = self.keogram_dir {
            config.keogram_dir = Some(dir.clone());
        }
        if let Some(start) = self.start {
            config.ring.start_position = start.into();
        }
        if let Some(weight) = self.keogram_weight {
            config.ring.keogram_weight = weight;
        }
        if let Some(width) = self.width {
            config.output.width = width;
        }
        if let Some(height) = self.height {
            config.output.height = height;
        }
        if let Some(fps) = self.fps {
            config.output.framerate = fps;
        }
        if let Some(len) = self.max_length {
            config.output.max_length_seconds = len;
        }
        Ok(config)
    }
}

fn read_config(path: &Path) -> Result<KeolapseConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&contents).context("Invalid keolapse config")
}
