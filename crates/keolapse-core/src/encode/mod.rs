//! Raw frame output and the external encoding stage.
//!
//! Composited frames stream into a [`FrameSink`] that produces an
//! intermediate video. [`finalize_video`] then hands it to a
//! [`VideoEncoder`]; if that fails the intermediate becomes the deliverable.

pub mod ffmpeg;

use std::fmt;
use std::path::{Path, PathBuf};

use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::EncoderConfig;
use crate::error::{EncodeError, Result};

pub use ffmpeg::{FfmpegEncoder, FfmpegRawWriter};

/// Named quality presets for the final encode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Low,
    Medium,
    #[default]
    High,
    Ultra,
}

impl QualityTier {
    pub fn bitrate_kbps(self) -> u32 {
        match self {
            Self::Low => 2_000,
            Self::Medium => 4_000,
            Self::High => 8_000,
            Self::Ultra => 16_000,
        }
    }

    pub fn crf(self) -> u32 {
        match self {
            Self::Low => 28,
            Self::Medium => 23,
            Self::High => 20,
            Self::Ultra => 17,
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
            Self::Ultra => write!(f, "Ultra"),
        }
    }
}

/// Resolved parameters handed to the encoder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodeParams {
    pub codec: String,
    pub bitrate_kbps: u32,
    pub crf: u32,
}

impl EncodeParams {
    /// Tier values, with explicit bitrate/CRF settings taking precedence.
    pub fn resolve(config: &EncoderConfig) -> Self {
        Self {
            codec: config.codec.clone(),
            bitrate_kbps: config
                .bitrate_kbps
                .unwrap_or_else(|| config.quality.bitrate_kbps()),
            crf: config.crf.unwrap_or_else(|| config.quality.crf()),
        }
    }

    pub fn max_bitrate_kbps(&self) -> u32 {
        self.bitrate_kbps.saturating_mul(2)
    }

    pub fn buffer_size_kbps(&self) -> u32 {
        self.bitrate_kbps
    }
}

/// Shape of the intermediate video a [`FrameSink`] writes.
#[derive(Clone, Debug, PartialEq)]
pub struct RawVideoSpec {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
}

/// Receives composited frames in order.
pub trait FrameSink {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()>;

    /// Flush and close. The intermediate file is complete once this returns.
    fn finish(self: Box<Self>) -> Result<()>;
}

/// Opens a [`FrameSink`] once the canvas size is known.
pub trait RawWriter {
    fn open(&self, spec: &RawVideoSpec) -> Result<Box<dyn FrameSink>>;
}

/// Black-box compression of the intermediate video.
pub trait VideoEncoder {
    /// Encode `raw` into `target`. Implementations write to
    /// [`partial_path`] first and only move onto `target` on success.
    fn encode(
        &self,
        raw: &Path,
        target: &Path,
        params: &EncodeParams,
    ) -> std::result::Result<PathBuf, EncodeError>;
}

/// How the deliverable at the target path was produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EncodeOutcome {
    Encoded,
    /// Encoding failed; the intermediate was kept.
    RawFallback { reason: String },
    /// Encoding is disabled; the intermediate is the deliverable.
    RawOnly,
}

impl EncodeOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::RawFallback { .. })
    }
}

/// Path of the intermediate video for a target: `name.raw.ext`.
pub fn raw_path(target: &Path) -> PathBuf {
    sibling_with_infix(target, "raw")
}

/// Path an encoder writes to before renaming onto the target.
pub fn partial_path(target: &Path) -> PathBuf {
    sibling_with_infix(target, "partial")
}

fn sibling_with_infix(target: &Path, infix: &str) -> PathBuf {
    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match target.extension() {
        Some(ext) => format!("{stem}.{infix}.{}", ext.to_string_lossy()),
        None => format!("{stem}.{infix}"),
    };
    target.with_file_name(name)
}

/// Turn the intermediate at `raw` into the deliverable at `target`.
///
/// With no encoder, or when the encoder fails, `raw` is renamed onto
/// `target` and any partial encoder output is removed.
pub fn finalize_video(
    encoder: Option<&dyn VideoEncoder>,
    raw: &Path,
    target: &Path,
    params: &EncodeParams,
) -> Result<EncodeOutcome> {
    let Some(encoder) = encoder else {
        std::fs::rename(raw, target)?;
        info!(output = %target.display(), "Encoding disabled, kept raw video");
        return Ok(EncodeOutcome::RawOnly);
    };

    match encoder.encode(raw, target, params) {
        Ok(path) => {
            if let Err(e) = std::fs::remove_file(raw) {
                warn!(path = %raw.display(), error = %e, "Failed to remove raw video");
            }
            info!(output = %path.display(), "Encoded video");
            Ok(EncodeOutcome::Encoded)
        }
        Err(e) => {
            warn!(error = %e, "Encoder failed, keeping raw video");
            let mut reason = e.to_string();
            let partial = partial_path(target);
            if partial.exists() {
                if let Err(cleanup) = std::fs::remove_file(&partial) {
                    warn!(
                        path = %partial.display(),
                        error = %cleanup,
                        "Failed to remove partial encode"
                    );
                    reason.push_str(&format!(
                        "; could not remove {}: {cleanup}",
                        partial.display()
                    ));
                }
            }
            std::fs::rename(raw, target)?;
            Ok(EncodeOutcome::RawFallback { reason })
        }
    }
}
