use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_CIRCLE_RADIUS_FACTOR, DEFAULT_EDGE_PADDING, DEFAULT_FRAMERATE, DEFAULT_KEOGRAM_WEIGHT,
    DEFAULT_MAX_FPS, DEFAULT_MAX_LENGTH_SECONDS, DEFAULT_MIN_FPS, DEFAULT_OUTPUT_HEIGHT,
    DEFAULT_OUTPUT_WIDTH, DEFAULT_RING_HEIGHT, DEFAULT_RING_PADDING, HOURS_PER_STRIP,
    MAX_BITRATE_KBPS, MAX_CRF, MIN_BITRATE_KBPS,
};
use crate::encode::QualityTier;
use crate::error::{KeolapseError, Result};
use crate::schedule::ScheduleParams;

/// Full configuration of one keolapse run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeolapseConfig {
    /// Directory holding the session's still frames.
    pub images_dir: PathBuf,
    /// Directory searched for the keogram. Defaults to `<images_dir>/../keogram`.
    #[serde(default)]
    pub keogram_dir: Option<PathBuf>,
    /// Explicit keogram file, bypassing discovery.
    #[serde(default)]
    pub keogram: Option<PathBuf>,
    pub output_dir: PathBuf,
    /// Accepted frame file extensions (case-insensitive).
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub padding: PaddingConfig,
    #[serde(default)]
    pub ring: RingConfig,
    #[serde(default)]
    pub encoder: EncoderConfig,
    #[serde(default)]
    pub debug: DebugConfig,
}

fn default_extensions() -> Vec<String> {
    ["jpg", "jpeg", "png"].iter().map(|s| s.to_string()).collect()
}

impl KeolapseConfig {
    /// A config with defaults for everything but the paths.
    pub fn new(images_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            images_dir: images_dir.into(),
            keogram_dir: None,
            keogram: None,
            output_dir: output_dir.into(),
            extensions: default_extensions(),
            output: OutputConfig::default(),
            padding: PaddingConfig::default(),
            ring: RingConfig::default(),
            encoder: EncoderConfig::default(),
            debug: DebugConfig::default(),
        }
    }

    /// Directory searched for the keogram when no explicit file is set.
    pub fn resolved_keogram_dir(&self) -> PathBuf {
        if let Some(ref dir) = self.keogram_dir {
            return dir.clone();
        }
        self.images_dir
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("keogram")
    }

    pub fn schedule_params(&self) -> ScheduleParams {
        ScheduleParams {
            framerate: self.output.framerate,
            max_length_seconds: self.output.max_length_seconds,
            min_fps: self.output.min_fps,
            max_fps: self.output.max_fps,
        }
    }

    /// Check numeric ranges and the images directory. Runs before any
    /// frame is touched.
    pub fn validate(&self) -> Result<()> {
        let out = &self.output;
        if out.width == 0 || out.height == 0 {
            return Err(KeolapseError::InvalidConfig(format!(
                "output size must be non-zero, got {}x{}",
                out.width, out.height
            )));
        }
        if !(out.min_fps > 0.0 && out.min_fps <= out.max_fps) {
            return Err(KeolapseError::InvalidConfig(format!(
                "fps bounds must satisfy 0 < min_fps <= max_fps, got [{}, {}]",
                out.min_fps, out.max_fps
            )));
        }
        if !(out.framerate >= out.min_fps && out.framerate <= out.max_fps) {
            return Err(KeolapseError::InvalidConfig(format!(
                "framerate {} is outside [{}, {}]",
                out.framerate, out.min_fps, out.max_fps
            )));
        }
        if !(out.max_length_seconds > 0.0 && out.max_length_seconds.is_finite()) {
            return Err(KeolapseError::InvalidConfig(format!(
                "max_length_seconds must be positive, got {}",
                out.max_length_seconds
            )));
        }
        if out.extension.is_empty() {
            return Err(KeolapseError::InvalidConfig(
                "output extension must not be empty".into(),
            ));
        }

        let ring = &self.ring;
        if !(ring.circle_radius_factor > 0.0 && ring.circle_radius_factor <= 1.0) {
            return Err(KeolapseError::InvalidConfig(format!(
                "circle_radius_factor must be in (0, 1], got {}",
                ring.circle_radius_factor
            )));
        }
        if ring.ring_height == 0 {
            return Err(KeolapseError::InvalidConfig(
                "ring_height must be at least 1 pixel".into(),
            ));
        }
        if !(0.0..=1.0).contains(&ring.keogram_weight) {
            return Err(KeolapseError::InvalidConfig(format!(
                "keogram_weight must be in [0, 1], got {}",
                ring.keogram_weight
            )));
        }
        if ring.first_hour >= HOURS_PER_STRIP {
            return Err(KeolapseError::InvalidConfig(format!(
                "first_hour must be below {HOURS_PER_STRIP}, got {}",
                ring.first_hour
            )));
        }
        let max_offset = out.width.max(out.height) as i64;
        for (axis, offset) in [("x", ring.center_x_offset), ("y", ring.center_y_offset)] {
            if (offset as i64).abs() > max_offset {
                return Err(KeolapseError::InvalidConfig(format!(
                    "center_{axis}_offset must be within +/-{max_offset}, got {offset}"
                )));
            }
        }

        let enc = &self.encoder;
        if let Some(bitrate) = enc.bitrate_kbps {
            if !(MIN_BITRATE_KBPS..=MAX_BITRATE_KBPS).contains(&bitrate) {
                return Err(KeolapseError::InvalidConfig(format!(
                    "bitrate_kbps must be in [{MIN_BITRATE_KBPS}, {MAX_BITRATE_KBPS}], got {bitrate}"
                )));
            }
        }
        if let Some(crf) = enc.crf {
            if crf > MAX_CRF {
                return Err(KeolapseError::InvalidConfig(format!(
                    "crf must be at most {MAX_CRF}, got {crf}"
                )));
            }
        }

        if self.extensions.is_empty() {
            return Err(KeolapseError::InvalidConfig(
                "at least one image extension is required".into(),
            ));
        }
        if !self.images_dir.is_dir() {
            return Err(KeolapseError::NoImages(self.images_dir.clone()));
        }
        Ok(())
    }
}

/// Output video geometry and timing.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Frames are scaled to fit inside `width` x `height`, aspect preserved.
    pub width: u32,
    pub height: u32,
    pub framerate: f64,
    /// Target video duration ceiling.
    pub max_length_seconds: f64,
    pub min_fps: f64,
    pub max_fps: f64,
    pub prefix: String,
    pub extension: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_OUTPUT_WIDTH,
            height: DEFAULT_OUTPUT_HEIGHT,
            framerate: DEFAULT_FRAMERATE,
            max_length_seconds: DEFAULT_MAX_LENGTH_SECONDS,
            min_fps: DEFAULT_MIN_FPS,
            max_fps: DEFAULT_MAX_FPS,
            prefix: "keolapse".into(),
            extension: "mp4".into(),
        }
    }
}

/// Padding added around each scaled frame before ring expansion.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaddingConfig {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

/// Clock position where the start of the keogram (strip column 0) sits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartPosition {
    #[default]
    #[serde(rename = "12")]
    Twelve,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "9")]
    Nine,
}

impl StartPosition {
    /// Clockwise offset from 12 o'clock, in degrees.
    pub fn angular_offset(self) -> f64 {
        match self {
            Self::Twelve => 0.0,
            Self::Three => 90.0,
            Self::Six => 180.0,
            Self::Nine => 270.0,
        }
    }
}

impl fmt::Display for StartPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Twelve => write!(f, "12 o'clock"),
            Self::Three => write!(f, "3 o'clock"),
            Self::Six => write!(f, "6 o'clock"),
            Self::Nine => write!(f, "9 o'clock"),
        }
    }
}

/// Placement and look of the keogram ring.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingConfig {
    /// Inner circle radius as a fraction of min(width, height).
    pub circle_radius_factor: f64,
    pub center_x_offset: i32,
    pub center_y_offset: i32,
    pub ring_height: u32,
    pub ring_padding: u32,
    /// Margin added beyond the ring on any side that has to be expanded.
    pub edge_padding: u32,
    pub start_position: StartPosition,
    pub keogram_weight: f32,
    /// Hour printed under the first gridline.
    pub first_hour: u32,
    /// Fill colour for user padding and canvas expansion.
    pub fill: [u8; 3],
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            circle_radius_factor: DEFAULT_CIRCLE_RADIUS_FACTOR,
            center_x_offset: 0,
            center_y_offset: 0,
            ring_height: DEFAULT_RING_HEIGHT,
            ring_padding: DEFAULT_RING_PADDING,
            edge_padding: DEFAULT_EDGE_PADDING,
            start_position: StartPosition::default(),
            keogram_weight: DEFAULT_KEOGRAM_WEIGHT,
            first_hour: 0,
            fill: [0, 0, 0],
        }
    }
}

/// External encoder settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// When false the raw intermediate is the deliverable.
    pub enabled: bool,
    pub program: String,
    pub codec: String,
    pub quality: QualityTier,
    /// Overrides the tier's bitrate.
    pub bitrate_kbps: Option<u32>,
    /// Overrides the tier's CRF.
    pub crf: Option<u32>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: "ffmpeg".into(),
            codec: "libx264".into(),
            quality: QualityTier::default(),
            bitrate_kbps: None,
            crf: None,
        }
    }
}

/// Debug switches, passed explicitly to every stage that reads them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Skip the keogram entirely and draw calibration circles only.
    pub circles_only: bool,
    /// Draw calibration circles on top of the composited ring.
    pub draw_circles: bool,
    /// Write ring and frame preview stills next to the video.
    pub save_previews: bool,
}

impl DebugConfig {
    pub fn wants_circles(&self) -> bool {
        self.circles_only || self.draw_circles
    }
}
