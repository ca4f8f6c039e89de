use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeolapseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Status file error: {0}")]
    Status(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: i64, height: i64 },

    #[error("No images found in {0}")]
    NoImages(PathBuf),

    #[error("No keogram found in {0}")]
    KeogramNotFound(PathBuf),

    #[error("No frame could be composited")]
    EmptySequence,

    #[error("Font error: {0}")]
    Font(String),

    #[error("Raw video writer error: {0}")]
    RawWriter(String),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Failure of the external encoding stage. Always recoverable: the caller
/// falls back to the raw intermediate video.
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("failed to launch encoder '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("encoder exited with status {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("encoder produced no output at {0}")]
    MissingOutput(PathBuf),

    #[error("encoder I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, KeolapseError>;
