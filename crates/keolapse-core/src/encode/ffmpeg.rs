use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use image::RgbImage;
use tracing::debug;

use crate::consts::RAW_INTERMEDIATE_QSCALE;
use crate::error::{EncodeError, KeolapseError, Result};

use super::{partial_path, EncodeParams, FrameSink, RawVideoSpec, RawWriter, VideoEncoder};

/// Pads odd canvas sizes to even ones, as yuv420p requires.
const EVEN_PAD_FILTER: &str = "pad=ceil(iw/2)*2:ceil(ih/2)*2";

fn raw_args(spec: &RawVideoSpec) -> Vec<String> {
    vec![
        "-y".into(),
        "-loglevel".into(),
        "error".into(),
        "-f".into(),
        "rawvideo".into(),
        "-pix_fmt".into(),
        "rgb24".into(),
        "-s".into(),
        format!("{}x{}", spec.width, spec.height),
        "-r".into(),
        format!("{}", spec.fps),
        "-i".into(),
        "pipe:0".into(),
        "-an".into(),
        "-vf".into(),
        EVEN_PAD_FILTER.into(),
        "-c:v".into(),
        "mpeg4".into(),
        "-q:v".into(),
        RAW_INTERMEDIATE_QSCALE.to_string(),
        "-pix_fmt".into(),
        "yuv420p".into(),
        spec.path.to_string_lossy().into_owned(),
    ]
}

fn encode_args(raw: &Path, out: &Path, params: &EncodeParams) -> Vec<String> {
    vec![
        "-y".into(),
        "-loglevel".into(),
        "error".into(),
        "-i".into(),
        raw.to_string_lossy().into_owned(),
        "-an".into(),
        "-c:v".into(),
        params.codec.clone(),
        "-b:v".into(),
        format!("{}k", params.bitrate_kbps),
        "-maxrate".into(),
        format!("{}k", params.max_bitrate_kbps()),
        "-bufsize".into(),
        format!("{}k", params.buffer_size_kbps()),
        "-crf".into(),
        params.crf.to_string(),
        "-pix_fmt".into(),
        "yuv420p".into(),
        "-movflags".into(),
        "+faststart".into(),
        out.to_string_lossy().into_owned(),
    ]
}

/// Streams frames into an `ffmpeg` child producing the intermediate video.
#[derive(Clone, Debug)]
pub struct FfmpegRawWriter {
    pub program: String,
}

impl FfmpegRawWriter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl RawWriter for FfmpegRawWriter {
    fn open(&self, spec: &RawVideoSpec) -> Result<Box<dyn FrameSink>> {
        if spec.width == 0 || spec.height == 0 {
            return Err(KeolapseError::InvalidDimensions {
                width: spec.width as i64,
                height: spec.height as i64,
            });
        }
        debug!(program = %self.program, path = %spec.path.display(), "Spawning raw writer");

        let mut child = Command::new(&self.program)
            .args(raw_args(spec))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                KeolapseError::RawWriter(format!("failed to spawn '{}': {e}", self.program))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| KeolapseError::RawWriter("failed to open writer stdin".into()))?;

        Ok(Box::new(FfmpegRawSink {
            width: spec.width,
            height: spec.height,
            child,
            stdin: Some(stdin),
        }))
    }
}

struct FfmpegRawSink {
    width: u32,
    height: u32,
    child: Child,
    stdin: Option<ChildStdin>,
}

impl FrameSink for FfmpegRawSink {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        if frame.dimensions() != (self.width, self.height) {
            return Err(KeolapseError::InvalidDimensions {
                width: frame.width() as i64,
                height: frame.height() as i64,
            });
        }
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(KeolapseError::RawWriter("writer already finished".into()));
        };
        stdin
            .write_all(frame.as_raw())
            .map_err(|e| KeolapseError::RawWriter(format!("failed to write frame: {e}")))
    }

    fn finish(mut self: Box<Self>) -> Result<()> {
        drop(self.stdin.take());
        let output = self
            .child
            .wait_with_output()
            .map_err(|e| KeolapseError::RawWriter(format!("failed to wait for writer: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(KeolapseError::RawWriter(format!(
                "writer exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

/// Re-encodes the intermediate video with the configured quality settings.
#[derive(Clone, Debug)]
pub struct FfmpegEncoder {
    pub program: String,
}

impl FfmpegEncoder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl VideoEncoder for FfmpegEncoder {
    fn encode(
        &self,
        raw: &Path,
        target: &Path,
        params: &EncodeParams,
    ) -> std::result::Result<PathBuf, EncodeError> {
        let partial = partial_path(target);
        debug!(
            program = %self.program,
            codec = %params.codec,
            bitrate_kbps = params.bitrate_kbps,
            crf = params.crf,
            "Encoding video"
        );

        let output = Command::new(&self.program)
            .args(encode_args(raw, &partial, params))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| EncodeError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            if partial.exists() {
                std::fs::remove_file(&partial)?;
            }
            return Err(EncodeError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        if !partial.exists() {
            return Err(EncodeError::MissingOutput(partial));
        }
        std::fs::rename(&partial, target)?;
        Ok(target.to_path_buf())
    }
}
