use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use image::{Rgb, RgbImage};

use keolapse_core::config::{KeolapseConfig, RingConfig};
use keolapse_core::encode::{EncodeParams, FrameSink, RawVideoSpec, RawWriter, VideoEncoder};
use keolapse_core::error::{EncodeError, Result};

/// Small sky-like test frame: a radial gradient that varies with `seed`.
pub fn sky_frame(width: u32, height: u32, seed: u8) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let v = ((x + y) as u8).wrapping_add(seed);
        Rgb([v, v / 2, 255 - v])
    })
}

/// Keogram-like strip: every column gets its own colour.
pub fn keogram_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 128])
    })
}

/// Write `count` PNG frames named `image-00000.png`.. into `dir`.
pub fn write_frames(dir: &Path, count: usize, width: u32, height: u32) -> Vec<PathBuf> {
    std::fs::create_dir_all(dir).expect("create frame dir");
    (0..count)
        .map(|i| {
            let path = dir.join(format!("image-{i:05}.png"));
            sky_frame(width, height, i as u8)
                .save(&path)
                .expect("write frame");
            path
        })
        .collect()
}

/// Write a keogram PNG into `dir` and return its path.
pub fn write_keogram(dir: &Path) -> PathBuf {
    std::fs::create_dir_all(dir).expect("create keogram dir");
    let path = dir.join("keogram.png");
    keogram_image(96, 24).save(&path).expect("write keogram");
    path
}

/// Config for tiny 48x36 frames with a ring that needs canvas expansion.
pub fn small_config(images: &Path, keograms: &Path, output: &Path) -> KeolapseConfig {
    let mut config = KeolapseConfig::new(images, output);
    config.keogram_dir = Some(keograms.to_path_buf());
    config.output.width = 48;
    config.output.height = 36;
    config.output.framerate = 25.0;
    config.output.max_length_seconds = 120.0;
    config.output.min_fps = 1.0;
    config.output.max_fps = 60.0;
    config.ring = RingConfig {
        circle_radius_factor: 0.3,
        ring_height: 6,
        ring_padding: 2,
        edge_padding: 2,
        ..Default::default()
    };
    config
}

#[derive(Debug, Default)]
pub struct WriterLog {
    pub opened: Vec<RawVideoSpec>,
    pub frames: usize,
    pub sizes: Vec<(u32, u32)>,
    pub finished: bool,
}

/// Raw writer that records frames and writes a small marker file on finish.
#[derive(Clone, Default)]
pub struct MemoryWriter {
    pub log: Rc<RefCell<WriterLog>>,
}

struct MemorySink {
    path: PathBuf,
    log: Rc<RefCell<WriterLog>>,
}

impl RawWriter for MemoryWriter {
    fn open(&self, spec: &RawVideoSpec) -> Result<Box<dyn FrameSink>> {
        self.log.borrow_mut().opened.push(spec.clone());
        Ok(Box::new(MemorySink {
            path: spec.path.clone(),
            log: Rc::clone(&self.log),
        }))
    }
}

impl FrameSink for MemorySink {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        let mut log = self.log.borrow_mut();
        log.frames += 1;
        log.sizes.push(frame.dimensions());
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<()> {
        let mut log = self.log.borrow_mut();
        log.finished = true;
        std::fs::write(&self.path, format!("raw frames={}", log.frames))?;
        Ok(())
    }
}

/// Encoder that copies the raw file with a prefix, or fails on demand.
pub struct FakeEncoder {
    pub fail: bool,
}

impl VideoEncoder for FakeEncoder {
    fn encode(
        &self,
        raw: &Path,
        target: &Path,
        _params: &EncodeParams,
    ) -> std::result::Result<PathBuf, EncodeError> {
        let partial = keolapse_core::encode::partial_path(target);
        let body = std::fs::read_to_string(raw)?;
        std::fs::write(&partial, format!("encoded {body}"))?;
        if self.fail {
            return Err(EncodeError::Failed {
                status: "exit status: 1".into(),
                stderr: "simulated failure".into(),
            });
        }
        std::fs::rename(&partial, target)?;
        Ok(target.to_path_buf())
    }
}
