use std::io::{BufWriter, Write};
use std::path::Path;

use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgb, RgbImage};
use tempfile::NamedTempFile;

use crate::config::PaddingConfig;
use crate::error::{KeolapseError, Result};

/// Load any supported image file as 8-bit RGB.
pub fn load_frame(path: &Path) -> Result<RgbImage> {
    let img = image::open(path)?;
    Ok(img.to_rgb8())
}

/// Dimensions of `(width, height)` scaled to fit inside `max_w` x `max_h`
/// with the aspect ratio preserved.
pub fn fit_dimensions(width: u32, height: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }
    let scale = (max_w as f64 / width as f64).min(max_h as f64 / height as f64);
    let w = ((width as f64 * scale).round() as u32).clamp(1, max_w.max(1));
    let h = ((height as f64 * scale).round() as u32).clamp(1, max_h.max(1));
    (w, h)
}

/// Scale an image to fit inside `max_w` x `max_h`, preserving aspect ratio.
pub fn scale_to_fit(img: &RgbImage, max_w: u32, max_h: u32) -> RgbImage {
    let (w, h) = fit_dimensions(img.width(), img.height(), max_w, max_h);
    if (w, h) == img.dimensions() {
        return img.clone();
    }
    imageops::resize(img, w, h, FilterType::Triangle)
}

/// Add constant-colour borders around an image.
pub fn apply_padding(img: &RgbImage, padding: &PaddingConfig, fill: [u8; 3]) -> RgbImage {
    if *padding == PaddingConfig::default() {
        return img.clone();
    }
    let w = img.width() + padding.left + padding.right;
    let h = img.height() + padding.top + padding.bottom;
    let mut canvas = RgbImage::from_pixel(w, h, Rgb(fill));
    imageops::replace(&mut canvas, img, padding.left as i64, padding.top as i64);
    canvas
}

/// Place an image centred on a `width` x `height` canvas, scaling it up or
/// down to fit first. Used when a later frame disagrees with the canvas size
/// established by the first frame.
pub fn letterbox(img: &RgbImage, width: u32, height: u32, fill: [u8; 3]) -> RgbImage {
    if img.dimensions() == (width, height) {
        return img.clone();
    }
    let scaled = scale_to_fit(img, width, height);
    let mut canvas = RgbImage::from_pixel(width, height, Rgb(fill));
    let x = (width - scaled.width()) / 2;
    let y = (height - scaled.height()) / 2;
    imageops::replace(&mut canvas, &scaled, x as i64, y as i64);
    canvas
}

/// Write bytes to `path` through a temporary file in the same directory,
/// so readers never see a partially written file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp = temp_file_beside(path)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| KeolapseError::Io(e.error))?;
    Ok(())
}

/// Save an RGB image as PNG, atomically.
pub fn save_png_atomic(img: &RgbImage, path: &Path) -> Result<()> {
    let tmp = temp_file_beside(path)?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        img.write_to(&mut writer, ImageFormat::Png)?;
        writer.flush()?;
    }
    tmp.persist(path).map_err(|e| KeolapseError::Io(e.error))?;
    Ok(())
}

fn temp_file_beside(path: &Path) -> Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    Ok(NamedTempFile::new_in(dir)?)
}
