use fontdue::{Font, FontSettings};
use image::{Rgb, RgbImage};

use crate::error::{KeolapseError, Result};

/// DejaVu Sans Mono, see `assets/fonts/LICENSE-DejaVu`.
static LABEL_FONT_BYTES: &[u8] = include_bytes!("../../assets/fonts/DejaVuSansMono.ttf");

/// Antialiased text renderer for the hour labels of the progress strip.
pub(super) struct LabelFont {
    font: Font,
    size: f32,
    cap_height: u32,
}

impl LabelFont {
    pub(super) fn load(size: f32) -> Result<Self> {
        let font = Font::from_bytes(LABEL_FONT_BYTES, FontSettings::default())
            .map_err(|e| KeolapseError::Font(e.to_string()))?;
        let digit = font.metrics('0', size);
        let cap_height = (digit.height as i32 + digit.ymin).max(1) as u32;
        Ok(Self {
            font,
            size,
            cap_height,
        })
    }

    /// Horizontal extent of `text` in pixels.
    pub(super) fn text_width(&self, text: &str) -> u32 {
        let advance: f32 = text
            .chars()
            .map(|ch| self.font.metrics(ch, self.size).advance_width)
            .sum();
        advance.ceil() as u32
    }

    /// Height of a line of digits, baseline to top.
    pub(super) fn text_height(&self) -> u32 {
        self.cap_height
    }

    /// Draw `text` with the top of its digits at `y` and its pen starting
    /// at `x`. Coverage is blended towards `color`; pixels outside the image
    /// are clipped.
    pub(super) fn draw_text(&self, img: &mut RgbImage, x: i64, y: i64, text: &str, color: Rgb<u8>) {
        let (w, h) = (img.width() as i64, img.height() as i64);
        let baseline = y + self.cap_height as i64;
        let mut pen = x as f32;

        for ch in text.chars() {
            let (metrics, coverage) = self.font.rasterize(ch, self.size);
            let left = pen.round() as i64 + metrics.xmin as i64;
            let top = baseline - (metrics.height as i64 + metrics.ymin as i64);
            pen += metrics.advance_width;

            for gy in 0..metrics.height {
                let py = top + gy as i64;
                if !(0..h).contains(&py) {
                    continue;
                }
                for gx in 0..metrics.width {
                    let px = left + gx as i64;
                    if !(0..w).contains(&px) {
                        continue;
                    }
                    let alpha = coverage[gy * metrics.width + gx];
                    if alpha == 0 {
                        continue;
                    }
                    let a = alpha as f32 / 255.0;
                    let dst = img.get_pixel_mut(px as u32, py as u32);
                    for c in 0..3 {
                        let old = dst[c] as f32;
                        dst[c] = (old + (color[c] as f32 - old) * a).round() as u8;
                    }
                }
            }
        }
    }
}
