use std::f64::consts::TAU;

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use tracing::debug;

use crate::config::RingConfig;
use crate::consts::{
    GRIDLINE_INTENSITY, HOURS_PER_STRIP, LABEL_FONT_SIZE, MARKER_TRAIL_WIDTH, MARKER_WIDTH,
};
use crate::error::{KeolapseError, Result};

use super::geometry::RingGeometry;
use super::labels::LabelFont;

/// Keogram strip and its hour/progress companion, sized to the ring.
///
/// Built once per run. `base` caches the blend of both strips without a
/// marker so each frame only re-blends the marker columns.
#[derive(Clone, Debug)]
pub struct RingStrips {
    pub keogram: RgbImage,
    pub progress: RgbImage,
    keogram_weight: f32,
    base: RgbImage,
    placeholder: bool,
}

impl RingStrips {
    fn new(keogram: RgbImage, progress: RgbImage, keogram_weight: f32) -> Self {
        let base = blend(&keogram, &progress, keogram_weight);
        Self {
            keogram,
            progress,
            keogram_weight,
            base,
            placeholder: false,
        }
    }

    /// Degenerate strips for circles-only runs.
    pub fn placeholder() -> Self {
        let blank = RgbImage::new(1, 1);
        Self {
            keogram: blank.clone(),
            progress: blank.clone(),
            keogram_weight: 1.0,
            base: blank,
            placeholder: true,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    pub fn width(&self) -> u32 {
        self.keogram.width()
    }

    pub fn height(&self) -> u32 {
        self.keogram.height()
    }

    /// Blend of keogram and progress strip with the position marker for
    /// `frame_index` of `total_frames`.
    pub fn composite(&self, frame_index: usize, total_frames: usize) -> RgbImage {
        let mut out = self.base.clone();
        if self.placeholder {
            return out;
        }
        let width = self.width();
        let column = marker_column(frame_index, total_frames, width);
        let kw = self.keogram_weight;

        for (col, intensity) in marker_profile(column, width) {
            for row in 0..self.height() {
                let k = self.keogram.get_pixel(col, row);
                let p = self.progress.get_pixel(col, row);
                let mut px = [0u8; 3];
                for c in 0..3 {
                    let marked = p[c].max(intensity) as f32;
                    px[c] = (kw * k[c] as f32 + (1.0 - kw) * marked).round().min(255.0) as u8;
                }
                out.put_pixel(col, row, Rgb(px));
            }
        }
        out
    }
}

/// Strip width for a ring: `round(2π · (radius + ring_padding))`.
pub fn strip_width(geometry: &RingGeometry) -> u32 {
    ((TAU * geometry.inner_radius()).round() as u32).max(1)
}

/// Resample the keogram onto the ring circumference and render the matching
/// progress strip.
pub fn prepare_strips(
    keogram: &RgbImage,
    geometry: &RingGeometry,
    ring: &RingConfig,
) -> Result<RingStrips> {
    if keogram.width() == 0 || keogram.height() == 0 {
        return Err(KeolapseError::InvalidDimensions {
            width: keogram.width() as i64,
            height: keogram.height() as i64,
        });
    }
    let width = strip_width(geometry);
    let height = geometry.ring_thickness;
    debug!(
        src_width = keogram.width(),
        src_height = keogram.height(),
        width,
        height,
        "Resampling keogram strip"
    );

    let resized = imageops::resize(keogram, width, height, FilterType::Lanczos3);
    let progress = render_progress(width, height, ring.first_hour)?;
    Ok(RingStrips::new(resized, progress, ring.keogram_weight))
}

/// Column of gridline `hour_index` on a strip of `width` columns.
pub fn gridline_column(hour_index: u32, width: u32) -> u32 {
    let col = (hour_index as f64 * width as f64 / HOURS_PER_STRIP as f64).round() as u32;
    col.min(width.saturating_sub(1))
}

/// Dark strip with one gridline per hour and its hour number underneath.
pub fn render_progress(width: u32, height: u32, first_hour: u32) -> Result<RgbImage> {
    let mut img = RgbImage::new(width, height);
    let line = Rgb([GRIDLINE_INTENSITY; 3]);
    let font = LabelFont::load(LABEL_FONT_SIZE)?;
    let label_h = font.text_height();
    let with_labels = height > label_h + 4;
    let line_end = if with_labels { height - label_h - 2 } else { height };

    for i in 0..HOURS_PER_STRIP {
        let col = gridline_column(i, width);
        for row in 0..line_end {
            img.put_pixel(col, row, line);
        }
        if with_labels {
            let hour = ((first_hour + i) % HOURS_PER_STRIP).to_string();
            let label_w = font.text_width(&hour) as i64;
            let x = col as i64 - label_w / 2;
            let y = (height - label_h - 1) as i64;
            font.draw_text(&mut img, x, y, &hour, line);
        }
    }
    Ok(img)
}

/// Marker column for a frame: `round(frame_index / total_frames · width)`,
/// wrapped onto the strip.
pub fn marker_column(frame_index: usize, total_frames: usize, width: u32) -> u32 {
    if total_frames == 0 || width == 0 {
        return 0;
    }
    let col = (frame_index as f64 / total_frames as f64 * width as f64).round() as u64;
    (col % width as u64) as u32
}

/// Columns touched by the marker and their brightness: the marker itself at
/// full intensity and a fading trail to its left, wrapping around the strip.
fn marker_profile(column: u32, width: u32) -> Vec<(u32, u8)> {
    let mut out = Vec::new();
    for k in 0..MARKER_WIDTH.min(width) {
        out.push(((column + k) % width, 255));
    }
    for k in 1..=MARKER_TRAIL_WIDTH {
        if k + MARKER_WIDTH > width {
            break;
        }
        let col = (column + width - k % width) % width;
        let intensity = 255 * (MARKER_TRAIL_WIDTH + 1 - k) / (MARKER_TRAIL_WIDTH + 1);
        out.push((col, intensity as u8));
    }
    out
}

/// Weighted blend: `weight · a + (1 − weight) · b`.
pub fn blend(a: &RgbImage, b: &RgbImage, weight: f32) -> RgbImage {
    debug_assert_eq!(a.dimensions(), b.dimensions());
    let mut out = RgbImage::new(a.width(), a.height());
    for ((o, pa), pb) in out.pixels_mut().zip(a.pixels()).zip(b.pixels()) {
        for c in 0..3 {
            o[c] = (weight * pa[c] as f32 + (1.0 - weight) * pb[c] as f32)
                .round()
                .min(255.0) as u8;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::geometry::resolve;

    #[test]
    fn strip_width_matches_ring_circumference() {
        let cfg = RingConfig {
            circle_radius_factor: 0.25,
            ring_height: 20,
            ring_padding: 10,
            ..Default::default()
        };
        let g = resolve(400, 400, &cfg).unwrap();
        // 2π · (100 + 10) = 691.15
        assert_eq!(strip_width(&g), 691);
    }

    #[test]
    fn prepared_strips_share_dimensions() {
        let cfg = RingConfig {
            circle_radius_factor: 0.25,
            ring_height: 30,
            ring_padding: 4,
            ..Default::default()
        };
        let g = resolve(200, 200, &cfg).unwrap();
        let keogram = RgbImage::from_pixel(48, 12, Rgb([40, 80, 120]));
        let strips = prepare_strips(&keogram, &g, &cfg).unwrap();
        assert_eq!(strips.keogram.dimensions(), strips.progress.dimensions());
        assert_eq!(strips.height(), 30);
        assert_eq!(strips.width(), strip_width(&g));
    }

    #[test]
    fn progress_has_24_gridlines() {
        let img = render_progress(480, 40, 0).unwrap();
        let lit = (0..480)
            .filter(|&x| img.get_pixel(x, 0)[0] == GRIDLINE_INTENSITY)
            .count();
        assert_eq!(lit, 24);
        assert_eq!(img.get_pixel(20, 0)[0], GRIDLINE_INTENSITY);
        assert_eq!(img.get_pixel(21, 0)[0], 0);
    }

    #[test]
    fn progress_labels_sit_below_gridlines() {
        let img = render_progress(480, 40, 0).unwrap();
        // Left of the hour 1 gridline only its label is lit.
        let label_rows = (0..40)
            .filter(|&y| (14..20).any(|x| img.get_pixel(x, y)[0] > 0))
            .collect::<Vec<_>>();
        assert!(!label_rows.is_empty());
        assert!(label_rows.iter().all(|&y| y > 20));
    }

    #[test]
    fn short_strip_skips_labels() {
        let img = render_progress(480, 6, 0).unwrap();
        assert_eq!(img.get_pixel(20, 5)[0], GRIDLINE_INTENSITY);
        assert!((14..20).all(|x| img.get_pixel(x, 5)[0] == 0));
    }

    #[test]
    fn marker_column_spans_strip() {
        assert_eq!(marker_column(0, 100, 500), 0);
        assert_eq!(marker_column(50, 100, 500), 250);
        assert_eq!(marker_column(99, 100, 500), 495);
        assert_eq!(marker_column(100, 100, 500), 0);
    }

    #[test]
    fn marker_trail_fades_to_the_left() {
        let profile = marker_profile(10, 100);
        let at = |c: u32| profile.iter().find(|(col, _)| *col == c).map(|(_, i)| *i);
        assert_eq!(at(10), Some(255));
        assert!(at(9).unwrap() > at(8).unwrap());
        assert!(at(8).unwrap() > at(7).unwrap());
        assert_eq!(at(10 - MARKER_TRAIL_WIDTH - 1), None);
    }

    #[test]
    fn marker_trail_wraps_at_strip_start() {
        let profile = marker_profile(0, 100);
        assert!(profile.iter().any(|(col, _)| *col == 99));
    }

    #[test]
    fn composite_brightens_marker_column_only() {
        let keogram = RgbImage::from_pixel(100, 10, Rgb([100, 100, 100]));
        let progress = RgbImage::new(100, 10);
        let strips = RingStrips::new(keogram, progress, 0.8);
        let out = strips.composite(50, 100);
        assert_eq!(out.get_pixel(50, 5)[0], 131);
        assert_eq!(out.get_pixel(80, 5)[0], 80);
    }
}
