use image::RgbImage;
use ndarray::{Array2, Zip};

use crate::config::DebugConfig;
use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::error::{KeolapseError, Result};

use super::calibration::draw_calibration;
use super::geometry::RingGeometry;
use super::strip::RingStrips;

/// Polar coordinates of every canvas pixel relative to the ring centre.
///
/// `angle` is measured clockwise from the strip start (12 o'clock rotated by
/// the geometry's angular offset) and lies in `[0, 360)`.
pub struct PolarField {
    pub radius: Array2<f64>,
    pub angle: Array2<f64>,
}

/// Sampling angle of the offset `(dx, dy)` from the centre, in degrees.
///
/// Image rows grow downwards, so `atan2(dy, dx)` already runs clockwise
/// from 3 o'clock; adding 90° moves zero to 12 o'clock.
pub fn sample_angle(dx: f64, dy: f64, angular_offset: f64) -> f64 {
    let clock = dy.atan2(dx).to_degrees() + 90.0;
    (clock - angular_offset).rem_euclid(360.0)
}

/// Strip column for an angle: `angle / 360 · width`, clamped to the strip.
///
/// Angles just below 360° land on the last column and angles just above 0°
/// on the first, which are neighbours on the ring.
pub fn strip_column(angle: f64, strip_width: u32) -> u32 {
    let a = angle.rem_euclid(360.0);
    let col = (a / 360.0 * strip_width as f64).floor() as u32;
    col.min(strip_width.saturating_sub(1))
}

/// Strip row for a distance past the ring's inner edge.
pub fn strip_row(radial_offset: f64, thickness: u32) -> u32 {
    (radial_offset.max(0.0).floor() as u32).min(thickness.saturating_sub(1))
}

/// Compute the polar field over the expanded canvas of `geometry`.
pub fn polar_field(geometry: &RingGeometry) -> PolarField {
    let w = geometry.canvas_width() as usize;
    let h = geometry.canvas_height() as usize;
    let (cx, cy, offset) = (geometry.center_x, geometry.center_y, geometry.angular_offset);

    let mut radius = Array2::<f64>::zeros((h, w));
    let mut angle = Array2::<f64>::zeros((h, w));

    let fill = |(row, col): (usize, usize), r: &mut f64, a: &mut f64| {
        let dx = col as f64 - cx;
        let dy = row as f64 - cy;
        *r = dx.hypot(dy);
        *a = sample_angle(dx, dy, offset);
    };

    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        Zip::indexed(&mut radius).and(&mut angle).par_for_each(fill);
    } else {
        Zip::indexed(&mut radius).and(&mut angle).for_each(fill);
    }

    PolarField { radius, angle }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct RingSample {
    canvas: u32,
    strip: u32,
}

/// Precomputed inverse polar mapping from ring pixels to strip pixels.
///
/// Built once from the frozen geometry; applying it to a frame is a table
/// copy, so every frame receives exactly the same ring placement.
#[derive(Clone, Debug)]
pub struct RingMap {
    canvas_width: u32,
    canvas_height: u32,
    strip_width: u32,
    strip_height: u32,
    samples: Vec<RingSample>,
}

impl RingMap {
    pub fn build(geometry: &RingGeometry, strip_width: u32) -> Self {
        let field = polar_field(geometry);
        let inner = geometry.inner_radius();
        let outer = geometry.outer_radius();
        let thickness = geometry.ring_thickness;
        let canvas_width = geometry.canvas_width();

        let mut samples = Vec::new();
        Zip::indexed(&field.radius)
            .and(&field.angle)
            .for_each(|(row, col), &r, &a| {
                if r <= inner || r >= outer {
                    return;
                }
                let sc = strip_column(a, strip_width);
                let sr = strip_row(r - inner, thickness);
                samples.push(RingSample {
                    canvas: row as u32 * canvas_width + col as u32,
                    strip: sr * strip_width + sc,
                });
            });

        Self {
            canvas_width,
            canvas_height: geometry.canvas_height(),
            strip_width,
            strip_height: thickness,
            samples,
        }
    }

    /// Number of canvas pixels covered by the ring.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn strip_width(&self) -> u32 {
        self.strip_width
    }

    /// `((x, y), (column, row))` pairs of canvas pixel and strip pixel.
    pub fn samples(&self) -> impl Iterator<Item = ((u32, u32), (u32, u32))> + '_ {
        self.samples.iter().map(|s| {
            (
                (s.canvas % self.canvas_width, s.canvas / self.canvas_width),
                (s.strip % self.strip_width, s.strip / self.strip_width),
            )
        })
    }

    /// Copy strip pixels into the ring region of `canvas`.
    pub fn apply(&self, canvas: &mut RgbImage, strip: &RgbImage) -> Result<()> {
        if canvas.dimensions() != (self.canvas_width, self.canvas_height) {
            return Err(KeolapseError::InvalidDimensions {
                width: canvas.width() as i64,
                height: canvas.height() as i64,
            });
        }
        if strip.dimensions() != (self.strip_width, self.strip_height) {
            return Err(KeolapseError::InvalidDimensions {
                width: strip.width() as i64,
                height: strip.height() as i64,
            });
        }
        let src = strip.as_raw();
        let dst: &mut [u8] = &mut **canvas;
        for s in &self.samples {
            let d = s.canvas as usize * 3;
            let p = s.strip as usize * 3;
            dst[d..d + 3].copy_from_slice(&src[p..p + 3]);
        }
        Ok(())
    }
}

/// Composite the ring into one expanded frame.
pub fn warp_frame(
    mut canvas: RgbImage,
    geometry: &RingGeometry,
    map: &RingMap,
    strips: &RingStrips,
    frame_index: usize,
    total_frames: usize,
    debug: &DebugConfig,
) -> Result<RgbImage> {
    if !debug.circles_only && !strips.is_placeholder() {
        let strip = strips.composite(frame_index, total_frames);
        map.apply(&mut canvas, &strip)?;
    }
    if debug.wants_circles() {
        draw_calibration(&mut canvas, geometry);
    }
    Ok(canvas)
}
