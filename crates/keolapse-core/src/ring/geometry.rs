use image::{imageops, Rgb, RgbImage};

use crate::config::RingConfig;
use crate::error::{KeolapseError, Result};

/// Per-side canvas growth needed for the ring to fit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Expansion {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl Expansion {
    pub fn is_none(&self) -> bool {
        *self == Self::default()
    }
}

/// Ring placement in expanded-canvas pixel coordinates.
///
/// Computed once per run by [`resolve`]. Nothing in the per-frame path may
/// construct or alter one.
#[derive(Clone, Debug, PartialEq)]
pub struct RingGeometry {
    pub center_x: f64,
    pub center_y: f64,
    /// Radius of the inner (sky) circle.
    pub radius: f64,
    /// Gap between the inner circle and the ring.
    pub ring_padding: f64,
    /// Radial thickness of the ring; equals the strip height.
    pub ring_thickness: u32,
    /// Clockwise rotation from 12 o'clock of strip column 0, degrees.
    pub angular_offset: f64,
    pub expansion: Expansion,
    /// Size of the frames fed to [`RingGeometry::expand`].
    pub source_width: u32,
    pub source_height: u32,
}

impl RingGeometry {
    pub fn inner_radius(&self) -> f64 {
        self.radius + self.ring_padding
    }

    pub fn outer_radius(&self) -> f64 {
        self.inner_radius() + self.ring_thickness as f64
    }

    pub fn canvas_width(&self) -> u32 {
        self.source_width + self.expansion.left + self.expansion.right
    }

    pub fn canvas_height(&self) -> u32 {
        self.source_height + self.expansion.top + self.expansion.bottom
    }

    /// Grow a frame by the frozen expansion. The frame must have the size the
    /// geometry was resolved for.
    pub fn expand(&self, frame: &RgbImage, fill: [u8; 3]) -> Result<RgbImage> {
        if frame.dimensions() != (self.source_width, self.source_height) {
            return Err(KeolapseError::InvalidDimensions {
                width: frame.width() as i64,
                height: frame.height() as i64,
            });
        }
        if self.expansion.is_none() {
            return Ok(frame.clone());
        }
        let mut canvas = RgbImage::from_pixel(self.canvas_width(), self.canvas_height(), Rgb(fill));
        imageops::replace(
            &mut canvas,
            frame,
            self.expansion.left as i64,
            self.expansion.top as i64,
        );
        Ok(canvas)
    }
}

fn overshoot(amount: f64, edge_padding: u32) -> u32 {
    if amount > 0.0 {
        amount.ceil() as u32 + edge_padding
    } else {
        0
    }
}

/// Place the ring on a `width` x `height` canvas.
///
/// Pure: the same inputs always give an identical geometry.
pub fn resolve(width: u32, height: u32, ring: &RingConfig) -> Result<RingGeometry> {
    if width == 0 || height == 0 {
        return Err(KeolapseError::InvalidDimensions {
            width: width as i64,
            height: height as i64,
        });
    }

    let w = width as f64;
    let h = height as f64;
    let cx = w / 2.0 + ring.center_x_offset as f64;
    let cy = h / 2.0 + ring.center_y_offset as f64;
    let radius = w.min(h) * ring.circle_radius_factor;
    let reach = radius + ring.ring_height as f64 + ring.ring_padding as f64;

    let expansion = Expansion {
        left: overshoot(reach - cx, ring.edge_padding),
        right: overshoot(cx + reach - w, ring.edge_padding),
        top: overshoot(reach - cy, ring.edge_padding),
        bottom: overshoot(cy + reach - h, ring.edge_padding),
    };

    Ok(RingGeometry {
        center_x: cx + expansion.left as f64,
        center_y: cy + expansion.top as f64,
        radius,
        ring_padding: ring.ring_padding as f64,
        ring_thickness: ring.ring_height,
        angular_offset: ring.start_position.angular_offset(),
        expansion,
        source_width: width,
        source_height: height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StartPosition;

    fn ring(factor: f64, height: u32, padding: u32, edge: u32) -> RingConfig {
        RingConfig {
            circle_radius_factor: factor,
            ring_height: height,
            ring_padding: padding,
            edge_padding: edge,
            ..Default::default()
        }
    }

    #[test]
    fn no_expansion_when_ring_fits() {
        let g = resolve(1000, 1000, &ring(0.25, 50, 10, 5)).unwrap();
        assert!(g.expansion.is_none());
        assert_eq!(g.center_x, 500.0);
        assert_eq!(g.center_y, 500.0);
        assert_eq!(g.radius, 250.0);
        assert_eq!(g.canvas_width(), 1000);
    }

    #[test]
    fn vertical_expansion_on_wide_canvas() {
        // radius 0.5 * 400 = 200, reach = 200 + 40 + 10 = 250 > 200
        let g = resolve(1000, 400, &ring(0.5, 40, 10, 5)).unwrap();
        assert_eq!(g.expansion.top, 55);
        assert_eq!(g.expansion.bottom, 55);
        assert_eq!(g.expansion.left, 0);
        assert_eq!(g.expansion.right, 0);
        assert_eq!(g.center_y, 255.0);
        assert_eq!(g.canvas_height(), 510);
    }

    #[test]
    fn offset_center_expands_one_side() {
        let cfg = RingConfig {
            center_x_offset: 300,
            ..ring(0.25, 50, 10, 0)
        };
        // cx = 800, reach = 310, right overshoot 110
        let g = resolve(1000, 1000, &cfg).unwrap();
        assert_eq!(g.expansion.right, 110);
        assert_eq!(g.expansion.left, 0);
        assert_eq!(g.center_x, 800.0);
    }

    #[test]
    fn start_position_sets_offset() {
        let cfg = RingConfig {
            start_position: StartPosition::Nine,
            ..Default::default()
        };
        let g = resolve(640, 480, &cfg).unwrap();
        assert_eq!(g.angular_offset, 270.0);
    }

    #[test]
    fn zero_dimensions_rejected() {
        assert!(resolve(0, 100, &RingConfig::default()).is_err());
        assert!(resolve(100, 0, &RingConfig::default()).is_err());
    }

    #[test]
    fn expand_rejects_mismatched_frame() {
        let g = resolve(100, 100, &ring(0.4, 20, 5, 2)).unwrap();
        let frame = RgbImage::new(90, 100);
        assert!(g.expand(&frame, [0, 0, 0]).is_err());
    }
}
