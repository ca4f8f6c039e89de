use std::f64::consts::TAU;

use image::{Rgb, RgbImage};

use super::geometry::RingGeometry;

const INNER_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const PADDING_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const OUTER_COLOR: Rgb<u8> = Rgb([0, 128, 255]);
const CROSSHAIR_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const CROSSHAIR_HALF_LENGTH: i64 = 10;

fn put_clipped(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Draw a one-pixel circle outline, clipped to the image.
pub fn draw_circle(img: &mut RgbImage, cx: f64, cy: f64, radius: f64, color: Rgb<u8>) {
    if radius <= 0.0 {
        put_clipped(img, cx.round() as i64, cy.round() as i64, color);
        return;
    }
    // Two samples per pixel of circumference leave no gaps.
    let steps = (TAU * radius * 2.0).ceil().max(8.0) as usize;
    for i in 0..steps {
        let t = i as f64 / steps as f64 * TAU;
        let x = (cx + radius * t.cos()).round() as i64;
        let y = (cy + radius * t.sin()).round() as i64;
        put_clipped(img, x, y, color);
    }
}

/// Overlay the ring's three boundary circles and a centre crosshair.
pub fn draw_calibration(img: &mut RgbImage, geometry: &RingGeometry) {
    let (cx, cy) = (geometry.center_x, geometry.center_y);
    draw_circle(img, cx, cy, geometry.radius, INNER_COLOR);
    draw_circle(img, cx, cy, geometry.inner_radius(), PADDING_COLOR);
    draw_circle(img, cx, cy, geometry.outer_radius(), OUTER_COLOR);

    let (x0, y0) = (cx.round() as i64, cy.round() as i64);
    for d in -CROSSHAIR_HALF_LENGTH..=CROSSHAIR_HALF_LENGTH {
        put_clipped(img, x0 + d, y0, CROSSHAIR_COLOR);
        put_clipped(img, x0, y0 + d, CROSSHAIR_COLOR);
    }
}
