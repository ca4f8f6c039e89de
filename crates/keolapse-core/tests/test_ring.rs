#[allow(dead_code)]
mod common;

use image::{Rgb, RgbImage};

use keolapse_core::config::{DebugConfig, KeolapseConfig, RingConfig, StartPosition};
use keolapse_core::pipeline::{NoOpReporter, RingCompositor};
use keolapse_core::ring::strip::strip_width;
use keolapse_core::ring::warp::{polar_field, strip_column, warp_frame};
use keolapse_core::ring::{prepare_strips, resolve, RingMap, RingStrips};

fn ring_config() -> RingConfig {
    RingConfig {
        circle_radius_factor: 0.35,
        ring_height: 24,
        ring_padding: 6,
        edge_padding: 4,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Geometry stability
// ---------------------------------------------------------------------------

#[test]
fn test_geometry_is_bit_identical_across_calls() {
    for &(w, h) in &[(640u32, 480u32), (1920, 1080), (333, 777), (50, 50)] {
        let cfg = RingConfig {
            center_x_offset: -17,
            center_y_offset: 9,
            start_position: StartPosition::Six,
            ..ring_config()
        };
        let a = resolve(w, h, &cfg).unwrap();
        let b = resolve(w, h, &cfg).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.radius.to_bits(), b.radius.to_bits());
        assert_eq!(a.center_x.to_bits(), b.center_x.to_bits());
        assert_eq!(a.center_y.to_bits(), b.center_y.to_bits());
    }
}

#[test]
fn test_expanded_canvas_contains_ring() {
    for &(w, h) in &[(400u32, 100u32), (100, 400), (200, 200)] {
        let cfg = RingConfig {
            circle_radius_factor: 0.6,
            ..ring_config()
        };
        let g = resolve(w, h, &cfg).unwrap();
        let outer = g.outer_radius();
        assert!(g.center_x - outer >= 0.0, "{w}x{h}: left");
        assert!(g.center_y - outer >= 0.0, "{w}x{h}: top");
        assert!(g.center_x + outer <= g.canvas_width() as f64, "{w}x{h}: right");
        assert!(g.center_y + outer <= g.canvas_height() as f64, "{w}x{h}: bottom");
    }
}

// ---------------------------------------------------------------------------
// Ring containment
// ---------------------------------------------------------------------------

#[test]
fn test_ring_pixels_lie_strictly_inside_annulus() {
    let g = resolve(160, 120, &ring_config()).unwrap();
    let map = RingMap::build(&g, strip_width(&g));
    assert!(!map.is_empty());

    let inner = g.inner_radius();
    let outer = g.outer_radius();
    for ((x, y), (col, row)) in map.samples() {
        assert!(x < g.canvas_width() && y < g.canvas_height());
        let r = (x as f64 - g.center_x).hypot(y as f64 - g.center_y);
        assert!(r > inner && r < outer, "pixel ({x},{y}) at r={r}");
        assert!(col < map.strip_width());
        assert!(row < g.ring_thickness);
    }
}

#[test]
fn test_pixels_outside_ring_untouched() {
    let g = resolve(120, 120, &ring_config()).unwrap();
    let map = RingMap::build(&g, strip_width(&g));
    let mut canvas = RgbImage::from_pixel(g.canvas_width(), g.canvas_height(), Rgb([7, 7, 7]));
    let strip = RgbImage::from_pixel(map.strip_width(), g.ring_thickness, Rgb([200, 100, 50]));
    map.apply(&mut canvas, &strip).unwrap();

    let field = polar_field(&g);
    let mut ring_count = 0;
    for (x, y, px) in canvas.enumerate_pixels() {
        let r = field.radius[[y as usize, x as usize]];
        if r > g.inner_radius() && r < g.outer_radius() {
            assert_eq!(px, &Rgb([200, 100, 50]));
            ring_count += 1;
        } else {
            assert_eq!(px, &Rgb([7, 7, 7]));
        }
    }
    assert_eq!(ring_count, map.len());
}

#[test]
fn test_apply_rejects_wrong_canvas() {
    let g = resolve(100, 100, &ring_config()).unwrap();
    let map = RingMap::build(&g, strip_width(&g));
    let mut canvas = RgbImage::new(10, 10);
    let strip = RgbImage::new(map.strip_width(), g.ring_thickness);
    assert!(map.apply(&mut canvas, &strip).is_err());
}

// ---------------------------------------------------------------------------
// Angle wraparound
// ---------------------------------------------------------------------------

#[test]
fn test_wraparound_columns_are_adjacent() {
    for width in [1u32, 2, 7, 360, 691, 1000, 2513, 6283] {
        let high = strip_column(359.999, width);
        let low = strip_column(0.001, width);
        assert!(high < width && low < width);
        let gap = (low + width - high) % width;
        assert!(gap <= 1, "width {width}: columns {high} and {low}");
    }
}

#[test]
fn test_wraparound_has_no_seam_in_map() {
    // Pixels straddling 12 o'clock just above the centre must sample the
    // first and last strip columns, never something in between.
    let g = resolve(200, 200, &ring_config()).unwrap();
    let width = strip_width(&g);
    let map = RingMap::build(&g, width);
    let cx = g.center_x.round() as u32;
    let y = (g.center_y - g.inner_radius() - g.ring_thickness as f64 / 2.0).round() as u32;

    let col_at = |x: u32| {
        map.samples()
            .find(|((px, py), _)| *px == x && *py == y)
            .map(|(_, (c, _))| c)
            .unwrap()
    };
    let left = col_at(cx - 1);
    let right = col_at(cx + 1);
    assert!(left >= width - 3, "left of 12 o'clock sampled column {left}");
    assert!(right <= 2, "right of 12 o'clock sampled column {right}");
}

// ---------------------------------------------------------------------------
// Frozen geometry across frames
// ---------------------------------------------------------------------------

#[test]
fn test_ring_identical_for_differently_sized_frames() {
    let mut config = KeolapseConfig::new("/unused", "/unused");
    config.output.width = 120;
    config.output.height = 90;
    config.ring = ring_config();

    let keogram = common::keogram_image(240, 30);
    let first = common::sky_frame(120, 90, 0);
    let compositor = RingCompositor::new(&first, Some(&keogram), &config, &NoOpReporter).unwrap();

    // A later frame at a different native size and content.
    let later = common::sky_frame(400, 250, 99);
    let a = compositor.composite(&first, 3, 10).unwrap();
    let b = compositor.composite(&later, 3, 10).unwrap();
    assert_eq!(a.dimensions(), b.dimensions());

    let g = compositor.geometry();
    let map = RingMap::build(g, strip_width(g));
    for ((x, y), _) in map.samples() {
        assert_eq!(a.get_pixel(x, y), b.get_pixel(x, y), "ring pixel ({x},{y})");
    }
}

#[test]
fn test_marker_moves_with_frame_index() {
    let g = resolve(160, 160, &ring_config()).unwrap();
    let keogram = RgbImage::from_pixel(100, 10, Rgb([50, 50, 50]));
    let strips = prepare_strips(&keogram, &g, &ring_config()).unwrap();
    let early = strips.composite(0, 100);
    let late = strips.composite(50, 100);
    assert_ne!(early, late);
    assert_eq!(early.dimensions(), late.dimensions());
}

#[test]
fn test_circles_only_draws_without_strip() {
    let g = resolve(100, 100, &ring_config()).unwrap();
    let map = RingMap::build(&g, strip_width(&g));
    let canvas = RgbImage::new(g.canvas_width(), g.canvas_height());
    let debug = DebugConfig {
        circles_only: true,
        ..Default::default()
    };
    let out = warp_frame(canvas, &g, &map, &RingStrips::placeholder(), 0, 1, &debug).unwrap();
    let (cx, cy) = (g.center_x.round() as u32, g.center_y.round() as u32);
    assert_eq!(out.get_pixel(cx, cy), &Rgb([255, 255, 255]));
}
