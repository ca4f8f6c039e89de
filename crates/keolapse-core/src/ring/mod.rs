//! Keogram ring: geometry, strips, polar remap and calibration overlay.
//!
//! The ring is built in two phases. [`geometry::resolve`] runs once on the
//! first frame's canvas size and yields a frozen [`RingGeometry`]; every
//! frame is then expanded and warped with that same value.

pub mod calibration;
pub mod geometry;
mod labels;
pub mod strip;
pub mod warp;

pub use geometry::{resolve, Expansion, RingGeometry};
pub use strip::{prepare_strips, RingStrips};
pub use warp::RingMap;
