//! Vector geometry helpers
//!
//! - Bounding boxes
//! - Clip: convex faces to a rectangle, any polygon to a boundary
//! - Square metres to hectares

mod clip;
mod measurements;
mod spatial;

pub use clip::{clip_polygon_to_rect, clip_ring_to_rect, clip_to_boundary, ClipRect};
pub use measurements::{hectares, M2_PER_HECTARE};
pub use spatial::BoundingBox;
