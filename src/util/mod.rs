//! Shared utilities: easing curves and viewport geometry.

pub mod easing;
pub mod geometry;
