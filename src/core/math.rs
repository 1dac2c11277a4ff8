// Conversions between glam and rapier's nalgebra types

use glam::Vec2;
use rapier2d::prelude::*;

/// Convert a glam vector into a rapier vector
pub fn to_vector(v: Vec2) -> Vector<Real> {
    vector![v.x, v.y]
}

/// Convert a glam vector into a rapier point
pub fn to_point(v: Vec2) -> Point<Real> {
    point![v.x, v.y]
}

/// Convert a rapier vector into a glam vector
pub fn to_vec2(v: &Vector<Real>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

/// Convert a rapier point into a glam vector
pub fn point_to_vec2(p: &Point<Real>) -> Vec2 {
    Vec2::new(p.x, p.y)
}
