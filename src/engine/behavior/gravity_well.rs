use glam::Vec2;
use rapier2d::prelude::{Real, RigidBody};

use crate::core::math::point_to_vec2;
use crate::engine::physics::Force;

/// Below this squared distance the well exerts no force (no singularity at the center)
pub const MIN_DISTANCE_SQ: Real = 1e-6;

/// Inverse-square attraction toward a fixed point, limited to a radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityWell {
    pub center: Vec2,
    pub strength: Real,
    pub radius: Real,
}

impl GravityWell {
    pub fn new(center: Vec2, strength: Real, radius: Real) -> Self {
        Self {
            center,
            strength,
            radius,
        }
    }

    /// Force on a body of `mass` at `position`, or `None` outside the well's range
    pub fn force_at(&self, position: Vec2, mass: Real) -> Option<Vec2> {
        let delta = self.center - position;
        let dist_sq = delta.length_squared();

        if dist_sq > self.radius * self.radius || dist_sq < MIN_DISTANCE_SQ {
            return None;
        }

        let dist = dist_sq.sqrt();
        let magnitude = mass * self.strength / dist_sq;
        Some(delta / dist * magnitude)
    }

    /// Force to apply to `body` this tick, measured from and applied at its
    /// center of mass so the pull adds no torque
    pub fn apply(&self, body: &RigidBody) -> Option<Force> {
        let position = point_to_vec2(body.center_of_mass());
        self.force_at(position, body.mass())
            .map(|vector| Force::new(position, vector))
    }
}
