use glam::Vec2;
use rapier2d::prelude::*;

use crate::core::math::{to_point, to_vector};

/// A force to be accumulated on a body and resolved by the next physics step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Force {
    /// World-space point of application
    pub point: Vec2,
    /// Force vector
    pub vector: Vec2,
}

impl Force {
    pub fn new(point: Vec2, vector: Vec2) -> Self {
        Self { point, vector }
    }

    /// Check whether the force would change anything
    pub fn is_zero(&self) -> bool {
        self.vector == Vec2::ZERO
    }
}

/// What produced an applied force
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForceSource {
    /// Cancellation of global gravity on an exempt body
    GravityOverride,

    /// A behavior attached to an entity's body
    Behavior { entity: String, index: usize },

    /// Any direct call from outside the core
    External,
}

/// Record of one force application, kept when force tracing is enabled
#[derive(Debug, Clone, PartialEq)]
pub struct ForceEvent {
    pub body: RigidBodyHandle,
    pub source: ForceSource,
    pub force: Force,
}

/// Queue of force events for the current tick
///
/// Cleared at the start of every physics step, so after a tick it holds the
/// counter-gravity forces of that step plus whatever the behaviors applied.
#[derive(Debug, Default)]
pub struct ForceEventQueue {
    enabled: bool,
    events: Vec<ForceEvent>,
}

impl ForceEventQueue {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            events: Vec::with_capacity(if enabled { 32 } else { 0 }),
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.events.clear();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Clear all events (call at start of physics step)
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn events(&self) -> &[ForceEvent] {
        &self.events
    }

    pub(crate) fn push(&mut self, body: RigidBodyHandle, source: ForceSource, force: Force) {
        log::trace!(
            target: "gravity_sandbox::force",
            "body={:?} source={:?} point=({}, {}) force=({}, {})",
            body,
            source,
            force.point.x,
            force.point.y,
            force.vector.x,
            force.vector.y
        );
        if self.enabled {
            self.events.push(ForceEvent {
                body,
                source,
                force,
            });
        }
    }
}

/// Add a force to a body's accumulator without moving it
///
/// The force stays in the accumulator until the next physics step consumes it.
pub(crate) fn accumulate(body: &mut RigidBody, force: Force) {
    body.add_force_at_point(to_vector(force.vector), to_point(force.point), true);
}
