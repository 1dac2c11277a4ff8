// Physics system using rapier2d, extended with selective gravity

pub mod body;
mod force;
mod world;

pub use body::{BodyBuilder, ColliderBuilder2D};
pub use force::{Force, ForceEvent, ForceSource};
pub use world::{BodyExtension, ColliderHandle, Gravity, PhysicsWorld, RigidBodyHandle};

// Re-export commonly used rapier types for convenience
pub use rapier2d::prelude::{RigidBody, Real};

/// Physics layer errors
#[derive(Debug, thiserror::Error)]
pub enum PhysicsError {
    #[error("Rigid body not found: {0:?}")]
    BodyNotFound(RigidBodyHandle),
}
