// Behaviors: per-body force generators run once per tick

mod gravity_well;
pub mod pipeline;

pub use gravity_well::{GravityWell, MIN_DISTANCE_SQ};

use std::fmt;

use rapier2d::prelude::{Real, RigidBody};

use super::entity::{Entity, EntityMap};
use super::physics::{Force, PhysicsWorld};

/// What a behavior sees besides its own body
pub struct BehaviorContext<'a> {
    /// Key of the entity owning the body
    pub key: &'a str,
    /// The entity owning the body
    pub entity: &'a Entity,
    /// Every entity of the simulation
    pub entities: &'a EntityMap,
    /// Read access to all bodies
    pub world: &'a PhysicsWorld,
}

/// Reason a behavior gave up
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct BehaviorFailure(pub String);

impl BehaviorFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Behavior pipeline errors
#[derive(Debug, thiserror::Error)]
pub enum BehaviorError {
    #[error("Behavior #{index} of entity '{key}' failed: {source}")]
    Failed {
        key: String,
        index: usize,
        #[source]
        source: BehaviorFailure,
    },

    #[error("Entity '{0}' has no body in the physics world")]
    MissingBody(String),
}

/// A force generator written outside this crate
///
/// `apply` may only inspect state; the returned force is applied by the
/// pipeline before the next behavior runs.
pub trait BodyBehavior: fmt::Debug {
    fn apply(
        &self,
        body: &RigidBody,
        delta_ms: Real,
        context: &BehaviorContext<'_>,
    ) -> Result<Option<Force>, BehaviorFailure>;

    /// Name used in logs
    fn name(&self) -> &str {
        "custom"
    }
}

/// A behavior attached to a body
#[derive(Debug)]
pub enum Behavior {
    /// Inverse-square attraction toward a fixed point
    GravityWell(GravityWell),

    /// Anything else
    Custom(Box<dyn BodyBehavior>),
}

impl Behavior {
    pub fn custom(behavior: impl BodyBehavior + 'static) -> Self {
        Behavior::Custom(Box::new(behavior))
    }

    /// Compute the force this behavior wants applied to `body`
    pub fn apply(
        &self,
        body: &RigidBody,
        delta_ms: Real,
        context: &BehaviorContext<'_>,
    ) -> Result<Option<Force>, BehaviorFailure> {
        match self {
            Behavior::GravityWell(well) => Ok(well.apply(body)),
            Behavior::Custom(behavior) => behavior.apply(body, delta_ms, context),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Behavior::GravityWell(_) => "gravity_well",
            Behavior::Custom(behavior) => behavior.name(),
        }
    }
}

impl From<GravityWell> for Behavior {
    fn from(well: GravityWell) -> Self {
        Behavior::GravityWell(well)
    }
}
