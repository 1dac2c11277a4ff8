//! Gravity sandbox: a 2D rigid-body simulation built on rapier2d.
//!
//! The engine layer wraps rapier's per-step update with a gravity override for
//! gravity-exempt bodies and runs per-body behaviors (force generators such as
//! gravity wells) once per tick. The game layer holds entities, the explicit
//! simulation state and a demo scene.

pub mod core;
pub mod engine;
pub mod game;

pub use engine::behavior::{Behavior, BehaviorContext, BehaviorError, BodyBehavior, GravityWell};
pub use engine::config::SandboxConfig;
pub use engine::physics::{Force, Gravity, PhysicsError, PhysicsWorld};
pub use game::{Entity, EntityMap, Simulation, SimulationError, Visual};
