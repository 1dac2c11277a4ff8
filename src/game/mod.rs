// Game layer: simulation state and the demo scene

pub mod scene;
pub mod simulation;

pub use crate::engine::entity::{Entity, EntityMap, Visual};
pub use simulation::{Simulation, SimulationError};
