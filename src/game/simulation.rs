// Simulation state: one physics world plus its entities

use rapier2d::prelude::Real;

use crate::engine::behavior::{pipeline, BehaviorError};
use crate::engine::config::{ConfigError, SandboxConfig};
use crate::engine::entity::EntityMap;
use crate::engine::physics::{PhysicsError, PhysicsWorld};

/// Simulation errors
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Behavior pass failed: {0}")]
    Behavior(#[from] BehaviorError),

    #[error("Scene setup failed: {0}")]
    Scene(#[from] PhysicsError),
}

/// A self-contained simulation
///
/// Lifecycle: `new` validates the configuration and starts with an empty
/// world; callers (usually a scene) add bodies and entities; `tick` advances
/// one step; `reset` drops everything and returns to the freshly created
/// state with the same configuration.
pub struct Simulation {
    config: SandboxConfig,
    world: PhysicsWorld,
    entities: EntityMap,
    ticks: u64,
}

impl Simulation {
    pub fn new(config: SandboxConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        let world = PhysicsWorld::from_config(&config);
        Ok(Self {
            config,
            world,
            entities: EntityMap::new(),
            ticks: 0,
        })
    }

    /// Advance the simulation by `delta_ms` milliseconds
    ///
    /// Runs the gravity-overriding physics step, then every behavior. If a
    /// behavior fails the physics step has still happened; the remaining
    /// behaviors of this tick are skipped.
    pub fn tick(&mut self, delta_ms: Real) -> Result<(), SimulationError> {
        self.world.step(delta_ms, None);
        self.ticks += 1;
        pipeline::run(&mut self.world, &self.entities, delta_ms)?;
        Ok(())
    }

    /// Advance by one configured timestep
    pub fn tick_fixed(&mut self) -> Result<(), SimulationError> {
        self.tick(self.config.timestep_ms)
    }

    /// Drop all bodies and entities
    pub fn reset(&mut self) {
        log::info!(
            "Resetting simulation after {} ticks ({} entities)",
            self.ticks,
            self.entities.len()
        );
        self.world = PhysicsWorld::from_config(&self.config);
        self.entities.clear();
        self.ticks = 0;
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.world
    }

    pub fn entities(&self) -> &EntityMap {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut EntityMap {
        &mut self.entities
    }

    /// Ticks since creation or the last reset
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
