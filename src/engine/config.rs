// Sandbox configuration - one set of defaults, overridable per simulation

use rapier2d::prelude::Real;

/// Configuration errors
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("Timestep must be positive, got {0} ms")]
    InvalidTimestep(Real),

    #[error("Arena size must be positive, got {width}x{height}")]
    InvalidArena { width: Real, height: Real },

    #[error("At least one physics step per frame is required")]
    NoStepsPerFrame,
}

/// Tunable parameters for a simulation
#[derive(Debug, Clone, PartialEq)]
pub struct SandboxConfig {
    // World
    /// Global gravity direction (units/s² before scaling)
    pub gravity: [Real; 2],
    /// Global gravity multiplier (0.0 = no gravity)
    pub gravity_scale: Real,

    // Timing
    /// Fixed simulation step in milliseconds
    pub timestep_ms: Real,
    /// Maximum number of physics steps per frame to prevent spiral of death
    pub max_steps_per_frame: u32,

    // Arena
    /// Arena width in world units
    pub arena_width: Real,
    /// Arena height in world units
    pub arena_height: Real,
    /// Wall thickness in world units
    pub wall_thickness: Real,

    // Demo scene
    /// Ball diameter
    pub ball_size: Real,
    /// Ball launch velocity (units/second)
    pub ball_velocity: [Real; 2],
    /// Paddle diameter
    pub paddle_size: Real,
    /// Strength of the gravity well carried by the ball, centered on the arena
    pub well_strength: Real,
    /// Effective radius of the ball's gravity well
    pub well_radius: Real,

    /// Record every applied force in the per-tick event queue
    pub trace_forces: bool,
}

/// Default configuration, sized like a small portrait arena
pub const DEFAULT_CONFIG: SandboxConfig = SandboxConfig {
    gravity: [0.0, -9.81],
    gravity_scale: 1.0,

    timestep_ms: 1000.0 / 60.0,
    max_steps_per_frame: 5,

    arena_width: 40.0,
    arena_height: 70.0,
    wall_thickness: 2.0,

    ball_size: 2.0,
    ball_velocity: [4.0, -10.0],
    paddle_size: 10.0,
    well_strength: 1.0,
    well_radius: 20.0,

    trace_forces: false,
};

impl SandboxConfig {
    /// Replace the gravity vector and scale
    pub fn with_gravity(mut self, x: Real, y: Real, scale: Real) -> Self {
        self.gravity = [x, y];
        self.gravity_scale = scale;
        self
    }

    /// Replace the fixed timestep (milliseconds)
    pub fn with_timestep_ms(mut self, timestep_ms: Real) -> Self {
        self.timestep_ms = timestep_ms;
        self
    }

    /// Enable or disable force tracing
    pub fn with_force_tracing(mut self, enabled: bool) -> Self {
        self.trace_forces = enabled;
        self
    }

    /// Check the values the simulation cannot run without
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.timestep_ms > 0.0) {
            return Err(ConfigError::InvalidTimestep(self.timestep_ms));
        }
        if !(self.arena_width > 0.0 && self.arena_height > 0.0) {
            return Err(ConfigError::InvalidArena {
                width: self.arena_width,
                height: self.arena_height,
            });
        }
        if self.max_steps_per_frame == 0 {
            return Err(ConfigError::NoStepsPerFrame);
        }
        Ok(())
    }
}

impl Default for SandboxConfig {
    fn default() -> Self {
        DEFAULT_CONFIG
    }
}
