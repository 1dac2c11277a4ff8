//! Frame driver for the simulation
//!
//! Accumulates wall-clock time and tells the caller how many fixed-size
//! simulation ticks to run this frame. Rendering (if any) happens between
//! frames at whatever rate the host manages.
use std::time::{Duration, Instant};

use rapier2d::prelude::Real;

use super::config::{ConfigError, SandboxConfig};

/// Fixed-timestep accumulator state
pub struct FrameLoop {
    /// Length of one tick
    timestep: Duration,

    /// Maximum ticks per frame to prevent spiral of death
    max_steps: u32,

    /// Accumulated time not yet simulated
    accumulator: Duration,

    /// Time of last frame
    last_frame_time: Instant,

    /// Time when the loop started
    start_time: Instant,

    /// Whether the simulation is paused
    paused: bool,

    /// Current frame number
    frame_count: u64,

    /// Total ticks handed out
    tick_count: u64,

    /// Frames that hit the step cap and dropped time
    dropped_frames: u64,
}

impl FrameLoop {
    /// Create a frame loop for the configured timestep
    pub fn new(config: &SandboxConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Self::with_timestep(config.timestep_ms, config.max_steps_per_frame)
    }

    /// Timesteps that round below one microsecond are rejected
    pub fn with_timestep(timestep_ms: Real, max_steps: u32) -> Result<Self, ConfigError> {
        if !(timestep_ms.is_finite() && timestep_ms > 0.0) {
            return Err(ConfigError::InvalidTimestep(timestep_ms));
        }
        if max_steps == 0 {
            return Err(ConfigError::NoStepsPerFrame);
        }

        let timestep = Duration::from_micros((timestep_ms * 1000.0).round() as u64);
        if timestep.is_zero() {
            return Err(ConfigError::InvalidTimestep(timestep_ms));
        }

        let now = Instant::now();
        Ok(Self {
            timestep,
            max_steps,
            accumulator: Duration::ZERO,
            last_frame_time: now,
            start_time: now,
            paused: false,
            frame_count: 0,
            tick_count: 0,
            dropped_frames: 0,
        })
    }

    /// Begin a new frame, returns the number of ticks to run
    pub fn begin_frame(&mut self) -> u32 {
        let now = Instant::now();
        let frame_time = now.duration_since(self.last_frame_time);
        self.last_frame_time = now;
        self.advance(frame_time)
    }

    /// Account for `frame_time` of elapsed time, returns the number of ticks to run
    pub fn advance(&mut self, frame_time: Duration) -> u32 {
        self.frame_count += 1;

        // If paused, don't accumulate time for ticks
        if self.paused {
            return 0;
        }

        self.accumulator += frame_time;

        let mut ticks = 0;
        while self.accumulator >= self.timestep && ticks < self.max_steps {
            self.accumulator -= self.timestep;
            ticks += 1;
        }

        // Whatever is left beyond one tick cannot be caught up
        if self.accumulator >= self.timestep {
            self.dropped_frames += 1;
            log::debug!(
                "Frame {} hit the {}-tick cap, dropping {:?}",
                self.frame_count,
                self.max_steps,
                self.accumulator
            );
            self.accumulator = Duration::ZERO;
        }

        self.tick_count += ticks as u64;
        ticks
    }

    /// Length of one tick in milliseconds
    pub fn timestep_ms(&self) -> Real {
        self.timestep.as_secs_f32() * 1000.0
    }

    /// Interpolation alpha for smooth rendering between ticks
    pub fn alpha(&self) -> f32 {
        self.accumulator.as_secs_f32() / self.timestep.as_secs_f32()
    }

    /// Get total elapsed time since start
    pub fn elapsed(&self) -> Duration {
        Instant::now().duration_since(self.start_time)
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            log::info!("Simulation paused");
        }
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            // Reset accumulator to prevent a burst of ticks
            self.accumulator = Duration::ZERO;
            self.last_frame_time = Instant::now();
            log::info!("Simulation resumed");
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }
}
