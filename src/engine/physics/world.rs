use glam::Vec2;
use rapier2d::prelude::*;
use std::collections::HashMap;

use super::force::{self, Force, ForceEvent, ForceEventQueue, ForceSource};
use super::PhysicsError;
use crate::core::math::{point_to_vec2, to_vec2};
use crate::engine::behavior::Behavior;
use crate::engine::config::SandboxConfig;

/// Handle to identify rigid bodies
pub type RigidBodyHandle = rapier2d::prelude::RigidBodyHandle;

/// Handle to identify colliders
pub type ColliderHandle = rapier2d::prelude::ColliderHandle;

/// Global gravity: a direction and a scale applied to it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gravity {
    pub x: Real,
    pub y: Real,
    pub scale: Real,
}

impl Gravity {
    pub fn new(x: Real, y: Real, scale: Real) -> Self {
        Self { x, y, scale }
    }

    /// Acceleration actually applied to bodies
    pub fn acceleration(&self) -> Vector<Real> {
        vector![self.x * self.scale, self.y * self.scale]
    }
}

impl Default for Gravity {
    fn default() -> Self {
        Self::new(0.0, -9.81, 1.0)
    }
}

/// Sandbox data attached to a rapier body
#[derive(Debug, Default)]
pub struct BodyExtension {
    /// Global gravity has no net effect on this body
    pub gravity_exempt: bool,
    /// Force generators run once per tick, in order
    pub behaviors: Vec<Behavior>,
}

/// Physics world that manages all physics simulation
pub struct PhysicsWorld {
    /// Global gravity (direction and scale)
    gravity: Gravity,

    /// Integration parameters for the physics simulation
    integration_parameters: IntegrationParameters,

    /// Physics pipeline handles collision detection and solving
    physics_pipeline: PhysicsPipeline,

    /// Island manager for sleeping bodies
    island_manager: IslandManager,

    /// Broad phase collision detection
    broad_phase: DefaultBroadPhase,

    /// Narrow phase collision detection
    narrow_phase: NarrowPhase,

    /// Impulse joint set
    impulse_joint_set: ImpulseJointSet,

    /// Multibody joint set
    multibody_joint_set: MultibodyJointSet,

    /// CCD solver for fast-moving objects
    ccd_solver: CCDSolver,

    /// Rigid body set
    rigid_body_set: RigidBodySet,

    /// Collider set
    collider_set: ColliderSet,

    /// Exempt flags and behaviors, keyed by body
    extensions: HashMap<RigidBodyHandle, BodyExtension>,

    /// Forces applied during the current tick
    force_events: ForceEventQueue,

    /// Number of completed steps
    step_count: u64,
}

impl PhysicsWorld {
    /// Create a new physics world with default settings
    pub fn new() -> Self {
        Self::with_gravity(Gravity::default())
    }

    /// Create a new physics world with custom gravity
    pub fn with_gravity(gravity: Gravity) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        // Fixed timestep of 1/60 seconds until the first step overrides it
        integration_parameters.dt = 1.0 / 60.0;

        Self {
            gravity,
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            extensions: HashMap::new(),
            force_events: ForceEventQueue::new(false),
            step_count: 0,
        }
    }

    /// Create a physics world from a sandbox configuration
    pub fn from_config(config: &SandboxConfig) -> Self {
        let gravity = Gravity::new(config.gravity[0], config.gravity[1], config.gravity_scale);
        let mut world = Self::with_gravity(gravity);
        world.integration_parameters.dt = config.timestep_ms / 1000.0;
        world.force_events.set_enabled(config.trace_forces);
        log::info!(
            "Physics world created: gravity=({}, {}) scale={}",
            gravity.x,
            gravity.y,
            gravity.scale
        );
        world
    }

    /// Step the simulation forward by `delta_ms` milliseconds
    ///
    /// Every gravity-exempt body first receives the exact negation of the
    /// global gravity force, then rapier runs one full step (gravity,
    /// collisions, integration). All accumulated forces are consumed by this
    /// step and cleared afterwards. `correction` scales the timestep and
    /// defaults to 1.0.
    ///
    /// Exempt bodies are visited in body-set order. Only dynamic bodies are
    /// touched since gravity never acts on fixed or kinematic ones.
    pub fn step(&mut self, delta_ms: Real, correction: Option<Real>) {
        self.force_events.clear();

        let acceleration = self.gravity.acceleration();
        let exempt: Vec<RigidBodyHandle> = self
            .rigid_body_set
            .iter()
            .filter(|(handle, body)| body.is_dynamic() && self.is_gravity_exempt(*handle))
            .map(|(handle, _)| handle)
            .collect();
        for handle in exempt {
            let Some(body) = self.rigid_body_set.get_mut(handle) else {
                continue;
            };
            let counter = counter_gravity(body, &acceleration);
            if counter.is_zero() {
                continue;
            }
            force::accumulate(body, counter);
            self.force_events
                .push(handle, ForceSource::GravityOverride, counter);
        }

        self.integrate(delta_ms, correction);
        self.clear_forces();
        self.step_count += 1;
    }

    /// Run rapier's own single-step update
    fn integrate(&mut self, delta_ms: Real, correction: Option<Real>) {
        self.integration_parameters.dt = delta_ms / 1000.0 * correction.unwrap_or(1.0);

        self.physics_pipeline.step(
            &self.gravity.acceleration(),
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
    }

    /// Empty every body's force accumulator
    fn clear_forces(&mut self) {
        let loaded: Vec<RigidBodyHandle> = self
            .rigid_body_set
            .iter()
            .filter(|(_, body)| body.user_force() != Vector::zeros() || body.user_torque() != 0.0)
            .map(|(handle, _)| handle)
            .collect();

        for handle in loaded {
            if let Some(body) = self.rigid_body_set.get_mut(handle) {
                body.reset_forces(false);
                body.reset_torques(false);
            }
        }
    }

    /// Apply a force to a body; it is resolved by the next step
    pub fn apply_force(
        &mut self,
        handle: RigidBodyHandle,
        point: Vec2,
        vector: Vec2,
    ) -> Result<(), PhysicsError> {
        self.apply_force_from(handle, Force::new(point, vector), ForceSource::External)
    }

    pub(crate) fn apply_force_from(
        &mut self,
        handle: RigidBodyHandle,
        force: Force,
        source: ForceSource,
    ) -> Result<(), PhysicsError> {
        let body = self
            .rigid_body_set
            .get_mut(handle)
            .ok_or(PhysicsError::BodyNotFound(handle))?;
        force::accumulate(body, force);
        self.force_events.push(handle, source, force);
        Ok(())
    }

    /// Add a rigid body to the physics world
    pub fn add_rigid_body(&mut self, body: RigidBody) -> RigidBodyHandle {
        let handle = self.rigid_body_set.insert(body);
        self.extensions.insert(handle, BodyExtension::default());
        handle
    }

    /// Add a collider attached to a rigid body
    ///
    /// The body's mass is recomputed right away so the first step already
    /// sees it.
    pub fn add_collider(
        &mut self,
        collider: Collider,
        parent_handle: RigidBodyHandle,
    ) -> ColliderHandle {
        let handle =
            self.collider_set
                .insert_with_parent(collider, parent_handle, &mut self.rigid_body_set);
        if let Some(body) = self.rigid_body_set.get_mut(parent_handle) {
            body.recompute_mass_properties_from_colliders(&self.collider_set);
        }
        handle
    }

    /// Remove a rigid body, its colliders and its sandbox data
    pub fn remove_rigid_body(&mut self, handle: RigidBodyHandle) {
        self.rigid_body_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true, // remove attached colliders
        );
        self.extensions.remove(&handle);
    }

    /// Get a reference to a rigid body
    pub fn get_rigid_body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.rigid_body_set.get(handle)
    }

    /// Get a mutable reference to a rigid body
    pub fn get_rigid_body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.rigid_body_set.get_mut(handle)
    }

    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    /// Body position, if the body exists
    pub fn position(&self, handle: RigidBodyHandle) -> Option<Vec2> {
        self.get_rigid_body(handle).map(|body| to_vec2(body.translation()))
    }

    /// Body linear velocity, if the body exists
    pub fn velocity(&self, handle: RigidBodyHandle) -> Option<Vec2> {
        self.get_rigid_body(handle).map(|body| to_vec2(body.linvel()))
    }

    /// Teleport a body
    pub fn set_position(&mut self, handle: RigidBodyHandle, position: Vec2) -> Result<(), PhysicsError> {
        let body = self
            .get_rigid_body_mut(handle)
            .ok_or(PhysicsError::BodyNotFound(handle))?;
        if body.is_kinematic() {
            body.set_next_kinematic_translation(vector![position.x, position.y]);
        } else {
            body.set_translation(vector![position.x, position.y], true);
        }
        Ok(())
    }

    /// Set a body's linear velocity
    pub fn set_velocity(&mut self, handle: RigidBodyHandle, velocity: Vec2) -> Result<(), PhysicsError> {
        let body = self
            .get_rigid_body_mut(handle)
            .ok_or(PhysicsError::BodyNotFound(handle))?;
        body.set_linvel(vector![velocity.x, velocity.y], true);
        Ok(())
    }

    /// Mark a body as immune (or not) to global gravity
    pub fn set_gravity_exempt(
        &mut self,
        handle: RigidBodyHandle,
        exempt: bool,
    ) -> Result<(), PhysicsError> {
        self.extension_mut(handle)?.gravity_exempt = exempt;
        Ok(())
    }

    pub fn is_gravity_exempt(&self, handle: RigidBodyHandle) -> bool {
        self.extensions
            .get(&handle)
            .is_some_and(|extension| extension.gravity_exempt)
    }

    /// Append a behavior to a body's list
    pub fn attach_behavior(
        &mut self,
        handle: RigidBodyHandle,
        behavior: impl Into<Behavior>,
    ) -> Result<(), PhysicsError> {
        self.extension_mut(handle)?.behaviors.push(behavior.into());
        Ok(())
    }

    /// Behaviors attached to a body, in execution order
    pub fn behaviors(&self, handle: RigidBodyHandle) -> &[Behavior] {
        self.extensions
            .get(&handle)
            .map(|extension| extension.behaviors.as_slice())
            .unwrap_or(&[])
    }

    fn extension_mut(&mut self, handle: RigidBodyHandle) -> Result<&mut BodyExtension, PhysicsError> {
        if !self.rigid_body_set.contains(handle) {
            return Err(PhysicsError::BodyNotFound(handle));
        }
        Ok(self.extensions.entry(handle).or_default())
    }

    /// Set gravity for the physics world
    pub fn set_gravity(&mut self, gravity: Gravity) {
        self.gravity = gravity;
    }

    /// Get current gravity
    pub fn gravity(&self) -> Gravity {
        self.gravity
    }

    /// Duration of the last step in seconds
    pub fn timestep(&self) -> Real {
        self.integration_parameters.dt
    }

    /// Number of steps taken since creation
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Turn recording of applied forces on or off
    pub fn set_force_tracing(&mut self, enabled: bool) {
        self.force_events.set_enabled(enabled);
    }

    /// Forces applied since the start of the last step
    pub fn force_events(&self) -> &[ForceEvent] {
        self.force_events.events()
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Force that cancels global gravity on `body`, applied at its centre of mass
fn counter_gravity(body: &RigidBody, acceleration: &Vector<Real>) -> Force {
    let factor = -body.mass() * body.gravity_scale();
    Force::new(
        point_to_vec2(body.center_of_mass()),
        Vec2::new(acceleration.x * factor, acceleration.y * factor),
    )
}
