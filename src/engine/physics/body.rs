use rapier2d::prelude::*;

pub use rapier2d::prelude::{ColliderHandle, RigidBodyHandle};

/// Builder for creating rigid bodies with sandbox defaults
///
/// Dynamic bodies default to no damping and no sleeping, so a body left alone
/// keeps its velocity exactly and keeps receiving behavior forces.
pub struct BodyBuilder {
    body_type: RigidBodyType,
    position: Isometry<Real>,
    ccd_enabled: bool,
    locked_axes: LockedAxes,
}

impl BodyBuilder {
    /// Create a new dynamic body (affected by forces and collisions)
    pub fn new_dynamic() -> Self {
        Self::with_type(RigidBodyType::Dynamic)
    }

    /// Create a new fixed (static) body (completely immovable)
    pub fn new_fixed() -> Self {
        Self::with_type(RigidBodyType::Fixed)
    }

    /// Create a new kinematic position-based body (moved by setting its position)
    pub fn new_kinematic_position_based() -> Self {
        Self::with_type(RigidBodyType::KinematicPositionBased)
    }

    fn with_type(body_type: RigidBodyType) -> Self {
        Self {
            body_type,
            position: Isometry::identity(),
            ccd_enabled: false,
            locked_axes: LockedAxes::empty(),
        }
    }

    /// Set the initial position of the body
    pub fn position(mut self, x: Real, y: Real) -> Self {
        self.position = Isometry::translation(x, y);
        self
    }

    /// Enable continuous collision detection for fast movers
    pub fn ccd(mut self) -> Self {
        self.ccd_enabled = true;
        self
    }

    /// Lock rotation (infinite inertia)
    pub fn lock_rotation(mut self) -> Self {
        self.locked_axes |= LockedAxes::ROTATION_LOCKED;
        self
    }

    /// Build the rigid body
    pub fn build(self) -> RigidBody {
        RigidBodyBuilder::new(self.body_type)
            .position(self.position)
            .ccd_enabled(self.ccd_enabled)
            .can_sleep(false)
            .locked_axes(self.locked_axes)
            .build()
    }
}

/// Builder for creating colliders with common configurations
pub struct ColliderBuilder2D {
    shape: SharedShape,
    friction: Real,
    restitution: Real,
    mass: Option<Real>,
}

impl ColliderBuilder2D {
    fn with_shape(shape: SharedShape) -> Self {
        Self {
            shape,
            friction: 0.5,
            restitution: 0.0,
            mass: None,
        }
    }

    /// Create a box-shaped collider
    pub fn box_shape(half_width: Real, half_height: Real) -> Self {
        Self::with_shape(SharedShape::cuboid(half_width, half_height))
    }

    /// Create a circle-shaped collider
    pub fn circle(radius: Real) -> Self {
        Self::with_shape(SharedShape::ball(radius))
    }

    /// Set friction coefficient (0.0 = no friction, 1.0 = high friction)
    pub fn friction(mut self, friction: Real) -> Self {
        self.friction = friction;
        self
    }

    /// Set restitution/bounciness (0.0 = no bounce, 1.0 = perfect bounce)
    pub fn restitution(mut self, restitution: Real) -> Self {
        self.restitution = restitution;
        self
    }

    /// Set mass directly instead of deriving it from unit density
    pub fn mass(mut self, mass: Real) -> Self {
        self.mass = Some(mass);
        self
    }

    /// Build the collider
    pub fn build(self) -> Collider {
        let mut builder = ColliderBuilder::new(self.shape)
            .friction(self.friction)
            .restitution(self.restitution)
            .restitution_combine_rule(CoefficientCombineRule::Max)
            .friction_combine_rule(CoefficientCombineRule::Min);

        if let Some(mass) = self.mass {
            builder = builder.mass(mass);
        }

        builder.build()
    }
}

/// Body configurations used by the demo scene
pub mod presets {
    use super::*;

    /// A bouncy ball: dynamic, rotation locked, CCD against tunneling
    pub fn ball_body(x: Real, y: Real) -> RigidBody {
        BodyBuilder::new_dynamic()
            .position(x, y)
            .ccd()
            .lock_rotation()
            .build()
    }

    /// Ball collider with unit mass and perfect bounce
    pub fn ball_collider(diameter: Real) -> Collider {
        ColliderBuilder2D::circle(diameter / 2.0)
            .friction(0.0)
            .restitution(1.0)
            .mass(1.0)
            .build()
    }

    /// A paddle that is moved by setting its position, not by forces
    pub fn paddle_body(x: Real, y: Real) -> RigidBody {
        BodyBuilder::new_kinematic_position_based()
            .position(x, y)
            .build()
    }

    /// Paddle collider (round, like the ball but larger)
    pub fn paddle_collider(diameter: Real) -> Collider {
        ColliderBuilder2D::circle(diameter / 2.0)
            .friction(0.0)
            .restitution(1.0)
            .build()
    }

    /// A wall body (fixed/static)
    pub fn wall_body(x: Real, y: Real) -> RigidBody {
        BodyBuilder::new_fixed().position(x, y).build()
    }

    /// Wall collider (box shape)
    pub fn wall_collider(width: Real, height: Real) -> Collider {
        ColliderBuilder2D::box_shape(width / 2.0, height / 2.0)
            .friction(0.0)
            .build()
    }
}
