// Demo scene: a walled arena, a floating ball and a paddle

use glam::Vec2;

use super::simulation::{Simulation, SimulationError};
use crate::engine::behavior::GravityWell;
use crate::engine::entity::{Entity, Visual};
use crate::engine::physics::body::presets;
use crate::engine::physics::{PhysicsError, RigidBodyHandle};

pub const BALL: &str = "ball";
pub const PADDLE: &str = "paddle";

const BALL_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const PADDLE_COLOR: [f32; 4] = [0.4, 0.8, 1.0, 1.0];
const WALL_COLOR: [f32; 4] = [0.3, 0.3, 0.35, 1.0];

/// Handles of the bodies created by [`build_pong`]
#[derive(Debug, Clone, Copy)]
pub struct PongHandles {
    pub ball: RigidBodyHandle,
    pub paddle: RigidBodyHandle,
    pub walls: [RigidBodyHandle; 4],
}

/// Populate `sim` with the pong arena
///
/// The arena spans `(0, 0)` to `(arena_width, arena_height)`. The ball starts
/// a quarter width left of the middle, ignores global gravity and carries a
/// gravity well that pulls it toward the arena center. The kinematic paddle
/// sits near the bottom and is moved by position.
pub fn build_pong(sim: &mut Simulation) -> Result<PongHandles, SimulationError> {
    let config = sim.config().clone();
    let (width, height) = (config.arena_width, config.arena_height);
    let center = Vec2::new(width / 2.0, height / 2.0);

    let world = sim.world_mut();

    // Off the well center so the inverse-square pull stays bounded at launch
    let ball_start = center - Vec2::new(width / 4.0, 0.0);
    let ball = world.add_rigid_body(presets::ball_body(ball_start.x, ball_start.y));
    world.add_collider(presets::ball_collider(config.ball_size), ball);
    world.set_gravity_exempt(ball, true)?;
    world.set_velocity(ball, Vec2::from(config.ball_velocity))?;
    world.attach_behavior(
        ball,
        GravityWell::new(center, config.well_strength, config.well_radius),
    )?;

    let paddle_y = config.wall_thickness + config.paddle_size;
    let paddle = world.add_rigid_body(presets::paddle_body(center.x, paddle_y));
    world.add_collider(presets::paddle_collider(config.paddle_size), paddle);

    let t = config.wall_thickness;
    let wall_specs = [
        (t / 2.0, height / 2.0, t, height),          // Left
        (width / 2.0, height - t / 2.0, width, t),   // Top
        (width - t / 2.0, height / 2.0, t, height),  // Right
        (width / 2.0, t / 2.0, width, t),            // Bottom
    ];
    let walls = wall_specs.map(|(x, y, w, h)| {
        let wall = world.add_rigid_body(presets::wall_body(x, y));
        world.add_collider(presets::wall_collider(w, h), wall);
        wall
    });

    let entities = sim.entities_mut();
    entities.insert(
        BALL,
        Entity::new(ball, Visual::circle(config.ball_size).with_color(BALL_COLOR)),
    );
    entities.insert(
        PADDLE,
        Entity::new(
            paddle,
            Visual::circle(config.paddle_size).with_color(PADDLE_COLOR),
        ),
    );
    for (index, (wall, spec)) in walls.iter().zip(wall_specs).enumerate() {
        entities.insert(
            format!("wall_{index}"),
            Entity::new(*wall, Visual::rect(spec.2, spec.3).with_color(WALL_COLOR)),
        );
    }

    log::info!(
        "Pong scene built: {}x{} arena, {} entities",
        width,
        height,
        sim.entities().len()
    );

    Ok(PongHandles {
        ball,
        paddle,
        walls,
    })
}

/// Move the paddle to `position`; takes effect on the next tick
pub fn move_paddle(sim: &mut Simulation, position: Vec2) -> Result<(), PhysicsError> {
    let Some(paddle) = sim.entities().get(PADDLE).map(|entity| entity.body) else {
        return Ok(());
    };
    sim.world_mut().set_position(paddle, position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::SandboxConfig;
    use approx::assert_abs_diff_eq;

    fn pong() -> (Simulation, PongHandles) {
        let mut sim = Simulation::new(SandboxConfig::default()).unwrap();
        let handles = build_pong(&mut sim).unwrap();
        (sim, handles)
    }

    #[test]
    fn test_scene_layout() {
        let (sim, handles) = pong();

        assert_eq!(sim.world().body_count(), 6);
        assert_eq!(sim.entities().len(), 6);
        let keys: Vec<_> = sim.entities().keys().take(2).collect();
        assert_eq!(keys, [BALL, PADDLE]);
        assert!(sim.world().is_gravity_exempt(handles.ball));
        assert!(!sim.world().is_gravity_exempt(handles.paddle));
        assert_eq!(sim.world().behaviors(handles.ball).len(), 1);
        assert!(sim.world().behaviors(handles.paddle).is_empty());
        assert!(sim.world().get_rigid_body(handles.paddle).unwrap().is_kinematic());
    }

    #[test]
    fn test_ball_launch_velocity() {
        let (sim, handles) = pong();
        let velocity = sim.world().velocity(handles.ball).unwrap();
        assert_eq!(velocity, Vec2::from(sim.config().ball_velocity));
    }

    #[test]
    fn test_ball_starts_off_well_center() {
        let (sim, handles) = pong();
        let config = sim.config();
        let center = Vec2::new(config.arena_width / 2.0, config.arena_height / 2.0);

        let position = sim.world().position(handles.ball).unwrap();
        assert!(position.distance(center) > 1.0);
        assert!(sim.world().get_rigid_body(handles.ball).unwrap().is_ccd_enabled());
    }

    #[test]
    fn test_ball_stays_inside_arena() {
        let (mut sim, handles) = pong();
        let config = sim.config().clone();

        for tick in 0..600 {
            sim.tick_fixed().unwrap();

            let position = sim.world().position(handles.ball).unwrap();
            assert!(
                position.x > 0.0 && position.x < config.arena_width,
                "tick {tick}: ball left the arena at {position:?}"
            );
            assert!(
                position.y > 0.0 && position.y < config.arena_height,
                "tick {tick}: ball left the arena at {position:?}"
            );
        }
    }

    #[test]
    fn test_move_paddle() {
        let (mut sim, handles) = pong();
        move_paddle(&mut sim, Vec2::new(12.0, 8.0)).unwrap();
        sim.tick_fixed().unwrap();

        let position = sim.world().position(handles.paddle).unwrap();
        assert_abs_diff_eq!(position.x, 12.0, epsilon = 1e-4);
        assert_abs_diff_eq!(position.y, 8.0, epsilon = 1e-4);
    }
}
