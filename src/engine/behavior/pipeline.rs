//! Runs every attached behavior once per tick.
//!
//! Entities are visited in insertion order and each body's behaviors in list
//! order. A behavior's force is applied before the next behavior runs. The
//! first failure stops the whole pass: entities after the failing one get no
//! behavior forces this tick, forces already applied are kept. An entity whose
//! body has been removed from the world is a failure too.

use rapier2d::prelude::Real;

use super::{BehaviorContext, BehaviorError};
use crate::engine::entity::EntityMap;
use crate::engine::physics::{ForceSource, PhysicsWorld};

/// Run all behaviors of all entities; returns how many behaviors ran
pub fn run(
    world: &mut PhysicsWorld,
    entities: &EntityMap,
    delta_ms: Real,
) -> Result<usize, BehaviorError> {
    let mut invoked = 0;

    for (key, entity) in entities.iter() {
        let handle = entity.body;
        if world.get_rigid_body(handle).is_none() {
            return Err(BehaviorError::MissingBody(key.to_string()));
        }

        for index in 0..world.behaviors(handle).len() {
            let force = {
                let body = world
                    .get_rigid_body(handle)
                    .ok_or_else(|| BehaviorError::MissingBody(key.to_string()))?;
                let behavior = &world.behaviors(handle)[index];
                let context = BehaviorContext {
                    key,
                    entity,
                    entities,
                    world: &*world,
                };
                behavior
                    .apply(body, delta_ms, &context)
                    .map_err(|source| BehaviorError::Failed {
                        key: key.to_string(),
                        index,
                        source,
                    })?
            };
            invoked += 1;

            let Some(force) = force else {
                continue;
            };
            let source = ForceSource::Behavior {
                entity: key.to_string(),
                index,
            };
            world
                .apply_force_from(handle, force, source)
                .map_err(|_| BehaviorError::MissingBody(key.to_string()))?;
        }
    }

    log::trace!("Behavior pass ran {} behaviors", invoked);
    Ok(invoked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::behavior::{Behavior, BehaviorFailure, BodyBehavior, GravityWell};
    use crate::engine::entity::{Entity, Visual};
    use crate::engine::physics::body::{presets, BodyBuilder};
    use crate::engine::physics::{Force, RigidBody, RigidBodyHandle};
    use approx::assert_abs_diff_eq;
    use glam::Vec2;
    use rapier2d::prelude::{nalgebra, vector, ColliderBuilder};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    /// Records each call as "entity:label"
    #[derive(Debug)]
    struct Recorder {
        label: &'static str,
        log: Log,
    }

    impl BodyBehavior for Recorder {
        fn apply(
            &self,
            _body: &RigidBody,
            _delta_ms: Real,
            context: &BehaviorContext<'_>,
        ) -> Result<Option<Force>, BehaviorFailure> {
            self.log
                .borrow_mut()
                .push(format!("{}:{}", context.key, self.label));
            Ok(None)
        }
    }

    #[derive(Debug)]
    struct Failing;

    impl BodyBehavior for Failing {
        fn apply(
            &self,
            _body: &RigidBody,
            _delta_ms: Real,
            _context: &BehaviorContext<'_>,
        ) -> Result<Option<Force>, BehaviorFailure> {
            Err(BehaviorFailure::new("boom"))
        }
    }

    /// Pushes with a constant force and records the accumulator it saw
    #[derive(Debug)]
    struct Pusher {
        push: Vec2,
        seen: Rc<RefCell<Vec<f32>>>,
    }

    impl BodyBehavior for Pusher {
        fn apply(
            &self,
            body: &RigidBody,
            _delta_ms: Real,
            _context: &BehaviorContext<'_>,
        ) -> Result<Option<Force>, BehaviorFailure> {
            self.seen.borrow_mut().push(body.user_force().x);
            let position = Vec2::new(body.translation().x, body.translation().y);
            Ok(Some(Force::new(position, self.push)))
        }
    }

    fn spawn(world: &mut PhysicsWorld, entities: &mut EntityMap, key: &str, x: f32, y: f32) -> RigidBodyHandle {
        let handle = world.add_rigid_body(presets::ball_body(x, y));
        world.add_collider(presets::ball_collider(1.0), handle);
        entities.insert(key, Entity::new(handle, Visual::circle(1.0)));
        handle
    }

    fn recorder(label: &'static str, log: &Log) -> Behavior {
        Behavior::custom(Recorder {
            label,
            log: Rc::clone(log),
        })
    }

    #[test]
    fn test_runs_in_entity_then_list_order() {
        let mut world = PhysicsWorld::new();
        let mut entities = EntityMap::new();
        let log: Log = Rc::default();

        let paddle = spawn(&mut world, &mut entities, "paddle", 0.0, 0.0);
        let ball = spawn(&mut world, &mut entities, "ball", 5.0, 0.0);
        world.attach_behavior(paddle, recorder("first", &log)).unwrap();
        world.attach_behavior(paddle, recorder("second", &log)).unwrap();
        world.attach_behavior(ball, recorder("only", &log)).unwrap();

        let invoked = run(&mut world, &entities, 16.0).unwrap();

        assert_eq!(invoked, 3);
        assert_eq!(
            *log.borrow(),
            ["paddle:first", "paddle:second", "ball:only"]
        );
    }

    #[test]
    fn test_same_behavior_twice_runs_twice_per_tick() {
        let mut world = PhysicsWorld::new();
        let mut entities = EntityMap::new();
        let log: Log = Rc::default();

        let ball = spawn(&mut world, &mut entities, "ball", 0.0, 0.0);
        world.attach_behavior(ball, recorder("tick", &log)).unwrap();
        world.attach_behavior(ball, recorder("tick", &log)).unwrap();

        run(&mut world, &entities, 16.0).unwrap();
        run(&mut world, &entities, 16.0).unwrap();

        assert_eq!(log.borrow().len(), 4);
        assert!(log.borrow().iter().all(|entry| entry == "ball:tick"));
    }

    #[test]
    fn test_failure_aborts_later_entities() {
        let mut world = PhysicsWorld::new();
        let mut entities = EntityMap::new();
        let log: Log = Rc::default();

        let first = spawn(&mut world, &mut entities, "first", 0.0, 0.0);
        let broken = spawn(&mut world, &mut entities, "broken", 5.0, 0.0);
        let last = spawn(&mut world, &mut entities, "last", 10.0, 0.0);
        world.attach_behavior(first, recorder("ran", &log)).unwrap();
        world.attach_behavior(broken, Behavior::custom(Failing)).unwrap();
        world.attach_behavior(broken, recorder("after-failure", &log)).unwrap();
        world.attach_behavior(last, recorder("ran", &log)).unwrap();

        let err = run(&mut world, &entities, 16.0).unwrap_err();

        match err {
            BehaviorError::Failed { key, index, source } => {
                assert_eq!(key, "broken");
                assert_eq!(index, 0);
                assert_eq!(source, BehaviorFailure::new("boom"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(*log.borrow(), ["first:ran"]);
    }

    #[test]
    fn test_forces_applied_before_failure_are_kept() {
        let mut world = PhysicsWorld::new();
        let mut entities = EntityMap::new();
        let seen = Rc::default();

        let first = spawn(&mut world, &mut entities, "first", 0.0, 0.0);
        let broken = spawn(&mut world, &mut entities, "broken", 5.0, 0.0);
        world
            .attach_behavior(first, Behavior::custom(Pusher { push: Vec2::X, seen }))
            .unwrap();
        world.attach_behavior(broken, Behavior::custom(Failing)).unwrap();

        assert!(run(&mut world, &entities, 16.0).is_err());
        assert_abs_diff_eq!(world.get_rigid_body(first).unwrap().user_force().x, 1.0);
    }

    #[test]
    fn test_later_behaviors_see_earlier_forces() {
        let mut world = PhysicsWorld::new();
        let mut entities = EntityMap::new();
        let seen: Rc<RefCell<Vec<f32>>> = Rc::default();

        let ball = spawn(&mut world, &mut entities, "ball", 0.0, 0.0);
        for _ in 0..3 {
            let pusher = Pusher {
                push: Vec2::new(2.0, 0.0),
                seen: Rc::clone(&seen),
            };
            world.attach_behavior(ball, Behavior::custom(pusher)).unwrap();
        }

        run(&mut world, &entities, 16.0).unwrap();

        assert_eq!(*seen.borrow(), [0.0f32, 2.0, 4.0]);
    }

    #[test]
    fn test_entities_without_behaviors_are_skipped() {
        let mut world = PhysicsWorld::new();
        let mut entities = EntityMap::new();
        spawn(&mut world, &mut entities, "wall", 0.0, 0.0);

        assert_eq!(run(&mut world, &entities, 16.0).unwrap(), 0);
    }

    #[test]
    fn test_gravity_well_applies_expected_force() {
        let mut world = PhysicsWorld::new();
        let mut entities = EntityMap::new();
        world.set_force_tracing(true);

        let ball = spawn(&mut world, &mut entities, "ball", 10.0, 0.0);
        world
            .attach_behavior(ball, GravityWell::new(Vec2::ZERO, 1.0, 200.0))
            .unwrap();

        run(&mut world, &entities, 16.0).unwrap();

        let force = world.get_rigid_body(ball).unwrap().user_force();
        assert_abs_diff_eq!(force.x, -0.01, epsilon = 1e-6);
        assert_abs_diff_eq!(force.y, 0.0, epsilon = 1e-6);

        let events = world.force_events();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].source,
            ForceSource::Behavior {
                entity: "ball".to_string(),
                index: 0
            }
        );
    }

    #[test]
    fn test_gravity_well_out_of_range_and_at_center() {
        let mut world = PhysicsWorld::new();
        let mut entities = EntityMap::new();

        let far = spawn(&mut world, &mut entities, "far", 300.0, 0.0);
        let centered = spawn(&mut world, &mut entities, "centered", 0.0, 0.0);
        let well = GravityWell::new(Vec2::ZERO, 1.0, 200.0);
        world.attach_behavior(far, well).unwrap();
        world.attach_behavior(centered, well).unwrap();

        assert_eq!(run(&mut world, &entities, 16.0).unwrap(), 2);
        assert_eq!(world.get_rigid_body(far).unwrap().user_force().x, 0.0);
        assert_eq!(world.get_rigid_body(centered).unwrap().user_force().x, 0.0);
    }

    #[test]
    fn test_removed_body_is_reported_missing() {
        let mut world = PhysicsWorld::new();
        let mut entities = EntityMap::new();
        let log: Log = Rc::default();

        let before = spawn(&mut world, &mut entities, "before", 0.0, 0.0);
        let ghost = spawn(&mut world, &mut entities, "ghost", 5.0, 0.0);
        let after = spawn(&mut world, &mut entities, "after", 10.0, 0.0);
        world.attach_behavior(before, recorder("ran", &log)).unwrap();
        world
            .attach_behavior(ghost, GravityWell::new(Vec2::ZERO, 1.0, 200.0))
            .unwrap();
        world.attach_behavior(after, recorder("ran", &log)).unwrap();
        world.remove_rigid_body(ghost);

        let result = run(&mut world, &entities, 16.0);
        assert!(matches!(result, Err(BehaviorError::MissingBody(key)) if key == "ghost"));
        assert_eq!(*log.borrow(), ["before:ran"]);
    }

    #[test]
    fn test_gravity_well_pulls_at_center_of_mass() {
        let mut world = PhysicsWorld::new();
        let mut entities = EntityMap::new();
        world.set_force_tracing(true);

        // Body origin at (8, 0), collider shifted so the center of mass is at (10, 0)
        let body = world.add_rigid_body(BodyBuilder::new_dynamic().position(8.0, 0.0).build());
        let collider = ColliderBuilder::ball(0.5)
            .translation(vector![2.0, 0.0])
            .mass(1.0)
            .build();
        world.add_collider(collider, body);
        entities.insert("offset", Entity::new(body, Visual::circle(1.0)));
        world
            .attach_behavior(body, GravityWell::new(Vec2::ZERO, 1.0, 200.0))
            .unwrap();

        run(&mut world, &entities, 16.0).unwrap();

        let events = world.force_events();
        assert_eq!(events.len(), 1);
        assert_abs_diff_eq!(events[0].force.point.x, 10.0, epsilon = 1e-5);
        assert_abs_diff_eq!(events[0].force.vector.x, -0.01, epsilon = 1e-6);
        let rigid_body = world.get_rigid_body(body).unwrap();
        assert_abs_diff_eq!(rigid_body.user_torque(), 0.0, epsilon = 1e-7);
    }
}
