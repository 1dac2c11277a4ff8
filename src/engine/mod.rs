// Engine modules: physics, behaviors, entities, frame driver

pub mod behavior;
pub mod config;
pub mod entity;
pub mod frame_loop;
pub mod physics;
