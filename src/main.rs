use std::time::Duration;

use anyhow::{Context, Result};
use log::info;

use gravity_sandbox::engine::frame_loop::FrameLoop;
use gravity_sandbox::game::scene;
use gravity_sandbox::{SandboxConfig, Simulation};

/// How long the headless demo runs
const RUN_TIME: Duration = Duration::from_secs(3);

/// Pause between frames, roughly a 120 Hz display
const FRAME_SLEEP: Duration = Duration::from_millis(8);

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    info!("Starting Gravity Sandbox...");

    let config = SandboxConfig::default().with_force_tracing(log::log_enabled!(
        target: "gravity_sandbox::force",
        log::Level::Trace
    ));
    let mut frame_loop = FrameLoop::new(&config).context("Invalid frame timing")?;
    let mut sim = Simulation::new(config).context("Failed to create simulation")?;
    let handles = scene::build_pong(&mut sim).context("Failed to build scene")?;

    let mut last_report = 0;
    while frame_loop.elapsed() < RUN_TIME {
        for _ in 0..frame_loop.begin_frame() {
            sim.tick(frame_loop.timestep_ms())
                .with_context(|| format!("Tick {} failed", sim.ticks()))?;
        }

        let seconds = frame_loop.elapsed().as_secs();
        if seconds > last_report {
            last_report = seconds;
            let world = sim.world();
            info!(
                "t={}s ticks={} ball={:?} paddle={:?}",
                seconds,
                sim.ticks(),
                world.position(handles.ball),
                world.position(handles.paddle)
            );
        }

        std::thread::sleep(FRAME_SLEEP);
    }

    info!(
        "Done: {} frames, {} ticks, {} frames over the step cap",
        frame_loop.frame_count(),
        frame_loop.tick_count(),
        frame_loop.dropped_frames()
    );

    Ok(())
}
