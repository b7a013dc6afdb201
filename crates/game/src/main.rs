use engine::Vec2;
use tracing::{debug, error, info};

mod app;

use crate::app::sim::InputIntent;

const FIXED_DT_SECONDS: f32 = 1.0 / 60.0;
const DEMO_TICKS: u32 = 600;
// Middle of the demo map's pipe run.
const DEMO_TARGET_PIPE: Vec2 = Vec2 { x: 315.0, y: 455.0 };

fn main() {
    app::init_tracing();
    info!("=== Pipeworks Sim Startup ===");

    if let Err(err) = run_demo() {
        error!(error = %err, "startup_failed");
        std::process::exit(1);
    }
}

/// Headless fixed-step run with scripted input: walk right, hop onto the
/// ledge, fire a few shots, then break and repair one pipe in the run.
fn run_demo() -> Result<(), app::DemoError> {
    let mut world = app::build_world_from_args()?;
    info!(blocks = world.blocks().len(), "static geometry loaded");

    for tick in 0..DEMO_TICKS {
        let input = InputIntent {
            right: tick < 150,
            jump: tick == 40,
            fire: (300..360).contains(&tick),
            ..InputIntent::default()
        };
        world.update(FIXED_DT_SECONDS, input)?;

        match tick {
            420 => {
                world.damage_pipe_at(DEMO_TARGET_PIPE, 100.0)?;
            }
            480 => {
                world.heal_pipe_at(DEMO_TARGET_PIPE, 100.0)?;
            }
            _ => {}
        }

        if tick % 60 == 0 {
            info!(
                tick,
                enemies = world.enemy_count(),
                lasers = world.laser_count(),
                "sim_tick"
            );
        }
    }

    for pipe in world.network().pipes() {
        let neighbors = world
            .network()
            .connections_of(pipe.id)
            .unwrap_or_default()
            .len();
        debug!(
            pipe = pipe.id.0,
            kind = ?pipe.kind(),
            neighbors,
            functional = pipe.functional,
            "pipe state"
        );
    }
    let functional = world
        .network()
        .pipes()
        .iter()
        .filter(|pipe| pipe.functional)
        .count();
    info!(
        pipes = world.network().len(),
        functional,
        player_state = ?world.player().state(),
        pocket = world.pocket().is_some(),
        "sim_finished"
    );
    Ok(())
}
