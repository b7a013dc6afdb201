use std::path::Path;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

pub(crate) mod sim;

use self::sim::{load_level_file, parse_level_json, LevelError, PipeNetworkError, World, WorldError};

#[derive(Debug, Error)]
pub(crate) enum DemoError {
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error(transparent)]
    World(#[from] WorldError),
    #[error(transparent)]
    Network(#[from] PipeNetworkError),
}

pub(crate) fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

/// Built-in demo map: a floor, a one-way ledge, and a four-pipe run with a
/// gold endpoint at each end. Breaking any middle pipe opens the circuit.
pub(crate) const DEMO_LEVEL_JSON: &str = r#"{
    "name": "demo",
    "width": 10,
    "height": 8,
    "tile_size": 70.0,
    "tiles": [
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 2, 2, 2, 0, 0, 0,
        0, 0, 3, 4, 4, 4, 4, 3, 0, 0,
        1, 1, 1, 1, 1, 1, 1, 1, 1, 1
    ],
    "catalog": {
        "solid_tiles": [1],
        "one_way_tiles": [2],
        "pipe_tiles": [
            { "id": 3, "kind": "gold", "opening_a": [-1, 0], "opening_b": [1, 0] },
            { "id": 4, "kind": "normal", "opening_a": [-1, 0], "opening_b": [1, 0] }
        ]
    },
    "player_spawn": [80.0, 330.0],
    "spawners": [
        { "position": [560.0, 340.0], "period": 3.0, "limit": 3 }
    ]
}"#;

pub(crate) fn build_demo_world() -> Result<World, DemoError> {
    let level = parse_level_json(DEMO_LEVEL_JSON)?;
    let world = World::from_level(&level)?;
    Ok(world)
}

/// First CLI argument, when present, is a level file to load instead of the
/// built-in demo map.
pub(crate) fn build_world_from_args() -> Result<World, DemoError> {
    match std::env::args().nth(1) {
        Some(path) => {
            let level = load_level_file(Path::new(&path))?;
            Ok(World::from_level(&level)?)
        }
        None => build_demo_world(),
    }
}
