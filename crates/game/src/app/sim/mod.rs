use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::Path;

use engine::{
    ActorState, Body, Collider, DrawLayer, EntityId, EntityIdAllocator, Facing, PhysicsConfig,
    Rect, Registry, RegistryError, Shape, SpatialIndex, StateHooks, StateMachine,
    StateMachineError, StepEvents, Tilemap, TilemapError, Transform, Vec2, EMPTY_TILE,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

const PLAYER_WIDTH: f32 = 48.0;
const PLAYER_HEIGHT: f32 = 64.0;
const PLAYER_WALK_SPEED: f32 = 4.0;
const PLAYER_JUMP_SPEED: f32 = 9.0;
const PLAYER_HURT_SECONDS: f32 = 1.0;
const PLAYER_KNOCKBACK_SPEED: f32 = 3.0;
const SLIME_WIDTH: f32 = 44.0;
const SLIME_HEIGHT: f32 = 30.0;
const SLIME_WALK_SPEED: f32 = 1.0;
const LASER_SPEED: f32 = 12.0;
const LASER_HIT_RADIUS: f32 = 20.0;
const LASER_COOLDOWN_SECONDS: f32 = 0.25;
const LASER_DAMAGE: f32 = 25.0;
const PIPE_MAX_HEALTH: f32 = 100.0;

include!("pipe.rs");
include!("network.rs");
include!("actors.rs");
include!("level.rs");
include!("world.rs");

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
