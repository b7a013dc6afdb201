pub mod body;
pub mod math;
pub mod registry;
pub mod spatial;
pub mod state_machine;
pub mod tilemap;
pub mod transform;

pub use body::{
    ActorState, Body, Collider, Facing, PhysicsConfig, StepEvents, COLLISION_SKIN, GRAVITY_ACCEL,
};
pub use math::{Rect, Shape, Vec2};
pub use registry::{EntityId, EntityIdAllocator, Registry, RegistryError};
pub use spatial::SpatialIndex;
pub use state_machine::{StateHooks, StateMachine, StateMachineError};
pub use tilemap::{Tilemap, TilemapError, EMPTY_TILE};
pub use transform::{DrawLayer, Transform};
