use serde::{Deserialize, Serialize};

use crate::math::{Rect, Vec2};
use crate::registry::EntityId;
use crate::spatial::SpatialIndex;
use crate::transform::Transform;

/// Downward acceleration added to `velocity.y` every tick (y-down screen
/// coordinates, fixed per-tick integration).
pub const GRAVITY_ACCEL: f32 = 0.33;

/// Extra push-out applied on top of the measured penetration so a resting
/// body does not re-penetrate the surface on the next tick.
pub const COLLISION_SKIN: f32 = 0.2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Facing {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

/// Behavioral states shared by every actor; transition policy is per-actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorState {
    Idle,
    Walk,
    Jump,
    Hurt,
}

/// Payload stored in the solids index: enough for the resolver to apply the
/// one-way rule without chasing the owning entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collider {
    pub id: EntityId,
    pub one_way: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub terminal_velocity: Option<f32>,
    pub skin: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY_ACCEL,
            terminal_velocity: None,
            skin: COLLISION_SKIN,
        }
    }
}

/// Directional collision report for one step. `vertical` is +1 when the body
/// landed on something (moving down) and -1 when it hit a ceiling;
/// `horizontal` is +1 for a wall on the right, -1 for a wall on the left.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepEvents {
    pub vertical: Option<i32>,
    pub horizontal: Option<i32>,
}

/// Physically simulated axis-aligned body. World bounds are re-derived after
/// every position mutation, so they are never stale when the resolver or an
/// outside query reads them.
#[derive(Debug, Clone)]
pub struct Body {
    transform: Transform,
    local_bounds: Rect,
    bounds: Rect,
    pub velocity: Vec2,
    pub facing: Facing,
    fall_through: bool,
    grounded: bool,
}

impl Body {
    pub fn new(local_bounds: Rect) -> Self {
        let mut body = Self {
            transform: Transform::default(),
            local_bounds,
            bounds: local_bounds,
            velocity: Vec2::ZERO,
            facing: Facing::default(),
            fall_through: false,
            grounded: false,
        };
        body.recompute_bounds();
        body
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn position(&self) -> Vec2 {
        self.transform.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.transform.position = position;
        self.recompute_bounds();
    }

    pub fn translate(&mut self, offset: Vec2) {
        self.transform.position += offset;
        self.recompute_bounds();
    }

    pub fn local_bounds(&self) -> Rect {
        self.local_bounds
    }

    pub fn set_local_bounds(&mut self, local_bounds: Rect) {
        self.local_bounds = local_bounds;
        self.recompute_bounds();
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn grounded(&self) -> bool {
        self.grounded
    }

    /// Signals fall-through intent for the current tick: one-way platforms
    /// will not resolve against this body until the next `step` completes.
    pub fn request_fall_through(&mut self) {
        self.fall_through = true;
    }

    fn recompute_bounds(&mut self) {
        self.bounds = self.local_bounds.translated(self.transform.position);
    }

    /// One fixed-order physics tick: gravity, vertical resolution, horizontal
    /// resolution. Finding no colliders is not an error; the body just keeps
    /// moving.
    pub fn step(&mut self, solids: &SpatialIndex<Collider>, config: &PhysicsConfig) -> StepEvents {
        let mut events = StepEvents::default();
        self.grounded = false;

        self.velocity.y += config.gravity;
        if let Some(limit) = config.terminal_velocity {
            if self.velocity.y > limit {
                self.velocity.y = limit;
            }
        }

        // Vertical phase.
        let dy = self.velocity.y;
        if dy != 0.0 {
            self.transform.position.y += dy;
            self.recompute_bounds();
            let falling = dy > 0.0;

            let mut deepest: Option<f32> = None;
            for (collider, collider_bounds) in solids.query_rect(self.bounds) {
                if collider.one_way && (!falling || self.fall_through) {
                    continue;
                }
                let penetration = if falling {
                    self.bounds.bottom() - collider_bounds.top()
                } else {
                    collider_bounds.bottom() - self.bounds.top()
                };
                if penetration > 0.0 && deepest.map_or(true, |best| penetration > best) {
                    deepest = Some(penetration);
                }
            }

            if let Some(penetration) = deepest {
                let push = penetration + config.skin;
                if falling {
                    self.transform.position.y -= push;
                    self.grounded = true;
                    events.vertical = Some(1);
                } else {
                    self.transform.position.y += push;
                    events.vertical = Some(-1);
                }
                self.recompute_bounds();
                self.velocity.y = 0.0;
            }
        }

        // Horizontal phase. One-way platforms never block sideways motion.
        let dx = self.velocity.x;
        if dx != 0.0 {
            self.transform.position.x += dx;
            self.recompute_bounds();
            let moving_right = dx > 0.0;

            let mut deepest: Option<f32> = None;
            for (collider, collider_bounds) in solids.query_rect(self.bounds) {
                if collider.one_way {
                    continue;
                }
                let penetration = if moving_right {
                    self.bounds.right() - collider_bounds.left()
                } else {
                    collider_bounds.right() - self.bounds.left()
                };
                if penetration > 0.0 && deepest.map_or(true, |best| penetration > best) {
                    deepest = Some(penetration);
                }
            }

            if let Some(penetration) = deepest {
                let push = penetration + config.skin;
                if moving_right {
                    self.transform.position.x -= push;
                    events.horizontal = Some(1);
                } else {
                    self.transform.position.x += push;
                    events.horizontal = Some(-1);
                }
                self.recompute_bounds();
                self.velocity.x = 0.0;
            }
        }

        self.fall_through = false;
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(id: u64, bounds: Rect) -> (Collider, Rect) {
        (
            Collider {
                id: EntityId(id),
                one_way: false,
            },
            bounds,
        )
    }

    fn one_way(id: u64, bounds: Rect) -> (Collider, Rect) {
        (
            Collider {
                id: EntityId(id),
                one_way: true,
            },
            bounds,
        )
    }

    fn index_of(items: &[(Collider, Rect)]) -> SpatialIndex<Collider> {
        let mut index = SpatialIndex::new();
        for (collider, bounds) in items {
            index.insert(*collider, *bounds);
        }
        index
    }

    fn test_body(position: Vec2) -> Body {
        let mut body = Body::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        body.set_position(position);
        body
    }

    #[test]
    fn velocity_grows_by_gravity_every_tick_in_free_fall() {
        let empty = SpatialIndex::new();
        let config = PhysicsConfig::default();
        let mut body = test_body(Vec2::new(0.0, 0.0));

        let mut expected = 0.0f32;
        for _ in 0..10 {
            let previous = body.velocity.y;
            body.step(&empty, &config);
            expected += config.gravity;
            assert!(body.velocity.y > previous);
            assert!((body.velocity.y - expected).abs() < 1e-4);
        }
    }

    #[test]
    fn terminal_velocity_clamps_fall_speed() {
        let empty = SpatialIndex::new();
        let config = PhysicsConfig {
            terminal_velocity: Some(1.0),
            ..PhysicsConfig::default()
        };
        let mut body = test_body(Vec2::new(0.0, 0.0));
        for _ in 0..20 {
            body.step(&empty, &config);
        }
        assert_eq!(body.velocity.y, 1.0);
    }

    #[test]
    fn dropped_body_comes_to_rest_on_block_top_without_jitter() {
        let ground_top = 100.0;
        let solids = index_of(&[solid(1, Rect::new(0.0, ground_top, 200.0, 50.0))]);
        let config = PhysicsConfig::default();
        let mut body = test_body(Vec2::new(50.0, 50.0));

        for _ in 0..300 {
            body.step(&solids, &config);
        }
        assert_eq!(body.velocity.y, 0.0);
        assert!(body.grounded());
        assert!((body.bounds().bottom() - ground_top).abs() <= config.skin + 0.05);

        // Settled: the bottom edge must stay put tick after tick.
        let settled_bottom = body.bounds().bottom();
        for _ in 0..10 {
            body.step(&solids, &config);
            assert_eq!(body.velocity.y, 0.0);
            assert!((body.bounds().bottom() - settled_bottom).abs() <= 1e-4);
        }
    }

    #[test]
    fn rising_body_passes_through_one_way_platform() {
        let solids = index_of(&[one_way(1, Rect::new(0.0, 100.0, 100.0, 10.0))]);
        let config = PhysicsConfig::default();
        let mut body = test_body(Vec2::new(45.0, 104.0));
        body.velocity.y = -5.0;

        let events = body.step(&solids, &config);
        assert_eq!(events.vertical, None);
        assert!(body.position().y < 104.0);
    }

    #[test]
    fn falling_body_lands_on_one_way_platform() {
        let platform_top = 100.0;
        let solids = index_of(&[one_way(1, Rect::new(0.0, platform_top, 100.0, 10.0))]);
        let config = PhysicsConfig::default();
        let mut body = test_body(Vec2::new(45.0, 60.0));

        let mut landed = false;
        for _ in 0..200 {
            let events = body.step(&solids, &config);
            if events.vertical == Some(1) {
                landed = true;
                break;
            }
        }
        assert!(landed);
        assert_eq!(body.velocity.y, 0.0);
        assert!((body.bounds().bottom() - platform_top).abs() <= config.skin + 0.05);
    }

    #[test]
    fn fall_through_intent_skips_one_way_resolution_for_one_tick() {
        let solids = index_of(&[one_way(1, Rect::new(0.0, 100.0, 100.0, 10.0))]);
        let config = PhysicsConfig::default();
        let mut body = test_body(Vec2::new(45.0, 89.8));

        // Without intent the body rests on the platform.
        let events = body.step(&solids, &config);
        assert_eq!(events.vertical, Some(1));

        body.request_fall_through();
        body.velocity.y = 2.0;
        let events = body.step(&solids, &config);
        assert_eq!(events.vertical, None);
        assert!(body.velocity.y > 0.0);

        // Intent is consumed: the next falling step resolves again.
        let mut recaught = false;
        for _ in 0..20 {
            if body.step(&solids, &config).vertical == Some(1) {
                recaught = true;
                break;
            }
        }
        assert!(recaught);
    }

    #[test]
    fn ceiling_hit_pushes_down_and_reports_negative_direction() {
        let solids = index_of(&[solid(1, Rect::new(0.0, 0.0, 100.0, 10.0))]);
        let config = PhysicsConfig::default();
        let mut body = test_body(Vec2::new(45.0, 12.0));
        body.velocity.y = -5.0;

        let events = body.step(&solids, &config);
        assert_eq!(events.vertical, Some(-1));
        assert_eq!(body.velocity.y, 0.0);
        assert!(body.bounds().top() >= 10.0);
    }

    #[test]
    fn wall_on_the_right_stops_horizontal_motion() {
        let solids = index_of(&[solid(1, Rect::new(100.0, 0.0, 20.0, 200.0))]);
        let config = PhysicsConfig::default();
        let mut body = test_body(Vec2::new(80.0, 50.0));
        body.velocity = Vec2::new(15.0, 0.0);

        let events = body.step(&solids, &config);
        assert_eq!(events.horizontal, Some(1));
        assert_eq!(body.velocity.x, 0.0);
        assert!(body.bounds().right() <= 100.0);
    }

    #[test]
    fn one_way_platform_never_blocks_horizontal_motion() {
        let solids = index_of(&[one_way(1, Rect::new(100.0, 0.0, 20.0, 200.0))]);
        let config = PhysicsConfig::default();
        let mut body = test_body(Vec2::new(80.0, 50.0));
        body.velocity = Vec2::new(15.0, 0.0);

        let events = body.step(&solids, &config);
        assert_eq!(events.horizontal, None);
        assert!(body.position().x > 90.0);
    }

    #[test]
    fn bounds_track_position_mutations() {
        let mut body = test_body(Vec2::new(5.0, 6.0));
        assert_eq!(body.bounds().position(), Vec2::new(5.0, 6.0));
        body.translate(Vec2::new(1.0, -1.0));
        assert_eq!(body.bounds().position(), Vec2::new(6.0, 5.0));
    }
}
