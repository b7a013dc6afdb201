/// Per-tick control intent, injected by the caller; how keys map to intent
/// is the input layer's business, not the simulation's.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct InputIntent {
    pub(crate) left: bool,
    pub(crate) right: bool,
    pub(crate) jump: bool,
    pub(crate) fall_through: bool,
    pub(crate) fire: bool,
    pub(crate) pickup: bool,
    /// World position the pickup/repair cursor points at.
    pub(crate) aim: Vec2,
}

/// Mutable context the player's state hooks run against: everything the
/// behavior needs except the machine itself.
#[derive(Debug)]
pub(crate) struct PlayerCore {
    pub(crate) body: Body,
    pub(crate) input: InputIntent,
    pub(crate) walk_speed: f32,
    pub(crate) jump_speed: f32,
    pub(crate) hurt_timer: f32,
    pub(crate) fire_cooldown: f32,
}

impl PlayerCore {
    fn walk_direction(&self) -> Option<Facing> {
        match (self.input.left, self.input.right) {
            (true, false) => Some(Facing::Left),
            (false, true) => Some(Facing::Right),
            _ => None,
        }
    }
}

pub(crate) struct Player {
    pub(crate) core: PlayerCore,
    machine: StateMachine<ActorState, PlayerCore>,
    #[allow(dead_code)]
    pub(crate) layer: DrawLayer,
}

impl Player {
    pub(crate) fn new(position: Vec2) -> Result<Self, StateMachineError> {
        let core = PlayerCore {
            body: Body::new(Rect::new(0.0, 0.0, PLAYER_WIDTH, PLAYER_HEIGHT)),
            input: InputIntent::default(),
            walk_speed: PLAYER_WALK_SPEED,
            jump_speed: PLAYER_JUMP_SPEED,
            hurt_timer: 0.0,
            fire_cooldown: 0.0,
        };
        let mut player = Self {
            core,
            machine: StateMachine::new(),
            layer: DrawLayer::Front,
        };
        player.core.body.set_position(position);

        player.machine.add(
            ActorState::Idle,
            StateHooks::new()
                .with_enter(|core: &mut PlayerCore| core.body.velocity.x = 0.0)
                .with_update(|core, _dt| {
                    if core.input.jump && core.body.grounded() {
                        return Some(ActorState::Jump);
                    }
                    core.walk_direction().map(|_| ActorState::Walk)
                }),
        )?;
        player.machine.add(
            ActorState::Walk,
            StateHooks::new().with_update(|core: &mut PlayerCore, _dt| {
                if core.input.jump && core.body.grounded() {
                    return Some(ActorState::Jump);
                }
                match core.walk_direction() {
                    Some(facing) => {
                        core.body.facing = facing;
                        core.body.velocity.x = facing.sign() * core.walk_speed;
                        None
                    }
                    None => Some(ActorState::Idle),
                }
            }),
        )?;
        player.machine.add(
            ActorState::Jump,
            StateHooks::new()
                .with_enter(|core: &mut PlayerCore| core.body.velocity.y = -core.jump_speed)
                .with_update(|core, _dt| {
                    // Air control only; landing is resolved by the collision
                    // events, not by the state itself.
                    if let Some(facing) = core.walk_direction() {
                        core.body.facing = facing;
                        core.body.velocity.x = facing.sign() * core.walk_speed;
                    }
                    None
                }),
        )?;
        player.machine.add(
            ActorState::Hurt,
            StateHooks::new()
                .with_enter(|core: &mut PlayerCore| {
                    core.hurt_timer = PLAYER_HURT_SECONDS;
                    core.body.velocity.x = -core.body.facing.sign() * PLAYER_KNOCKBACK_SPEED;
                })
                .with_update(|core, dt| {
                    core.hurt_timer -= dt;
                    (core.hurt_timer <= 0.0).then_some(ActorState::Idle)
                }),
        )?;
        player.machine.request(ActorState::Idle)?;
        Ok(player)
    }

    pub(crate) fn state(&self) -> Option<ActorState> {
        self.machine.active()
    }

    pub(crate) fn bounds(&self) -> Rect {
        self.core.body.bounds()
    }

    pub(crate) fn update(
        &mut self,
        dt: f32,
        input: InputIntent,
        solids: &SpatialIndex<Collider>,
        physics: &PhysicsConfig,
    ) -> Result<StepEvents, StateMachineError> {
        self.core.input = input;
        if input.fall_through {
            self.core.body.request_fall_through();
        }

        let events = self.core.body.step(solids, physics);
        if events.vertical == Some(1) && self.machine.active() == Some(ActorState::Jump) {
            self.machine.request(ActorState::Idle)?;
        }

        self.machine.tick(&mut self.core, dt)?;
        self.core.fire_cooldown = (self.core.fire_cooldown - dt).max(0.0);
        Ok(events)
    }

    /// Consumes the fire cooldown and yields a muzzle position + direction
    /// when a shot should spawn this tick.
    pub(crate) fn try_fire(&mut self) -> Option<(Vec2, Vec2)> {
        if !self.core.input.fire || self.core.fire_cooldown > 0.0 {
            return None;
        }
        self.core.fire_cooldown = LASER_COOLDOWN_SECONDS;
        let origin = self.core.body.bounds().center();
        let direction = Vec2::new(self.core.body.facing.sign(), 0.0);
        Some((origin, direction))
    }

    pub(crate) fn hurt(&mut self) -> Result<(), StateMachineError> {
        if self.machine.active() == Some(ActorState::Hurt) {
            return Ok(());
        }
        self.machine.request(ActorState::Hurt)
    }
}

#[derive(Debug)]
pub(crate) struct SlimeCore {
    pub(crate) body: Body,
    pub(crate) walk_speed: f32,
}

/// Patrolling enemy: walks along its facing and reverses when it runs into
/// a wall.
pub(crate) struct Slime {
    pub(crate) core: SlimeCore,
    machine: StateMachine<ActorState, SlimeCore>,
    #[allow(dead_code)]
    pub(crate) layer: DrawLayer,
}

impl Slime {
    pub(crate) fn new(position: Vec2) -> Result<Self, StateMachineError> {
        let core = SlimeCore {
            body: Body::new(Rect::new(0.0, 0.0, SLIME_WIDTH, SLIME_HEIGHT)),
            walk_speed: SLIME_WALK_SPEED,
        };
        let mut slime = Self {
            core,
            machine: StateMachine::new(),
            layer: DrawLayer::Front,
        };
        slime.core.body.set_position(position);
        slime.core.body.facing = Facing::Left;

        slime.machine.add(
            ActorState::Walk,
            StateHooks::new().with_update(|core: &mut SlimeCore, _dt| {
                core.body.velocity.x = core.body.facing.sign() * core.walk_speed;
                None
            }),
        )?;
        slime.machine.add(ActorState::Idle, StateHooks::new())?;
        slime.machine.add(ActorState::Jump, StateHooks::new())?;
        slime.machine.add(ActorState::Hurt, StateHooks::new())?;
        slime.machine.request(ActorState::Walk)?;
        Ok(slime)
    }

    pub(crate) fn bounds(&self) -> Rect {
        self.core.body.bounds()
    }

    pub(crate) fn update(
        &mut self,
        dt: f32,
        solids: &SpatialIndex<Collider>,
        physics: &PhysicsConfig,
    ) -> Result<(), StateMachineError> {
        let events = self.core.body.step(solids, physics);
        if let Some(direction) = events.horizontal {
            let facing = self.core.body.facing;
            if (direction == -1 && facing == Facing::Left)
                || (direction == 1 && facing == Facing::Right)
            {
                self.core.body.facing = facing.flipped();
            }
        }
        self.machine.tick(&mut self.core, dt)?;
        Ok(())
    }
}

/// Straight-flying projectile; the world removes it on impact.
#[derive(Debug, Clone)]
pub(crate) struct Laser {
    pub(crate) transform: Transform,
    pub(crate) direction: Vec2,
    #[allow(dead_code)]
    pub(crate) layer: DrawLayer,
}

impl Laser {
    pub(crate) fn new(position: Vec2, direction: Vec2) -> Self {
        Self {
            transform: Transform::at(position),
            direction: direction.normalized_or_zero(),
            layer: DrawLayer::Front,
        }
    }

    pub(crate) fn advance(&mut self) {
        self.transform.position += self.direction * LASER_SPEED;
    }

    pub(crate) fn hit_shape(&self) -> Shape {
        Shape::Circle {
            center: self.transform.position,
            radius: LASER_HIT_RADIUS,
        }
    }
}

/// Timed enemy source: releases up to `limit` slimes, one per period.
#[derive(Debug, Clone)]
pub(crate) struct Spawner {
    pub(crate) transform: Transform,
    period: f32,
    limit: u32,
    spawned: u32,
    timer: f32,
}

impl Spawner {
    pub(crate) fn new(position: Vec2, period: f32, limit: u32) -> Self {
        Self {
            transform: Transform::at(position),
            period,
            limit,
            spawned: 0,
            timer: 0.0,
        }
    }

    /// Returns true when a new enemy should be scheduled this tick.
    pub(crate) fn update(&mut self, dt: f32) -> bool {
        self.timer -= dt;
        if self.timer > 0.0 {
            return false;
        }
        self.timer = self.period;
        if self.spawned < self.limit {
            self.spawned += 1;
            true
        } else {
            false
        }
    }
}
