#[derive(Debug, Error)]
pub(crate) enum WorldError {
    #[error(transparent)]
    StateMachine(#[from] StateMachineError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Network(#[from] PipeNetworkError),
    #[error(transparent)]
    Tilemap(#[from] TilemapError),
    #[error("tile id {id} at cell ({x}, {y}) is not in the level catalog")]
    UnknownTile { id: u16, x: u32, y: u32 },
}

/// Owns every simulated entity and drives one fixed-step tick at a time.
pub(crate) struct World {
    allocator: EntityIdAllocator,
    physics: PhysicsConfig,
    tilemap: Tilemap,
    solids: SpatialIndex<Collider>,
    pipe_lookup: SpatialIndex<EntityId>,
    blocks: Vec<Block>,
    network: PipeNetwork,
    pocket: Option<Pipe>,
    player: Player,
    enemies: Registry<Slime>,
    lasers: Registry<Laser>,
    spawners: Vec<Spawner>,
}

impl World {
    pub(crate) fn from_level(level: &LevelFile) -> Result<Self, WorldError> {
        let mut allocator = EntityIdAllocator::default();
        let tilemap = Tilemap::new(
            level.width,
            level.height,
            Vec2::ZERO,
            level.tile_size,
            level.tiles.clone(),
        )?;

        let mut solids = SpatialIndex::new();
        let mut pipe_lookup = SpatialIndex::new();
        let mut blocks = Vec::new();
        let mut network = PipeNetwork::new();

        for cell_y in 0..level.height {
            for cell_x in 0..level.width {
                let Some(tile) = tilemap.tile_at(cell_x, cell_y) else {
                    continue;
                };
                if tile == EMPTY_TILE {
                    continue;
                }
                let Some(position) = tilemap.tile_origin_world(cell_x, cell_y) else {
                    continue;
                };
                let cell_bounds = Rect::new(0.0, 0.0, level.tile_size, level.tile_size);
                match level.catalog.role_of(tile) {
                    Some(TileRole::Solid) | Some(TileRole::OneWay) => {
                        let one_way = level.catalog.role_of(tile) == Some(TileRole::OneWay);
                        let id = allocator.allocate();
                        let bounds = cell_bounds.translated(position);
                        solids.insert(Collider { id, one_way }, bounds);
                        blocks.push(Block {
                            id,
                            bounds,
                            one_way,
                            layer: DrawLayer::Back,
                        });
                    }
                    Some(TileRole::Pipe(def)) => {
                        let id = allocator.allocate();
                        let half = level.tile_size * 0.5;
                        let offsets = [def.opening_a, def.opening_b].map(|[dx, dy]| {
                            Vec2::new(
                                dx as f32 * level.tile_size + half,
                                dy as f32 * level.tile_size + half,
                            )
                        });
                        let pipe = Pipe::new(
                            id,
                            position,
                            cell_bounds,
                            offsets,
                            def.kind.to_kind(),
                            PIPE_MAX_HEALTH,
                        );
                        pipe_lookup.insert(id, pipe.bounds());
                        network.add(pipe);
                    }
                    None => {
                        return Err(WorldError::UnknownTile {
                            id: tile,
                            x: cell_x,
                            y: cell_y,
                        });
                    }
                }
            }
        }

        let player = Player::new(Vec2::new(level.player_spawn[0], level.player_spawn[1]))?;
        let spawners = level
            .spawners
            .iter()
            .map(|def| Spawner::new(Vec2::new(def.position[0], def.position[1]), def.period, def.limit))
            .collect();

        let mut world = Self {
            allocator,
            physics: PhysicsConfig::default(),
            tilemap,
            solids,
            pipe_lookup,
            blocks,
            network,
            pocket: None,
            player,
            enemies: Registry::new(),
            lasers: Registry::new(),
            spawners,
        };
        world.network.evaluate()?;
        info!(
            level = level.name.as_str(),
            blocks = world.blocks.len(),
            pipes = world.network.len(),
            spawners = world.spawners.len(),
            "world built"
        );
        Ok(world)
    }

    pub(crate) fn update(&mut self, dt: f32, input: InputIntent) -> Result<(), WorldError> {
        self.enemies.apply_pending();
        self.lasers.apply_pending();

        self.player.update(dt, input, &self.solids, &self.physics)?;
        if input.pickup {
            self.pickup_at(input.aim)?;
        }
        if let Some((origin, direction)) = self.player.try_fire() {
            let id = self.allocator.allocate();
            self.lasers.schedule_add(id, Laser::new(origin, direction))?;
        }

        for (_, slime) in self.enemies.iter_mut() {
            slime.update(dt, &self.solids, &self.physics)?;
        }

        for id in self.lasers.ids() {
            let Some(laser) = self.lasers.get_mut(id) else {
                continue;
            };
            laser.advance();
            let shape = laser.hit_shape();
            let pipe_hit = self.pipe_lookup.query(&shape).next().map(|(pipe_id, _)| pipe_id);
            if let Some(pipe_id) = pipe_hit {
                self.network.damage(pipe_id, LASER_DAMAGE)?;
                self.lasers.schedule_remove(id)?;
                continue;
            }
            if self.solids.query(&shape).next().is_some() {
                self.lasers.schedule_remove(id)?;
            }
        }

        for spawner in &mut self.spawners {
            if spawner.update(dt) {
                let id = self.allocator.allocate();
                let slime = Slime::new(spawner.transform.position)?;
                self.enemies.schedule_add(id, slime)?;
            }
        }

        if self.player.state() != Some(ActorState::Hurt) {
            let player_bounds = self.player.bounds();
            let touching = self
                .enemies
                .iter()
                .any(|(_, slime)| slime.bounds().intersects(&player_bounds));
            if touching {
                self.player.hurt()?;
            }
        }
        Ok(())
    }

    /// Pick up the pipe under `aim`, or place the pocketed pipe into the
    /// aimed cell. Placement snaps to the cell the aim point falls in.
    pub(crate) fn pickup_at(&mut self, aim: Vec2) -> Result<bool, PipeNetworkError> {
        let place = self.tilemap.snap_to_cell_origin(aim);
        self.network
            .pickup(aim, place, &mut self.pocket, &mut self.pipe_lookup)
    }

    pub(crate) fn heal_pipe_at(&mut self, position: Vec2, amount: f32) -> Result<bool, PipeNetworkError> {
        let Some(&(id, _)) = self.pipe_lookup.query_point(position).first() else {
            return Ok(false);
        };
        self.network.heal(id, amount)?;
        Ok(true)
    }

    pub(crate) fn damage_pipe_at(&mut self, position: Vec2, amount: f32) -> Result<bool, PipeNetworkError> {
        let Some(&(id, _)) = self.pipe_lookup.query_point(position).first() else {
            return Ok(false);
        };
        self.network.damage(id, amount)?;
        Ok(true)
    }

    pub(crate) fn network(&self) -> &PipeNetwork {
        &self.network
    }

    pub(crate) fn player(&self) -> &Player {
        &self.player
    }

    pub(crate) fn pocket(&self) -> Option<&Pipe> {
        self.pocket.as_ref()
    }

    pub(crate) fn enemy_count(&self) -> usize {
        self.enemies.len()
    }

    pub(crate) fn laser_count(&self) -> usize {
        self.lasers.len()
    }

    pub(crate) fn blocks(&self) -> &[Block] {
        &self.blocks
    }
}
