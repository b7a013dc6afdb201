#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PipeKind {
    /// Portable segment the player can pick up and relocate.
    Normal,
    /// Immovable puzzle obstacle; takes damage like a normal pipe.
    Grey,
    /// Fixed circuit endpoint; indestructible, never carried.
    Gold,
}

/// One puzzle network segment. World bounds and connection points are
/// derived from the transform and re-derived after every move.
#[derive(Debug, Clone)]
pub(crate) struct Pipe {
    pub(crate) id: EntityId,
    pub(crate) transform: Transform,
    #[allow(dead_code)]
    pub(crate) layer: DrawLayer,
    local_bounds: Rect,
    bounds: Rect,
    connection_offsets: [Vec2; 2],
    connection_points: [Vec2; 2],
    health: f32,
    max_health: f32,
    kind: PipeKind,
    pub(crate) functional: bool,
}

impl Pipe {
    pub(crate) fn new(
        id: EntityId,
        position: Vec2,
        local_bounds: Rect,
        connection_offsets: [Vec2; 2],
        kind: PipeKind,
        max_health: f32,
    ) -> Self {
        let mut pipe = Self {
            id,
            transform: Transform::at(position),
            layer: DrawLayer::Back,
            local_bounds,
            bounds: local_bounds,
            connection_offsets,
            connection_points: connection_offsets,
            health: max_health,
            max_health,
            kind,
            functional: false,
        };
        pipe.compute_world_space();
        pipe
    }

    /// Re-derives world bounds and connection points from the transform.
    /// Must be called after any position mutation.
    pub(crate) fn compute_world_space(&mut self) {
        self.bounds = self.local_bounds.translated(self.transform.position);
        for (point, offset) in self
            .connection_points
            .iter_mut()
            .zip(self.connection_offsets)
        {
            *point = self.transform.position + offset;
        }
    }

    pub(crate) fn set_position(&mut self, position: Vec2) {
        self.transform.position = position;
        self.compute_world_space();
    }

    pub(crate) fn bounds(&self) -> Rect {
        self.bounds
    }

    pub(crate) fn connection_points(&self) -> [Vec2; 2] {
        self.connection_points
    }

    pub(crate) fn kind(&self) -> PipeKind {
        self.kind
    }

    pub(crate) fn is_gold(&self) -> bool {
        self.kind == PipeKind::Gold
    }

    pub(crate) fn is_grey(&self) -> bool {
        self.kind == PipeKind::Grey
    }

    pub(crate) fn health(&self) -> f32 {
        self.health
    }

    /// Broken pipes stay on the map but can form no connections.
    pub(crate) fn is_broken(&self) -> bool {
        self.health <= 0.0
    }

    /// Gold pipes are indestructible; everything else clamps at zero.
    pub(crate) fn take_damage(&mut self, amount: f32) {
        if self.is_gold() {
            return;
        }
        self.health = (self.health - amount).max(0.0);
    }

    pub(crate) fn heal_damage(&mut self, amount: f32) {
        self.health = (self.health + amount).min(self.max_health);
    }
}
