#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub(crate) enum PipeNetworkError {
    #[error("map data contains no gold pipe endpoint")]
    NoGoldPipe,
    #[error("pipe {0:?} is not part of the network")]
    UnknownPipe(EntityId),
}

/// Owns every live pipe on the current map, plus the adjacency derived from
/// their geometry. Adjacency is index-keyed and rebuilt wholesale on every
/// evaluation; it is a lookup aid, never an ownership relation.
#[derive(Debug, Default)]
pub(crate) struct PipeNetwork {
    pipes: Vec<Pipe>,
    adjacency: Vec<Vec<usize>>,
}

impl PipeNetwork {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, pipe: Pipe) {
        self.pipes.push(pipe);
    }

    pub(crate) fn len(&self) -> usize {
        self.pipes.len()
    }

    pub(crate) fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    pub(crate) fn connections_of(&self, id: EntityId) -> Option<Vec<EntityId>> {
        let index = self.index_of(id)?;
        let neighbors = self.adjacency.get(index)?;
        Some(
            neighbors
                .iter()
                .map(|&neighbor| self.pipes[neighbor].id)
                .collect(),
        )
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.pipes.iter().position(|pipe| pipe.id == id)
    }

    /// Rebuilds the adjacency from scratch: two pipes are connected iff each
    /// one's connection points land inside the other's bounds (checked in
    /// both directions) and neither is broken. Asymmetric "sees but is not
    /// seen" pairs do not connect.
    pub(crate) fn recompute_connections(&mut self) {
        self.adjacency = vec![Vec::new(); self.pipes.len()];
        for pipe in &mut self.pipes {
            pipe.functional = false;
        }

        for i in 0..self.pipes.len() {
            for j in (i + 1)..self.pipes.len() {
                let a = &self.pipes[i];
                let b = &self.pipes[j];
                if a.is_broken() || b.is_broken() {
                    continue;
                }
                if Self::sees(a, b) && Self::sees(b, a) {
                    self.adjacency[i].push(j);
                    self.adjacency[j].push(i);
                }
            }
        }
    }

    fn sees(source: &Pipe, target: &Pipe) -> bool {
        source
            .connection_points()
            .iter()
            .any(|point| target.bounds().contains_point(*point))
    }

    /// Recomputes connections, then BFS from a gold endpoint. If another
    /// gold endpoint is reachable the circuit is complete and every visited
    /// pipe becomes functional. Deterministic and idempotent for a given
    /// pipe set and health values.
    pub(crate) fn evaluate(&mut self) -> Result<bool, PipeNetworkError> {
        self.recompute_connections();

        let source = self
            .pipes
            .iter()
            .position(|pipe| pipe.is_gold())
            .ok_or(PipeNetworkError::NoGoldPipe)?;

        let mut visited = HashSet::new();
        visited.insert(source);
        let mut frontier = VecDeque::new();
        frontier.push_back(source);

        let mut complete = false;
        while let Some(current) = frontier.pop_front() {
            if self.pipes[current].is_gold() && current != source {
                complete = true;
                break;
            }
            for &neighbor in &self.adjacency[current] {
                if visited.insert(neighbor) {
                    frontier.push_back(neighbor);
                }
            }
        }

        if complete {
            for &index in &visited {
                self.pipes[index].functional = true;
            }
        }
        debug!(
            complete,
            pipes = self.pipes.len(),
            visited = visited.len(),
            "pipe configuration evaluated"
        );
        Ok(complete)
    }

    /// Applies damage to a pipe and re-evaluates before returning, so the
    /// connectivity state is never observably stale. Gold pipes are skipped
    /// entirely.
    pub(crate) fn damage(&mut self, id: EntityId, amount: f32) -> Result<(), PipeNetworkError> {
        let index = self.index_of(id).ok_or(PipeNetworkError::UnknownPipe(id))?;
        if self.pipes[index].is_gold() {
            return Ok(());
        }
        self.pipes[index].take_damage(amount);
        debug!(
            pipe = id.0,
            health = self.pipes[index].health(),
            "pipe damaged"
        );
        self.evaluate()?;
        Ok(())
    }

    pub(crate) fn heal(&mut self, id: EntityId, amount: f32) -> Result<(), PipeNetworkError> {
        let index = self.index_of(id).ok_or(PipeNetworkError::UnknownPipe(id))?;
        self.pipes[index].heal_damage(amount);
        debug!(
            pipe = id.0,
            health = self.pipes[index].health(),
            "pipe healed"
        );
        self.evaluate()?;
        Ok(())
    }

    /// Single-slot inventory swap: the only way a pipe moves after map load.
    /// Returns `Ok(false)` (no state change, no re-evaluation) for rejected
    /// swaps; `Ok(true)` after a completed transaction and re-evaluation.
    pub(crate) fn pickup(
        &mut self,
        lookup_point: Vec2,
        place_position: Vec2,
        pocket: &mut Option<Pipe>,
        index: &mut SpatialIndex<EntityId>,
    ) -> Result<bool, PipeNetworkError> {
        let field_id = index.query_point(lookup_point).first().map(|(id, _)| *id);
        let field_index = field_id.and_then(|id| self.index_of(id));

        // Both locations empty: nothing to do.
        if field_index.is_none() && pocket.is_none() {
            return Ok(false);
        }

        if let Some(existing) = field_index {
            // Pocket already holds a pipe, or the field pipe is fixed.
            if pocket.is_some() {
                return Ok(false);
            }
            if self.pipes[existing].is_grey() || self.pipes[existing].is_gold() {
                return Ok(false);
            }
        }

        let mut field = match field_index {
            Some(existing) => {
                let pipe = self.pipes.remove(existing);
                index.remove(&pipe.id);
                Some(pipe)
            }
            None => None,
        };

        std::mem::swap(&mut field, pocket);

        // Non-empty on deposit: the former pocket pipe lands on the field.
        if let Some(mut pipe) = field {
            pipe.set_position(place_position);
            index.insert(pipe.id, pipe.bounds());
            self.pipes.push(pipe);
        }

        self.evaluate()?;
        Ok(true)
    }
}
