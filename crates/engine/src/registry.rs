use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

#[derive(Debug, Default)]
pub struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("entity {0:?} is already live or scheduled to spawn")]
    AlreadyRegistered(EntityId),
    #[error("entity {0:?} is neither live nor scheduled to spawn")]
    NotRegistered(EntityId),
}

/// Deferred-mutation entity store. Adds and removes requested during a tick
/// are buffered and applied in bulk by `apply_pending`, which the owning
/// world calls at the start of the next tick, never while iterating the live
/// set. Unbalanced operations (double add, removal of something that was
/// never scheduled) fail loudly.
#[derive(Debug)]
pub struct Registry<T> {
    live: Vec<(EntityId, T)>,
    pending_adds: Vec<(EntityId, T)>,
    pending_removes: Vec<EntityId>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            live: Vec::new(),
            pending_adds: Vec::new(),
            pending_removes: Vec::new(),
        }
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_add(&mut self, id: EntityId, value: T) -> Result<(), RegistryError> {
        let already_live = self.live.iter().any(|(live_id, _)| *live_id == id);
        let already_pending = self.pending_adds.iter().any(|(add_id, _)| *add_id == id);
        if already_live || already_pending {
            return Err(RegistryError::AlreadyRegistered(id));
        }
        self.pending_adds.push((id, value));
        Ok(())
    }

    pub fn schedule_remove(&mut self, id: EntityId) -> Result<(), RegistryError> {
        if self.pending_removes.contains(&id) {
            return Err(RegistryError::NotRegistered(id));
        }
        let is_live = self.live.iter().any(|(live_id, _)| *live_id == id);
        if is_live {
            self.pending_removes.push(id);
            return Ok(());
        }
        // Removing an entity that is still waiting to spawn cancels the spawn.
        let pending_index = self
            .pending_adds
            .iter()
            .position(|(add_id, _)| *add_id == id);
        match pending_index {
            Some(index) => {
                self.pending_adds.remove(index);
                Ok(())
            }
            None => Err(RegistryError::NotRegistered(id)),
        }
    }

    /// Flushes buffered mutations: removals first, then adds.
    pub fn apply_pending(&mut self) {
        if !self.pending_removes.is_empty() {
            self.pending_removes.sort();
            let pending = &self.pending_removes;
            self.live.retain(|(id, _)| pending.binary_search(id).is_err());
            self.pending_removes.clear();
        }
        if !self.pending_adds.is_empty() {
            self.live.append(&mut self.pending_adds);
        }
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.live.iter().any(|(live_id, _)| *live_id == id)
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.live
            .iter()
            .find(|(live_id, _)| *live_id == id)
            .map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.live
            .iter_mut()
            .find(|(live_id, _)| *live_id == id)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.live.iter().map(|(id, value)| (*id, value))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.live.iter_mut().map(|(id, value)| (*id, value))
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.live.iter().map(|(id, _)| *id).collect()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn clear(&mut self) {
        self.live.clear();
        self.pending_adds.clear();
        self.pending_removes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_are_invisible_until_applied() {
        let mut allocator = EntityIdAllocator::default();
        let mut registry: Registry<&str> = Registry::new();
        let id = allocator.allocate();
        registry.schedule_add(id, "slime").expect("schedule add");
        assert!(!registry.contains(id));
        assert_eq!(registry.len(), 0);

        registry.apply_pending();
        assert!(registry.contains(id));
        assert_eq!(registry.get(id), Some(&"slime"));
    }

    #[test]
    fn double_add_fails() {
        let mut registry: Registry<u32> = Registry::new();
        let id = EntityId(7);
        registry.schedule_add(id, 1).expect("first add");
        assert_eq!(
            registry.schedule_add(id, 2),
            Err(RegistryError::AlreadyRegistered(id))
        );
        registry.apply_pending();
        assert_eq!(
            registry.schedule_add(id, 3),
            Err(RegistryError::AlreadyRegistered(id))
        );
    }

    #[test]
    fn remove_of_unknown_entity_fails() {
        let mut registry: Registry<u32> = Registry::new();
        assert_eq!(
            registry.schedule_remove(EntityId(1)),
            Err(RegistryError::NotRegistered(EntityId(1)))
        );
    }

    #[test]
    fn double_remove_fails() {
        let mut registry: Registry<u32> = Registry::new();
        let id = EntityId(3);
        registry.schedule_add(id, 9).expect("add");
        registry.apply_pending();
        registry.schedule_remove(id).expect("first remove");
        assert_eq!(
            registry.schedule_remove(id),
            Err(RegistryError::NotRegistered(id))
        );
    }

    #[test]
    fn remove_of_pending_add_cancels_the_spawn() {
        let mut registry: Registry<u32> = Registry::new();
        let id = EntityId(4);
        registry.schedule_add(id, 11).expect("add");
        registry.schedule_remove(id).expect("cancel");
        registry.apply_pending();
        assert!(!registry.contains(id));
        assert!(registry.is_empty());
    }

    #[test]
    fn removes_flush_before_adds() {
        let mut registry: Registry<u32> = Registry::new();
        let stale = EntityId(1);
        registry.schedule_add(stale, 1).expect("add stale");
        registry.apply_pending();

        registry.schedule_remove(stale).expect("remove stale");
        let fresh = EntityId(2);
        registry.schedule_add(fresh, 2).expect("add fresh");
        registry.apply_pending();

        assert!(!registry.contains(stale));
        assert!(registry.contains(fresh));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn allocator_ids_are_unique_and_monotonic() {
        let mut allocator = EntityIdAllocator::default();
        let a = allocator.allocate();
        let b = allocator.allocate();
        assert!(a < b);
    }
}
