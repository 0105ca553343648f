//! Fixed-capacity slot array holding every non-player actor.
//!
//! Slots are addressed by `EntityId` handles, never by reference, so the
//! simulation can hold an id across spawns and deactivations. A rotating
//! cursor remembers where the last spawn landed; the next spawn probes
//! forward from there, wrapping at capacity, for at most one full pass.

use crate::entities::{Entity, EntityKind};
use crate::error::{GameError, GameResult};

/// Handle to a pool slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(usize);

impl EntityId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug)]
pub struct EntityPool {
    slots: Vec<Option<Entity>>,
    cursor: usize,
    active: usize,
}

impl EntityPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
            cursor: 0,
            active: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of active slots.
    pub fn len(&self) -> usize {
        self.active
    }

    pub fn is_empty(&self) -> bool {
        self.active == 0
    }

    /// Activate the next free slot at or after the cursor.
    ///
    /// Fails with `PoolExhausted` once a full pass finds every slot active.
    pub fn spawn(&mut self, x: f64, y: f64, angle: f64, kind: EntityKind) -> GameResult<EntityId> {
        let capacity = self.capacity();
        if capacity == 0 {
            return Err(GameError::PoolExhausted { capacity });
        }

        let free = (0..capacity)
            .map(|offset| (self.cursor + offset) % capacity)
            .find(|&index| self.slots[index].is_none())
            .ok_or(GameError::PoolExhausted { capacity })?;

        self.slots[free] = Some(Entity::new(x, y, angle, kind));
        self.active += 1;
        self.cursor = (free + 1) % capacity;
        Ok(EntityId(free))
    }

    /// Free the slot for reuse. Deactivating an inactive slot is a no-op.
    pub fn deactivate(&mut self, id: EntityId) {
        if let Some(slot) = self.slots.get_mut(id.0) {
            if slot.take().is_some() {
                self.active -= 1;
            }
        }
    }

    pub fn is_active(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Active entities in slot order.
    pub fn iter_active(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|entity| (EntityId(index), entity)))
    }

    /// Handles of every active slot, in slot order.
    ///
    /// Taken as a snapshot so the caller may spawn and deactivate while
    /// walking it.
    pub fn active_ids(&self) -> Vec<EntityId> {
        self.iter_active().map(|(id, _)| id).collect()
    }

    /// First active entity in slot order matching `pred`.
    pub fn find(&self, mut pred: impl FnMut(EntityId, &Entity) -> bool) -> Option<EntityId> {
        self.iter_active()
            .find(|(id, entity)| pred(*id, entity))
            .map(|(id, _)| id)
    }
}
