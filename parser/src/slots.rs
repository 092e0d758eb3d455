use crate::types::EntityIndex;

/// Growable arena keyed by entity slot index.
///
/// Each slot holds at most one value; inserting into an occupied slot hands
/// back the previous occupant so callers can decide what a reuse means.
#[derive(Debug, Clone)]
pub struct SlotArena<T> {
    slots: Vec<Option<T>>,
    live: usize,
}

impl<T> Default for SlotArena<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            live: 0,
        }
    }
}

impl<T> SlotArena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn insert(&mut self, index: EntityIndex, value: T) -> Option<T> {
        let slot = index.as_usize();
        if slot >= self.slots.len() {
            self.slots.resize_with(slot + 1, || None);
        }
        let previous = self.slots[slot].replace(value);
        if previous.is_none() {
            self.live += 1;
        }
        previous
    }

    pub fn get(&self, index: EntityIndex) -> Option<&T> {
        self.slots.get(index.as_usize()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, index: EntityIndex) -> Option<&mut T> {
        self.slots.get_mut(index.as_usize()).and_then(Option::as_mut)
    }

    /// Empties the slot. Returns `None` if it was already vacant, so a value
    /// can only ever be taken out once.
    pub fn remove(&mut self, index: EntityIndex) -> Option<T> {
        let removed = self.slots.get_mut(index.as_usize()).and_then(Option::take);
        if removed.is_some() {
            self.live -= 1;
        }
        removed
    }

    /// Occupied slots in index order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.live = 0;
    }
}
