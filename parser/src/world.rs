use tracing::{trace, warn};

use crate::entity::{Entity, EntityClass, EntityEvent, Lifecycle};
use crate::slots::SlotArena;
use crate::types::{EntityHandle, EntityIndex};

/// Readonly view over every entity currently alive in the replay.
///
/// This is what ownership resolution runs against; it hides how the entity
/// table is stored.
pub trait EntityUniverse {
    /// Entity currently occupying `index`.
    fn entity(&self, index: EntityIndex) -> Option<&Entity>;

    /// All live entities in slot order.
    fn entities(&self) -> Box<dyn Iterator<Item = &Entity> + '_>;

    /// Direct lookup by composite handle. Fails when the slot is empty or
    /// holds an entity with a different serial.
    fn entity_by_handle(&self, handle: EntityHandle) -> Option<&Entity> {
        self.entity(handle.index())
            .filter(|entity| entity.serial() == handle.serial())
    }

    fn filter_entities<'a>(
        &'a self,
        predicate: &'a dyn Fn(&Entity) -> bool,
    ) -> Box<dyn Iterator<Item = &'a Entity> + 'a> {
        Box::new(self.entities().filter(move |entity| predicate(*entity)))
    }

    /// First live entity of the given class.
    fn find_by_class(&self, class: EntityClass) -> Option<&Entity> {
        self.entities().find(|entity| entity.class() == Some(class))
    }
}

/// Slot-indexed table of entity snapshots, kept in step with the event
/// stream.
#[derive(Debug, Default)]
pub struct EntityTable {
    slots: SlotArena<Entity>,
}

impl EntityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn insert(&mut self, entity: Entity) -> Option<Entity> {
        self.slots.insert(entity.index(), entity)
    }

    pub fn remove(&mut self, index: EntityIndex) -> Option<Entity> {
        self.slots.remove(index)
    }

    /// Brings the table up to date with `event` before analyzers see it.
    /// Deleted entities stay readable until [`EntityTable::retire`].
    pub fn apply(&mut self, event: &EntityEvent) {
        match event.phase() {
            Some(Lifecycle::Created) => {
                let class_name = event.class_name.as_deref().unwrap_or_default();
                let mut entity = Entity::new(event.index, event.serial, class_name);
                entity.merge_fields(&event.fields);
                if let Some(stale) = self.insert(entity) {
                    trace!(
                        "slot {} reused by {class_name} while {} was still present",
                        event.index,
                        stale.class_name()
                    );
                }
            }
            Some(Lifecycle::Updated) | Some(Lifecycle::Deleted) => {
                match self.slots.get_mut(event.index) {
                    Some(entity) => entity.merge_fields(&event.fields),
                    None => warn!("change at {} for empty slot {}", event.tick, event.index),
                }
            }
            None => {}
        }
    }

    /// Drops the entity once every analyzer has processed its deletion.
    pub fn retire(&mut self, event: &EntityEvent) {
        if event.phase() == Some(Lifecycle::Deleted) {
            self.remove(event.index);
        }
    }
}

impl EntityUniverse for EntityTable {
    fn entity(&self, index: EntityIndex) -> Option<&Entity> {
        self.slots.get(index)
    }

    fn entities(&self) -> Box<dyn Iterator<Item = &Entity> + '_> {
        Box::new(self.slots.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::FieldSnapshot;

    #[test]
    fn handle_lookup_checks_serial() {
        let mut table = EntityTable::new();
        table.insert(Entity::new(EntityIndex(12), 4, "CDOTA_Unit_Hero_Lion"));

        let good = EntityHandle::composite(EntityIndex(12), 4);
        let stale = EntityHandle::composite(EntityIndex(12), 3);
        assert!(table.entity_by_handle(good).is_some());
        assert!(table.entity_by_handle(stale).is_none());
    }

    #[test]
    fn updates_merge_and_deletes_wait_for_retire() {
        let mut table = EntityTable::new();
        table.apply(
            &EntityEvent::created(10, 3, "CDOTA_NPC_Observer_Ward")
                .with_field("m_iTeamNum", 2)
                .with_field("CBodyComponent.m_cellX", 64),
        );
        table.apply(&EntityEvent::updated(11, 3).with_field("CBodyComponent.m_cellX", 65));

        let entity = table.entity(EntityIndex(3)).unwrap();
        assert_eq!(entity.get_i64("m_iTeamNum"), Some(2));
        assert_eq!(entity.get_i64("CBodyComponent.m_cellX"), Some(65));
        assert_eq!(entity.class(), Some(EntityClass::ObserverWard));

        let delete = EntityEvent::deleted(12, 3);
        table.apply(&delete);
        assert_eq!(table.len(), 1);
        table.retire(&delete);
        assert!(table.is_empty());
        assert!(table.entity(EntityIndex(3)).is_none());
    }

    #[test]
    fn entities_iterate_in_slot_order() {
        let mut table = EntityTable::new();
        table.insert(Entity::new(EntityIndex(9), 0, "b"));
        table.insert(Entity::new(EntityIndex(2), 0, "a"));
        let order: Vec<_> = table.entities().map(|e| e.index().raw()).collect();
        assert_eq!(order, vec![2, 9]);
    }
}
