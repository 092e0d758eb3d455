use crate::entity::EntityEvent;
use crate::world::EntityUniverse;

/// Consumer of the entity event stream. `world` already reflects `event`;
/// a deleted entity is still present while its deletion is processed.
pub trait Analyzer {
    fn process(&mut self, event: &EntityEvent, world: &dyn EntityUniverse);
    fn finish(&mut self);
}
