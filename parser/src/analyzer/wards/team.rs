use tracing::trace;

use crate::entity::{Entity, EntityClass, FieldSnapshot};
use crate::game_constants::{INVALID_HANDLE, MAX_PLAYER_SLOT, PLAYER_SLOT_MASK, fields};
use crate::types::{EntityHandle, Team};
use crate::world::EntityUniverse;

/// A single way of figuring out which team controls an entity.
pub type TeamStrategy = fn(&Entity, &dyn EntityUniverse) -> Option<Team>;

/// Resolution order used for wards. The first strategy that yields a playable
/// team wins.
pub const STANDARD_STRATEGIES: &[(&str, TeamStrategy)] = &[
    ("team number", own_team_number),
    ("owner entity", owner_entity),
    ("owner npc", owner_npc),
    ("player slot", player_slot),
];

/// Walks an ordered chain of [`TeamStrategy`]s.
#[derive(Clone, Copy)]
pub struct TeamResolver {
    strategies: &'static [(&'static str, TeamStrategy)],
}

impl Default for TeamResolver {
    fn default() -> Self {
        Self::new(STANDARD_STRATEGIES)
    }
}

impl TeamResolver {
    pub fn new(strategies: &'static [(&'static str, TeamStrategy)]) -> Self {
        Self { strategies }
    }

    /// Returns [`Team::Unknown`] when every strategy comes up empty.
    pub fn resolve(&self, entity: &Entity, world: &dyn EntityUniverse) -> Team {
        self.strategies
            .iter()
            .find_map(|(name, strategy)| {
                let team = strategy(entity, world)?;
                trace!("slot {} resolved to {team} via {name}", entity.index());
                Some(team)
            })
            .unwrap_or_default()
    }
}

/// Team number of the entity itself, if it is one of the two playable teams.
pub fn team_number(entity: &impl FieldSnapshot) -> Option<Team> {
    entity
        .get_i64(fields::TEAM_NUM)
        .and_then(Team::from_team_number)
}

/// Reads an ownership handle, discarding empty and invalid ones.
pub fn read_handle(entity: &impl FieldSnapshot, path: &str) -> Option<EntityHandle> {
    entity
        .get_u64(path)
        .filter(|raw| *raw != 0 && *raw != INVALID_HANDLE)
        .map(EntityHandle)
}

/// Team of the entity `handle` points to.
///
/// Direct lookup only understands the composite encoding, so when it fails
/// every entity with a team is checked against both the composite and the
/// raw index encoding. The first match is taken, which can misattribute in
/// pathological captures where a raw index collides with a composite value.
pub fn owner_team(handle: EntityHandle, world: &dyn EntityUniverse) -> Option<Team> {
    if let Some(team) = world.entity_by_handle(handle).and_then(team_number) {
        return Some(team);
    }

    let has_team = |entity: &Entity| team_number(entity).is_some();
    let owner = world.filter_entities(&has_team).find(|candidate| {
        candidate.handle() == handle || candidate.index().raw() as u64 == handle.raw()
    })?;
    trace!("handle {handle} matched slot {} by scan", owner.index());
    team_number(owner)
}

pub fn own_team_number(entity: &Entity, _world: &dyn EntityUniverse) -> Option<Team> {
    team_number(entity)
}

pub fn owner_entity(entity: &Entity, world: &dyn EntityUniverse) -> Option<Team> {
    owner_team(read_handle(entity, fields::OWNER_ENTITY)?, world)
}

pub fn owner_npc(entity: &Entity, world: &dyn EntityUniverse) -> Option<Team> {
    owner_team(read_handle(entity, fields::OWNER_NPC)?, world)
}

/// Player slot of the placing player, looked up on the player roster and
/// falling back to the fixed 0-4 / 5-9 split.
pub fn player_slot(entity: &Entity, world: &dyn EntityUniverse) -> Option<Team> {
    let raw = entity.get_i64(fields::PLAYER_OWNER_ID)?;
    let slot = if raw > MAX_PLAYER_SLOT {
        raw & PLAYER_SLOT_MASK
    } else {
        raw
    };
    if !(0..=MAX_PLAYER_SLOT).contains(&slot) {
        return None;
    }

    world
        .find_by_class(EntityClass::PlayerResource)
        .and_then(|roster| roster.get_i64(&fields::player_team(slot)))
        .and_then(Team::from_team_number)
        .or_else(|| static_slot_team(slot))
}

fn static_slot_team(slot: i64) -> Option<Team> {
    match slot {
        0..=4 => Some(Team::Radiant),
        5..=9 => Some(Team::Dire),
        _ => None,
    }
}
