use tracing::{debug, trace};

use crate::analyzer::Analyzer;
use crate::entity::{Entity, EntityClass, EntityEvent, Lifecycle};
use crate::game_constants::DurationRules;
use crate::slots::SlotArena;
use crate::types::{Tick, WardType};
use crate::world::EntityUniverse;

use super::duration::DurationEvaluator;
use super::position::decode_position;
use super::record::WardRecord;
use super::state::ActiveWard;
use super::team::TeamResolver;

/// Follows every observer and sentry from creation to deletion and emits one
/// [`WardRecord`] per deleted ward, in deletion order.
///
/// Wards still alive when the stream ends produce nothing.
pub struct WardTracker {
    match_id: i64,
    teams: TeamResolver,
    durations: DurationEvaluator,
    active: SlotArena<ActiveWard>,
    records: Vec<WardRecord>,
}

impl WardTracker {
    pub fn new(match_id: i64, rules: DurationRules) -> Self {
        Self {
            match_id,
            teams: TeamResolver::default(),
            durations: DurationEvaluator::new(rules),
            active: SlotArena::new(),
            records: Vec::new(),
        }
    }

    pub fn with_team_resolver(mut self, teams: TeamResolver) -> Self {
        self.teams = teams;
        self
    }

    pub fn records(&self) -> &[WardRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<WardRecord> {
        self.records
    }

    /// Wards created but not yet deleted.
    pub fn active(&self) -> impl Iterator<Item = &ActiveWard> {
        self.active.values()
    }

    fn on_created(
        &mut self,
        ward_type: WardType,
        entity: &Entity,
        tick: Tick,
        world: &dyn EntityUniverse,
    ) {
        let ward = ActiveWard {
            team: self.teams.resolve(entity, world),
            ward_type,
            position: decode_position(entity),
            start_tick: tick,
        };
        trace!("{ward_type} placed in slot {} at {tick}", entity.index());

        if let Some(previous) = self.active.insert(entity.index(), ward) {
            debug!(
                "slot {} registered again while a {} from {} was active; replacing it",
                entity.index(),
                previous.ward_type,
                previous.start_tick
            );
        }
    }

    fn on_updated(&mut self, entity: &Entity, world: &dyn EntityUniverse) {
        let Some(ward) = self.active.get_mut(entity.index()) else {
            return;
        };
        ward.merge(self.teams.resolve(entity, world), decode_position(entity));
    }

    fn on_deleted(&mut self, entity: &Entity, tick: Tick, world: &dyn EntityUniverse) {
        let Some(ward) = self.active.remove(entity.index()) else {
            trace!("ignoring deletion of untracked slot {}", entity.index());
            return;
        };

        // Body component fields are sometimes only synchronized after creation,
        // so the deletion snapshot gets the final say when it has a value.
        let team = Some(self.teams.resolve(entity, world))
            .filter(|team| team.is_known())
            .unwrap_or(ward.team);
        let position = decode_position(entity).or(ward.position);
        let lifetime = self.durations.evaluate(ward.start_tick, tick, ward.ward_type);

        self.records.push(WardRecord {
            match_id: self.match_id,
            team_id: team,
            ward_type: ward.ward_type,
            pos_x: position.x,
            pos_y: position.y,
            game_time_sec: ward.start_tick.seconds(),
            duration_sec: lifetime.duration_sec,
            is_denied: lifetime.is_denied,
            region_tag: String::new(),
        });
    }
}

impl Analyzer for WardTracker {
    fn process(&mut self, event: &EntityEvent, world: &dyn EntityUniverse) {
        let Some(entity) = world.entity(event.index) else {
            return;
        };
        let Some(ward_type) = entity.class().and_then(EntityClass::ward_type) else {
            return;
        };

        match event.phase() {
            Some(Lifecycle::Created) => self.on_created(ward_type, entity, event.tick, world),
            Some(Lifecycle::Updated) => self.on_updated(entity, world),
            Some(Lifecycle::Deleted) => self.on_deleted(entity, event.tick, world),
            None => {}
        }
    }

    fn finish(&mut self) {
        if !self.active.is_empty() {
            debug!(
                "{} wards still active at end of stream, dropping them",
                self.active.len()
            );
        }
        self.active.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_constants::fields;
    use crate::types::{Team, WorldPos};
    use crate::world::EntityTable;

    const OBSERVER: &str = "CDOTA_NPC_Observer_Ward";
    const SENTRY: &str = "CDOTA_NPC_Sentry_Ward";

    /// Drives the tracker the same way the extraction loop does.
    fn run(events: Vec<EntityEvent>) -> WardTracker {
        let mut world = EntityTable::new();
        let mut tracker = WardTracker::new(0, DurationRules::defaults());
        for event in &events {
            world.apply(event);
            tracker.process(event, &world);
            world.retire(event);
        }
        tracker.finish();
        tracker
    }

    fn with_position(event: EntityEvent, cell: (i64, i64), offset: (f32, f32)) -> EntityEvent {
        event
            .with_field(fields::CELL_X, cell.0)
            .with_field(fields::CELL_Y, cell.1)
            .with_field(fields::VEC_X, offset.0)
            .with_field(fields::VEC_Y, offset.1)
    }

    #[test]
    fn observer_placed_and_destroyed_early() {
        let tracker = run(vec![
            with_position(
                EntityEvent::created(100, 7, OBSERVER).with_field(fields::TEAM_NUM, 2),
                (2, 2),
                (44.0, 44.0),
            ),
            // Placeholder body fields decode to (0,0).
            with_position(EntityEvent::updated(150, 7), (0, 0), (0.0, 0.0)),
            EntityEvent::deleted(820, 7),
        ]);

        let records = tracker.records();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.team_id, Team::Radiant);
        assert_eq!(record.ward_type, WardType::Observer);
        assert_eq!((record.pos_x, record.pos_y), (300.0, 300.0));
        assert_eq!(record.game_time_sec, 100.0 / 30.0);
        assert_eq!(record.duration_sec, 24.0);
        assert!(record.is_denied);
        assert!(record.region_tag.is_empty());
    }

    #[test]
    fn update_with_unknown_position_keeps_tracked_one() {
        let mut world = EntityTable::new();
        let mut tracker = WardTracker::new(0, DurationRules::defaults());

        for event in [
            with_position(
                EntityEvent::created(10, 3, SENTRY).with_field(fields::TEAM_NUM, 3),
                (0, 1),
                (100.0, 72.0),
            ),
            with_position(
                EntityEvent::updated(11, 3).with_field(fields::TEAM_NUM, 0),
                (0, 0),
                (0.0, 0.0),
            ),
        ] {
            world.apply(&event);
            tracker.process(&event, &world);
        }

        let ward = tracker.active().next().unwrap();
        assert_eq!(ward.position, WorldPos::new(100.0, 200.0));
        assert_eq!(ward.team, Team::Dire);
    }

    #[test]
    fn position_synchronized_late_is_read_at_deletion() {
        let tracker = run(vec![
            EntityEvent::created(0, 5, SENTRY).with_field(fields::TEAM_NUM, 3),
            with_position(EntityEvent::deleted(30 * 420, 5), (10, 20), (1.0, 2.0)),
        ]);

        let record = &tracker.records()[0];
        assert_eq!((record.pos_x, record.pos_y), (1281.0, 2562.0));
        assert_eq!(record.duration_sec, 420.0);
        assert!(!record.is_denied);
    }

    #[test]
    fn deletion_of_untracked_slot_is_ignored() {
        let tracker = run(vec![
            EntityEvent::created(5, 2, "CDOTA_Unit_Hero_Lion"),
            EntityEvent::deleted(6, 2),
            EntityEvent::deleted(7, 99),
        ]);
        assert!(tracker.records().is_empty());
    }

    #[test]
    fn ward_never_deleted_yields_nothing() {
        let tracker = run(vec![EntityEvent::created(1, 4, OBSERVER)]);
        assert!(tracker.records().is_empty());
        assert_eq!(tracker.active().count(), 0);
    }

    #[test]
    fn reused_slot_produces_separate_records_in_deletion_order() {
        let tracker = run(vec![
            EntityEvent::created(0, 9, OBSERVER).with_field(fields::TEAM_NUM, 2),
            EntityEvent::created(30, 10, SENTRY).with_field(fields::TEAM_NUM, 3),
            EntityEvent::deleted(60, 10),
            EntityEvent::deleted(90, 9),
            EntityEvent::created(120, 9, SENTRY).with_field(fields::TEAM_NUM, 3),
            EntityEvent::deleted(180, 9),
        ]);

        let summary: Vec<_> = tracker
            .records()
            .iter()
            .map(|r| (r.ward_type, r.team_id, r.duration_sec))
            .collect();
        assert_eq!(
            summary,
            vec![
                (WardType::Sentry, Team::Dire, 1.0),
                (WardType::Observer, Team::Radiant, 3.0),
                (WardType::Sentry, Team::Dire, 2.0),
            ]
        );
    }

    #[test]
    fn recreation_without_deletion_replaces_entry() {
        let tracker = run(vec![
            EntityEvent::created(0, 9, OBSERVER).with_field(fields::TEAM_NUM, 2),
            EntityEvent::created(300, 9, SENTRY).with_field(fields::TEAM_NUM, 3),
            EntityEvent::deleted(330, 9),
        ]);
        assert_eq!(tracker.records().len(), 1);
        let record = &tracker.records()[0];
        assert_eq!(record.ward_type, WardType::Sentry);
        assert_eq!(record.game_time_sec, 10.0);
        assert_eq!(record.duration_sec, 1.0);
    }

    #[test]
    fn team_resolved_at_deletion_overrides_unknown() {
        let tracker = run(vec![
            EntityEvent::created(0, 1, OBSERVER),
            EntityEvent::deleted(60, 1).with_field(fields::PLAYER_OWNER_ID, 8),
        ]);
        assert_eq!(tracker.records()[0].team_id, Team::Dire);
    }

    #[test]
    fn unresolved_team_stays_zero() {
        let tracker = run(vec![EntityEvent::created(0, 1, OBSERVER), EntityEvent::deleted(60, 1)]);
        assert_eq!(tracker.records()[0].team_id, Team::Unknown);
        assert_eq!(tracker.records()[0].team_id.id(), 0);
    }
}
