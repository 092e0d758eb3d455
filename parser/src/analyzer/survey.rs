use std::collections::BTreeMap;

use serde::Serialize;

use crate::analyzer::Analyzer;
use crate::entity::{EntityEvent, Lifecycle};
use crate::slots::SlotArena;
use crate::types::Tick;
use crate::world::EntityUniverse;

/// Event counts gathered over one replay.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SurveyStats {
    pub total_events: usize,
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    /// Enter/leave notifications with no lifecycle phase.
    pub visibility_only: usize,
    /// Creations per entity class name.
    pub classes: BTreeMap<String, usize>,
    pub first_tick: Option<Tick>,
    pub last_tick: Option<Tick>,
    /// Entities still alive once the stream ended.
    pub live_at_end: usize,
}

impl SurveyStats {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Counts events by phase and entity class.
#[derive(Debug, Default)]
pub struct Survey {
    stats: SurveyStats,
    live: SlotArena<()>,
}

impl Survey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &SurveyStats {
        &self.stats
    }

    pub fn into_stats(self) -> SurveyStats {
        self.stats
    }
}

impl Analyzer for Survey {
    fn process(&mut self, event: &EntityEvent, world: &dyn EntityUniverse) {
        let stats = &mut self.stats;
        stats.total_events += 1;
        stats.first_tick.get_or_insert(event.tick);
        stats.last_tick = Some(event.tick);

        match event.phase() {
            Some(Lifecycle::Created) => {
                stats.created += 1;
                self.live.insert(event.index, ());
                if let Some(entity) = world.entity(event.index) {
                    *stats
                        .classes
                        .entry(entity.class_name().to_string())
                        .or_default() += 1;
                }
            }
            Some(Lifecycle::Updated) => stats.updated += 1,
            Some(Lifecycle::Deleted) => {
                stats.deleted += 1;
                self.live.remove(event.index);
            }
            None => stats.visibility_only += 1,
        }
    }

    fn finish(&mut self) {
        self.stats.live_at_end = self.live.len();
    }
}
