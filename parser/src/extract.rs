use std::path::Path;

use derive_builder::Builder;
use tracing::{Level, debug, span};

use crate::analyzer::Analyzer;
use crate::analyzer::wards::{WardRecord, WardTracker};
use crate::entity::EntityEvent;
use crate::game_constants::{DurationRules, SLOT_INDEX_MASK};
use crate::types::Tick;
use crate::world::EntityTable;
use crate::{Error, ReplayFile, Result};

/// Settings for a single extraction pass.
#[derive(Debug, Clone, Default, Builder)]
#[builder(default)]
pub struct ExtractOptions {
    /// Copied into every record; 0 when the match id is not known.
    pub match_id: i64,
    pub rules: DurationRules,
}

/// Feeds every event to `analyzers` in stream order while keeping the entity
/// table in sync, then calls [`Analyzer::finish`] on each.
///
/// Stops at the first stream error; analyzers are not finished in that case.
pub fn run_analyzers<I>(events: I, analyzers: &mut [&mut dyn Analyzer]) -> Result<()>
where
    I: IntoIterator<Item = Result<EntityEvent>>,
{
    let mut world = EntityTable::new();
    let mut last_tick: Option<Tick> = None;

    for event in events {
        let event = event?;
        if let Some(previous) = last_tick.filter(|previous| event.tick < *previous) {
            return Err(Error::TickRegression {
                previous: previous.raw(),
                tick: event.tick.raw(),
            });
        }
        last_tick = Some(event.tick);
        if u64::from(event.index.raw()) > SLOT_INDEX_MASK {
            return Err(Error::SlotOutOfRange {
                index: event.index.raw(),
                tick: event.tick.raw(),
            });
        }

        world.apply(&event);
        for analyzer in analyzers.iter_mut() {
            analyzer.process(&event, &world);
        }
        world.retire(&event);
    }

    for analyzer in analyzers.iter_mut() {
        analyzer.finish();
    }
    Ok(())
}

/// Extracts ward records from an already opened event sequence. Nothing is
/// returned unless the whole sequence decodes.
pub fn extract_events<I>(events: I, options: &ExtractOptions) -> Result<Vec<WardRecord>>
where
    I: IntoIterator<Item = Result<EntityEvent>>,
{
    let mut tracker = WardTracker::new(options.match_id, options.rules.clone());
    run_analyzers(events, &mut [&mut tracker])?;
    Ok(tracker.into_records())
}

/// Opens the event log at `path` and extracts its ward records.
pub fn extract_wards(path: &Path, options: &ExtractOptions) -> Result<Vec<WardRecord>> {
    let span = span!(Level::DEBUG, "extract_wards", match_id = options.match_id);
    let _enter = span.enter();

    let replay = ReplayFile::open(path)?;
    let records = extract_events(replay.events(), options)?;
    debug!("extracted {} wards from {}", records.len(), path.display());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_regression_aborts_without_records() {
        let events = vec![
            Ok(EntityEvent::created(10, 1, "CDOTA_NPC_Observer_Ward")),
            Ok(EntityEvent::deleted(20, 1)),
            Ok(EntityEvent::updated(15, 2)),
        ];
        let result = extract_events(events, &ExtractOptions::default());
        assert!(matches!(
            result,
            Err(Error::TickRegression {
                previous: 20,
                tick: 15
            })
        ));
    }

    #[test]
    fn slot_beyond_handle_range_is_rejected() {
        let events = vec![
            Ok(EntityEvent::created(1, 1, "CDOTA_NPC_Observer_Ward")),
            Ok(EntityEvent::created(2, u32::MAX, "CDOTA_NPC_Observer_Ward")),
        ];
        let result = extract_events(events, &ExtractOptions::default());
        assert!(matches!(
            result,
            Err(Error::SlotOutOfRange {
                index: u32::MAX,
                tick: 2
            })
        ));
    }

    #[test]
    fn highest_handle_slot_is_accepted() {
        let top = SLOT_INDEX_MASK as u32;
        let events = vec![
            Ok(EntityEvent::created(1, top, "CDOTA_NPC_Sentry_Ward")),
            Ok(EntityEvent::deleted(31, top)),
        ];
        let records = extract_events(events, &ExtractOptions::default()).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn stream_error_discards_finished_wards() {
        let events = vec![
            Ok(EntityEvent::created(10, 1, "CDOTA_NPC_Observer_Ward")),
            Ok(EntityEvent::deleted(20, 1)),
            Err(Error::Io(std::io::Error::other("truncated"))),
        ];
        assert!(extract_events(events, &ExtractOptions::default()).is_err());
    }

    #[test]
    fn match_id_is_stamped_on_records() {
        let options = ExtractOptionsBuilder::default()
            .match_id(7_654_321)
            .build()
            .unwrap();
        let events = vec![
            Ok(EntityEvent::created(0, 1, "CDOTA_NPC_Sentry_Ward")),
            Ok(EntityEvent::deleted(30, 1)),
        ];
        let records = extract_events(events, &options).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].match_id, 7_654_321);
    }
}
