use std::collections::BTreeMap;

use kinded::Kinded;
use serde::Serialize;
use tracing::debug;

use crate::analyzer::Analyzer;
use crate::entity::{EntityEvent, FieldValue, FieldValueKind, Lifecycle};
use crate::types::{EntityIndex, Tick};
use crate::world::EntityUniverse;

#[derive(Debug, Clone, Serialize)]
pub struct DumpedField {
    pub kind: FieldValueKind,
    pub value: FieldValue,
}

/// Every property of the first ward entity seen in a replay. Useful for
/// finding out which field names a new capture format uses.
#[derive(Debug, Clone, Serialize)]
pub struct WardDumpOutput {
    pub class_name: String,
    pub index: EntityIndex,
    pub serial: u32,
    pub tick: Tick,
    pub fields: BTreeMap<String, DumpedField>,
}

#[derive(Debug, Default)]
pub struct WardDump {
    dump: Option<WardDumpOutput>,
}

impl WardDump {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dump(&self) -> Option<&WardDumpOutput> {
        self.dump.as_ref()
    }

    pub fn into_dump(self) -> Option<WardDumpOutput> {
        self.dump
    }
}

impl Analyzer for WardDump {
    fn process(&mut self, event: &EntityEvent, world: &dyn EntityUniverse) {
        if self.dump.is_some() || event.phase() != Some(Lifecycle::Created) {
            return;
        }
        let Some(entity) = world.entity(event.index) else {
            return;
        };
        if entity.class().and_then(|class| class.ward_type()).is_none() {
            return;
        }

        debug!("dumping {} fields of {}", entity.fields().len(), entity.class_name());
        self.dump = Some(WardDumpOutput {
            class_name: entity.class_name().to_string(),
            index: entity.index(),
            serial: entity.serial(),
            tick: event.tick,
            fields: entity
                .fields()
                .iter()
                .map(|(path, value)| {
                    let field = DumpedField {
                        kind: value.kind(),
                        value: value.clone(),
                    };
                    (path.clone(), field)
                })
                .collect(),
        });
    }

    fn finish(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::EntityTable;

    #[test]
    fn captures_only_the_first_ward() {
        let mut world = EntityTable::new();
        let mut dump = WardDump::new();
        for event in [
            EntityEvent::created(1, 1, "CDOTA_Unit_Hero_Lion").with_field("m_iTeamNum", 2),
            EntityEvent::created(2, 2, "CDOTA_NPC_Sentry_Ward").with_field("m_iTeamNum", 3),
            EntityEvent::created(3, 3, "CDOTA_NPC_Observer_Ward"),
        ] {
            world.apply(&event);
            dump.process(&event, &world);
        }

        let output = dump.into_dump().unwrap();
        assert_eq!(output.class_name, "CDOTA_NPC_Sentry_Ward");
        assert_eq!(output.tick, Tick(2));
        assert_eq!(output.fields["m_iTeamNum"].kind, FieldValueKind::Int);
    }
}
