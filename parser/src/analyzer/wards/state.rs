use serde::Serialize;

use crate::types::{Team, Tick, WardType, WorldPos};

/// A ward that has been created but not yet deleted.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveWard {
    pub team: Team,
    pub ward_type: WardType,
    pub position: WorldPos,
    pub start_tick: Tick,
}

impl ActiveWard {
    /// Takes whatever the latest snapshot resolved, but never lets an
    /// unsynchronized placeholder overwrite a value already known.
    pub fn merge(&mut self, team: Team, position: WorldPos) {
        if !position.is_unknown() {
            self.position = position;
        }
        if team.is_known() {
            self.team = team;
        }
    }
}
