use serde::{Deserialize, Serialize};

use crate::types::WardType;

/// Replay clock rate. Every duration is derived from tick deltas at this rate.
pub const TICKS_PER_SECOND: f64 = 30.0;

/// World units per coarse body-component cell.
pub const CELL_SIZE: f64 = 128.0;

/// Width of the slot index inside a composite entity handle.
pub const SLOT_INDEX_BITS: u32 = 14;
pub const SLOT_INDEX_MASK: u64 = (1 << SLOT_INDEX_BITS) - 1;

/// Handle value the engine writes for "no entity".
pub const INVALID_HANDLE: u64 = 0xFF_FFFF;

/// Player slots above this value use the extended encoding.
pub const MAX_PLAYER_SLOT: i64 = 9;
pub const PLAYER_SLOT_MASK: i64 = 0xF;

pub const OBSERVER_MAX_DURATION_SEC: u32 = 360;
pub const SENTRY_MAX_DURATION_SEC: u32 = 420;
pub const DENIAL_GRACE_SEC: u32 = 5;

/// Entity field paths read by the extractor.
pub mod fields {
    pub const TEAM_NUM: &str = "m_iTeamNum";
    pub const OWNER_ENTITY: &str = "m_hOwnerEntity";
    pub const OWNER_NPC: &str = "m_hOwnerNPC";
    pub const PLAYER_OWNER_ID: &str = "m_nPlayerOwnerID";
    pub const CELL_X: &str = "CBodyComponent.m_cellX";
    pub const CELL_Y: &str = "CBodyComponent.m_cellY";
    pub const VEC_X: &str = "CBodyComponent.m_vecX";
    pub const VEC_Y: &str = "CBodyComponent.m_vecY";

    /// Per-slot team number on the player roster entity.
    pub fn player_team(slot: i64) -> String {
        format!("m_vecPlayerTeamData.{slot:04}.m_iTeamNum")
    }
}

/// Ward lifetime rules used by the denial heuristic.
///
/// All fields default to the current game rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DurationRules {
    pub observer_max_sec: u32,
    pub sentry_max_sec: u32,
    /// A ward gone more than this many seconds before its natural expiry
    /// counts as denied.
    pub denial_grace_sec: u32,
}

impl Default for DurationRules {
    fn default() -> Self {
        Self::defaults()
    }
}

impl DurationRules {
    /// Hardcoded game-rule defaults.
    pub fn defaults() -> Self {
        Self {
            observer_max_sec: OBSERVER_MAX_DURATION_SEC,
            sentry_max_sec: SENTRY_MAX_DURATION_SEC,
            denial_grace_sec: DENIAL_GRACE_SEC,
        }
    }

    pub fn max_duration_sec(&self, ward_type: WardType) -> u32 {
        match ward_type {
            WardType::Observer => self.observer_max_sec,
            WardType::Sentry => self.sentry_max_sec,
        }
    }

    /// Generate a commented default TOML config string.
    pub fn generate_default_toml() -> String {
        r#"# Ward lifetime rules

# Natural lifetime of an observer ward, in seconds
observer_max_sec = 360

# Natural lifetime of a sentry ward, in seconds
sentry_max_sec = 420

# Wards removed more than this many seconds early are flagged as denied
denial_grace_sec = 5
"#
        .to_string()
    }
}
