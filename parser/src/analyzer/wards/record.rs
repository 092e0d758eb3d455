use serde::{Deserialize, Serialize};

use crate::game_constants::DurationRules;
use crate::types::{Team, WardType, WorldPos};

/// A finished ward, emitted when its entity is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WardRecord {
    /// External match id, 0 when unknown.
    pub match_id: i64,
    pub team_id: Team,
    pub ward_type: WardType,
    pub pos_x: f64,
    pub pos_y: f64,
    /// Game time the ward was placed at.
    pub game_time_sec: f64,
    /// Time between creation and deletion.
    pub duration_sec: f64,
    pub is_denied: bool,
    /// Filled in by a later zone classifier.
    pub region_tag: String,
}

impl WardRecord {
    pub fn position(&self) -> WorldPos {
        WorldPos::new(self.pos_x, self.pos_y)
    }

    pub fn has_position(&self) -> bool {
        !self.position().is_unknown()
    }

    /// Fraction of the natural lifetime the ward survived, in `[0, 1]`.
    pub fn duration_ratio(&self, rules: &DurationRules) -> f64 {
        let max = rules.max_duration_sec(self.ward_type);
        if max == 0 {
            return 0.0;
        }
        (self.duration_sec / max as f64).clamp(0.0, 1.0)
    }
}

/// Ward list for one match together with the match length, as served to the
/// heatmap front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionPayload {
    pub duration_sec: u32,
    pub wards: Vec<WardRecord>,
}

impl VisionPayload {
    pub fn new(duration_sec: u32, wards: Vec<WardRecord>) -> Self {
        Self {
            duration_sec,
            wards,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentry(duration_sec: f64) -> WardRecord {
        WardRecord {
            match_id: 0,
            team_id: Team::Dire,
            ward_type: WardType::Sentry,
            pos_x: 650.0,
            pos_y: 364.0,
            game_time_sec: 12.5,
            duration_sec,
            is_denied: false,
            region_tag: String::new(),
        }
    }

    #[test]
    fn serializes_with_flat_field_names() {
        let value = serde_json::to_value(sentry(30.0)).unwrap();
        let object = value.as_object().unwrap();
        let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "duration_sec",
                "game_time_sec",
                "is_denied",
                "match_id",
                "pos_x",
                "pos_y",
                "region_tag",
                "team_id",
                "ward_type",
            ]
        );
        assert_eq!(object["team_id"], 3);
        assert_eq!(object["ward_type"], "sentry");
        assert_eq!(object["region_tag"], "");
    }

    #[test]
    fn duration_ratio_is_clamped() {
        let rules = DurationRules::defaults();
        assert_eq!(sentry(210.0).duration_ratio(&rules), 0.5);
        assert_eq!(sentry(600.0).duration_ratio(&rules), 1.0);
    }
}
