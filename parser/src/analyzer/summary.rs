use serde::Serialize;

use crate::analyzer::wards::WardRecord;
use crate::types::{Team, WardType};

/// Ward counts for one side of one match.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct TeamWardCounts {
    pub observers: usize,
    pub sentries: usize,
    pub denied: usize,
    /// Wards whose position could not be decoded are left out of heatmaps.
    pub positioned: usize,
    pub average_duration_sec: f64,
}

impl TeamWardCounts {
    fn total(&self) -> usize {
        self.observers + self.sentries
    }

    fn add(&mut self, record: &WardRecord) {
        let before = self.total() as f64;
        match record.ward_type {
            WardType::Observer => self.observers += 1,
            WardType::Sentry => self.sentries += 1,
        }
        if record.is_denied {
            self.denied += 1;
        }
        if record.has_position() {
            self.positioned += 1;
        }
        self.average_duration_sec =
            (self.average_duration_sec * before + record.duration_sec) / self.total() as f64;
    }
}

/// Per-team breakdown of the wards extracted from a single replay.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct WardSummary {
    pub radiant: TeamWardCounts,
    pub dire: TeamWardCounts,
    /// Wards whose team could not be resolved.
    pub unknown: TeamWardCounts,
}

impl WardSummary {
    pub fn from_records(records: &[WardRecord]) -> Self {
        let mut summary = WardSummary::default();
        for record in records {
            summary.team_mut(record.team_id).add(record);
        }
        summary
    }

    pub fn team(&self, team: Team) -> &TeamWardCounts {
        match team {
            Team::Radiant => &self.radiant,
            Team::Dire => &self.dire,
            Team::Unknown => &self.unknown,
        }
    }

    fn team_mut(&mut self, team: Team) -> &mut TeamWardCounts {
        match team {
            Team::Radiant => &mut self.radiant,
            Team::Dire => &mut self.dire,
            Team::Unknown => &mut self.unknown,
        }
    }

    /// True when no ward could be attributed to either side.
    pub fn lacks_team_data(&self) -> bool {
        self.radiant.total() == 0 && self.dire.total() == 0
    }
}
