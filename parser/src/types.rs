use serde::{Deserialize, Serialize};
use std::fmt;

use crate::InvalidTeamId;
use crate::game_constants::{SLOT_INDEX_BITS, SLOT_INDEX_MASK, TICKS_PER_SECOND};

/// Entity slot index. The replay recycles slots once an entity is deleted, so
/// an index alone only identifies the entity currently living in it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityIndex(pub u32);

impl EntityIndex {
    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EntityIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for EntityIndex {
    fn from(v: u32) -> Self {
        EntityIndex(v)
    }
}

/// Indirect reference to an entity as stored in ownership fields.
///
/// Newer captures encode `(serial << 14) | index`, older ones store the bare
/// slot index. Both forms are checked when resolving ownership.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityHandle(pub u64);

impl EntityHandle {
    pub fn raw(self) -> u64 {
        self.0
    }

    /// Builds the composite serial/index form of a handle.
    pub fn composite(index: EntityIndex, serial: u32) -> Self {
        EntityHandle(((serial as u64) << SLOT_INDEX_BITS) | (index.raw() as u64 & SLOT_INDEX_MASK))
    }

    /// Slot index under the composite encoding.
    pub fn index(self) -> EntityIndex {
        EntityIndex((self.0 & SLOT_INDEX_MASK) as u32)
    }

    /// Serial number under the composite encoding.
    pub fn serial(self) -> u32 {
        (self.0 >> SLOT_INDEX_BITS) as u32
    }
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Network tick counter of the replay clock.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tick(pub u32);

impl Tick {
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Seconds since tick zero.
    pub fn seconds(self) -> f64 {
        self.0 as f64 / TICKS_PER_SECOND
    }

    /// Ticks elapsed since `start`, clamped to zero.
    pub fn ticks_since(self, start: Tick) -> u32 {
        self.0.saturating_sub(start.0)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tick {}", self.0)
    }
}

impl From<u32> for Tick {
    fn from(v: u32) -> Self {
        Tick(v)
    }
}

/// Controlling side of an entity. `Unknown` means resolution failed and is
/// never a third team.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum Team {
    #[default]
    Unknown,
    Radiant,
    Dire,
}

impl Team {
    /// Accepts only the two playable team numbers.
    pub fn from_team_number(value: i64) -> Option<Team> {
        match value {
            2 => Some(Team::Radiant),
            3 => Some(Team::Dire),
            _ => None,
        }
    }

    pub fn id(self) -> i32 {
        match self {
            Team::Unknown => 0,
            Team::Radiant => 2,
            Team::Dire => 3,
        }
    }

    pub fn is_known(self) -> bool {
        self != Team::Unknown
    }
}

impl From<Team> for i32 {
    fn from(team: Team) -> i32 {
        team.id()
    }
}

impl TryFrom<i32> for Team {
    type Error = InvalidTeamId;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Team::Unknown),
            other => Team::from_team_number(other as i64).ok_or(InvalidTeamId(other)),
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Unknown => write!(f, "unknown"),
            Team::Radiant => write!(f, "radiant"),
            Team::Dire => write!(f, "dire"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WardType {
    Observer,
    Sentry,
}

impl fmt::Display for WardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WardType::Observer => write!(f, "observer"),
            WardType::Sentry => write!(f, "sentry"),
        }
    }
}

/// World-space position on the map plane.
///
/// `(0, 0)` doubles as the "position unknown" sentinel. Wards are never placed
/// at the literal map origin, so the two cannot be confused in practice.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f64,
    pub y: f64,
}

impl WorldPos {
    pub const UNKNOWN: WorldPos = WorldPos { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        WorldPos { x, y }
    }

    pub fn is_unknown(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Returns `self` unless it is the unknown sentinel.
    pub fn or(self, fallback: WorldPos) -> WorldPos {
        if self.is_unknown() { fallback } else { self }
    }
}
