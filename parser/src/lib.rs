//! Reconstructs ward placements from the entity event stream of a recorded
//! Dota 2 match.
//!
//! The replay decoder is expected to emit one [`entity::EntityEvent`] per
//! entity lifecycle notification, in tick order. [`extract_wards`] turns such
//! a stream into one [`analyzer::wards::WardRecord`] per ward that was
//! destroyed during the match.

pub mod analyzer;
pub mod entity;
mod error;
pub mod event_log;
mod extract;
pub mod game_constants;
pub mod slots;
pub mod types;
pub mod world;

pub use error::*;
pub use event_log::{EventStream, ReplayFile};
pub use extract::{ExtractOptions, ExtractOptionsBuilder, extract_events, extract_wards, run_analyzers};
