//! Ward lifecycle tracking.
//!
//! [`WardTracker`] is the entry point; the other modules are the pieces it
//! composes at each lifecycle phase.

pub mod duration;
pub mod position;
pub mod record;
pub mod state;
pub mod team;
mod tracker;

pub use duration::{DurationEvaluator, WardLifetime};
pub use position::decode_position;
pub use record::{VisionPayload, WardRecord};
pub use state::ActiveWard;
pub use team::TeamResolver;
pub use tracker::WardTracker;
