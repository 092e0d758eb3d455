use thiserror::Error;

/// Stream-level failures. Any of these aborts the extraction pass; field-level
/// problems never surface here and degrade to defaults instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error")]
    Io(#[from] std::io::Error),
    #[error("malformed event on line {line}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("tick went backwards from {previous} to {tick}")]
    TickRegression { previous: u32, tick: u32 },
    #[error("entity slot {index} at tick {tick} is outside the handle index range")]
    SlotOutOfRange { index: u32, tick: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Raised when a team id outside of {0, 2, 3} is deserialized.
#[derive(Debug, Error)]
#[error("invalid team id {0}")]
pub struct InvalidTeamId(pub i32);
