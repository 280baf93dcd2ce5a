//! Error taxonomy for the decision subsystem.
//!
//! Only [`BotError::EngineUnavailable`] is unrecoverable; everything else
//! is handled locally (pass fallback, single retry, or abandoning the
//! current game) without taking the process down.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    /// The rules engine cannot be reached at all. Fatal for the
    /// subsystem; reported once and the session exits cleanly.
    #[error("rules engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The engine refused a move we judged legal, usually because our
    /// snapshot went stale between fetch and submit.
    #[error("engine rejected move at ({x}, {y}) as illegal")]
    IllegalMoveRejected { x: usize, y: usize },

    /// A transient failure on any engine call.
    #[error("engine call failed: {0}")]
    EngineCallFailed(String),

    /// Bad weights, board size, or session parameters. Fails fast at
    /// session start.
    #[error("invalid configuration: {0}")]
    ConfigurationInvalid(String),
}
