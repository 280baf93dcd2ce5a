//! Contract with the external rules engine.
//!
//! The decision core never implements Go's capture or ko rules; it
//! consumes them through this trait. Implementations are expected to be
//! synchronous: submitting our action also yields the opponent's
//! resulting action, so there is no separate opponent channel.

use serde::{Deserialize, Serialize};

use crate::board::{Board, Point, TerritoryMap};
use crate::error::BotError;

/// Everything the engine reports about the current position.
#[derive(Clone, Debug)]
pub struct Snapshot {
    /// Current board, oriented from the bot's perspective.
    pub board: Board,
    /// Per-cell ownership estimate.
    pub territory: TerritoryMap,
    /// Coordinates the engine will accept as legal moves.
    pub legal_moves: Vec<Point>,
}

/// Reply to a submitted move or pass, as a tagged union per call kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnReply {
    /// The opponent answered with a stone at `(x, y)`; `captures` is the
    /// number of opponent stones our own action just removed.
    Move { x: usize, y: usize, captures: usize },
    /// The opponent passed. After our own pass this ends the game; after
    /// a stone it just hands the turn back.
    Pass { captures: usize },
    /// The engine declared the game over.
    GameOver { captures: usize },
}

/// Win/loss record the engine keeps per opponent.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize)]
pub struct OpponentStats {
    pub wins: u32,
    pub losses: u32,
    pub streak: u32,
}

/// The rules-engine collaborator.
///
/// All methods may fail with [`BotError::EngineCallFailed`] (transient,
/// retried once as a pass by the orchestrator) or
/// [`BotError::EngineUnavailable`] (fatal for the subsystem).
pub trait RulesEngine {
    /// Start or reset a game against `opponent` at `board_size`.
    fn start_game(&mut self, opponent: &str, board_size: usize) -> Result<(), BotError>;

    /// Fetch a fresh snapshot of the position.
    fn snapshot(&mut self) -> Result<Snapshot, BotError>;

    /// Play a stone at `pt`. May fail with
    /// [`BotError::IllegalMoveRejected`] when the snapshot raced the
    /// engine; the orchestrator falls back to a pass once.
    fn play(&mut self, pt: Point) -> Result<TurnReply, BotError>;

    /// Pass the turn.
    fn pass(&mut self) -> Result<TurnReply, BotError>;

    /// Win/loss/streak record against a named opponent.
    fn stats(&self, opponent: &str) -> Result<OpponentStats, BotError>;
}
