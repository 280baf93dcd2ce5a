//! Tengen: a heuristic move-decision engine for Go.
//!
//! Given a board position supplied by an external rules engine, the
//! crate decides whether to play a stone (and where) or to pass, and
//! manages the cross-turn tactical state needed to play a coherent game.
//! It is a single-ply evaluator: no tree search, no playouts.
//!
//! ## Modules
//!
//! - [`board`] - Board snapshot, cells, territory map
//! - [`chains`] - Chain/liberty analysis, eyes, score estimate
//! - [`eval`] - Weighted single-ply move evaluation
//! - [`pass`] - Pure pass decision
//! - [`focus`] - Cross-turn attack focus
//! - [`engine`] - Rules-engine trait and reply types
//! - [`orchestrator`] - Turn state machine
//! - [`session`] - Bounded multi-game session loop
//! - [`status`] - Fire-and-forget status reporting
//! - [`config`] - Weights and session configuration
//! - [`error`] - Error taxonomy
//! - [`sim`] - Built-in stand-in rules engine
//!
//! ## Example
//!
//! ```
//! use tengen::config::BotConfig;
//! use tengen::session::SessionManager;
//! use tengen::sim::SimEngine;
//! use tengen::status::NullSink;
//!
//! let mut config = BotConfig::default();
//! config.board_size = 7;
//! config.max_games = 1;
//! let engine = SimEngine::with_seed(config.board_size, config.komi, 42);
//! let mut manager = SessionManager::new(engine, config, NullSink).unwrap();
//! let summary = manager.run().unwrap();
//! assert_eq!(summary.games, 1);
//! ```

pub mod board;
pub mod chains;
pub mod config;
pub mod engine;
pub mod error;
pub mod eval;
pub mod focus;
pub mod orchestrator;
pub mod pass;
pub mod session;
pub mod sim;
pub mod status;

pub use crate::board::{Board, Cell, Point, Territory, TerritoryMap};
pub use crate::chains::{Chain, ChainId, ChainRegistry};
pub use crate::config::{BotConfig, Weights};
pub use crate::engine::{OpponentStats, RulesEngine, Snapshot, TurnReply};
pub use crate::error::BotError;
pub use crate::eval::{EvalContext, MoveEval, MoveEvaluator, Reason};
pub use crate::focus::AttackFocus;
pub use crate::orchestrator::{GameOutcome, GameSession, Orchestrator, TurnState};
pub use crate::pass::{PassContext, should_pass};
pub use crate::session::{SessionManager, SessionSummary};
pub use crate::sim::SimEngine;
pub use crate::status::{LogSink, NullSink, StatusRecord, StatusSink};
