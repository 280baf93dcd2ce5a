//! Turn orchestration.
//!
//! Drives one game to completion: snapshot, pass decision, tactical
//! override, move/pass submission, opponent-reply routing, and the
//! attack-focus update. The decision core is pure; everything mutable
//! (focus, session counters, the state tag) lives here and changes
//! strictly between turns.
//!
//! Liveness: the hard turn cap (3× board area) and the per-game timeout
//! force GameOver no matter what the engine does. Transient engine
//! failures are retried once as a pass; two consecutive failures abandon
//! the game, which is reported as an abort, never a crash.

use std::thread;
use std::time::Instant;

use crate::board::Cell;
use crate::chains::{self, ChainRegistry};
use crate::config::BotConfig;
use crate::engine::{RulesEngine, TurnReply};
use crate::error::BotError;
use crate::eval::{EvalContext, MoveEval, MoveEvaluator};
use crate::focus::{AttackFocus, PRESSURE_LIBS};
use crate::pass::{PassContext, should_pass};
use crate::status::{StatusRecord, StatusSink};

/// Where the orchestrator is inside a turn.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TurnState {
    AwaitingDecision,
    Evaluating,
    CommittingMove,
    CommittingPass,
    AwaitingOpponent,
    GameOver,
}

/// How a game ended.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum GameOutcome {
    Won { score_diff: f64 },
    Lost { score_diff: f64 },
    /// Abandoned after repeated engine failures; counted against us.
    Aborted,
}

/// Per-game record, created at game start and closed at game end.
#[derive(Clone, Debug)]
pub struct GameSession {
    pub opponent: String,
    pub board_size: usize,
    /// Actions by both sides, ours and the opponent's.
    pub move_count: usize,
    pub started: Instant,
    pub opponent_passed: bool,
    /// Latest score estimate, positive when the bot leads.
    pub score_diff: f64,
}

/// Session-level progress, threaded through for status records.
#[derive(Copy, Clone, Debug)]
pub struct SessionProgress {
    pub games_played: u32,
    pub games_total: u32,
}

/// Result of a submission attempt after fallback handling.
enum Submitted {
    Reply { reply: TurnReply, fell_back: bool },
    Abort,
}

/// Run the primary engine action; on transient failure or a stale-move
/// rejection, fall back once to a pass. Two consecutive failures give up.
fn submit_with_fallback<E: RulesEngine>(
    engine: &mut E,
    failures: &mut u8,
    primary: Result<TurnReply, BotError>,
) -> Result<Submitted, BotError> {
    match primary {
        Ok(reply) => {
            *failures = 0;
            Ok(Submitted::Reply { reply, fell_back: false })
        }
        Err(BotError::EngineUnavailable(m)) => Err(BotError::EngineUnavailable(m)),
        Err(e) => {
            if matches!(e, BotError::IllegalMoveRejected { .. }) {
                log::warn!("stale snapshot: {e}; falling back to pass");
            } else {
                *failures += 1;
                log::warn!("engine call failed ({}/2): {e}; retrying as pass", failures);
                if *failures >= 2 {
                    return Ok(Submitted::Abort);
                }
            }
            match engine.pass() {
                Ok(reply) => {
                    *failures = 0;
                    Ok(Submitted::Reply { reply, fell_back: true })
                }
                Err(BotError::EngineUnavailable(m)) => Err(BotError::EngineUnavailable(m)),
                Err(e2) => {
                    *failures += 1;
                    log::warn!("pass fallback failed: {e2}; abandoning game");
                    Ok(Submitted::Abort)
                }
            }
        }
    }
}

/// Best tactical candidate: the guardrail that stops us from passing
/// away free material.
fn best_tactical(evals: &[MoveEval]) -> Option<&MoveEval> {
    let mut best: Option<&MoveEval> = None;
    for eval in evals.iter().filter(|e| e.is_tactical()) {
        match best {
            Some(b) if eval.score <= b.score => {}
            _ => best = Some(eval),
        }
    }
    best
}

/// The turn state machine. One per session; `run_game` resets all
/// per-game state on entry.
pub struct Orchestrator<'c> {
    config: &'c BotConfig,
    evaluator: MoveEvaluator,
    focus: AttackFocus,
    state: TurnState,
}

impl<'c> Orchestrator<'c> {
    pub fn new(config: &'c BotConfig) -> Self {
        Self {
            config,
            evaluator: MoveEvaluator::new(config.weights.clone()),
            focus: AttackFocus::new(),
            state: TurnState::AwaitingDecision,
        }
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    /// Play one full game against `opponent`. Returns the outcome and
    /// the closed session record. Only
    /// [`BotError::EngineUnavailable`] propagates; every other engine
    /// problem resolves into an outcome.
    pub fn run_game<E: RulesEngine>(
        &mut self,
        engine: &mut E,
        opponent: &str,
        progress: SessionProgress,
        sink: &mut dyn StatusSink,
    ) -> Result<(GameOutcome, GameSession), BotError> {
        let mut session = GameSession {
            opponent: opponent.to_string(),
            board_size: self.config.board_size,
            move_count: 0,
            started: Instant::now(),
            opponent_passed: false,
            score_diff: 0.0,
        };
        self.focus.reset();
        self.state = TurnState::AwaitingDecision;

        if let Err(e) = engine.start_game(opponent, self.config.board_size) {
            return match e {
                BotError::EngineUnavailable(m) => Err(BotError::EngineUnavailable(m)),
                other => {
                    log::warn!("could not start game against {opponent}: {other}");
                    self.state = TurnState::GameOver;
                    Ok((GameOutcome::Aborted, session))
                }
            };
        }

        let turn_cap = self.config.turn_cap();
        let mut failures = 0u8;
        let outcome = loop {
            if session.move_count >= turn_cap {
                log::warn!("turn cap {turn_cap} reached against {opponent}; forcing game over");
                break self.score_outcome(&session);
            }
            if session.started.elapsed() >= self.config.game_timeout() {
                log::warn!("game against {opponent} timed out; forcing game over");
                break self.score_outcome(&session);
            }

            self.state = TurnState::Evaluating;
            let snapshot = match engine.snapshot() {
                Ok(s) => {
                    failures = 0;
                    s
                }
                Err(BotError::EngineUnavailable(m)) => {
                    return Err(BotError::EngineUnavailable(m));
                }
                Err(e) => {
                    // No position to decide on: the retry-as-pass rule
                    // applies to this call like any other.
                    match submit_with_fallback(engine, &mut failures, Err(e))? {
                        Submitted::Reply { reply, .. } => {
                            self.focus.age();
                            session.move_count += 1;
                            self.state = TurnState::AwaitingOpponent;
                            match self.route_reply(&mut session, reply, true) {
                                Some(outcome) => break outcome,
                                None => continue,
                            }
                        }
                        Submitted::Abort => break GameOutcome::Aborted,
                    }
                }
            };

            let registry = ChainRegistry::analyze(&snapshot.board);
            self.focus.retain_valid(&registry);
            session.score_diff =
                chains::estimate_score(&snapshot.board, &snapshot.territory, self.config.komi);

            let ctx = EvalContext {
                score_diff: session.score_diff,
                pressure_points: registry.pressure_points(PRESSURE_LIBS),
                focus_targets: self.focus.targets().clone(),
            };
            let evals = self.evaluator.evaluate_all(
                &snapshot.board,
                &registry,
                &snapshot.territory,
                &ctx,
                &snapshot.legal_moves,
            );

            let pass_ctx = PassContext {
                score_diff: session.score_diff,
                move_count: session.move_count,
                board_size: session.board_size,
                own_weak: registry.any_weak(Cell::Own, PRESSURE_LIBS),
                enemy_weak: registry.any_weak(Cell::Enemy, PRESSURE_LIBS),
                opponent_passed: session.opponent_passed,
            };
            let chosen = if should_pass(&pass_ctx) {
                // Guardrail: a capture or atari prep outranks the pass
                // recommendation.
                let tactical = best_tactical(&evals);
                if let Some(t) = tactical {
                    log::debug!(
                        "pass recommended but tactical move at {:?} ({:?}) overrides",
                        t.point,
                        t.reason
                    );
                }
                tactical
            } else {
                self.evaluator
                    .best_move(&evals)
                    .filter(|e| e.score >= self.config.weights.min_move_score)
            };

            let (submitted, we_passed) = match chosen {
                Some(eval) => {
                    self.state = TurnState::CommittingMove;
                    log::debug!(
                        "playing {:?}: score {:.1}, reason {:?}",
                        eval.point,
                        eval.score,
                        eval.reason
                    );
                    let primary = engine.play(eval.point);
                    let submitted = submit_with_fallback(engine, &mut failures, primary)?;
                    let fell_back =
                        matches!(submitted, Submitted::Reply { fell_back: true, .. });
                    match &submitted {
                        Submitted::Reply { .. } if fell_back => {
                            self.state = TurnState::CommittingPass;
                            self.focus.age();
                        }
                        Submitted::Reply { .. } => self.focus.note_move(&eval.meta),
                        Submitted::Abort => {}
                    }
                    (submitted, fell_back)
                }
                None => {
                    self.state = TurnState::CommittingPass;
                    log::debug!("passing (move {})", session.move_count);
                    let primary = engine.pass();
                    let submitted = submit_with_fallback(engine, &mut failures, primary)?;
                    if matches!(submitted, Submitted::Reply { .. }) {
                        self.focus.age();
                    }
                    (submitted, true)
                }
            };

            let reply = match submitted {
                Submitted::Reply { reply, .. } => reply,
                Submitted::Abort => break GameOutcome::Aborted,
            };
            session.move_count += 1;

            self.state = TurnState::AwaitingOpponent;
            if let Some(outcome) = self.route_reply(&mut session, reply, we_passed) {
                break outcome;
            }

            sink.publish(&StatusRecord {
                active: true,
                opponent: session.opponent.clone(),
                games_played: progress.games_played,
                games_total: progress.games_total,
                score_diff: session.score_diff,
                move_count: session.move_count,
            });

            let delay = self.config.move_delay();
            if !delay.is_zero() {
                thread::sleep(delay);
            }
        };

        self.state = TurnState::GameOver;
        sink.publish(&StatusRecord {
            active: false,
            opponent: session.opponent.clone(),
            games_played: progress.games_played,
            games_total: progress.games_total,
            score_diff: session.score_diff,
            move_count: session.move_count,
        });
        Ok((outcome, session))
    }

    /// Route the engine's reply; `Some` ends the game.
    fn route_reply(
        &mut self,
        session: &mut GameSession,
        reply: TurnReply,
        we_passed: bool,
    ) -> Option<GameOutcome> {
        match reply {
            TurnReply::Move { x, y, captures } => {
                log::debug!("opponent played ({x}, {y}); our move captured {captures}");
                session.move_count += 1;
                session.opponent_passed = false;
                None
            }
            TurnReply::Pass { captures } => {
                if we_passed {
                    // Two consecutive passes end the game.
                    log::info!("both sides passed against {}", session.opponent);
                    Some(self.score_outcome(session))
                } else {
                    log::debug!("opponent passed; our move captured {captures}");
                    session.move_count += 1;
                    session.opponent_passed = true;
                    None
                }
            }
            TurnReply::GameOver { captures } => {
                log::info!(
                    "engine declared game over against {} (last captures: {captures})",
                    session.opponent
                );
                Some(self.score_outcome(session))
            }
        }
    }

    fn score_outcome(&self, session: &GameSession) -> GameOutcome {
        if session.score_diff > 0.0 {
            GameOutcome::Won {
                score_diff: session.score_diff,
            }
        } else {
            GameOutcome::Lost {
                score_diff: session.score_diff,
            }
        }
    }
}
