//! Session management: a bounded run of games against a rotation of
//! opponents.
//!
//! The session validates configuration once up front, then loops:
//! pick the opponent we have beaten least, run one game through the
//! orchestrator, account for the outcome. Games abandoned on engine
//! failures count as losses; only a vanished engine ends the session
//! early.

use crate::config::BotConfig;
use crate::engine::RulesEngine;
use crate::error::BotError;
use crate::orchestrator::{GameOutcome, Orchestrator, SessionProgress};
use crate::status::StatusSink;

/// Final tally for a session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub games: u32,
    pub wins: u32,
    /// Includes aborted games.
    pub losses: u32,
    pub aborted: u32,
}

pub struct SessionManager<E: RulesEngine, S: StatusSink> {
    engine: E,
    config: BotConfig,
    sink: S,
}

impl<E: RulesEngine, S: StatusSink> SessionManager<E, S> {
    /// Fails fast on invalid configuration.
    pub fn new(engine: E, config: BotConfig, sink: S) -> Result<Self, BotError> {
        config.validate()?;
        Ok(Self { engine, config, sink })
    }

    /// Play the configured number of games and return the tally.
    pub fn run(&mut self) -> Result<SessionSummary, BotError> {
        let mut summary = SessionSummary::default();
        let mut orchestrator = Orchestrator::new(&self.config);

        for played in 0..self.config.max_games {
            let opponent = self.pick_opponent();
            log::info!(
                "game {}/{} against {opponent}",
                played + 1,
                self.config.max_games
            );
            let progress = SessionProgress {
                games_played: played,
                games_total: self.config.max_games,
            };
            match orchestrator.run_game(&mut self.engine, &opponent, progress, &mut self.sink) {
                Ok((outcome, session)) => {
                    summary.games += 1;
                    match outcome {
                        GameOutcome::Won { score_diff } => {
                            summary.wins += 1;
                            log::info!(
                                "won against {opponent} by {score_diff:.1} after {} moves",
                                session.move_count
                            );
                        }
                        GameOutcome::Lost { score_diff } => {
                            summary.losses += 1;
                            log::info!(
                                "lost against {opponent} by {:.1} after {} moves",
                                -score_diff,
                                session.move_count
                            );
                        }
                        GameOutcome::Aborted => {
                            summary.losses += 1;
                            summary.aborted += 1;
                            log::warn!("game against {opponent} abandoned");
                        }
                    }
                }
                Err(BotError::EngineUnavailable(m)) => {
                    // Fatal for the subsystem only: report once and hand
                    // a clean exit upward.
                    log::error!("rules engine unavailable, stopping session: {m}");
                    return Err(BotError::EngineUnavailable(m));
                }
                Err(e) => {
                    summary.games += 1;
                    summary.losses += 1;
                    summary.aborted += 1;
                    log::warn!("game against {opponent} failed: {e}");
                }
            }
        }

        log::info!(
            "session complete: {} wins / {} losses over {} games ({} aborted)",
            summary.wins,
            summary.losses,
            summary.games,
            summary.aborted
        );
        Ok(summary)
    }

    /// The opponent with the fewest recorded wins against us... from our
    /// side: the one we have beaten least. Rotation order breaks ties;
    /// unanswered stats queries count as zero wins.
    fn pick_opponent(&self) -> String {
        let mut best: Option<(u32, &String)> = None;
        for name in &self.config.opponents {
            let wins = match self.engine.stats(name) {
                Ok(stats) => stats.wins,
                Err(e) => {
                    log::debug!("stats for {name} unavailable ({e}); assuming none");
                    0
                }
            };
            match best {
                Some((w, _)) if wins >= w => {}
                _ => best = Some((wins, name)),
            }
        }
        best.map(|(_, name)| name.clone())
            .unwrap_or_else(|| "unknown".to_string())
    }
}
