//! Session configuration and heuristic weights.
//!
//! Ownership of these values sits outside the decision core: they arrive
//! from a config file or CLI flags, are validated once at session start,
//! and are passed through explicitly. No process-wide mutable state.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::BotError;

/// Heuristic weights for the move evaluator.
///
/// The capture weight must dominate every other positive term so that
/// capturing moves outrank everything else; `validate` enforces this.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    /// Multiplier on pressure and invasion terms.
    pub aggression: f64,
    /// Multiplier on territory terms.
    pub territory_weight: f64,
    /// Minimum post-move liberties for an invasion to count as safe.
    pub liberty_safety: usize,
    /// Moves scoring below this are discarded in favor of passing.
    pub min_move_score: f64,
    /// Score assigned to vetoed (self-atari) moves. Nothing legitimate
    /// scores this low.
    pub score_floor: f64,

    /// Per captured stone.
    pub capture: f64,
    /// Reducing an opponent chain to one liberty.
    pub atari: f64,
    /// Reducing an opponent chain to two liberties.
    pub pressure: f64,
    /// Rescuing an own chain out of atari.
    pub defense: f64,
    /// Playing into enemy territory.
    pub invasion: f64,
    /// Playing into contested territory.
    pub contested: f64,
    /// Penalty for playing deep inside secured own territory.
    pub redundant: f64,
    /// Penalty for filling an own true eye.
    pub eye_fill: f64,
    /// Forming a second eye space.
    pub eye_make: f64,
    /// Connecting two weak own chains.
    pub connect: f64,
    /// Opening-phase anchor points.
    pub anchor: f64,
    /// Opening-phase extensions from own stones.
    pub extension: f64,
    /// Continuing pressure on a tracked focus target.
    pub focus_bonus: f64,
    /// Penalty for a liberty-short deep invasion.
    pub risk: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            aggression: 1.0,
            territory_weight: 1.0,
            liberty_safety: 2,
            min_move_score: 1.0,
            score_floor: -1.0e6,
            capture: 60.0,
            atari: 45.0,
            pressure: 15.0,
            defense: 40.0,
            invasion: 12.0,
            contested: 8.0,
            redundant: 10.0,
            eye_fill: 80.0,
            eye_make: 25.0,
            connect: 20.0,
            anchor: 30.0,
            extension: 12.0,
            focus_bonus: 25.0,
            risk: 35.0,
        }
    }
}

impl Weights {
    pub fn validate(&self) -> Result<(), BotError> {
        let terms = [
            ("capture", self.capture),
            ("atari", self.atari),
            ("pressure", self.pressure),
            ("defense", self.defense),
            ("invasion", self.invasion),
            ("contested", self.contested),
            ("redundant", self.redundant),
            ("eye_fill", self.eye_fill),
            ("eye_make", self.eye_make),
            ("connect", self.connect),
            ("anchor", self.anchor),
            ("extension", self.extension),
            ("focus_bonus", self.focus_bonus),
            ("risk", self.risk),
        ];
        for (name, value) in terms {
            if !value.is_finite() || value < 0.0 {
                return Err(BotError::ConfigurationInvalid(format!(
                    "weight `{name}` must be finite and non-negative, got {value}"
                )));
            }
        }
        if !(self.aggression > 0.0 && self.aggression <= 8.0) {
            return Err(BotError::ConfigurationInvalid(format!(
                "aggression must be in (0, 8], got {}",
                self.aggression
            )));
        }
        if !(self.territory_weight >= 0.0 && self.territory_weight <= 8.0) {
            return Err(BotError::ConfigurationInvalid(format!(
                "territory_weight must be in [0, 8], got {}",
                self.territory_weight
            )));
        }
        if !(1..=4).contains(&self.liberty_safety) {
            return Err(BotError::ConfigurationInvalid(format!(
                "liberty_safety must be in 1..=4, got {}",
                self.liberty_safety
            )));
        }
        if !self.min_move_score.is_finite() {
            return Err(BotError::ConfigurationInvalid(
                "min_move_score must be finite".into(),
            ));
        }
        if !(self.score_floor <= -1.0e4) {
            return Err(BotError::ConfigurationInvalid(format!(
                "score_floor must be at most -1e4, got {}",
                self.score_floor
            )));
        }
        let dominated = terms
            .iter()
            .filter(|(name, _)| *name != "capture")
            .all(|(_, v)| *v <= self.capture);
        if !dominated {
            return Err(BotError::ConfigurationInvalid(
                "capture weight must dominate all other terms".into(),
            ));
        }
        Ok(())
    }
}

/// Full session configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Board size (NxN), 5 through 19.
    pub board_size: usize,
    /// Opponent rotation list.
    pub opponents: Vec<String>,
    /// Games to play before the session stops.
    pub max_games: u32,
    /// Delay between decision cycles, in milliseconds.
    pub move_delay_ms: u64,
    /// Per-game wall-clock budget, in seconds.
    pub game_timeout_secs: u64,
    /// Compensation points charged against the bot in score estimates.
    pub komi: f64,
    pub weights: Weights,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            board_size: 9,
            opponents: vec!["alpha".into(), "beta".into(), "gamma".into()],
            max_games: 5,
            move_delay_ms: 0,
            game_timeout_secs: 300,
            komi: 5.5,
            weights: Weights::default(),
        }
    }
}

impl BotConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, BotError> {
        let text = fs::read_to_string(path).map_err(|e| {
            BotError::ConfigurationInvalid(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: BotConfig = serde_json::from_str(&text).map_err(|e| {
            BotError::ConfigurationInvalid(format!("cannot parse {}: {e}", path.display()))
        })?;
        Ok(config)
    }

    /// Fail fast on anything a session could not run with.
    pub fn validate(&self) -> Result<(), BotError> {
        if !(5..=19).contains(&self.board_size) {
            return Err(BotError::ConfigurationInvalid(format!(
                "board_size must be in 5..=19, got {}",
                self.board_size
            )));
        }
        if self.opponents.is_empty() || self.opponents.iter().any(|o| o.trim().is_empty()) {
            return Err(BotError::ConfigurationInvalid(
                "opponents must be a non-empty list of non-empty names".into(),
            ));
        }
        if self.max_games == 0 {
            return Err(BotError::ConfigurationInvalid(
                "max_games must be at least 1".into(),
            ));
        }
        if self.game_timeout_secs == 0 {
            return Err(BotError::ConfigurationInvalid(
                "game_timeout_secs must be at least 1".into(),
            ));
        }
        if !self.komi.is_finite() || self.komi < 0.0 {
            return Err(BotError::ConfigurationInvalid(format!(
                "komi must be finite and non-negative, got {}",
                self.komi
            )));
        }
        self.weights.validate()
    }

    /// Hard cap on turns per game: three times the board area, enough
    /// for captures and replays.
    pub fn turn_cap(&self) -> usize {
        self.board_size * self.board_size * 3
    }

    pub fn move_delay(&self) -> Duration {
        Duration::from_millis(self.move_delay_ms)
    }

    pub fn game_timeout(&self) -> Duration {
        Duration::from_secs(self.game_timeout_secs)
    }
}
