//! Built-in rules engine used by the CLI and tests.
//!
//! Implements just enough of the game to stand in for the real engine
//! process: stone placement with capture resolution, suicide rejection,
//! an eyeish territory estimate, and a random opponent that refuses to
//! fill its own true eyes. The decision core only ever talks to this
//! through the [`RulesEngine`] trait.

use std::collections::HashMap;

use crate::board::{Board, Cell, Point, Territory, TerritoryMap};
use crate::chains;
use crate::engine::{OpponentStats, RulesEngine, Snapshot, TurnReply};
use crate::error::BotError;

pub struct SimEngine {
    board: Board,
    opponent: String,
    komi: f64,
    game_over: bool,
    /// Actions taken this game, both sides.
    moves: usize,
    records: HashMap<String, OpponentStats>,
    rng: fastrand::Rng,
}

impl SimEngine {
    pub fn new(board_size: usize, komi: f64) -> Self {
        Self::with_seed(board_size, komi, fastrand::u64(..))
    }

    /// Deterministic variant for tests and reproducible demos.
    pub fn with_seed(board_size: usize, komi: f64, seed: u64) -> Self {
        Self {
            board: Board::new(board_size),
            opponent: String::new(),
            komi,
            game_over: false,
            moves: 0,
            records: HashMap::new(),
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Place a stone, resolving captures. Fails on occupied points and
    /// suicide, leaving the board untouched.
    fn place(&mut self, pt: Point, color: Cell) -> Result<usize, ()> {
        if !self.board.is_empty(pt) {
            return Err(());
        }
        self.board.set(pt, color);

        let hostile = color.opposite();
        let mut captured: Vec<Point> = Vec::new();
        let neighbors: Vec<Point> = self.board.neighbors(pt).collect();
        for n in neighbors {
            if self.board.get(n) == Some(hostile)
                && !captured.contains(&n)
                && chains::group_liberties(&self.board, n).is_empty()
            {
                captured.extend(chains::collect_group(&self.board, n));
            }
        }
        for &c in &captured {
            self.board.set(c, Cell::Empty);
        }

        if captured.is_empty() && chains::group_liberties(&self.board, pt).is_empty() {
            // Undo the suicidal stone.
            self.board.set(pt, Cell::Empty);
            return Err(());
        }
        Ok(captured.len())
    }

    /// All placements `color` could legally make, by clone-and-test.
    fn legal_for(&self, color: Cell) -> Vec<Point> {
        self.board
            .points()
            .filter(|&pt| self.board.is_empty(pt))
            .filter(|&pt| {
                let mut probe = self.clone_board_only();
                probe.place(pt, color).is_ok()
            })
            .collect()
    }

    fn clone_board_only(&self) -> SimEngine {
        SimEngine {
            board: self.board.clone(),
            opponent: String::new(),
            komi: self.komi,
            game_over: false,
            moves: 0,
            records: HashMap::new(),
            rng: fastrand::Rng::with_seed(0),
        }
    }

    /// Random legal move for the opponent, avoiding its own true eyes.
    /// `None` means the opponent passes.
    fn opponent_move(&mut self) -> Option<Point> {
        let mut candidates: Vec<Point> = self
            .legal_for(Cell::Enemy)
            .into_iter()
            .filter(|&pt| !chains::is_true_eye(&self.board, pt, Cell::Enemy))
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let i = self.rng.usize(..candidates.len());
        Some(candidates.swap_remove(i))
    }

    /// Eyeish estimate: stones own their cells, surrounded empties go to
    /// the surrounding color, everything else is contested.
    fn territory_estimate(&self) -> TerritoryMap {
        let mut map = TerritoryMap::contested(self.board.size());
        for pt in self.board.points() {
            let t = match self.board.get(pt) {
                Some(Cell::Own) => Territory::Own,
                Some(Cell::Enemy) => Territory::Enemy,
                _ => match chains::eyeish_owner(&self.board, pt) {
                    Some(Cell::Own) => Territory::Own,
                    Some(Cell::Enemy) => Territory::Enemy,
                    _ => Territory::Contested,
                },
            };
            map.set(pt, t);
        }
        map
    }

    fn finish_game(&mut self) {
        self.game_over = true;
        let territory = self.territory_estimate();
        let score = chains::estimate_score(&self.board, &territory, self.komi);
        let record = self.records.entry(self.opponent.clone()).or_default();
        if score > 0.0 {
            record.wins += 1;
            record.streak += 1;
        } else {
            record.losses += 1;
            record.streak = 0;
        }
        log::debug!(
            "sim game against {} finished, score {score:.1} ({} moves)",
            self.opponent,
            self.moves
        );
    }

    fn ensure_active(&self) -> Result<(), BotError> {
        if self.game_over {
            return Err(BotError::EngineCallFailed("game already over".into()));
        }
        if self.opponent.is_empty() {
            return Err(BotError::EngineCallFailed("no game in progress".into()));
        }
        Ok(())
    }

    /// Let the opponent answer our action. `we_passed` decides whether a
    /// silent opponent ends the game or merely hands the turn back.
    fn opponent_turn(&mut self, captures: usize, we_passed: bool) -> TurnReply {
        match self.opponent_move() {
            Some(pt) => {
                // Legality was probed above; a failure here means the
                // probe and the board diverged, which would be a bug.
                if self.place(pt, Cell::Enemy).is_err() {
                    log::warn!("sim opponent produced an illegal move at {pt:?}");
                    self.finish_game();
                    return TurnReply::GameOver { captures };
                }
                self.moves += 1;
                TurnReply::Move {
                    x: pt.0,
                    y: pt.1,
                    captures,
                }
            }
            None => {
                if we_passed {
                    self.finish_game();
                }
                TurnReply::Pass { captures }
            }
        }
    }
}

impl RulesEngine for SimEngine {
    fn start_game(&mut self, opponent: &str, board_size: usize) -> Result<(), BotError> {
        self.board = Board::new(board_size);
        self.opponent = opponent.to_string();
        self.game_over = false;
        self.moves = 0;
        Ok(())
    }

    fn snapshot(&mut self) -> Result<Snapshot, BotError> {
        self.ensure_active()?;
        Ok(Snapshot {
            board: self.board.clone(),
            territory: self.territory_estimate(),
            legal_moves: self.legal_for(Cell::Own),
        })
    }

    fn play(&mut self, pt: Point) -> Result<TurnReply, BotError> {
        self.ensure_active()?;
        let captures = self
            .place(pt, Cell::Own)
            .map_err(|_| BotError::IllegalMoveRejected { x: pt.0, y: pt.1 })?;
        self.moves += 1;
        Ok(self.opponent_turn(captures, false))
    }

    fn pass(&mut self) -> Result<TurnReply, BotError> {
        self.ensure_active()?;
        self.moves += 1;
        Ok(self.opponent_turn(0, true))
    }

    fn stats(&self, opponent: &str) -> Result<OpponentStats, BotError> {
        Ok(self.records.get(opponent).copied().unwrap_or_default())
    }
}
