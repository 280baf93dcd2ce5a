//! Single-ply move evaluation.
//!
//! Every legal candidate is scored by trying it on a scratch copy of the
//! snapshot: place the stone, lift any captured chains, flood-fill the
//! resulting group's liberties. No search beyond that one ply; the terms
//! below carry all the tactical knowledge.
//!
//! Term priority (weights in [`Weights`]):
//! self-atari veto, capture, pressure, defense, territory, eyes,
//! connectivity, opening shape, score-differential bias, focus
//! continuation. Ties break by row-major scan order, so evaluation is
//! fully deterministic for a given snapshot.

use std::collections::BTreeSet;

use crate::board::{Board, Cell, Point, Territory, TerritoryMap};
use crate::chains::{self, ChainId, ChainRegistry};
use crate::config::Weights;

/// Primary motivation behind a move's score.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Reason {
    SelfAtari,
    Capture,
    Pressure,
    Defense,
    Territory,
    Eye,
    Connect,
    Opening,
    Focus,
    Quiet,
}

/// Everything the scoring pass learned about a candidate. Consumed by
/// the orchestrator's guardrail and the attack-focus tracker.
#[derive(Clone, Debug)]
pub struct MoveMeta {
    pub own_adjacent: usize,
    pub enemy_adjacent: usize,
    pub empty_adjacent: usize,
    /// Liberties of the newly formed own group after captures resolve.
    pub liberties_after: usize,
    /// Liberties gained relative to the strongest merged own chain.
    pub liberty_gain: isize,
    pub captures: usize,
    /// Territory estimate at the point itself.
    pub territory: Territory,
    pub self_atari: bool,
    pub deep_invasion_risk: bool,
    /// Enemy chains this move leaves with exactly one liberty.
    pub ataris: usize,
    /// Enemy chains captured or pressured to two liberties or fewer.
    pub targets: BTreeSet<ChainId>,
}

/// A scored candidate.
#[derive(Clone, Debug)]
pub struct MoveEval {
    pub point: Point,
    pub score: f64,
    pub reason: Reason,
    pub meta: MoveMeta,
}

impl MoveEval {
    /// A capture, or an atari prep on a real target: the moves worth
    /// playing even when the pass rules say stop.
    pub fn is_tactical(&self) -> bool {
        !self.meta.self_atari && self.score > 0.0 && (self.meta.captures > 0 || self.meta.ataris > 0)
    }
}

/// Game context threaded into each evaluation. All fields are computed
/// fresh by the orchestrator each turn.
#[derive(Clone, Debug, Default)]
pub struct EvalContext {
    /// Current score estimate, positive when the bot leads.
    pub score_diff: f64,
    /// Liberties of weak enemy chains (registry pressure points).
    pub pressure_points: BTreeSet<Point>,
    /// Focus targets already re-validated against the current registry.
    pub focus_targets: BTreeSet<ChainId>,
}

/// Opening anchor points for a board size: the classic corner points on
/// the second/third/fourth line plus the side midpoints.
pub fn anchor_points(size: usize) -> Vec<Point> {
    let off = if size >= 13 {
        3
    } else if size >= 7 {
        2
    } else {
        1
    };
    let last = size - 1 - off;
    let mid = size / 2;
    let mut anchors = BTreeSet::new();
    anchors.extend([
        (off, off),
        (last, off),
        (off, last),
        (last, last),
        (mid, off),
        (off, mid),
        (mid, last),
        (last, mid),
    ]);
    anchors.into_iter().collect()
}

/// The move evaluator. Stateless apart from its weights; all mutable
/// game state lives in the orchestrator.
#[derive(Clone, Debug)]
pub struct MoveEvaluator {
    weights: Weights,
}

impl MoveEvaluator {
    pub fn new(weights: Weights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    /// Score every candidate in deterministic scan order.
    pub fn evaluate_all(
        &self,
        board: &Board,
        registry: &ChainRegistry,
        territory: &TerritoryMap,
        ctx: &EvalContext,
        candidates: &[Point],
    ) -> Vec<MoveEval> {
        let mut ordered: Vec<Point> = candidates.to_vec();
        ordered.sort_by_key(|&(x, y)| (y, x));
        ordered.dedup();
        ordered
            .into_iter()
            .map(|pt| self.evaluate(board, registry, territory, ctx, pt))
            .collect()
    }

    /// Best non-vetoed candidate; ties keep the earliest in scan order.
    /// Returns `None` when every candidate is vetoed — any last-resort
    /// selection past that point is the orchestrator's call, not ours.
    pub fn best_move<'a>(&self, evals: &'a [MoveEval]) -> Option<&'a MoveEval> {
        let mut best: Option<&MoveEval> = None;
        for eval in evals.iter().filter(|e| !e.meta.self_atari) {
            match best {
                Some(b) if eval.score <= b.score => {}
                _ => best = Some(eval),
            }
        }
        best
    }

    /// Score a single legal candidate.
    pub fn evaluate(
        &self,
        board: &Board,
        registry: &ChainRegistry,
        territory: &TerritoryMap,
        ctx: &EvalContext,
        pt: Point,
    ) -> MoveEval {
        let w = &self.weights;
        let trailing = ctx.score_diff < 0.0;
        let leading = ctx.score_diff > 0.0;
        // Score-differential bias on the aggressive terms.
        let bias = if trailing {
            1.25
        } else if leading {
            0.8
        } else {
            1.0
        };

        // Neighbor census.
        let mut own_adj: BTreeSet<ChainId> = BTreeSet::new();
        let mut enemy_adj: BTreeSet<ChainId> = BTreeSet::new();
        let mut empty_adjacent = 0;
        for n in board.neighbors(pt) {
            match board.get(n) {
                Some(Cell::Own) => {
                    if let Some(chain) = registry.chain_at(n) {
                        own_adj.insert(chain.id);
                    }
                }
                Some(Cell::Enemy) => {
                    if let Some(chain) = registry.chain_at(n) {
                        enemy_adj.insert(chain.id);
                    }
                }
                _ => empty_adjacent += 1,
            }
        }

        // Try the placement on a scratch board: captures first, then the
        // new group's liberties.
        let mut scratch = board.clone();
        scratch.set(pt, Cell::Own);
        let mut captures = 0usize;
        let mut captured: Vec<ChainId> = Vec::new();
        for &id in &enemy_adj {
            let Some(chain) = registry.resolve(id) else {
                continue;
            };
            // pt is adjacent and empty, so it is one of the chain's
            // liberties; one liberty total means this move fills it.
            if chain.liberty_count() == 1 {
                captures += chain.stones.len();
                captured.push(id);
                for &s in &chain.stones {
                    scratch.set(s, Cell::Empty);
                }
            }
        }
        let liberties_after = chains::group_liberties(&scratch, pt).len();

        let pre_libs = own_adj
            .iter()
            .filter_map(|&id| registry.resolve(id))
            .map(|c| c.liberty_count())
            .max()
            .unwrap_or(0);
        let liberty_gain = liberties_after as isize - pre_libs as isize;

        // Pressure census over surviving enemy neighbors.
        let mut ataris = 0usize;
        let mut targets: BTreeSet<ChainId> = captured.iter().copied().collect();
        let mut pressure_score = 0.0;
        for &id in &enemy_adj {
            if captured.contains(&id) {
                continue;
            }
            let Some(chain) = registry.resolve(id) else {
                continue;
            };
            let libs_left = chain.liberty_count().saturating_sub(1);
            match libs_left {
                1 => {
                    ataris += 1;
                    targets.insert(id);
                    pressure_score += w.atari;
                }
                2 => {
                    targets.insert(id);
                    pressure_score += w.pressure;
                }
                _ => {}
            }
        }

        let mut score = 0.0;
        // Highest positive contribution wins the reason tag.
        let mut best_term = (0.0f64, Reason::Quiet);
        fn add(score: &mut f64, best: &mut (f64, Reason), amount: f64, reason: Reason) {
            *score += amount;
            if amount > best.0 {
                *best = (amount, reason);
            }
        }

        // Capture dominates everything.
        if captures > 0 {
            add(
                &mut score,
                &mut best_term,
                w.capture * captures as f64,
                Reason::Capture,
            );
        }

        // Constricting an escape route: next to a weak chain's liberty
        // without touching the chain itself.
        if pressure_score == 0.0
            && captures == 0
            && board.neighbors(pt).any(|n| ctx.pressure_points.contains(&n))
        {
            pressure_score += w.pressure * 0.5;
        }
        if pressure_score > 0.0 {
            add(
                &mut score,
                &mut best_term,
                pressure_score * w.aggression * bias,
                Reason::Pressure,
            );
        }

        // Defense only counts when the rescue is real (two liberties or
        // better afterwards).
        if liberties_after >= 2 {
            let rescued: usize = own_adj
                .iter()
                .filter_map(|&id| registry.resolve(id))
                .filter(|c| c.in_atari())
                .map(|c| c.stones.len())
                .sum();
            if rescued > 0 {
                add(
                    &mut score,
                    &mut best_term,
                    w.defense + 2.0 * rescued as f64,
                    Reason::Defense,
                );
            }
        }

        // Territory at the point.
        let territory_here = territory.get(pt).unwrap_or(Territory::Contested);
        let deep_in_enemy = territory_here == Territory::Enemy
            && board
                .neighbors(pt)
                .all(|n| territory.get(n) == Some(Territory::Enemy));
        match territory_here {
            Territory::Enemy => add(
                &mut score,
                &mut best_term,
                w.invasion * w.territory_weight * bias,
                Reason::Territory,
            ),
            Territory::Contested => add(
                &mut score,
                &mut best_term,
                w.contested * w.territory_weight,
                Reason::Territory,
            ),
            Territory::Own => {
                let buried = board
                    .neighbors(pt)
                    .all(|n| territory.get(n) == Some(Territory::Own));
                if buried && enemy_adj.is_empty() {
                    score -= w.redundant * w.territory_weight;
                }
            }
        }

        // Eye protection: never fill a live eye of our own group.
        if chains::eyeish_owner(board, pt) == Some(Cell::Own)
            && chains::is_true_eye(board, pt, Cell::Own)
        {
            score -= w.eye_fill;
        }
        // Eye building: the placement leaves two separate eyeish spaces
        // next to the new stone.
        let eye_spaces = board
            .neighbors(pt)
            .filter(|&n| {
                scratch.is_empty(n) && chains::eyeish_owner(&scratch, n) == Some(Cell::Own)
            })
            .count();
        if eye_spaces >= 2 {
            add(&mut score, &mut best_term, w.eye_make, Reason::Eye);
        }

        // Connecting two weak own chains into one.
        let weak_merged = own_adj
            .iter()
            .filter_map(|&id| registry.resolve(id))
            .filter(|c| c.liberty_count() <= 3)
            .count();
        if weak_merged >= 2 {
            add(&mut score, &mut best_term, w.connect, Reason::Connect);
        }

        // Opening shape: anchors over plain center, short extensions
        // from our stones.
        if board.stone_count() < board.area() / 4 {
            if anchor_points(board.size()).contains(&pt) {
                add(&mut score, &mut best_term, w.anchor, Reason::Opening);
            } else if let Some(d) = nearest_own_stone_distance(board, pt) {
                if (2..=3).contains(&d) {
                    add(&mut score, &mut best_term, w.extension, Reason::Opening);
                }
            }
        }

        // Deep invasions must be liberty-safe; when not trailing they
        // are discouraged even then.
        let deep_invasion_risk = deep_in_enemy && liberties_after < w.liberty_safety;
        if deep_in_enemy {
            if deep_invasion_risk {
                score -= w.risk;
            } else if !trailing {
                score -= w.risk * 0.5;
            }
        }

        // Keep pressing targets carried over from the previous turn.
        if targets.iter().any(|id| ctx.focus_targets.contains(id)) {
            add(&mut score, &mut best_term, w.focus_bonus, Reason::Focus);
        }

        // Self-atari veto: below the floor unless the move captures.
        let self_atari = liberties_after <= 1 && captures == 0;
        let reason = if self_atari {
            score = w.score_floor;
            Reason::SelfAtari
        } else if best_term.0 > 0.0 {
            best_term.1
        } else {
            Reason::Quiet
        };

        MoveEval {
            point: pt,
            score,
            reason,
            meta: MoveMeta {
                own_adjacent: own_adj.len(),
                enemy_adjacent: enemy_adj.len(),
                empty_adjacent,
                liberties_after,
                liberty_gain,
                captures,
                territory: territory_here,
                self_atari,
                deep_invasion_risk,
                ataris,
                targets,
            },
        }
    }
}

/// Chebyshev distance to the nearest own stone, if any.
fn nearest_own_stone_distance(board: &Board, (x, y): Point) -> Option<usize> {
    board
        .points()
        .filter(|&p| board.get(p) == Some(Cell::Own))
        .map(|(sx, sy)| x.abs_diff(sx).max(y.abs_diff(sy)))
        .min()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    fn eval_setup(board: &Board) -> (ChainRegistry, TerritoryMap, EvalContext) {
        let registry = ChainRegistry::analyze(board);
        let territory = TerritoryMap::contested(board.size());
        (registry, territory, EvalContext::default())
    }

    fn all_empty(board: &Board) -> Vec<Point> {
        board.points().filter(|&p| board.is_empty(p)).collect()
    }

    #[test]
    fn empty_board_opens_on_an_anchor() {
        let board = Board::new(7);
        let (registry, territory, ctx) = eval_setup(&board);
        let evaluator = MoveEvaluator::new(Weights::default());
        let evals = evaluator.evaluate_all(&board, &registry, &territory, &ctx, &all_empty(&board));
        let best = evaluator.best_move(&evals).expect("moves available");
        let anchors = anchor_points(7);
        assert!(
            anchors.contains(&best.point),
            "expected an anchor, got {:?}",
            best.point
        );
        assert_eq!(best.reason, Reason::Opening);
        // Ties between equally scored anchors resolve to the first in
        // row-major scan order.
        assert_eq!(best.point, (2, 2));
    }

    #[test]
    fn capturing_the_atari_stone_ranks_first() {
        // Enemy stone at (3, 3) down to its last liberty at (3, 4).
        let board = Board::from_rows(&[
            ".......", //
            ".......", //
            "...X...", //
            "..XOX..", //
            ".......", //
            ".......", //
            ".......",
        ]);
        let (registry, territory, ctx) = eval_setup(&board);
        let evaluator = MoveEvaluator::new(Weights::default());
        let evals = evaluator.evaluate_all(&board, &registry, &territory, &ctx, &all_empty(&board));
        let best = evaluator.best_move(&evals).expect("moves available");
        assert_eq!(best.point, (3, 4));
        assert_eq!(best.reason, Reason::Capture);
        assert_eq!(best.meta.captures, 1);
        // Strictly above every other candidate.
        for eval in &evals {
            if eval.point != best.point {
                assert!(eval.score < best.score);
            }
        }
    }

    #[test]
    fn rescue_raising_liberties_is_defense_not_self_atari() {
        // Own three-stone chain whose only liberty is (2, 2); playing
        // there lifts the group to two liberties.
        let board = Board::from_rows(&[
            ".....", //
            ".....", //
            "OO...", //
            "XXXO.", //
            "OOO..",
        ]);
        let (registry, territory, ctx) = eval_setup(&board);
        let registry_chain = registry.chain_at((0, 3)).unwrap();
        assert!(registry_chain.in_atari());
        let evaluator = MoveEvaluator::new(Weights::default());
        let eval = evaluator.evaluate(&board, &registry, &territory, &ctx, (2, 2));
        assert!(!eval.meta.self_atari);
        assert!(eval.score > 0.0);
        assert_eq!(eval.reason, Reason::Defense);
        assert!(eval.meta.liberties_after >= 2);
    }

    #[test]
    fn self_atari_is_floored_and_never_selected() {
        // Playing (0, 0) leaves a lone stone with one liberty.
        let board = Board::from_rows(&[
            ".O...", //
            ".....", //
            "O....", //
            ".....", //
            ".....",
        ]);
        let (registry, territory, ctx) = eval_setup(&board);
        let evaluator = MoveEvaluator::new(Weights::default());
        let eval = evaluator.evaluate(&board, &registry, &territory, &ctx, (0, 0));
        assert!(eval.meta.self_atari);
        assert_eq!(eval.reason, Reason::SelfAtari);
        assert_eq!(eval.score, evaluator.weights().score_floor);
        // Even as the only candidate it is never picked here.
        let evals = vec![eval];
        assert!(evaluator.best_move(&evals).is_none());
    }

    #[test]
    fn self_atari_with_capture_is_allowed() {
        // Filling our own last outside liberty captures the enemy stone
        // first, so the veto does not apply.
        let board = Board::from_rows(&[
            "O X..", //
            "XX...", //
            ".....", //
            ".....", //
            ".....",
        ]);
        // Row strings: (0,0)=O, (1,0)=empty, (2,0)=X.
        let (registry, territory, ctx) = eval_setup(&board);
        let evaluator = MoveEvaluator::new(Weights::default());
        let eval = evaluator.evaluate(&board, &registry, &territory, &ctx, (1, 0));
        assert_eq!(eval.meta.captures, 1);
        assert!(!eval.meta.self_atari);
        assert_eq!(eval.reason, Reason::Capture);
    }

    #[test]
    fn pressure_is_graduated_by_remaining_liberties() {
        // A four-liberty enemy stone: approaching it leaves three
        // liberties, which is not yet pressure.
        let board = Board::from_rows(&[
            ".......", //
            ".......", //
            ".......", //
            "...O...", //
            ".......", //
            ".......", //
            ".......",
        ]);
        let (registry, territory, ctx) = eval_setup(&board);
        let evaluator = MoveEvaluator::new(Weights::default());
        let quiet = evaluator.evaluate(&board, &registry, &territory, &ctx, (3, 2));
        assert_eq!(quiet.meta.ataris, 0);
        assert!(quiet.meta.targets.is_empty());

        // A two-liberty chain pressured to one is an atari prep.
        let board = Board::from_rows(&[
            ".......", //
            ".XO....", //
            "..X....", //
            ".......", //
            ".......", //
            ".......", //
            ".......",
        ]);
        let (registry, territory, ctx) = eval_setup(&board);
        let prep = evaluator.evaluate(&board, &registry, &territory, &ctx, (3, 1));
        assert_eq!(prep.meta.ataris, 1);
        assert!(prep.is_tactical());
        assert_eq!(prep.reason, Reason::Pressure);
    }

    #[test]
    fn escape_route_constriction_scores_above_quiet() {
        // Enemy chain at two liberties, (2, 0) and (3, 1). Playing
        // (3, 0) touches both liberties but not the chain.
        let board = Board::from_rows(&[
            ".......", //
            ".XO....", //
            "..X....", //
            ".......", //
            ".......", //
            ".......", //
            ".......",
        ]);
        let registry = ChainRegistry::analyze(&board);
        let territory = TerritoryMap::contested(7);
        let ctx = EvalContext {
            pressure_points: registry.pressure_points(2),
            ..EvalContext::default()
        };
        let evaluator = MoveEvaluator::new(Weights::default());
        let constrict = evaluator.evaluate(&board, &registry, &territory, &ctx, (3, 0));
        let quiet = evaluator.evaluate(&board, &registry, &territory, &ctx, (5, 5));
        assert_eq!(constrict.meta.enemy_adjacent, 0);
        assert!(constrict.score > quiet.score);
    }

    #[test]
    fn focus_target_gets_continuation_bonus() {
        let board = Board::from_rows(&[
            ".......", //
            ".XO....", //
            "..X....", //
            ".......", //
            ".......", //
            ".......", //
            ".......",
        ]);
        let registry = ChainRegistry::analyze(&board);
        let territory = TerritoryMap::contested(7);
        let evaluator = MoveEvaluator::new(Weights::default());
        let enemy_id = registry.chain_at((2, 1)).unwrap().id;

        let plain = EvalContext::default();
        let focused = EvalContext {
            focus_targets: BTreeSet::from([enemy_id]),
            ..EvalContext::default()
        };
        let without = evaluator.evaluate(&board, &registry, &territory, &plain, (3, 1));
        let with = evaluator.evaluate(&board, &registry, &territory, &focused, (3, 1));
        let bonus = with.score - without.score;
        assert!((bonus - evaluator.weights().focus_bonus).abs() < 1e-9);
    }

    #[test]
    fn filling_own_eye_is_penalized() {
        let board = Board::from_rows(&[
            ".XX..", //
            "XX...", //
            ".....", //
            ".....", //
            ".....",
        ]);
        let (registry, territory, ctx) = eval_setup(&board);
        let evaluator = MoveEvaluator::new(Weights::default());
        let eval = evaluator.evaluate(&board, &registry, &territory, &ctx, (0, 0));
        assert!(eval.score < 0.0, "eye fill must score negative");
        assert!(!eval.meta.self_atari);
    }

    #[test]
    fn connecting_weak_chains_rewarded() {
        let board = Board::from_rows(&[
            "X.X....", //
            "O.O....", //
            ".......", //
            ".......", //
            ".......", //
            ".......", //
            ".......",
        ]);
        let (registry, territory, ctx) = eval_setup(&board);
        let evaluator = MoveEvaluator::new(Weights::default());
        let joined = evaluator.evaluate(&board, &registry, &territory, &ctx, (1, 0));
        assert!(joined.meta.own_adjacent >= 2);
        // The connect term contributed; compare against a far-away quiet
        // move on the same snapshot.
        let quiet = evaluator.evaluate(&board, &registry, &territory, &ctx, (5, 5));
        assert!(joined.score > quiet.score);
    }

    #[test]
    fn trailing_boosts_invasion_scores() {
        let mut territory = TerritoryMap::contested(7);
        for x in 0..7 {
            for y in 0..3 {
                territory.set((x, y), Territory::Enemy);
            }
        }
        let board = Board::new(7);
        let registry = ChainRegistry::analyze(&board);
        let evaluator = MoveEvaluator::new(Weights::default());
        let trailing = EvalContext {
            score_diff: -10.0,
            ..EvalContext::default()
        };
        let leading = EvalContext {
            score_diff: 10.0,
            ..EvalContext::default()
        };
        // Edge-of-territory point, not a deep invasion.
        let behind = evaluator.evaluate(&board, &registry, &territory, &trailing, (3, 2));
        let ahead = evaluator.evaluate(&board, &registry, &territory, &leading, (3, 2));
        assert!(behind.score > ahead.score);
    }

    #[test]
    fn deep_liberty_short_invasion_flagged() {
        let mut territory = TerritoryMap::contested(7);
        for x in 0..7 {
            for y in 0..7 {
                territory.set((x, y), Territory::Enemy);
            }
        }
        // Surrounded by enemy stones leaving two diagonal escapes: the
        // new stone has only one liberty after placement.
        let board = Board::from_rows(&[
            ".......", //
            ".......", //
            "...O...", //
            "..O.O..", //
            ".......", //
            ".......", //
            ".......",
        ]);
        let registry = ChainRegistry::analyze(&board);
        let evaluator = MoveEvaluator::new(Weights::default());
        let ctx = EvalContext::default();
        let eval = evaluator.evaluate(&board, &registry, &territory, &ctx, (3, 3));
        // One liberty left and no capture: vetoed, and the risk flag is
        // recorded for the metadata consumers.
        assert!(eval.meta.self_atari);
        assert!(eval.meta.deep_invasion_risk);
    }
}
