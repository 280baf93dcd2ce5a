//! Chain and liberty analysis.
//!
//! Builds a registry of maximal same-color chains from a board snapshot
//! using flood fill, with liberties deduplicated per chain. The registry
//! is rebuilt from scratch every decision cycle; nothing here survives a
//! turn, which is what makes stale-id handling in the focus tracker safe.
//!
//! Also hosts eye detection and the area-scoring estimate, both of which
//! read the same snapshot.

use std::collections::BTreeSet;

use crate::board::{Board, Cell, Point, Territory, TerritoryMap};

/// Identifier for a chain: its anchor, the first stone reached in
/// row-major scan order. Anchors are only meaningful for the snapshot
/// they were computed from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChainId(pub Point);

/// A maximal set of same-color orthogonally connected stones.
#[derive(Clone, Debug)]
pub struct Chain {
    pub id: ChainId,
    pub owner: Cell,
    pub stones: Vec<Point>,
    pub liberties: BTreeSet<Point>,
}

impl Chain {
    pub fn liberty_count(&self) -> usize {
        self.liberties.len()
    }

    /// A chain with exactly one liberty.
    pub fn in_atari(&self) -> bool {
        self.liberties.len() == 1
    }
}

/// Registry mapping every stone on the board to exactly one chain.
#[derive(Clone, Debug)]
pub struct ChainRegistry {
    chains: Vec<Chain>,
    /// Per-cell index into `chains`, row-major.
    index: Vec<Option<usize>>,
    size: usize,
}

impl ChainRegistry {
    /// Flood-fill every stone into its chain. O(N²): each cell is
    /// visited once as a stone and at most four times as a liberty.
    pub fn analyze(board: &Board) -> Self {
        let size = board.size();
        let mut index: Vec<Option<usize>> = vec![None; size * size];
        let mut chains = Vec::new();

        for start in board.points() {
            let owner = match board.get(start) {
                Some(Cell::Own) => Cell::Own,
                Some(Cell::Enemy) => Cell::Enemy,
                _ => continue,
            };
            if index[start.1 * size + start.0].is_some() {
                continue;
            }

            let chain_idx = chains.len();
            let mut stones = Vec::new();
            let mut liberties = BTreeSet::new();
            let mut stack = vec![start];
            while let Some(pt) = stack.pop() {
                let slot = pt.1 * size + pt.0;
                if index[slot].is_some() {
                    continue;
                }
                index[slot] = Some(chain_idx);
                stones.push(pt);
                for n in board.neighbors(pt) {
                    match board.get(n) {
                        Some(Cell::Empty) => {
                            liberties.insert(n);
                        }
                        Some(c) if c == owner => {
                            if index[n.1 * size + n.0].is_none() {
                                stack.push(n);
                            }
                        }
                        _ => {}
                    }
                }
            }

            chains.push(Chain {
                id: ChainId(start),
                owner,
                stones,
                liberties,
            });
        }

        Self { chains, index, size }
    }

    pub fn chains(&self) -> impl Iterator<Item = &Chain> {
        self.chains.iter()
    }

    /// The chain covering a stone at `pt`, if any.
    pub fn chain_at(&self, pt: Point) -> Option<&Chain> {
        if pt.0 >= self.size || pt.1 >= self.size {
            return None;
        }
        self.index[pt.1 * self.size + pt.0].map(|i| &self.chains[i])
    }

    /// Resolve a chain id from a previous turn against this registry.
    /// The anchor may now sit inside a different (or no) chain.
    pub fn resolve(&self, id: ChainId) -> Option<&Chain> {
        self.chain_at(id.0)
    }

    /// Whether any chain of `owner` has `max_libs` liberties or fewer.
    pub fn any_weak(&self, owner: Cell, max_libs: usize) -> bool {
        self.chains
            .iter()
            .any(|c| c.owner == owner && c.liberty_count() <= max_libs)
    }

    /// Liberties of every enemy chain at or below `max_libs` liberties:
    /// the coordinates where pressure can actually be applied.
    pub fn pressure_points(&self, max_libs: usize) -> BTreeSet<Point> {
        let mut points = BTreeSet::new();
        for chain in &self.chains {
            if chain.owner == Cell::Enemy && chain.liberty_count() <= max_libs {
                points.extend(chain.liberties.iter().copied());
            }
        }
        points
    }
}

/// Collect the stones of the group containing `start` (same cell value).
pub fn collect_group(board: &Board, start: Point) -> Vec<Point> {
    let Some(color) = board.get(start) else {
        return Vec::new();
    };
    if color == Cell::Empty {
        return Vec::new();
    }
    let size = board.size();
    let mut visited = vec![false; size * size];
    let mut stones = Vec::new();
    let mut stack = vec![start];
    while let Some(pt) = stack.pop() {
        let slot = pt.1 * size + pt.0;
        if visited[slot] {
            continue;
        }
        visited[slot] = true;
        stones.push(pt);
        for n in board.neighbors(pt) {
            if board.get(n) == Some(color) && !visited[n.1 * size + n.0] {
                stack.push(n);
            }
        }
    }
    stones
}

/// Unique liberty points of the group containing `start`.
pub fn group_liberties(board: &Board, start: Point) -> BTreeSet<Point> {
    let mut liberties = BTreeSet::new();
    for pt in collect_group(board, start) {
        for n in board.neighbors(pt) {
            if board.get(n) == Some(Cell::Empty) {
                liberties.insert(n);
            }
        }
    }
    liberties
}

/// The color surrounding an empty point, if all in-bounds orthogonal
/// neighbors are stones of one color. May report false eyes.
pub fn eyeish_owner(board: &Board, pt: Point) -> Option<Cell> {
    if !board.is_empty(pt) {
        return None;
    }
    let mut owner: Option<Cell> = None;
    for n in board.neighbors(pt) {
        match board.get(n) {
            Some(Cell::Empty) | None => return None,
            Some(c) => {
                if owner.is_some() && owner != Some(c) {
                    return None;
                }
                owner = Some(c);
            }
        }
    }
    owner
}

/// True-eye check: eyeish, and the diagonals give it away only within
/// tolerance (one hostile diagonal at the edge, none in the center).
pub fn is_true_eye(board: &Board, pt: Point, owner: Cell) -> bool {
    if eyeish_owner(board, pt) != Some(owner) {
        return false;
    }
    let hostile = owner.opposite();
    let diagonals: Vec<Point> = board.diagonals(pt).collect();
    let at_edge = diagonals.len() < 4;
    let bad = diagonals
        .iter()
        .filter(|d| board.get(**d) == Some(hostile))
        .count();
    let tolerance = if at_edge { 1 } else { 0 };
    bad <= tolerance
}

/// Area-scoring estimate from the bot's perspective: own stones and own
/// territory count +1, enemy's count −1, contested cells are neutral,
/// komi is charged against the bot.
pub fn estimate_score(board: &Board, territory: &TerritoryMap, komi: f64) -> f64 {
    let mut score = -komi;
    for pt in board.points() {
        match board.get(pt) {
            Some(Cell::Own) => score += 1.0,
            Some(Cell::Enemy) => score -= 1.0,
            Some(Cell::Empty) => match territory.get(pt) {
                Some(Territory::Own) => score += 1.0,
                Some(Territory::Enemy) => score -= 1.0,
                _ => {}
            },
            None => {}
        }
    }
    score
}
