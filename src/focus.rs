//! Attack focus: cross-turn pressure memory.
//!
//! When one of our moves hurts an opponent chain (captures from it, or
//! leaves it at two liberties or fewer), the chain ids go into the focus
//! set for two turns so the evaluator keeps leaning on them. Chain ids
//! are anchors computed per snapshot and the engine may reshape chains
//! between turns, so every id is re-validated against the fresh registry
//! before it grants any bonus; ids that no longer resolve are dropped
//! silently, never treated as errors.

use std::collections::BTreeSet;

use crate::board::Cell;
use crate::chains::{ChainId, ChainRegistry};
use crate::eval::MoveMeta;

/// Liberty count at or below which a chain counts as a pressure target.
pub const PRESSURE_LIBS: usize = 2;

/// Turns a refreshed focus stays alive without further pressure.
const FOCUS_TTL: u8 = 2;

#[derive(Clone, Debug, Default)]
pub struct AttackFocus {
    targets: BTreeSet<ChainId>,
    ttl: u8,
}

impl AttackFocus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cleared at the start of every game.
    pub fn reset(&mut self) {
        self.targets.clear();
        self.ttl = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn ttl(&self) -> u8 {
        self.ttl
    }

    /// Record the outcome of our move. A move that pressured or captured
    /// from opponent chains refreshes the focus to those targets;
    /// anything else ages the focus by one turn.
    pub fn note_move(&mut self, meta: &MoveMeta) {
        if meta.targets.is_empty() {
            self.age();
        } else {
            self.targets = meta.targets.clone();
            self.ttl = FOCUS_TTL;
            log::debug!("attack focus refreshed: {} target(s)", self.targets.len());
        }
    }

    /// One turn without refreshing pressure.
    pub fn age(&mut self) {
        if self.ttl > 0 {
            self.ttl -= 1;
        }
        if self.ttl == 0 {
            self.targets.clear();
        }
    }

    /// Drop ids that no longer resolve to a live opponent chain still
    /// worth pressuring. Called once per turn on the fresh registry.
    pub fn retain_valid(&mut self, registry: &ChainRegistry) {
        self.targets.retain(|id| {
            registry
                .resolve(*id)
                .is_some_and(|c| c.owner == Cell::Enemy && c.liberty_count() <= PRESSURE_LIBS)
        });
        if self.targets.is_empty() {
            self.ttl = 0;
        }
    }

    /// The validated target set handed to the evaluator.
    pub fn targets(&self) -> &BTreeSet<ChainId> {
        &self.targets
    }
}
