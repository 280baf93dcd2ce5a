//! Pass decision.
//!
//! A pure function over the turn's summary figures: no board access, no
//! clock, no randomness. Rules are evaluated in a fixed order and the
//! first match wins, so identical inputs always produce identical
//! output. The tactical-override guardrail (play anyway when a capture
//! or atari prep is on the table) belongs to the orchestrator, not here.

/// Inputs to the pass decision, computed fresh each turn.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PassContext {
    /// Score estimate, positive when the bot leads.
    pub score_diff: f64,
    /// Moves played so far this game, both sides.
    pub move_count: usize,
    pub board_size: usize,
    /// Any own chain at two liberties or fewer.
    pub own_weak: bool,
    /// Any opponent chain at two liberties or fewer.
    pub enemy_weak: bool,
    /// The opponent passed on their previous turn.
    pub opponent_passed: bool,
}

/// Losing margin past which a lost late game is conceded.
const LARGE_LOSS: f64 = 25.0;

/// Size-scaled winning threshold.
fn threshold(board_size: usize) -> f64 {
    board_size as f64 * 0.5
}

/// Whether to end the turn without playing. First matching rule wins.
pub fn should_pass(ctx: &PassContext) -> bool {
    let margin = threshold(ctx.board_size);
    let late = ctx.move_count > ctx.board_size * ctx.board_size / 2;

    // a. Opponent passed and we are not behind: take the result.
    if ctx.opponent_passed && ctx.score_diff >= 0.0 {
        return true;
    }
    // b. Late and hopelessly behind: concede.
    if late && ctx.score_diff < -LARGE_LOSS {
        return true;
    }
    // c. Dominant lead.
    if ctx.score_diff > 3.0 * margin {
        return true;
    }
    // d. Comfortable lead with nothing of ours in danger.
    if ctx.score_diff > margin && !ctx.own_weak {
        return true;
    }
    // e. Something of ours needs help while the game is close.
    if ctx.own_weak && ctx.score_diff.abs() <= 2.0 * margin {
        return false;
    }
    // f. A target is available while the game is still in reach.
    if ctx.enemy_weak && ctx.score_diff.abs() <= 4.0 * margin {
        return false;
    }
    // g. Late and close: accept the result.
    if late && ctx.score_diff.abs() <= margin {
        return true;
    }
    // h. Keep playing.
    false
}
