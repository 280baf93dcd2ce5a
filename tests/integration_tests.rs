//! Integration tests for tengen.
//!
//! These run the full decision stack against the built-in simulation
//! engine: evaluator, pass decision, focus tracking, orchestration and
//! session accounting, end to end.

use tengen::board::{Board, Territory, TerritoryMap};
use tengen::chains::ChainRegistry;
use tengen::config::BotConfig;
use tengen::eval::{EvalContext, MoveEvaluator, Reason};
use tengen::pass::{PassContext, should_pass};
use tengen::session::SessionManager;
use tengen::sim::SimEngine;
use tengen::status::{MemorySink, NullSink};

// =============================================================================
// Helper functions
// =============================================================================

fn quick_config(board_size: usize, max_games: u32) -> BotConfig {
    let mut config = BotConfig::default();
    config.board_size = board_size;
    config.max_games = max_games;
    config.move_delay_ms = 0;
    config.game_timeout_secs = 60;
    config
}

fn evaluate_best(board: &Board, territory: &TerritoryMap) -> (tengen::Point, Reason) {
    let registry = ChainRegistry::analyze(board);
    let evaluator = MoveEvaluator::new(BotConfig::default().weights);
    let candidates: Vec<_> = board.points().filter(|&p| board.is_empty(p)).collect();
    let evals = evaluator.evaluate_all(
        board,
        &registry,
        territory,
        &EvalContext::default(),
        &candidates,
    );
    let best = evaluator.best_move(&evals).expect("a move must exist");
    (best.point, best.reason)
}

// =============================================================================
// Full session runs
// =============================================================================

#[test]
fn session_completes_all_games() {
    let config = quick_config(7, 3);
    let engine = SimEngine::with_seed(7, config.komi, 11);
    let mut manager = SessionManager::new(engine, config, NullSink).unwrap();
    let summary = manager.run().expect("session must finish");
    assert_eq!(summary.games, 3);
    assert_eq!(summary.wins + summary.losses, 3);
    assert_eq!(summary.aborted, 0, "sim engine never fails transiently");
}

#[test]
fn session_is_reproducible_with_a_seed() {
    let run = |seed: u64| {
        let config = quick_config(7, 2);
        let engine = SimEngine::with_seed(7, config.komi, seed);
        let mut manager = SessionManager::new(engine, config, NullSink).unwrap();
        manager.run().expect("session must finish")
    };
    assert_eq!(run(99), run(99));
}

#[test]
fn games_publish_status_records() {
    use tengen::orchestrator::{Orchestrator, SessionProgress};

    let config = quick_config(5, 1);
    let mut engine = SimEngine::with_seed(5, config.komi, 3);
    let mut sink = MemorySink::default();
    let mut orchestrator = Orchestrator::new(&config);
    orchestrator
        .run_game(
            &mut engine,
            "alpha",
            SessionProgress {
                games_played: 0,
                games_total: 1,
            },
            &mut sink,
        )
        .expect("game must finish");
    assert!(!sink.records.is_empty());
    let last = sink.records.last().unwrap();
    assert!(!last.active);
    assert_eq!(last.games_total, 1);
    assert!(sink.records.iter().all(|r| r.opponent == "alpha"));
}

#[test]
fn larger_board_session_still_terminates() {
    let config = quick_config(9, 1);
    let engine = SimEngine::with_seed(9, config.komi, 5);
    let mut manager = SessionManager::new(engine, config, NullSink).unwrap();
    let summary = manager.run().expect("session must finish");
    assert_eq!(summary.games, 1);
}

// =============================================================================
// Evaluator behavior through the public API
// =============================================================================

#[test]
fn empty_board_opening_picks_an_anchor() {
    let board = Board::new(7);
    let territory = TerritoryMap::contested(7);
    let (point, reason) = evaluate_best(&board, &territory);
    assert_eq!(reason, Reason::Opening);
    let anchors = tengen::eval::anchor_points(7);
    assert!(anchors.contains(&point), "{point:?} is not an anchor");
    // Never the plain center.
    assert_ne!(point, (3, 3));
}

#[test]
fn lone_atari_stone_is_captured_first() {
    let board = Board::from_rows(&[
        ".......", //
        ".......", //
        "...X...", //
        "..XOX..", //
        ".......", //
        ".......", //
        ".......",
    ]);
    let territory = TerritoryMap::contested(7);
    let (point, reason) = evaluate_best(&board, &territory);
    assert_eq!(point, (3, 4));
    assert_eq!(reason, Reason::Capture);
}

#[test]
fn evaluation_is_deterministic_across_runs() {
    let board = Board::from_rows(&[
        ".......", //
        ".XO....", //
        "..X..O.", //
        ".......", //
        "...O...", //
        ".X.....", //
        ".......",
    ]);
    let territory = TerritoryMap::contested(7);
    let first = evaluate_best(&board, &territory);
    for _ in 0..10 {
        assert_eq!(evaluate_best(&board, &territory), first);
    }
}

// =============================================================================
// Pass decision edge cases
// =============================================================================

#[test]
fn dominant_lead_on_7x7_passes() {
    // Threshold on 7x7 is 3.5; +30 clears three times that.
    let ctx = PassContext {
        score_diff: 30.0,
        move_count: 10,
        board_size: 7,
        own_weak: false,
        enemy_weak: false,
        opponent_passed: false,
    };
    assert!(should_pass(&ctx));
}

#[test]
fn answering_a_pass_while_ahead_passes() {
    let ctx = PassContext {
        score_diff: 2.0,
        move_count: 20,
        board_size: 7,
        own_weak: false,
        enemy_weak: false,
        opponent_passed: true,
    };
    assert!(should_pass(&ctx));
}

// =============================================================================
// Sim engine sanity
// =============================================================================

#[test]
fn sim_tracks_stats_across_games() {
    let config = quick_config(5, 4);
    let mut opponents_config = config.clone();
    opponents_config.opponents = vec!["rival".into()];
    let engine = SimEngine::with_seed(5, opponents_config.komi, 21);
    let mut manager = SessionManager::new(engine, opponents_config, NullSink).unwrap();
    let summary = manager.run().expect("session must finish");
    assert_eq!(summary.games, 4);
}
