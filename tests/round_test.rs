//! Integration test: runs of the game
//!
//! Plays runs through the public API of [`Game`] without any timer: the countdown is driven
//! with `tick()` and the match times are simulated instants.

use std::time::{Duration, Instant};

use chromatch::difficulty::Difficulty;
use chromatch::game::{Game, Phase, Resolution, TapOutcome, TickOutcome};
use chromatch::highscores::{HighScoreEntry, HighScores};

/// Return the pairs of the current board, placeholder excluded.
fn pairs(game: &Game) -> Vec<(usize, usize)> {
    let board = game.board().unwrap();
    (0..board.len())
        .filter_map(|i| board.partner_of(i).filter(|j| i < *j).map(|j| (i, j)))
        .collect()
}

/// Start a run and hide the colors.
fn play(difficulty: Difficulty, seed: u64) -> Game {
    let mut game = Game::seeded(difficulty, seed);
    game.start().unwrap();
    assert!(game.end_memorize());
    game
}

/// Tap a pair and resolve it at the given time.
fn match_pair(game: &mut Game, pair: (usize, usize), at: Instant) -> Option<Resolution> {
    game.tap(pair.0).unwrap();
    game.tap(pair.1).unwrap();
    game.resolve(at)
}

/// Clear the board, all matches at the same instant.
fn clear_board(game: &mut Game, at: Instant) -> Option<Resolution> {
    let mut last = None;
    for pair in pairs(game) {
        last = match_pair(game, pair, at);
    }
    last
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_scenario_a_first_match_on_small_board() {
    let mut game = play(Difficulty::Easy, 11);
    let p = pairs(&game);

    assert_eq!(game.board().unwrap().pair_count(), 4);
    assert_eq!(p.len(), 4);
    match_pair(&mut game, p[0], Instant::now());

    let board = game.board().unwrap();
    assert!(board.tile(p[0].0).unwrap().is_matched);
    assert!(board.tile(p[0].1).unwrap().is_matched);
    assert_eq!(game.state().matched_pairs, 1);
}

#[test]
fn test_scenario_b_easy_flat_points() {
    let mut game = play(Difficulty::Easy, 12);
    let p = pairs(&game);
    let start = Instant::now();

    assert_eq!(game.state().time_limit, 20);
    for (i, at) in [0, 500, 30_000].into_iter().enumerate() {
        let before = game.state().score;
        match_pair(&mut game, p[i], start + Duration::from_millis(at));
        assert_eq!(game.state().score, before + 10);
    }
}

#[test]
fn test_scenario_c_hard_streak_and_time_bonus() {
    let mut game = play(Difficulty::Hard, 13);
    let p = pairs(&game);
    let start = Instant::now();

    match_pair(&mut game, p[0], start);
    match_pair(&mut game, p[1], start + Duration::from_millis(4000));
    assert_eq!(game.streak().current(), 2);

    let before = game.state().score;
    let resolution = match_pair(&mut game, p[2], start + Duration::from_millis(5000));
    assert_eq!(
        resolution,
        Some(Resolution::Match {
            points: 35,
            matched_pairs: 3
        })
    );
    assert_eq!(game.state().score, before + 35);
    assert_eq!(game.streak().current(), 3);
}

#[test]
fn test_scenario_d_medium_level_up() {
    let mut game = play(Difficulty::Medium, 14);
    let now = Instant::now();
    let p = pairs(&game);

    for pair in &p[..p.len() - 1] {
        match_pair(&mut game, *pair, now);
    }
    let before = game.state().score;
    let resolution = match_pair(&mut game, p[p.len() - 1], now);

    assert_eq!(
        resolution,
        Some(Resolution::LevelComplete {
            points: 15,
            bonus: 5,
            level: 2,
            time_limit: 60
        })
    );
    assert_eq!(game.state().score, before + 15 + 5);
    assert_eq!(game.state().current_level, 2);
    assert_eq!(game.state().matched_pairs, 0);
    assert_eq!(game.board().unwrap().grid_size(), 4);
    assert_eq!(game.phase(), Phase::Memorize);
}

#[test]
fn test_scenario_e_single_game_over() {
    let mut game = play(Difficulty::Medium, 15);
    let mut game_overs = 0;

    for _ in 0..200 {
        if game.tick() == TickOutcome::GameOver {
            game_overs += 1;
        }
    }
    assert_eq!(game_overs, 1);
    assert!(!game.state().is_game_started);
    assert_eq!(game.time_left(), 0);
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_selection_never_exceeds_two() {
    let mut game = play(Difficulty::Hard, 21);
    let len = game.board().unwrap().len();

    for index in 0..len {
        let _ = game.tap(index);
        assert!(game.selection().len() <= 2);
    }
    assert_eq!(game.selection().len(), 2);
}

#[test]
fn test_rejected_taps_do_not_change_state() {
    let mut game = play(Difficulty::Medium, 22);
    let p = pairs(&game);
    match_pair(&mut game, p[0], Instant::now());
    let before = game.snapshot();

    assert_eq!(game.tap(p[0].0), Ok(TapOutcome::Ignored));
    assert_eq!(game.snapshot(), before);

    game.tap(p[1].0).unwrap();
    let selected = game.snapshot();
    assert_eq!(game.tap(p[1].0), Ok(TapOutcome::Ignored));
    assert_eq!(game.snapshot(), selected);
}

#[test]
fn test_score_never_decreases() {
    let mut game = play(Difficulty::Hard, 23);
    let p = pairs(&game);
    let start = Instant::now();
    let mut score = 0;

    for (i, pair) in p.iter().enumerate().take(8) {
        // Every other turn is a mismatch
        if i % 2 == 1 {
            game.tap(pair.0).unwrap();
            game.tap(p[i + 1].0).unwrap();
            assert_eq!(game.resolve(start), Some(Resolution::Mismatch));
            assert!(game.state().score >= score);
            score = game.state().score;
        }
        match_pair(&mut game, *pair, start + Duration::from_millis(700 * i as u64));
        assert!(game.state().score >= score);
        score = game.state().score;
    }
}

#[test]
fn test_hard_streak_resets_after_mismatch_and_level() {
    let mut game = play(Difficulty::Hard, 24);
    let now = Instant::now();
    let p = pairs(&game);

    match_pair(&mut game, p[0], now);
    match_pair(&mut game, p[1], now);
    assert_eq!(game.streak().current(), 2);
    game.tap(p[2].0).unwrap();
    game.tap(p[3].0).unwrap();
    game.resolve(now);
    assert_eq!(game.streak().current(), 0);
    assert!(game.streak().max() >= game.streak().current());

    clear_board(&mut game, now);
    assert_eq!(game.state().current_level, 2);
    assert_eq!(game.streak().current(), 0);
    assert_eq!(game.streak().max(), 10);
}

#[test]
fn test_easy_time_limits_shrink_with_levels() {
    let mut game = play(Difficulty::Easy, 25);
    let now = Instant::now();

    for _ in 1..10 {
        assert!(matches!(
            clear_board(&mut game, now),
            Some(Resolution::LevelComplete { .. })
        ));
        game.end_memorize();
    }
    assert_eq!(game.state().current_level, 10);
    assert_eq!(game.state().time_limit, 18);
    assert_eq!(game.time_left(), 18);
    assert_eq!(game.state().score, 9 * 4 * 10);
}

#[test]
fn test_game_over_entry_reaches_high_scores() {
    let mut game = play(Difficulty::Easy, 26);
    let mut highscores = HighScores::new();

    clear_board(&mut game, Instant::now());
    game.end_memorize();
    while game.tick() != TickOutcome::GameOver {}

    let entry: HighScoreEntry = game.final_entry().unwrap();
    assert_eq!((entry.score, entry.level), (40, 2));
    assert!(highscores.is_high_score(Difficulty::Easy, entry.score));
    assert_eq!(highscores.add_score(entry), Some(1));
}

#[test]
fn test_high_score_cap_keeps_the_best() {
    let mut highscores = HighScores::new();
    let scores = [12, 90, 4, 55, 70, 3, 88, 41, 90, 17, 66];

    for s in scores {
        highscores.add_score(HighScoreEntry::new(s, 1, Difficulty::Medium));
        let kept = highscores.get_score(Difficulty::Medium).unwrap();
        assert!(kept.len() <= 5);
    }
    let kept: Vec<u32> = highscores
        .get_score(Difficulty::Medium)
        .unwrap()
        .iter()
        .map(|e| e.score)
        .collect();
    assert_eq!(kept, vec![90, 90, 88, 70, 66]);
}
