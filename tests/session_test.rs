//! Integration test: game session
//!
//! Runs sessions with short timers and a bot that reads the tile colors from the snapshots.

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use chromatch::config::{GameConfig, Preferences};
use chromatch::difficulty::Difficulty;
use chromatch::game::{Game, Phase, Snapshot};
use chromatch::highscores::HighScoreEntry;
use chromatch::progress::GameProgress;
use chromatch::saver::{JsonStore, MemoryStore, Store};
use chromatch::scoring::DifficultyBands;
use chromatch::session::{Command, Event, Session, SoundCue};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn test_dir() -> PathBuf {
    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!("chromatch-session-{}-{id}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

/// Short timers. The countdown is slow unless `tick` says otherwise.
fn fast_config(tick: Duration) -> GameConfig {
    GameConfig {
        match_delay: Duration::from_millis(5),
        mismatch_delay: Duration::from_millis(5),
        tick,
        memorize: Some(Duration::from_millis(10)),
        ..GameConfig::default()
    }
}

fn game(difficulty: Difficulty, config: GameConfig) -> Game {
    Game::with_config(difficulty, config, StdRng::seed_from_u64(31))
}

/// Collect events until `done` returns true. Panic after five seconds.
fn wait_for(session: &Session, mut done: impl FnMut(&Event) -> bool) -> Vec<Event> {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut seen = Vec::new();

    loop {
        match session.events().try_recv() {
            Ok(event) => {
                let stop = done(&event);
                seen.push(event);
                if stop {
                    return seen;
                }
            }
            Err(_) => {
                assert!(Instant::now() < deadline, "timed out after {seen:?}");
                thread::sleep(Duration::from_millis(2));
            }
        }
    }
}

/// Wait for the play phase and return its snapshot.
fn wait_for_play(session: &Session) -> Snapshot {
    let events = wait_for(
        session,
        |e| matches!(e, Event::Snapshot(s) if s.phase == Phase::Play),
    );
    match events.last() {
        Some(Event::Snapshot(s)) => s.clone(),
        other => panic!("unexpected event {other:?}"),
    }
}

/// Return the pairs of the snapshot that are not matched yet.
fn open_pairs(snapshot: &Snapshot) -> Vec<(usize, usize)> {
    let tiles = &snapshot.tiles;
    let mut pairs = Vec::new();
    for i in 0..tiles.len() {
        if tiles[i].is_matched {
            continue;
        }
        if let Some(j) = (i + 1..tiles.len()).find(|j| tiles[i].pairs_with(&tiles[*j])) {
            pairs.push((i, j));
        }
    }
    pairs
}

/// Match every pair of the board and return the events up to the level completion.
fn clear_level(session: &Session) -> Vec<Event> {
    let snapshot = wait_for_play(session);
    clear_board(session, &snapshot)
}

/// Match every pair of the snapshot's board.
fn clear_board(session: &Session, snapshot: &Snapshot) -> Vec<Event> {
    let pairs = open_pairs(snapshot);
    let mut events = Vec::new();

    for (n, (first, second)) in pairs.iter().enumerate() {
        session.send(Command::Tap(*first));
        session.send(Command::Tap(*second));
        let last = n + 1 == pairs.len();
        events.extend(wait_for(session, |e| {
            if last {
                matches!(e, Event::LevelComplete { .. })
            } else {
                matches!(e, Event::Matched { .. })
            }
        }));
    }
    events
}

#[test]
fn test_level_played_through_session() {
    let store = MemoryStore::new(Preferences::default());
    let session = Session::spawn(
        game(Difficulty::Easy, fast_config(Duration::from_secs(10))),
        Box::new(store),
    );

    session.send(Command::Start);
    let events = clear_level(&session);

    let matched: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            Event::Matched { points, .. } => Some(*points),
            _ => None,
        })
        .collect();
    assert_eq!(matched, vec![10, 10, 10, 10]);
    assert_eq!(
        events.last(),
        Some(&Event::LevelComplete {
            level: 2,
            bonus: 0,
            time_limit: 20
        })
    );
    assert!(events.contains(&Event::Sound(SoundCue::MatchFound)));

    // The next board is revealed, then played
    let events = wait_for(&session, |e| matches!(e, Event::Snapshot(s) if s.phase == Phase::Play));
    assert!(events.contains(&Event::Sound(SoundCue::LevelComplete)));
    match events.last() {
        Some(Event::Snapshot(s)) => {
            assert_eq!(s.state.current_level, 2);
            assert_eq!(s.state.score, 40);
            assert_eq!(s.state.matched_pairs, 0);
        }
        other => panic!("unexpected event {other:?}"),
    }
    session.exit();
}

#[test]
fn test_mismatch_through_session() {
    let session = Session::spawn(
        game(Difficulty::Medium, fast_config(Duration::from_secs(10))),
        Box::new(MemoryStore::default()),
    );

    session.send(Command::Start);
    let snapshot = wait_for_play(&session);
    let pairs = open_pairs(&snapshot);
    session.send(Command::Tap(pairs[0].0));
    session.send(Command::Tap(pairs[1].0));

    let events = wait_for(&session, |e| matches!(e, Event::Mismatched { .. }));
    assert!(events.contains(&Event::Selected(pairs[0].0)));
    assert_eq!(
        events.last(),
        Some(&Event::Mismatched {
            first: pairs[0].0,
            second: pairs[1].0
        })
    );
    let events = wait_for(&session, |e| matches!(e, Event::Snapshot(_)));
    match events.last() {
        Some(Event::Snapshot(s)) => {
            assert!(s.selection.is_empty());
            assert_eq!(s.state.score, 0);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn test_sound_follows_preferences() {
    let preferences = Preferences {
        sound_enabled: false,
        ..Preferences::default()
    };
    let session = Session::spawn(
        game(Difficulty::Easy, fast_config(Duration::from_secs(10))),
        Box::new(MemoryStore::new(preferences)),
    );

    session.send(Command::Start);
    let events = clear_level(&session);
    assert!(!events.iter().any(|e| matches!(e, Event::Sound(_))));
}

#[test]
fn test_resume_saved_run() {
    let store = MemoryStore::default();
    store
        .save_progress(&GameProgress::new(Difficulty::Hard, 12, 640))
        .unwrap();
    let session = Session::spawn(
        game(Difficulty::Hard, fast_config(Duration::from_secs(10))),
        Box::new(store),
    );

    session.send(Command::Start);
    let events = wait_for(&session, |e| matches!(e, Event::ResumeAvailable(_)));
    match events.last() {
        Some(Event::ResumeAvailable(p)) => assert_eq!((p.level, p.score), (12, 640)),
        other => panic!("unexpected event {other:?}"),
    }

    session.send(Command::ResumeSaved);
    let snapshot = wait_for_play(&session);
    assert_eq!(snapshot.state.current_level, 12);
    assert_eq!(snapshot.state.score, 640);
    assert_eq!(snapshot.state.time_limit, 150);
    assert_eq!(snapshot.time_left, 150);
    assert_eq!(snapshot.tiles.len(), 25);
}

#[test]
fn test_new_game_discards_saved_run() {
    let dir = test_dir();
    JsonStore::new(dir.clone(), 5)
        .save_progress(&GameProgress::new(Difficulty::Medium, 3, 90))
        .unwrap();
    let session = Session::spawn(
        game(Difficulty::Medium, fast_config(Duration::from_secs(10))),
        Box::new(JsonStore::new(dir.clone(), 5)),
    );

    session.send(Command::Start);
    wait_for(&session, |e| matches!(e, Event::ResumeAvailable(_)));
    session.send(Command::NewGame);
    let snapshot = wait_for_play(&session);
    assert_eq!(snapshot.state.current_level, 1);
    assert_eq!(snapshot.state.score, 0);

    // Level 1: nothing is saved when leaving
    session.exit();
    let store = JsonStore::new(dir, 5);
    assert_eq!(store.load_progress(Difficulty::Medium).unwrap(), None);
}

#[test]
fn test_exit_after_level_one_saves_progress() {
    let dir = test_dir();
    let session = Session::spawn(
        game(Difficulty::Easy, fast_config(Duration::from_secs(10))),
        Box::new(JsonStore::new(dir.clone(), 5)),
    );

    session.send(Command::Start);
    clear_level(&session);
    session.exit();

    let progress = JsonStore::new(dir, 5)
        .load_progress(Difficulty::Easy)
        .unwrap()
        .unwrap();
    assert_eq!((progress.level, progress.score), (2, 40));
}

#[test]
fn test_game_over_records_high_score() {
    let mut config = fast_config(Duration::from_millis(10));
    config.time_limits.easy = DifficultyBands {
        bands: Vec::new(),
        floor_seconds: 3,
    };
    let session = Session::spawn(
        game(Difficulty::Easy, config),
        Box::new(MemoryStore::default()),
    );

    session.send(Command::Start);
    let events = wait_for(&session, |e| matches!(e, Event::NewHighScore { .. }));

    let game_overs = events
        .iter()
        .filter(|e| matches!(e, Event::GameOver { .. }))
        .count();
    assert_eq!(game_overs, 1);
    assert!(events.contains(&Event::GameOver { score: 0, level: 1 }));
    assert!(events.contains(&Event::Sound(SoundCue::GameOver)));
    assert!(events.contains(&Event::TimeLeft(0)));
    assert_eq!(
        events.last(),
        Some(&Event::NewHighScore {
            difficulty: Difficulty::Easy,
            position: 1
        })
    );

    // A new run starts from level 1
    session.send(Command::TryAgain);
    let snapshot = wait_for_play(&session);
    assert_eq!(snapshot.state.current_level, 1);
    assert_eq!(snapshot.time_left, 3);
}

#[test]
fn test_pause_freezes_countdown() {
    let mut config = fast_config(Duration::from_millis(20));
    config.time_limits.medium = DifficultyBands {
        bands: Vec::new(),
        floor_seconds: 200,
    };
    let session = Session::spawn(
        game(Difficulty::Medium, config),
        Box::new(MemoryStore::default()),
    );

    session.send(Command::Start);
    wait_for_play(&session);
    wait_for(&session, |e| matches!(e, Event::TimeLeft(_)));

    session.send(Command::Pause);
    let events = wait_for(&session, |e| matches!(e, Event::Snapshot(s) if s.paused));
    let frozen = match events.last() {
        Some(Event::Snapshot(s)) => s.time_left,
        other => panic!("unexpected event {other:?}"),
    };

    thread::sleep(Duration::from_millis(200));
    while let Ok(event) = session.events().try_recv() {
        assert!(!matches!(event, Event::TimeLeft(_)), "tick while paused");
    }

    session.send(Command::Resume);
    let events = wait_for(&session, |e| matches!(e, Event::TimeLeft(_)));
    assert_eq!(events.last(), Some(&Event::TimeLeft(frozen - 1)));
}

#[test]
fn test_resume_without_pause_keeps_ticking() {
    let mut config = fast_config(Duration::from_millis(40));
    config.time_limits.medium = DifficultyBands {
        bands: Vec::new(),
        floor_seconds: 200,
    };
    let session = Session::spawn(
        game(Difficulty::Medium, config),
        Box::new(MemoryStore::default()),
    );

    session.send(Command::Start);
    wait_for_play(&session);

    // Foreground signals without any background signal in between
    let mut ticks = 0;
    let end = Instant::now() + Duration::from_millis(600);
    while Instant::now() < end {
        session.send(Command::Resume);
        thread::sleep(Duration::from_millis(20));
        while let Ok(event) = session.events().try_recv() {
            if matches!(event, Event::TimeLeft(_)) {
                ticks += 1;
            }
        }
    }
    assert!(ticks >= 5, "countdown stalled: {ticks} ticks");
}

/// Store whose operations all fail.
struct BrokenStore;

impl Store for BrokenStore {
    fn load_progress(&self, _: Difficulty) -> Result<Option<GameProgress>, Box<dyn Error>> {
        Err("disk unavailable".into())
    }

    fn save_progress(&self, _: &GameProgress) -> Result<(), Box<dyn Error>> {
        Err("disk unavailable".into())
    }

    fn delete_progress(&self, _: Difficulty) -> Result<(), Box<dyn Error>> {
        Err("disk unavailable".into())
    }

    fn insert_high_score(&self, _: HighScoreEntry) -> Result<Option<usize>, Box<dyn Error>> {
        Err("disk unavailable".into())
    }

    fn top_high_scores(
        &self,
        _: Option<Difficulty>,
        _: usize,
    ) -> Result<Vec<HighScoreEntry>, Box<dyn Error>> {
        Err("disk unavailable".into())
    }

    fn evict_below_cap(&self, _: Difficulty, _: usize) -> Result<(), Box<dyn Error>> {
        Err("disk unavailable".into())
    }

    fn load_preferences(&self) -> Result<Preferences, Box<dyn Error>> {
        Err("disk unavailable".into())
    }
}

#[test]
fn test_store_failures_do_not_stop_the_run() {
    let mut config = fast_config(Duration::from_millis(10));
    config.time_limits.easy = DifficultyBands {
        bands: Vec::new(),
        floor_seconds: 30,
    };
    let session = Session::spawn(game(Difficulty::Easy, config), Box::new(BrokenStore));

    // The failed load means no resume offer: the run starts at level 1
    session.send(Command::Start);
    let events = wait_for(
        &session,
        |e| matches!(e, Event::Snapshot(s) if s.phase == Phase::Play),
    );
    assert!(!events.iter().any(|e| matches!(e, Event::ResumeAvailable(_))));
    let snapshot = match events.last() {
        Some(Event::Snapshot(s)) => s.clone(),
        other => panic!("unexpected event {other:?}"),
    };
    assert_eq!(snapshot.state.current_level, 1);
    clear_board(&session, &snapshot);

    let events = wait_for(&session, |e| matches!(e, Event::GameOver { .. }));
    assert_eq!(
        events.last(),
        Some(&Event::GameOver {
            score: 40,
            level: 2
        })
    );

    // No high score event, and the session still answers
    session.send(Command::TryAgain);
    let events = wait_for(
        &session,
        |e| matches!(e, Event::Snapshot(s) if s.phase == Phase::Play),
    );
    assert!(!events.iter().any(|e| matches!(e, Event::NewHighScore { .. })));
    match events.last() {
        Some(Event::Snapshot(s)) => {
            assert_eq!(s.state.current_level, 1);
            assert_eq!(s.state.score, 0);
        }
        other => panic!("unexpected event {other:?}"),
    }
    session.exit();
}

#[test]
fn test_ticks_only_send_time_left() {
    let mut config = fast_config(Duration::from_millis(10));
    config.time_limits.hard = DifficultyBands {
        bands: Vec::new(),
        floor_seconds: 200,
    };
    let session = Session::spawn(
        game(Difficulty::Hard, config),
        Box::new(MemoryStore::default()),
    );

    session.send(Command::Start);
    wait_for_play(&session);
    wait_for(&session, |e| matches!(e, Event::TimeLeft(_)));

    let mut count = 0;
    let events = wait_for(&session, |e| {
        if matches!(e, Event::TimeLeft(_)) {
            count += 1;
        }
        count == 5
    });
    assert_eq!(events.len(), 5);
    assert!(events.iter().all(|e| matches!(e, Event::TimeLeft(_))));
}
