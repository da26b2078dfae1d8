/*
game.rs

Copyright 2025 Hervé Quatremain

This file is part of Chromatch.

Chromatch is free software: you can redistribute it and/or modify it under the
terms of the GNU General Public License as published by the Free Software
Foundation, either version 3 of the License, or (at your option) any later
version.

Chromatch is distributed in the hope that it will be useful, but WITHOUT ANY
WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR
A PARTICULAR PURPOSE. See the GNU General Public License for more details.

You should have received a copy of the GNU General Public License along with
Chromatch. If not, see <https://www.gnu.org/licenses/>.

SPDX-License-Identifier: GPL-3.0-or-later
*/

//! Manage the status of a run in progress.
//!
//! A [`Game`] object goes through the following phases:
//!
//! ```text
//! Idle -> Memorize -> Play <-> Resolving
//!            ^         |          |
//!            |         v          | all pairs matched (level up)
//!            |      GameOver      |
//!            +--------------------+
//! ```
//!
//! * [`Game::start`] generates a board and reveals the colors ([`Phase::Memorize`]).
//! * [`Game::end_memorize`] hides the colors and starts the countdown ([`Phase::Play`]).
//! * [`Game::tap`] selects tiles. The second tile moves the game to [`Phase::Resolving`].
//! * [`Game::resolve`] scores the pair. When the last pair is matched, the level is increased
//!   and a new board goes to [`Phase::Memorize`].
//! * [`Game::tick`] decrements the countdown. At zero the run is over ([`Phase::GameOver`]).
//! * [`Game::try_again`] starts a new run from level 1.
//!
//! The object does not own any timer: the caller decides when to end the memorize phase, when
//! to resolve a pair, and when to tick. See [`crate::session`] for a driver that does that.

use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::time::{Duration, Instant};

use crate::config::GameConfig;
use crate::difficulty::Difficulty;
use crate::generator::board::{Board, BoardError, Tile};
use crate::highscores::HighScoreEntry;
use crate::progress::GameProgress;
use crate::scoring;
use crate::selection::SelectionBuffer;
use crate::streak::StreakState;

/// Type of errors.
#[derive(Debug, PartialEq, Clone)]
pub enum GameError {
    /// Error from the board, such as an index out of range.
    Board(BoardError),

    /// The operation is not allowed in the current phase.
    WrongPhase(Phase),

    /// The saved run is for another difficulty.
    DifficultyMismatch {
        expected: Difficulty,
        found: Difficulty,
    },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GameError::Board(e) => write!(f, "{e}"),
            GameError::WrongPhase(p) => write!(f, "operation not allowed in the {p:?} phase"),
            GameError::DifficultyMismatch { expected, found } => {
                write!(f, "saved run is for {found}, not {expected}")
            }
        }
    }
}

impl Error for GameError {}

impl From<BoardError> for GameError {
    fn from(e: BoardError) -> Self {
        GameError::Board(e)
    }
}

/// Phase of the run.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No board yet. The caller might offer to resume a saved run.
    Idle,

    /// The colors are visible.
    Memorize,

    /// The colors are hidden and the countdown is running.
    Play,

    /// Two tiles are face up and the pair must be resolved.
    Resolving,

    /// The countdown reached zero.
    GameOver,
}

/// Counters of the run, as displayed to the player.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RoundState {
    pub grid_size: usize,

    /// Countdown duration for the current level, in seconds.
    pub time_limit: u32,

    /// Starts at 1.
    pub current_level: u32,

    /// Never decreases during a run.
    pub score: u32,

    /// Pairs matched on the current board.
    pub matched_pairs: usize,

    /// Whether the countdown is running (play phase).
    pub is_game_started: bool,
}

/// Result of a tap on a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// The tap has no effect.
    Ignored,

    /// The tile is face up, waiting for a second tile.
    Selected,

    /// The tile is the second of a pair. Call [`Game::resolve`] to score it.
    PairComplete { is_match: bool },
}

/// Result of resolving a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The two tiles are matched.
    Match { points: u32, matched_pairs: usize },

    /// The two tiles are matched and they were the last pair of the board. A new board is in
    /// the memorize phase.
    LevelComplete {
        points: u32,
        bonus: u32,
        level: u32,
        time_limit: u32,
    },

    /// The two tiles are turned face down.
    Mismatch,
}

/// Result of a countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The countdown is not running (not playing, or paused).
    Ignored,

    /// Remaining seconds.
    Running(u32),

    /// The countdown just reached zero.
    GameOver,
}

/// Everything a renderer needs to draw the run.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub difficulty: Difficulty,
    pub phase: Phase,
    pub state: RoundState,
    pub tiles: Vec<Tile>,
    pub selection: Vec<usize>,
    pub time_left: u32,
    pub paused: bool,

    /// Whether the colors must be drawn (memorize phase).
    pub reveal: bool,
    pub streak: u32,
    pub max_streak: u32,
}

/// Manage the status of the run in progress.
#[derive(Debug)]
pub struct Game {
    difficulty: Difficulty,

    /// Gameplay tunables.
    config: GameConfig,

    /// Level, score, and time limit.
    state: RoundState,

    /// Current board. None before the first call to [`Game::start`].
    board: Option<Board>,

    /// Tiles face up.
    selection: SelectionBuffer,

    /// Streak counters and time of the last match.
    streak: StreakState,

    phase: Phase,

    /// Whether the player or the host paused the countdown.
    paused: bool,

    /// Remaining seconds in the countdown.
    time_left: u32,

    /// Random generator for the boards.
    rng: StdRng,
}

impl Game {
    /// Create a [`Game`] object with the default settings.
    pub fn new(difficulty: Difficulty) -> Self {
        Self::with_config(difficulty, GameConfig::default(), StdRng::from_os_rng())
    }

    /// Create a [`Game`] object with reproducible boards.
    pub fn seeded(difficulty: Difficulty, seed: u64) -> Self {
        Self::with_config(
            difficulty,
            GameConfig::default(),
            StdRng::seed_from_u64(seed),
        )
    }

    /// Create a [`Game`] object.
    pub fn with_config(difficulty: Difficulty, config: GameConfig, rng: StdRng) -> Self {
        let time_limit: u32 = config.time_limits.time_limit(1, difficulty);
        Self {
            difficulty,
            config,
            state: RoundState {
                grid_size: difficulty.grid_size(),
                time_limit,
                current_level: 1,
                score: 0,
                matched_pairs: 0,
                is_game_started: false,
            },
            board: None,
            selection: SelectionBuffer::new(),
            streak: StreakState::new(),
            phase: Phase::Idle,
            paused: false,
            time_left: time_limit,
            rng,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn selection(&self) -> &SelectionBuffer {
        &self.selection
    }

    pub fn streak(&self) -> &StreakState {
        &self.streak
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    /// Restore the level and the score of a saved run.
    ///
    /// # Errors
    ///
    /// The run must be in the idle phase, and the saved run must be for the same difficulty.
    pub fn resume_from(&mut self, progress: &GameProgress) -> Result<(), GameError> {
        if self.phase != Phase::Idle {
            return Err(GameError::WrongPhase(self.phase));
        }
        if progress.difficulty != self.difficulty {
            return Err(GameError::DifficultyMismatch {
                expected: self.difficulty,
                found: progress.difficulty,
            });
        }
        let level: u32 = progress.level.max(1);
        self.state.current_level = level;
        self.state.score = progress.score;
        self.state.matched_pairs = 0;
        self.state.time_limit = self.config.time_limits.time_limit(level, self.difficulty);
        self.time_left = self.state.time_limit;
        self.streak.clear();
        info!(
            "Resuming {} at level {level} with score {}",
            self.difficulty, progress.score
        );
        Ok(())
    }

    /// Generate a board and reveal the colors.
    ///
    /// Return how long the colors must stay visible before calling [`Game::end_memorize`].
    ///
    /// # Errors
    ///
    /// The run must be in the idle phase.
    pub fn start(&mut self) -> Result<Duration, GameError> {
        if self.phase != Phase::Idle {
            return Err(GameError::WrongPhase(self.phase));
        }
        self.new_board()?;
        Ok(self.memorize_duration())
    }

    /// Return how long the colors stay visible at the start of a level.
    pub fn memorize_duration(&self) -> Duration {
        self.config
            .memorize
            .unwrap_or_else(|| self.difficulty.memorize_duration())
    }

    /// Replace the board and enter the memorize phase.
    fn new_board(&mut self) -> Result<(), GameError> {
        self.board = Some(Board::generate(self.state.grid_size, &mut self.rng)?);
        self.selection.clear();
        self.state.matched_pairs = 0;
        self.state.is_game_started = false;
        self.time_left = self.state.time_limit;
        self.phase = Phase::Memorize;
        debug!(
            "Level {}: new {}x{} board, {}s",
            self.state.current_level,
            self.state.grid_size,
            self.state.grid_size,
            self.state.time_limit
        );
        Ok(())
    }

    /// Hide the colors and start the countdown.
    ///
    /// Return false when the run is not in the memorize phase.
    pub fn end_memorize(&mut self) -> bool {
        if self.phase != Phase::Memorize {
            return false;
        }
        self.phase = Phase::Play;
        self.state.is_game_started = true;
        self.time_left = self.state.time_limit;
        debug!("Play phase, {}s left", self.time_left);
        true
    }

    /// Process a tap on a tile.
    ///
    /// The tap is ignored when the countdown is not running or is paused, when the tile is
    /// already matched or selected, or when two tiles are already selected.
    ///
    /// # Errors
    ///
    /// The method returns an error if the index is outside of the board.
    pub fn tap(&mut self, index: usize) -> Result<TapOutcome, GameError> {
        let Some(board) = self.board.as_mut() else {
            return Ok(TapOutcome::Ignored);
        };
        let tile: &mut Tile = board.tile_mut(index)?;

        if self.phase != Phase::Play
            || !self.state.is_game_started
            || self.paused
            || tile.is_matched
            || tile.is_selected
            || !self.selection.push(index)
        {
            return Ok(TapOutcome::Ignored);
        }
        tile.is_selected = true;

        match self.selection.pair() {
            None => Ok(TapOutcome::Selected),
            Some((first, second)) => {
                let is_match: bool = board.tile(first)?.pairs_with(board.tile(second)?);
                self.phase = Phase::Resolving;
                debug!("Pair {first}-{second}: match = {is_match}");
                Ok(TapOutcome::PairComplete { is_match })
            }
        }
    }

    /// Score the selected pair.
    ///
    /// `now` is the time of the match, used for the time bonus.
    /// Return None when there is no pair to resolve, for example because the countdown
    /// reached zero in the meantime.
    pub fn resolve(&mut self, now: Instant) -> Option<Resolution> {
        if self.phase != Phase::Resolving {
            return None;
        }
        let (first, second) = self.selection.pair()?;
        let board: &mut Board = self.board.as_mut()?;
        let is_match: bool = board
            .tile(first)
            .ok()?
            .pairs_with(board.tile(second).ok()?);

        for index in [first, second] {
            if let Ok(tile) = board.tile_mut(index) {
                tile.is_selected = false;
                tile.is_matched = is_match;
            }
        }
        self.selection.clear();
        self.phase = Phase::Play;

        if !is_match {
            self.streak.break_streak();
            return Some(Resolution::Mismatch);
        }

        // The streak includes this match
        let elapsed: Option<Duration> = self.streak.elapsed_since_last_match(now);
        self.streak.record_match(now, self.difficulty.has_streaks());
        let points: u32 = scoring::match_bonus(elapsed, self.streak.current(), self.difficulty);
        self.state.score += points;
        self.state.matched_pairs += 1;
        debug!(
            "Match: +{points} (elapsed {elapsed:?}), score = {}, pairs = {}",
            self.state.score, self.state.matched_pairs
        );

        if self.state.matched_pairs < board.pair_count() {
            return Some(Resolution::Match {
                points,
                matched_pairs: self.state.matched_pairs,
            });
        }

        match self.level_up() {
            Ok(bonus) => Some(Resolution::LevelComplete {
                points,
                bonus,
                level: self.state.current_level,
                time_limit: self.state.time_limit,
            }),
            Err(_) => None,
        }
    }

    /// Move to the next level with a new board. Return the level completion bonus.
    fn level_up(&mut self) -> Result<u32, GameError> {
        let bonus: u32 = scoring::level_complete_bonus(self.difficulty);

        self.state.score += bonus;
        self.state.current_level += 1;
        self.state.time_limit = self
            .config
            .time_limits
            .time_limit(self.state.current_level, self.difficulty);
        self.streak.break_streak();
        info!(
            "{} level {} reached, score = {}",
            self.difficulty, self.state.current_level, self.state.score
        );
        self.new_board()?;
        Ok(bonus)
    }

    /// Decrement the countdown by one second.
    pub fn tick(&mut self) -> TickOutcome {
        let running: bool = matches!(self.phase, Phase::Play | Phase::Resolving);
        if !running || !self.state.is_game_started || self.paused {
            return TickOutcome::Ignored;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left > 0 {
            return TickOutcome::Running(self.time_left);
        }
        self.state.is_game_started = false;
        self.phase = Phase::GameOver;
        info!(
            "{} game over at level {}, score = {}",
            self.difficulty, self.state.current_level, self.state.score
        );
        TickOutcome::GameOver
    }

    /// Freeze the countdown. The remaining time is kept.
    pub fn pause(&mut self) {
        if !self.paused {
            debug!("Paused with {}s left", self.time_left);
        }
        self.paused = true;
    }

    /// Continue the countdown from where it was frozen.
    pub fn resume(&mut self) {
        if self.paused {
            debug!("Resumed with {}s left", self.time_left);
        }
        self.paused = false;
    }

    /// Start a new run from level 1 after a game over.
    ///
    /// Return how long the colors must stay visible before calling [`Game::end_memorize`].
    ///
    /// # Errors
    ///
    /// The run must be over.
    pub fn try_again(&mut self) -> Result<Duration, GameError> {
        if self.phase != Phase::GameOver {
            return Err(GameError::WrongPhase(self.phase));
        }
        self.state.current_level = 1;
        self.state.score = 0;
        self.state.time_limit = self.config.time_limits.time_limit(1, self.difficulty);
        self.streak.clear();
        self.paused = false;
        self.phase = Phase::Idle;
        self.start()
    }

    /// Return the run to save when the player leaves, or None if there is nothing worth saving.
    ///
    /// Runs still at level 1 and finished runs are not saved.
    pub fn exit_progress(&self) -> Option<GameProgress> {
        if self.state.current_level <= 1 || self.phase == Phase::GameOver {
            return None;
        }
        Some(GameProgress::new(
            self.difficulty,
            self.state.current_level,
            self.state.score,
        ))
    }

    /// Return the high score candidate of a finished run.
    pub fn final_entry(&self) -> Option<HighScoreEntry> {
        if self.phase != Phase::GameOver {
            return None;
        }
        Some(HighScoreEntry::new(
            self.state.score,
            self.state.current_level,
            self.difficulty,
        ))
    }

    /// Return a copy of the run for the renderer.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            difficulty: self.difficulty,
            phase: self.phase,
            state: self.state.clone(),
            tiles: self
                .board
                .as_ref()
                .map(|b| b.tiles().to_vec())
                .unwrap_or_default(),
            selection: self.selection.get().to_vec(),
            time_left: self.time_left,
            paused: self.paused,
            reveal: self.phase == Phase::Memorize,
            streak: self.streak.current(),
            max_streak: self.streak.max(),
        }
    }
}
