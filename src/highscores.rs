/*
highscores.rs

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

//! Manage high scores.
//!
//! The main object, [`HighScores`], maintains a scoreboard for each difficulty.
//! A scoreboard keeps the best runs, sorted by decreasing score. When a board is full, a new
//! run makes it to the board only if its score is strictly greater than the lowest score, which
//! is then evicted.
//!
//! See the [`crate::saver::highscores`] module that saves and restores the [`HighScores`] object.

use chrono::{Local, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::{HIGH_SCORES_GLOBAL, HIGH_SCORES_PER_DIFFICULTY};
use crate::difficulty::Difficulty;

/// Finished run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HighScoreEntry {
    pub score: u32,

    /// Level reached.
    pub level: u32,

    pub difficulty: Difficulty,

    /// Day the run ended.
    pub date: NaiveDate,
}

impl HighScoreEntry {
    /// Create a [`HighScoreEntry`] object dated today.
    pub fn new(score: u32, level: u32, difficulty: Difficulty) -> Self {
        Self {
            score,
            level,
            difficulty,
            date: Local::now().date_naive(),
        }
    }
}

/// Sorted list of the top scores for a difficulty.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
struct DifficultyScoreBoard {
    /// Sorted list of the top scores, best first.
    top: Vec<HighScoreEntry>,
}

impl DifficultyScoreBoard {
    /// Whether the score would make it to a board of `cap` entries.
    fn is_high_score(&self, score: u32, cap: usize) -> bool {
        if self.top.len() < cap {
            return cap > 0;
        }
        match self.top.iter().map(|e| e.score).min() {
            Some(lowest) => score > lowest,
            None => cap > 0,
        }
    }

    /// Add an entry to the scoreboard and return the position in the board, or None if the
    /// entry does not make it to the board.
    ///
    /// The returned position starts at 1 (top score).
    fn add_score(&mut self, entry: HighScoreEntry, cap: usize) -> Option<usize> {
        if !self.is_high_score(entry.score, cap) {
            return None;
        }
        // Runs with the same score keep their rank: the new one goes after them
        let i: usize = self
            .top
            .iter()
            .position(|e| entry.score > e.score)
            .unwrap_or(self.top.len());
        self.top.insert(i, entry);
        self.evict_below_cap(cap);
        Some(i + 1)
    }

    /// Delete the entries after the first `cap` entries.
    fn evict_below_cap(&mut self, cap: usize) {
        if self.top.len() > cap {
            debug!("Evicting {} high scores", self.top.len() - cap);
            self.top.truncate(cap);
        }
    }
}

/// List of the scoreboards for the difficulties.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HighScores {
    /// Map of the [`DifficultyScoreBoard`] scoreboards indexed by the difficulty key.
    board: HashMap<String, DifficultyScoreBoard>,

    /// Number of entries per scoreboard.
    #[serde(skip, default = "default_cap")]
    cap: usize,
}

fn default_cap() -> usize {
    HIGH_SCORES_PER_DIFFICULTY
}

impl Default for HighScores {
    fn default() -> Self {
        Self::new()
    }
}

impl HighScores {
    /// Create a [`HighScores`] object with the default board size.
    pub fn new() -> Self {
        Self::with_cap(HIGH_SCORES_PER_DIFFICULTY)
    }

    /// Create a [`HighScores`] object that keeps `cap` entries per difficulty.
    pub fn with_cap(cap: usize) -> Self {
        Self {
            board: HashMap::new(),
            cap,
        }
    }

    /// Change the number of entries per difficulty. Existing boards are trimmed.
    pub fn set_cap(&mut self, cap: usize) {
        self.cap = cap;
        for scoreboard in self.board.values_mut() {
            scoreboard.evict_below_cap(cap);
        }
    }

    /// Number of entries per difficulty.
    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Whether the score would make it to the scoreboard of the difficulty.
    pub fn is_high_score(&self, difficulty: Difficulty, score: u32) -> bool {
        match self.board.get(difficulty.key()) {
            Some(b) => b.is_high_score(score, self.cap),
            None => self.cap > 0,
        }
    }

    /// Add the entry to the scoreboard of its difficulty and return the position in the
    /// scoreboard, or None if the entry does not make it to the board.
    ///
    /// The returned position starts at 1 (top score).
    pub fn add_score(&mut self, entry: HighScoreEntry) -> Option<usize> {
        let cap: usize = self.cap;
        let scoreboard: &mut DifficultyScoreBoard = self
            .board
            .entry(entry.difficulty.key().to_string())
            .or_default();

        scoreboard.add_score(entry, cap)
    }

    /// Delete the entries of the difficulty that are after the first `cap` entries.
    pub fn evict_below_cap(&mut self, difficulty: Difficulty, cap: usize) {
        if let Some(b) = self.board.get_mut(difficulty.key()) {
            b.evict_below_cap(cap);
        }
    }

    /// Return the list of entries for the given difficulty, best first.
    ///
    /// Return None when the scoreboard is empty.
    pub fn get_score(&self, difficulty: Difficulty) -> Option<&Vec<HighScoreEntry>> {
        match self.board.get(difficulty.key()) {
            Some(b) if !b.top.is_empty() => Some(&b.top),
            _ => None,
        }
    }

    /// Return at most `limit` entries, best first.
    ///
    /// When `difficulty` is None, the entries of all the difficulties are merged.
    pub fn top(&self, difficulty: Option<Difficulty>, limit: usize) -> Vec<HighScoreEntry> {
        let mut entries: Vec<HighScoreEntry> = match difficulty {
            Some(d) => self.get_score(d).cloned().unwrap_or_default(),
            None => {
                // Iterate in difficulty order so that ties are stable
                Difficulty::all()
                    .into_iter()
                    .filter_map(|d| self.get_score(d))
                    .flatten()
                    .cloned()
                    .collect()
            }
        };
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(limit);
        entries
    }

    /// Return the table that mixes all the difficulties.
    pub fn top_global(&self) -> Vec<HighScoreEntry> {
        self.top(None, HIGH_SCORES_GLOBAL)
    }

    /// Remove all the entries.
    pub fn clear(&mut self) {
        self.board.clear();
    }

    /// Whether the list of scoreboards is empty (no entry for any difficulty)
    pub fn is_empty(&self) -> bool {
        self.board.values().all(|b| b.top.is_empty())
    }
}
