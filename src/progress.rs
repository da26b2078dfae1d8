/*
progress.rs

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

//! Runs in progress.
//!
//! When the player leaves a run after level 1, the level and the score are kept so that the run
//! can be resumed later. There is at most one saved run per difficulty.
//! See the [`crate::saver::progress`] module that saves and restores the [`ProgressBook`] object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::difficulty::Difficulty;

/// Saved run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GameProgress {
    pub difficulty: Difficulty,

    /// Level to resume at.
    pub level: u32,

    /// Score at the time the player left.
    pub score: u32,

    /// When the player left the run.
    pub last_played: DateTime<Utc>,
}

impl GameProgress {
    /// Create a [`GameProgress`] object, timestamped now.
    pub fn new(difficulty: Difficulty, level: u32, score: u32) -> Self {
        Self {
            difficulty,
            level,
            score,
            last_played: Utc::now(),
        }
    }
}

/// Saved runs, one per difficulty.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ProgressBook {
    /// Runs indexed by the difficulty key.
    rows: BTreeMap<String, GameProgress>,
}

impl ProgressBook {
    /// Create an empty [`ProgressBook`] object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Save a run. Any previous run for the same difficulty is replaced.
    pub fn save(&mut self, progress: GameProgress) {
        self.rows.insert(progress.difficulty.key().to_string(), progress);
    }

    /// Return the saved run for the difficulty.
    pub fn get(&self, difficulty: Difficulty) -> Option<&GameProgress> {
        self.rows.get(difficulty.key())
    }

    /// Delete the saved run for the difficulty, and return it.
    pub fn remove(&mut self, difficulty: Difficulty) -> Option<GameProgress> {
        self.rows.remove(difficulty.key())
    }

    /// Whether no run is saved.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
