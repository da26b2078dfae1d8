/*
difficulty.rs

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

//! Difficulty levels.
//!
//! The difficulty selects the grid size, how long the colors stay visible before the round
//! starts, and which scoring rules apply (see [`crate::scoring`]).

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use strum_macros::FromRepr;

/// Game difficulty.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Copy,
    Clone,
    PartialOrd,
    PartialEq,
    Eq,
    Hash,
    ValueEnum,
    FromRepr,
    Default,
)]
#[repr(i32)]
pub enum Difficulty {
    /// 3x3 grid, flat scoring.
    #[default]
    Easy,

    /// 4x4 grid, time-tiered scoring and a level completion bonus.
    Medium,

    /// 5x5 grid, time-tiered scoring plus a streak bonus.
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl Difficulty {
    /// Return all the difficulties, from the easiest.
    pub fn all() -> Vec<Difficulty> {
        (0..).map_while(Difficulty::from_repr).collect()
    }

    /// Key used in the save files and in the high score tables.
    pub fn key(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// Retrieve a difficulty from its key. The comparison ignores the case.
    pub fn from_key(key: &str) -> Option<Difficulty> {
        Difficulty::all()
            .into_iter()
            .find(|d| d.key().eq_ignore_ascii_case(key.trim()))
    }

    /// Number of rows (and columns) of the board.
    pub fn grid_size(&self) -> usize {
        match self {
            Difficulty::Easy => 3,
            Difficulty::Medium => 4,
            Difficulty::Hard => 5,
        }
    }

    /// How long the colors are revealed before the player can play.
    ///
    /// The duration does not depend on the level.
    pub fn memorize_duration(&self) -> Duration {
        match self {
            Difficulty::Easy => Duration::from_secs(3),
            Difficulty::Medium => Duration::from_secs(5),
            Difficulty::Hard => Duration::from_secs(7),
        }
    }

    /// Whether consecutive matches are tracked and rewarded.
    pub fn has_streaks(&self) -> bool {
        *self == Difficulty::Hard
    }
}
