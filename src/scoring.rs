/*
scoring.rs

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

//! Compute the time limits and the points.
//!
//! The functions in this module are pure: the same inputs always give the same result.
//!
//! * [`TimeLimitTable`] gives the countdown duration for a level. The table is a list of level
//!   bands per difficulty, and can be customized.
//! * [`match_bonus`] gives the points for a match, from the time elapsed since the previous match
//!   and from the current streak.
//! * [`level_complete_bonus`] gives the extra points when all the pairs of a board are matched.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::difficulty::Difficulty;

/// Points for a match in [`Difficulty::Easy`].
const EASY_MATCH_POINTS: u32 = 10;

/// Time tiers for [`Difficulty::Medium`]: (upper bound in milliseconds, points).
const MEDIUM_TIERS: [(u64, u32); 2] = [(2000, 15), (3000, 10)];

/// Time tiers for [`Difficulty::Hard`]: (upper bound in milliseconds, points).
const HARD_TIERS: [(u64, u32); 3] = [(1500, 20), (2500, 15), (3500, 10)];

/// Points when the match is slower than every tier.
const BASE_POINTS: u32 = 5;

/// Points per streak step in [`Difficulty::Hard`].
const STREAK_POINTS: u32 = 5;

/// Extra points when a board is cleared in [`Difficulty::Medium`].
const MEDIUM_LEVEL_BONUS: u32 = 5;

/// Levels lower than `below_level` get `seconds` to clear the board.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct LevelBand {
    pub below_level: u32,
    pub seconds: u32,
}

/// Time limits of a difficulty.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DifficultyBands {
    /// Bands sorted by increasing level.
    pub bands: Vec<LevelBand>,

    /// Time limit for the levels after the last band.
    pub floor_seconds: u32,
}

impl DifficultyBands {
    fn from_slice(bands: &[(u32, u32)], floor_seconds: u32) -> Self {
        Self {
            bands: bands
                .iter()
                .map(|&(below_level, seconds)| LevelBand {
                    below_level,
                    seconds,
                })
                .collect(),
            floor_seconds,
        }
    }

    /// Return the time limit for the level.
    pub fn seconds_for(&self, level: u32) -> u32 {
        self.bands
            .iter()
            .find(|b| level < b.below_level)
            .map_or(self.floor_seconds, |b| b.seconds)
    }
}

/// Countdown duration per difficulty and level.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TimeLimitTable {
    pub easy: DifficultyBands,
    pub medium: DifficultyBands,
    pub hard: DifficultyBands,
}

impl Default for TimeLimitTable {
    fn default() -> Self {
        Self {
            easy: DifficultyBands::from_slice(
                &[
                    (10, 20),
                    (20, 18),
                    (30, 16),
                    (40, 14),
                    (50, 12),
                    (60, 10),
                    (70, 8),
                    (80, 6),
                ],
                4,
            ),
            medium: DifficultyBands::from_slice(
                &[(10, 60), (20, 50), (30, 45), (40, 40), (50, 35)],
                30,
            ),
            hard: DifficultyBands::from_slice(
                &[(10, 180), (20, 150), (30, 120), (40, 100), (50, 80), (60, 60)],
                50,
            ),
        }
    }
}

impl TimeLimitTable {
    /// Return the bands of the difficulty.
    pub fn bands(&self, difficulty: Difficulty) -> &DifficultyBands {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
        }
    }

    /// Return the countdown duration, in seconds, for the level.
    pub fn time_limit(&self, level: u32, difficulty: Difficulty) -> u32 {
        self.bands(difficulty).seconds_for(level)
    }
}

/// Return the points from a list of time tiers.
fn tier_points(tiers: &[(u64, u32)], elapsed: Option<Duration>) -> u32 {
    // Without a previous match, the elapsed time is unbounded
    let Some(elapsed) = elapsed else {
        return BASE_POINTS;
    };
    let ms: u128 = elapsed.as_millis();
    tiers
        .iter()
        .find(|(limit, _)| ms < *limit as u128)
        .map_or(BASE_POINTS, |(_, points)| *points)
}

/// Return the points for a match.
///
/// `elapsed` is the time since the previous match of the run (None for the first match).
/// `streak` is the streak including the current match. It is ignored outside of
/// [`Difficulty::Hard`].
pub fn match_bonus(elapsed: Option<Duration>, streak: u32, difficulty: Difficulty) -> u32 {
    match difficulty {
        Difficulty::Easy => EASY_MATCH_POINTS,
        Difficulty::Medium => tier_points(&MEDIUM_TIERS, elapsed),
        Difficulty::Hard => tier_points(&HARD_TIERS, elapsed) + streak * STREAK_POINTS,
    }
}

/// Return the extra points when all the pairs of a board are matched.
pub fn level_complete_bonus(difficulty: Difficulty) -> u32 {
    match difficulty {
        Difficulty::Medium => MEDIUM_LEVEL_BONUS,
        Difficulty::Easy | Difficulty::Hard => 0,
    }
}
