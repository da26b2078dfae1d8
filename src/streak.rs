/*
streak.rs

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

//! Manage the match streak and the time of the last match.
//!
//! The streak counts the consecutive matches without a mismatch. It is only rewarded in
//! [`crate::difficulty::Difficulty::Hard`], but the time of the last match is also needed for
//! the time bonus of [`crate::difficulty::Difficulty::Medium`].

use log::debug;
use std::time::{Duration, Instant};

/// Streak counters.
#[derive(Debug, Clone, Default)]
pub struct StreakState {
    /// Number of consecutive matches.
    current: u32,

    /// Longest streak since the beginning of the run.
    max: u32,

    /// Time of the last successful match of the run.
    last_match: Option<Instant>,
}

impl StreakState {
    /// Create a [`StreakState`] object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all the counters. Used when a new run starts.
    pub fn clear(&mut self) {
        self.current = 0;
        self.max = 0;
        self.last_match = None;
    }

    /// Current streak.
    pub fn current(&self) -> u32 {
        self.current
    }

    /// Longest streak of the run.
    pub fn max(&self) -> u32 {
        self.max
    }

    /// Time elapsed between the previous match and `now`, or None if there was no match yet.
    pub fn elapsed_since_last_match(&self, now: Instant) -> Option<Duration> {
        self.last_match.map(|t| now.saturating_duration_since(t))
    }

    /// Record a successful match.
    ///
    /// When `count_streak` is false, only the time of the match is recorded.
    pub fn record_match(&mut self, now: Instant, count_streak: bool) {
        if count_streak {
            self.current += 1;
            self.max = self.max.max(self.current);
            debug!("Streak = {}  Max streak = {}", self.current, self.max);
        }
        self.last_match = Some(now);
    }

    /// Break the streak, after a mismatch or when a new level starts.
    /// The longest streak and the time of the last match are kept.
    pub fn break_streak(&mut self) {
        if self.current > 0 {
            debug!("Streak broken at {}", self.current);
        }
        self.current = 0;
    }
}
