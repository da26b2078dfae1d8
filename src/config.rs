/*
config.rs

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

//! Application constants, gameplay tunables, and user preferences.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::scoring::TimeLimitTable;

pub const APPLICATION_NAME: &str = "chromatch";

pub const COPYRIGHT_NOTICE: &str = "
Copyright (C) 2025 Hervé Quatremain
License GPLv3+: GNU GPL version 3 or later <https://gnu.org/licenses/gpl.html>
This is free software: you are free to change and redistribute it.
There is NO WARRANTY, to the extent permitted by law.";

/// Number of high scores kept per difficulty.
pub const HIGH_SCORES_PER_DIFFICULTY: usize = 5;

/// Number of high scores in the table that mixes all the difficulties.
pub const HIGH_SCORES_GLOBAL: usize = 10;

/// Return the directory where the save files are stored.
///
/// Return None when the platform does not provide a data directory.
pub fn user_data_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", APPLICATION_NAME).map(|p| p.data_dir().to_path_buf())
}

/// Gameplay tunables.
///
/// The default values are the ones of the released game.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Countdown duration per difficulty and level.
    pub time_limits: TimeLimitTable,

    /// Delay before a matching pair is marked as matched. Cosmetic only.
    pub match_delay: Duration,

    /// Delay before a mismatching pair is turned face down. Cosmetic only.
    pub mismatch_delay: Duration,

    /// Period of the countdown.
    pub tick: Duration,

    /// Number of high scores kept per difficulty.
    pub high_score_cap: usize,

    /// Reveal duration for all the difficulties. When None, the duration of the difficulty
    /// is used.
    pub memorize: Option<Duration>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            time_limits: TimeLimitTable::default(),
            match_delay: Duration::from_millis(300),
            mismatch_delay: Duration::from_millis(500),
            tick: Duration::from_secs(1),
            high_score_cap: HIGH_SCORES_PER_DIFFICULTY,
            memorize: None,
        }
    }
}

/// User preferences.
///
/// The game only reads `sound_enabled`. The other settings are for the renderer.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct Preferences {
    /// Whether sound cues are emitted.
    pub sound_enabled: bool,

    /// Dark or light theme, when the system theme is not used.
    pub dark_mode: bool,

    /// Follow the system theme.
    pub use_system_theme: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            dark_mode: true,
            use_system_theme: true,
        }
    }
}
