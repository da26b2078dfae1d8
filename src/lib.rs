/*
lib.rs

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

//! Core of the Chromatch color memory game.
//!
//! A grid of colored tiles is shown for a few seconds, then the colors are hidden and the
//! player must find the pairs before the countdown ends. Each cleared board moves the run to
//! the next level, with less time.
//!
//! * [`generator`] builds the boards.
//! * [`game`] is the state machine of a run, and [`scoring`] computes the points and the time
//!   limits.
//! * [`session`] drives a run from a single thread, with the timers and the persistence.
//! * [`progress`] and [`highscores`] are the saved data, and [`saver`] stores them.

pub mod cli_options;
pub mod config;
pub mod difficulty;
pub mod game;
pub mod generator;
pub mod highscores;
pub mod progress;
pub mod saver;
pub mod scoring;
pub mod selection;
pub mod session;
pub mod streak;
