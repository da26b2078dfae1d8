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

//! Save and restore the high scores.
//!
//! The saved object is a serialization of the [`HighScores`] object in JSON format by
//! using [`serde`]. The number of entries per difficulty is not saved: it is set again when
//! the file is loaded.

use std::error::Error;
use std::path::PathBuf;

use super::JsonFile;
use crate::highscores::HighScores;

/// Object to save and restore the high scores.
pub struct SaverHighScores {
    file: JsonFile,

    /// Number of entries per difficulty.
    cap: usize,
}

impl SaverHighScores {
    /// Create a [`SaverHighScores`] object.
    ///
    /// The provided [`PathBuf`] is the path to the directory where the high scores must be saved.
    pub fn new(data_dir: PathBuf, cap: usize) -> Self {
        Self {
            file: JsonFile::new(data_dir, "highscores.json"),
            cap,
        }
    }

    /// Retrieve the [`HighScores`] object from the high scores file.
    ///
    /// Return the [`HighScores`] object or None if the high scores file does not exist.
    pub fn get_highscores(&self) -> Result<Option<HighScores>, Box<dyn Error>> {
        let highscores: Option<HighScores> = self.file.read()?;
        Ok(highscores.map(|mut h| {
            h.set_cap(self.cap);
            h
        }))
    }

    /// Retrieve the [`HighScores`] object, or an empty object if the file does not exist or
    /// is corrupted.
    pub fn load(&self) -> HighScores {
        let mut highscores: HighScores = self.file.read_or_default();
        highscores.set_cap(self.cap);
        highscores
    }

    /// Save the provided [`HighScores`] object.
    pub fn save_highscores(&self, highscores: &HighScores) -> Result<(), Box<dyn Error>> {
        self.file.write(highscores)
    }

    /// Delete the high scores file.
    pub fn delete_save(&self) {
        self.file.delete();
    }
}
