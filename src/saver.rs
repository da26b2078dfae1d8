/*
saver.rs

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

//! Save and restore the runs in progress, the high scores, and the preferences.
//!
//! Each object is serialized in JSON format by using [`serde`], in its own file of the data
//! directory. The [`Store`] trait is the interface that the game session uses. [`JsonStore`]
//! implements it on top of the files, and [`MemoryStore`] keeps everything in memory.

pub mod highscores;
pub mod preferences;
pub mod progress;

use log::debug;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::error::Error;
use std::ffi::OsString;
use std::fs::{self, File, remove_file};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::config::{Preferences, user_data_dir};
use crate::difficulty::Difficulty;
use crate::highscores::{HighScoreEntry, HighScores};
use crate::progress::{GameProgress, ProgressBook};

use self::highscores::SaverHighScores;
use self::preferences::SaverPreferences;
use self::progress::SaverProgress;

/// JSON file in the data directory.
#[derive(Debug, Clone)]
pub struct JsonFile {
    /// Absolute path to the file.
    path: PathBuf,
}

impl JsonFile {
    /// Create a [`JsonFile`] object for the `name` file in the `data_dir` directory.
    pub fn new(mut data_dir: PathBuf, name: &str) -> Self {
        data_dir.push(name);
        debug!("Save file: {data_dir:?}");
        Self { path: data_dir }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deserialize the file.
    ///
    /// Return None if the file does not exist.
    pub fn read<T: DeserializeOwned>(&self) -> Result<Option<T>, Box<dyn Error>> {
        let file: File = match File::open(&self.path) {
            Ok(f) => f,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(Box::new(error)),
        };
        let reader: BufReader<File> = BufReader::new(file);
        Ok(Some(serde_json::from_reader(reader)?))
    }

    /// Deserialize the file, or return the default value.
    ///
    /// A file that cannot be read is deleted so that the next save starts afresh.
    pub fn read_or_default<T: DeserializeOwned + Default>(&self) -> T {
        match self.read() {
            Ok(Some(v)) => v,
            Ok(None) => T::default(),
            Err(error) => {
                debug!("Error reading {:?}: {error}", self.path);
                self.delete();
                T::default()
            }
        }
    }

    /// Path of the file being written, renamed over the save file once complete.
    fn temporary_path(&self) -> PathBuf {
        let mut path: OsString = self.path.clone().into_os_string();
        path.push(".tmp");
        PathBuf::from(path)
    }

    /// Serialize the value into the file. The data directory is created if needed.
    ///
    /// The previous content stays intact until the new content is completely written.
    pub fn write<T: Serialize>(&self, value: &T) -> Result<(), Box<dyn Error>> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let tmp: PathBuf = self.temporary_path();
        {
            let file: File = File::create(&tmp)?;
            let mut writer: BufWriter<File> = BufWriter::new(file);

            serde_json::to_writer(&mut writer, value)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        if let Err(error) = fs::rename(&tmp, &self.path) {
            let _ = remove_file(&tmp);
            return Err(Box::new(error));
        }
        Ok(())
    }

    /// Delete the file.
    pub fn delete(&self) {
        let _ = remove_file(&self.path);
    }
}

/// Persistence operations used by the game session.
///
/// Implementations must be usable from a worker thread. Errors are reported to the caller,
/// which logs them and continues: a failed save never affects the run in progress.
pub trait Store: Send {
    /// Return the saved run for the difficulty.
    fn load_progress(&self, difficulty: Difficulty) -> Result<Option<GameProgress>, Box<dyn Error>>;

    /// Save the run, replacing any previous run for the same difficulty.
    fn save_progress(&self, progress: &GameProgress) -> Result<(), Box<dyn Error>>;

    /// Delete the saved run for the difficulty.
    fn delete_progress(&self, difficulty: Difficulty) -> Result<(), Box<dyn Error>>;

    /// Insert a finished run in the high scores.
    ///
    /// Return the position in the scoreboard of the difficulty (starting at 1), or None if
    /// the score is not high enough.
    fn insert_high_score(&self, entry: HighScoreEntry) -> Result<Option<usize>, Box<dyn Error>>;

    /// Return at most `limit` high scores, best first. All difficulties when None.
    fn top_high_scores(
        &self,
        difficulty: Option<Difficulty>,
        limit: usize,
    ) -> Result<Vec<HighScoreEntry>, Box<dyn Error>>;

    /// Keep only the `cap` best entries of the difficulty.
    fn evict_below_cap(&self, difficulty: Difficulty, cap: usize) -> Result<(), Box<dyn Error>>;

    /// Return the user preferences.
    fn load_preferences(&self) -> Result<Preferences, Box<dyn Error>>;
}

/// [`Store`] implementation that uses JSON files.
pub struct JsonStore {
    progress: SaverProgress,
    highscores: SaverHighScores,
    preferences: SaverPreferences,
}

impl JsonStore {
    /// Create a [`JsonStore`] object that stores its files in the `data_dir` directory.
    pub fn new(data_dir: PathBuf, high_score_cap: usize) -> Self {
        Self {
            progress: SaverProgress::new(data_dir.clone()),
            highscores: SaverHighScores::new(data_dir.clone(), high_score_cap),
            preferences: SaverPreferences::new(data_dir),
        }
    }

    /// Create a [`JsonStore`] object in the user data directory.
    ///
    /// Return None when the platform does not provide a data directory.
    pub fn in_user_data_dir(high_score_cap: usize) -> Option<Self> {
        user_data_dir().map(|d| Self::new(d, high_score_cap))
    }

    pub fn progress(&self) -> &SaverProgress {
        &self.progress
    }

    pub fn highscores(&self) -> &SaverHighScores {
        &self.highscores
    }

    pub fn preferences(&self) -> &SaverPreferences {
        &self.preferences
    }
}

impl Store for JsonStore {
    fn load_progress(&self, difficulty: Difficulty) -> Result<Option<GameProgress>, Box<dyn Error>> {
        let book: Option<ProgressBook> = self.progress.get_progress()?;
        Ok(book.and_then(|mut b| b.remove(difficulty)))
    }

    fn save_progress(&self, progress: &GameProgress) -> Result<(), Box<dyn Error>> {
        let mut book: ProgressBook = self.progress.load();
        book.save(progress.clone());
        self.progress.save_progress(&book)
    }

    fn delete_progress(&self, difficulty: Difficulty) -> Result<(), Box<dyn Error>> {
        let mut book: ProgressBook = self.progress.load();
        if book.remove(difficulty).is_none() {
            return Ok(());
        }
        if book.is_empty() {
            self.progress.delete_save();
            return Ok(());
        }
        self.progress.save_progress(&book)
    }

    fn insert_high_score(&self, entry: HighScoreEntry) -> Result<Option<usize>, Box<dyn Error>> {
        let mut highscores: HighScores = self.highscores.load();
        let position: Option<usize> = highscores.add_score(entry);
        if position.is_some() {
            self.highscores.save_highscores(&highscores)?;
        }
        Ok(position)
    }

    fn top_high_scores(
        &self,
        difficulty: Option<Difficulty>,
        limit: usize,
    ) -> Result<Vec<HighScoreEntry>, Box<dyn Error>> {
        Ok(self
            .highscores
            .get_highscores()?
            .map(|h| h.top(difficulty, limit))
            .unwrap_or_default())
    }

    fn evict_below_cap(&self, difficulty: Difficulty, cap: usize) -> Result<(), Box<dyn Error>> {
        let mut highscores: HighScores = self.highscores.load();
        highscores.evict_below_cap(difficulty, cap);
        self.highscores.save_highscores(&highscores)
    }

    fn load_preferences(&self) -> Result<Preferences, Box<dyn Error>> {
        Ok(self.preferences.get_preferences()?.unwrap_or_default())
    }
}

/// [`Store`] implementation that keeps everything in memory.
#[derive(Default)]
pub struct MemoryStore {
    progress: Mutex<ProgressBook>,
    highscores: Mutex<HighScores>,
    preferences: Preferences,
}

impl MemoryStore {
    /// Create an empty [`MemoryStore`] object.
    pub fn new(preferences: Preferences) -> Self {
        Self {
            preferences,
            ..Default::default()
        }
    }
}

/// Convert a poisoned lock into an error.
fn poisoned<T>(_: T) -> Box<dyn Error> {
    "store lock poisoned".into()
}

impl Store for MemoryStore {
    fn load_progress(&self, difficulty: Difficulty) -> Result<Option<GameProgress>, Box<dyn Error>> {
        Ok(self.progress.lock().map_err(poisoned)?.get(difficulty).cloned())
    }

    fn save_progress(&self, progress: &GameProgress) -> Result<(), Box<dyn Error>> {
        self.progress.lock().map_err(poisoned)?.save(progress.clone());
        Ok(())
    }

    fn delete_progress(&self, difficulty: Difficulty) -> Result<(), Box<dyn Error>> {
        self.progress.lock().map_err(poisoned)?.remove(difficulty);
        Ok(())
    }

    fn insert_high_score(&self, entry: HighScoreEntry) -> Result<Option<usize>, Box<dyn Error>> {
        Ok(self.highscores.lock().map_err(poisoned)?.add_score(entry))
    }

    fn top_high_scores(
        &self,
        difficulty: Option<Difficulty>,
        limit: usize,
    ) -> Result<Vec<HighScoreEntry>, Box<dyn Error>> {
        Ok(self.highscores.lock().map_err(poisoned)?.top(difficulty, limit))
    }

    fn evict_below_cap(&self, difficulty: Difficulty, cap: usize) -> Result<(), Box<dyn Error>> {
        self.highscores
            .lock()
            .map_err(poisoned)?
            .evict_below_cap(difficulty, cap);
        Ok(())
    }

    fn load_preferences(&self) -> Result<Preferences, Box<dyn Error>> {
        Ok(self.preferences)
    }
}
