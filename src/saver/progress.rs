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

//! Save and restore the runs in progress.
//!
//! The saved object is a serialization of the [`ProgressBook`] object in JSON format by
//! using [`serde`].

use std::error::Error;
use std::path::PathBuf;

use super::JsonFile;
use crate::progress::ProgressBook;

/// Object to save and restore the runs in progress.
pub struct SaverProgress {
    file: JsonFile,
}

impl SaverProgress {
    /// Create a [`SaverProgress`] object.
    ///
    /// The provided [`PathBuf`] is the path to the directory where the runs must be saved.
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            file: JsonFile::new(data_dir, "progress.json"),
        }
    }

    /// Retrieve the [`ProgressBook`] object from the file.
    ///
    /// Return None if the file does not exist.
    pub fn get_progress(&self) -> Result<Option<ProgressBook>, Box<dyn Error>> {
        self.file.read()
    }

    /// Retrieve the [`ProgressBook`] object, or an empty object if the file does not exist or
    /// is corrupted.
    pub fn load(&self) -> ProgressBook {
        self.file.read_or_default()
    }

    /// Save the provided [`ProgressBook`] object.
    pub fn save_progress(&self, book: &ProgressBook) -> Result<(), Box<dyn Error>> {
        self.file.write(book)
    }

    /// Delete the file.
    pub fn delete_save(&self) {
        self.file.delete();
    }
}
