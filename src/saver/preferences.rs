/*
preferences.rs

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

//! Save and restore the user preferences.

use std::error::Error;
use std::path::PathBuf;

use super::JsonFile;
use crate::config::Preferences;

/// Object to save and restore the [`Preferences`] object.
pub struct SaverPreferences {
    file: JsonFile,
}

impl SaverPreferences {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            file: JsonFile::new(data_dir, "preferences.json"),
        }
    }

    /// Retrieve the preferences. Return None if the file does not exist.
    pub fn get_preferences(&self) -> Result<Option<Preferences>, Box<dyn Error>> {
        self.file.read()
    }

    pub fn save_preferences(&self, preferences: &Preferences) -> Result<(), Box<dyn Error>> {
        self.file.write(preferences)
    }

    pub fn delete_save(&self) {
        self.file.delete();
    }
}
