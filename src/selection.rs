/*
selection.rs

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

//! Manage the tiles that the player turned face up.
//!
//! At most two tiles can be face up at the same time. When the second tile is selected, the pair
//! must be resolved (see [`crate::game`]) before another tile can be selected.

use serde::{Deserialize, Serialize};

/// Maximum number of face-up tiles.
pub const CAPACITY: usize = 2;

/// Ordered list of the selected tile indices.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SelectionBuffer {
    indices: Vec<usize>,
}

impl SelectionBuffer {
    /// Create an empty [`SelectionBuffer`] object.
    pub fn new() -> Self {
        Self {
            indices: Vec::with_capacity(CAPACITY),
        }
    }

    /// Add a tile to the selection.
    ///
    /// Return `false`, and leave the buffer unchanged, if the tile is already selected or if
    /// the buffer is full.
    pub fn push(&mut self, index: usize) -> bool {
        if self.is_full() || self.contains(index) {
            return false;
        }
        self.indices.push(index);
        true
    }

    /// Remove all the tiles from the selection.
    pub fn clear(&mut self) {
        self.indices.clear();
    }

    /// Whether the tile is selected.
    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    /// Whether two tiles are selected.
    pub fn is_full(&self) -> bool {
        self.indices.len() >= CAPACITY
    }

    /// Number of selected tiles.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether no tile is selected.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Return the two selected tiles, in selection order, when the buffer is full.
    pub fn pair(&self) -> Option<(usize, usize)> {
        match self.indices[..] {
            [first, second] => Some((first, second)),
            _ => None,
        }
    }

    /// Return the selected tiles in selection order.
    pub fn get(&self) -> &[usize] {
        &self.indices
    }
}
