/*
generator.rs

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

//! Generate random boards.
//!
//! A board is a square grid of [`board::Tile`] objects.
//! Every color on the board appears on exactly two tiles, so that the player can match them by
//! pairs.
//! When the grid has an odd number of cells, one tile is a gray placeholder that does not
//! participate in the game.
//!
//! The colors are drawn by a [`color::ColorSampler`] object, which rejects the colors that are
//! too close to the colors already on the board.
//! The sampler gives up after a fixed number of attempts and then keeps the most distinct
//! candidate it has seen, so that generating a board always terminates.
//!
//! To build a board, use [`board::Board::generate`].

pub mod board;
pub mod color;
