/*
board.rs

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

//! Board of colored tiles.

use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

use super::color::{ColorSampler, Rgb};

/// Supported grid sizes.
pub const GRID_SIZES: [usize; 3] = [3, 4, 5];

/// Type of errors.
#[derive(Debug, PartialEq, Clone)]
pub enum BoardError {
    /// The grid size is not 3, 4, or 5.
    InvalidGridSize(usize),

    /// The number of tiles does not match the grid size.
    WrongTileCount { expected: usize, found: usize },

    /// The tile index is outside of the board.
    IndexOutOfRange { index: usize, len: usize },

    /// The row is outside of the board.
    RowOutOfRange { row: usize, grid_size: usize },

    /// The column is outside of the board.
    ColumnOutOfRange { column: usize, grid_size: usize },
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BoardError::InvalidGridSize(s) => write!(f, "grid size must be 3, 4, or 5 (got {s})"),
            BoardError::WrongTileCount { expected, found } => {
                write!(f, "tile count must match the grid size ({expected}, got {found})")
            }
            BoardError::IndexOutOfRange { index, len } => write!(
                f,
                "index must be between 0 and {} (got {index})",
                len.saturating_sub(1)
            ),
            BoardError::RowOutOfRange { row, grid_size } => write!(
                f,
                "row must be between 0 and {} (got {row})",
                grid_size.saturating_sub(1)
            ),
            BoardError::ColumnOutOfRange { column, grid_size } => write!(
                f,
                "column must be between 0 and {} (got {column})",
                grid_size.saturating_sub(1)
            ),
        }
    }
}

impl Error for BoardError {}

/// One cell of the board.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Tile {
    /// Color of the tile.
    pub color: Rgb,

    /// Whether the tile is face up, waiting for the pair to be resolved.
    pub is_selected: bool,

    /// Whether the tile has been matched. A matched tile stays matched until the end of the
    /// round.
    pub is_matched: bool,

    /// Whether this is the unpaired tile of an odd-sized board.
    /// The placeholder is matched from the start so that it cannot be selected.
    pub is_placeholder: bool,
}

impl Tile {
    /// Create a [`Tile`] object for a color.
    pub fn new(color: Rgb) -> Self {
        Self {
            color,
            is_selected: false,
            is_matched: false,
            is_placeholder: false,
        }
    }

    /// Create the placeholder tile.
    pub fn placeholder() -> Self {
        Self {
            color: Rgb::PLACEHOLDER,
            is_selected: false,
            is_matched: true,
            is_placeholder: true,
        }
    }

    /// Whether the two tiles form a pair.
    pub fn pairs_with(&self, other: &Tile) -> bool {
        !self.is_placeholder && !other.is_placeholder && self.color == other.color
    }
}

/// Square grid of tiles, stored in row-major order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Board {
    /// Number of rows and columns.
    grid_size: usize,

    /// The tiles, row after row.
    tiles: Vec<Tile>,
}

impl Board {
    /// Number of pairs for the grid size. For odd-sized grids, the remaining cell is the
    /// placeholder.
    pub fn pair_count_for(grid_size: usize) -> usize {
        grid_size * grid_size / 2
    }

    /// Verify that the grid size is supported.
    pub fn check_grid_size(grid_size: usize) -> Result<(), BoardError> {
        if GRID_SIZES.contains(&grid_size) {
            Ok(())
        } else {
            Err(BoardError::InvalidGridSize(grid_size))
        }
    }

    /// Generate a random board.
    ///
    /// # Errors
    ///
    /// The method returns an error if the grid size is not 3, 4, or 5.
    pub fn generate<R: Rng + ?Sized>(grid_size: usize, rng: &mut R) -> Result<Board, BoardError> {
        Self::generate_with(grid_size, &mut ColorSampler::new(), rng)
    }

    /// Generate a random board by using the provided color sampler.
    ///
    /// # Errors
    ///
    /// The method returns an error if the grid size is not 3, 4, or 5.
    pub fn generate_with<R: Rng + ?Sized>(
        grid_size: usize,
        sampler: &mut ColorSampler,
        rng: &mut R,
    ) -> Result<Board, BoardError> {
        Self::check_grid_size(grid_size)?;

        let total: usize = grid_size * grid_size;
        let pair_count: usize = Self::pair_count_for(grid_size);

        // Each color twice, in random order
        let colors: Vec<Rgb> = sampler.generate(pair_count, rng);
        let mut pairs: Vec<Rgb> = Vec::with_capacity(2 * pair_count);
        pairs.extend_from_slice(&colors);
        pairs.extend_from_slice(&colors);
        pairs.shuffle(rng);

        // Odd grids get one placeholder at a random position. The colors after that position
        // are shifted by one cell.
        let placeholder: Option<usize> = if total % 2 == 1 {
            Some(rng.random_range(0..total))
        } else {
            None
        };
        debug!("Grid size = {grid_size}  Pairs = {pair_count}  Placeholder = {placeholder:?}");

        let mut color_iter = pairs.into_iter();
        let mut tiles: Vec<Tile> = Vec::with_capacity(total);
        for index in 0..total {
            if Some(index) == placeholder {
                tiles.push(Tile::placeholder());
            } else if let Some(c) = color_iter.next() {
                tiles.push(Tile::new(c));
            }
        }

        Ok(Board { grid_size, tiles })
    }

    /// Create a board from a list of tiles, in row-major order.
    ///
    /// # Errors
    ///
    /// The method returns an error if the grid size is not supported or if the number of tiles
    /// does not match the grid size.
    pub fn from_tiles(grid_size: usize, tiles: Vec<Tile>) -> Result<Board, BoardError> {
        Self::check_grid_size(grid_size)?;
        if tiles.len() != grid_size * grid_size {
            return Err(BoardError::WrongTileCount {
                expected: grid_size * grid_size,
                found: tiles.len(),
            });
        }
        Ok(Board { grid_size, tiles })
    }

    /// Number of rows (and columns).
    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Number of pairs to match.
    pub fn pair_count(&self) -> usize {
        Self::pair_count_for(self.grid_size)
    }

    /// Number of tiles.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether the board has no tiles. Never true for a board built by this module.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Return the tiles in row-major order.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Return the tile at the given index.
    pub fn tile(&self, index: usize) -> Result<&Tile, BoardError> {
        self.tiles.get(index).ok_or(BoardError::IndexOutOfRange {
            index,
            len: self.tiles.len(),
        })
    }

    pub(crate) fn tile_mut(&mut self, index: usize) -> Result<&mut Tile, BoardError> {
        let len: usize = self.tiles.len();
        self.tiles
            .get_mut(index)
            .ok_or(BoardError::IndexOutOfRange { index, len })
    }

    /// Convert a row and a column into a tile index.
    pub fn index_of(&self, row: usize, column: usize) -> Result<usize, BoardError> {
        if row >= self.grid_size {
            return Err(BoardError::RowOutOfRange {
                row,
                grid_size: self.grid_size,
            });
        }
        if column >= self.grid_size {
            return Err(BoardError::ColumnOutOfRange {
                column,
                grid_size: self.grid_size,
            });
        }
        Ok(row * self.grid_size + column)
    }

    /// Return the tile at the given row and column.
    pub fn tile_at(&self, row: usize, column: usize) -> Result<&Tile, BoardError> {
        self.tile(self.index_of(row, column)?)
    }

    /// Return the tiles as a list of rows.
    pub fn rows(&self) -> Vec<&[Tile]> {
        self.tiles.chunks(self.grid_size).collect()
    }

    /// Index of the placeholder tile, if any.
    pub fn placeholder_index(&self) -> Option<usize> {
        self.tiles.iter().position(|t| t.is_placeholder)
    }

    /// Number of pairs that have been matched.
    pub fn matched_pairs(&self) -> usize {
        self.tiles
            .iter()
            .filter(|t| t.is_matched && !t.is_placeholder)
            .count()
            / 2
    }

    /// Whether all the pairs are matched.
    pub fn is_cleared(&self) -> bool {
        self.tiles.iter().all(|t| t.is_matched)
    }

    /// Return the index of the other tile with the same color.
    pub fn partner_of(&self, index: usize) -> Option<usize> {
        let tile: &Tile = self.tiles.get(index)?;
        self.tiles
            .iter()
            .enumerate()
            .find(|(i, t)| *i != index && t.pairs_with(tile))
            .map(|(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn create_test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(12345)
    }

    fn color_count(board: &Board, color: &Rgb) -> usize {
        board
            .tiles()
            .iter()
            .filter(|t| !t.is_placeholder && t.color == *color)
            .count()
    }

    #[test]
    fn test_pair_count() {
        assert_eq!(Board::pair_count_for(3), 4);
        assert_eq!(Board::pair_count_for(4), 8);
        assert_eq!(Board::pair_count_for(5), 12);
    }

    #[test]
    fn test_invalid_grid_size() {
        let mut rng = create_test_rng();

        for size in [0, 1, 2, 6, 10] {
            assert_eq!(
                Board::generate(size, &mut rng),
                Err(BoardError::InvalidGridSize(size))
            );
        }
    }

    #[test]
    fn test_every_color_twice() {
        let mut rng = create_test_rng();

        for size in GRID_SIZES {
            for _ in 0..20 {
                let board: Board = Board::generate(size, &mut rng).unwrap();
                assert_eq!(board.len(), size * size);
                for tile in board.tiles().iter().filter(|t| !t.is_placeholder) {
                    assert_eq!(color_count(&board, &tile.color), 2);
                }
                let placeholders: usize =
                    board.tiles().iter().filter(|t| t.is_placeholder).count();
                assert_eq!(placeholders, size % 2);
            }
        }
    }

    #[test]
    fn test_placeholder_is_matched() {
        let mut rng = create_test_rng();
        let board: Board = Board::generate(5, &mut rng).unwrap();

        let index: usize = board.placeholder_index().unwrap();
        let tile: &Tile = board.tile(index).unwrap();
        assert!(tile.is_matched);
        assert!(!tile.is_selected);
        assert_eq!(board.partner_of(index), None);
        assert_eq!(board.matched_pairs(), 0);
    }

    #[test]
    fn test_placeholder_position_varies() {
        let mut rng = create_test_rng();
        let mut seen: Vec<usize> = (0..200)
            .filter_map(|_| Board::generate(3, &mut rng).unwrap().placeholder_index())
            .collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen, (0..9).collect::<Vec<usize>>());
    }

    #[test]
    fn test_partner_of() {
        let mut rng = create_test_rng();
        let board: Board = Board::generate(4, &mut rng).unwrap();

        for i in 0..board.len() {
            let j: usize = board.partner_of(i).unwrap();
            assert_ne!(i, j);
            assert_eq!(board.partner_of(j), Some(i));
        }
    }

    #[test]
    fn test_row_column_lookup() {
        let tiles: Vec<Tile> = (0..9)
            .map(|i| Tile::new(Rgb::new(i as f32 / 10.0, 0.0, 0.0)))
            .collect();
        let board: Board = Board::from_tiles(3, tiles.clone()).unwrap();

        assert_eq!(board.tile_at(0, 0).unwrap(), &tiles[0]);
        assert_eq!(board.tile_at(1, 2).unwrap(), &tiles[5]);
        assert_eq!(board.tile_at(2, 2).unwrap(), &tiles[8]);
        assert_eq!(
            board.tile_at(3, 0),
            Err(BoardError::RowOutOfRange {
                row: 3,
                grid_size: 3
            })
        );
        assert_eq!(
            board.tile_at(0, 3),
            Err(BoardError::ColumnOutOfRange {
                column: 3,
                grid_size: 3
            })
        );
        assert_eq!(
            board.tile(9),
            Err(BoardError::IndexOutOfRange { index: 9, len: 9 })
        );

        let rows: Vec<&[Tile]> = board.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2], &tiles[6..9]);
    }

    #[test]
    fn test_from_tiles_wrong_count() {
        let tiles: Vec<Tile> = vec![Tile::new(Rgb::PLACEHOLDER); 4];
        assert_eq!(
            Board::from_tiles(3, tiles),
            Err(BoardError::WrongTileCount {
                expected: 9,
                found: 4
            })
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            BoardError::InvalidGridSize(2).to_string(),
            "grid size must be 3, 4, or 5 (got 2)"
        );
        assert_eq!(
            BoardError::IndexOutOfRange { index: 9, len: 9 }.to_string(),
            "index must be between 0 and 8 (got 9)"
        );
    }
}
