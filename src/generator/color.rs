/*
color.rs

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

//! Tile colors and the sampler that draws distinct colors.

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Minimum Euclidean distance between two colors of the same board.
/// Channels are normalized between 0 and 1.
pub const SIMILARITY_THRESHOLD: f32 = 0.1;

/// Number of draws for a color before the sampler gives up and keeps its best candidate.
const MAX_ATTEMPTS: usize = 1000;

// Colors stay in the mid range so that they are neither too dark nor too bright.
const CHANNEL_MIN: f32 = 0.2;
const CHANNEL_MAX: f32 = 0.8;

/// RGB color. Channels are floats between 0 and 1.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl Rgb {
    /// Neutral gray used for the placeholder tile of odd-sized boards.
    pub const PLACEHOLDER: Rgb = Rgb {
        red: 0.5,
        green: 0.5,
        blue: 0.5,
    };

    /// Create an [`Rgb`] object. The channels are clamped between 0 and 1.
    pub fn new(red: f32, green: f32, blue: f32) -> Self {
        Self {
            red: red.clamp(0.0, 1.0),
            green: green.clamp(0.0, 1.0),
            blue: blue.clamp(0.0, 1.0),
        }
    }

    /// Draw a random mid-range color.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            red: rng.random_range(CHANNEL_MIN..=CHANNEL_MAX),
            green: rng.random_range(CHANNEL_MIN..=CHANNEL_MAX),
            blue: rng.random_range(CHANNEL_MIN..=CHANNEL_MAX),
        }
    }

    /// Euclidean distance between two colors.
    pub fn distance(&self, other: &Rgb) -> f32 {
        let r: f32 = self.red - other.red;
        let g: f32 = self.green - other.green;
        let b: f32 = self.blue - other.blue;
        (r * r + g * g + b * b).sqrt()
    }

    /// Color components as integers between 0 and 255.
    pub fn to_rgb8(&self) -> (u8, u8, u8) {
        let c = |v: f32| (v * 255.0).round() as u8;
        (c(self.red), c(self.green), c(self.blue))
    }

    /// Color in the `#rrggbb` format.
    pub fn to_hex(&self) -> String {
        let (r, g, b) = self.to_rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

/// Draw lists of colors that are far enough from each other.
pub struct ColorSampler {
    /// Minimum distance between two colors.
    threshold: f32,

    /// Number of draws it took to produce the last list of colors.
    pub attempts: usize,

    /// Number of colors in the last list that were accepted after the sampler gave up, and
    /// that might therefore be closer than the threshold to another color.
    pub fallbacks: usize,
}

impl Default for ColorSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorSampler {
    /// Create a [`ColorSampler`] object that uses the [`SIMILARITY_THRESHOLD`] distance.
    pub fn new() -> Self {
        Self::with_threshold(SIMILARITY_THRESHOLD)
    }

    /// Create a [`ColorSampler`] object with a custom minimum distance.
    pub fn with_threshold(threshold: f32) -> Self {
        Self {
            threshold,
            attempts: 0,
            fallbacks: 0,
        }
    }

    /// Return `count` colors.
    ///
    /// Each color is at least at the threshold distance from the previous ones, unless the
    /// sampler had to give up for that color (see [`ColorSampler::fallbacks`]).
    pub fn generate<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) -> Vec<Rgb> {
        let mut colors: Vec<Rgb> = Vec::with_capacity(count);

        self.attempts = 0;
        self.fallbacks = 0;
        for _ in 0..count {
            let color: Rgb = self.next_color(&colors, rng);
            colors.push(color);
        }
        debug!(
            "Colors = {count}  Attempts = {}  Fallbacks = {}",
            self.attempts, self.fallbacks
        );
        colors
    }

    /// Draw a color that is far enough from the provided colors.
    fn next_color<R: Rng + ?Sized>(&mut self, accepted: &[Rgb], rng: &mut R) -> Rgb {
        let mut best: Option<(Rgb, f32)> = None;

        for _ in 0..MAX_ATTEMPTS {
            self.attempts += 1;
            let candidate: Rgb = Rgb::random(rng);
            let closest: f32 = accepted
                .iter()
                .map(|c| c.distance(&candidate))
                .fold(f32::INFINITY, f32::min);

            if closest >= self.threshold {
                return candidate;
            }
            match best {
                Some((_, d)) if d >= closest => (),
                _ => best = Some((candidate, closest)),
            }
        }

        // Give up and keep the candidate that is the farthest from the accepted colors
        self.fallbacks += 1;
        debug!(
            "No color at distance {} after {MAX_ATTEMPTS} attempts",
            self.threshold
        );
        match best {
            Some((c, _)) => c,
            None => Rgb::random(rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn create_test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(4242)
    }

    #[test]
    fn test_distance() {
        let black: Rgb = Rgb::new(0.0, 0.0, 0.0);
        let white: Rgb = Rgb::new(1.0, 1.0, 1.0);

        assert_eq!(black.distance(&black), 0.0);
        assert!((black.distance(&white) - 3.0_f32.sqrt()).abs() < 1e-6);
        assert_eq!(black.distance(&white), white.distance(&black));
    }

    #[test]
    fn test_random_colors_stay_mid_range() {
        let mut rng = create_test_rng();

        for _ in 0..1000 {
            let c: Rgb = Rgb::random(&mut rng);
            for v in [c.red, c.green, c.blue] {
                assert!((CHANNEL_MIN..=CHANNEL_MAX).contains(&v));
            }
        }
    }

    #[test]
    fn test_sampler_respects_threshold() {
        let mut rng = create_test_rng();
        let mut sampler: ColorSampler = ColorSampler::new();

        for _ in 0..50 {
            let colors: Vec<Rgb> = sampler.generate(12, &mut rng);
            assert_eq!(colors.len(), 12);
            assert_eq!(sampler.fallbacks, 0);
            for (i, a) in colors.iter().enumerate() {
                for b in &colors[i + 1..] {
                    assert!(a.distance(b) >= SIMILARITY_THRESHOLD);
                }
            }
        }
    }

    #[test]
    fn test_sampler_gives_up_on_impossible_threshold() {
        let mut rng = create_test_rng();
        // Larger than the diagonal of the mid-range cube: only the first color can be accepted
        let mut sampler: ColorSampler = ColorSampler::with_threshold(2.0);

        let colors: Vec<Rgb> = sampler.generate(3, &mut rng);
        assert_eq!(colors.len(), 3);
        assert_eq!(sampler.fallbacks, 2);
        assert_eq!(sampler.attempts, 1 + 2 * MAX_ATTEMPTS);
    }

    #[test]
    fn test_hex_format() {
        assert_eq!(Rgb::new(1.0, 0.0, 0.5).to_hex(), "#ff0080");
        assert_eq!(Rgb::PLACEHOLDER.to_rgb8(), (128, 128, 128));
    }
}
