/*
cli_options.rs

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

//! Process command-line options.
//!
//! These options are intended for developers. Rendering is done by a separate front end, so
//! the command line gives access to the game core: generating boards, reading the high
//! scores, and playing a run with a bot.
//!
//! # Examples
//!
//! Generate two boards at the medium difficulty level:
//!
//! ```text
//! $ chromatch --board -f medium -c 2 --seed 12
//! ```
//!
//! Play three levels at the hard difficulty level, with a wrong pair every other turn:
//!
//! ```text
//! $ chromatch --debug --autoplay -f hard --levels 3 --mistakes
//! ```

use clap::{CommandFactory, Parser};
use log::debug;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::env;
use std::path::PathBuf;

use crate::config::{COPYRIGHT_NOTICE, GameConfig, HIGH_SCORES_GLOBAL};
use crate::difficulty::Difficulty;
use crate::game::{Game, Phase, Snapshot};
use crate::generator::board::{Board, Tile};
use crate::highscores::HighScoreEntry;
use crate::saver::{JsonStore, Store};
use crate::session::{Command, Event, Session};

/// Developer tool for the Chromatch game core.
#[derive(Parser)]
#[command(about, long_about = None, version, long_version = COPYRIGHT_NOTICE, ignore_errors = true)]
struct Args {
    /// Print random boards
    #[arg(short, long, default_value_t = false, group = "mode")]
    board: bool,

    /// Print the high scores
    #[arg(short, long, default_value_t = false, group = "mode")]
    scores: bool,

    /// Play a run with a bot
    #[arg(short, long, default_value_t = false, group = "mode")]
    autoplay: bool,

    /// Delete the saved run of the difficulty
    #[arg(long, default_value_t = false, group = "mode")]
    forget: bool,

    /// Difficulty level
    #[arg(value_enum, short = 'f', long)]
    difficulty: Option<Difficulty>,

    /// Number of boards to generate
    #[arg(short, long, default_value_t = 1, requires = "board")]
    count: usize,

    /// Seed for the random generator
    #[arg(long)]
    seed: Option<u64>,

    /// Number of levels the bot completes before leaving the run
    #[arg(short, long, default_value_t = 1, requires = "autoplay")]
    levels: u32,

    /// Make the bot tap a wrong pair every other turn
    #[arg(short, long, default_value_t = false, requires = "autoplay")]
    mistakes: bool,

    /// Directory for the save files
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Enable debug messages
    #[arg(short, long, default_value_t = false)]
    debug: bool,
}

/// Parse and process command-line options. Return the process exit code.
pub fn parse() -> u8 {
    let args: Args = Args::parse();

    if args.debug {
        unsafe {
            env::set_var("RUST_LOG", "debug");
        }
    }
    env_logger::init();

    if args.board {
        return print_boards(&args);
    }
    if args.scores {
        return print_scores(&args);
    }
    if args.autoplay {
        return autoplay(&args);
    }
    if args.forget {
        return forget(&args);
    }
    let _ = Args::command().print_help();
    0
}

/// Return the difficulty option, or print an error.
fn required_difficulty(args: &Args) -> Option<Difficulty> {
    if args.difficulty.is_none() {
        eprintln!("The --difficulty option is required for this mode.");
    }
    args.difficulty
}

/// Return the store in the data directory. The high scores are capped like in the game.
fn open_store(args: &Args, config: &GameConfig) -> Option<JsonStore> {
    let store: Option<JsonStore> = match &args.data_dir {
        Some(d) => Some(JsonStore::new(d.clone(), config.high_score_cap)),
        None => JsonStore::in_user_data_dir(config.high_score_cap),
    };
    if store.is_none() {
        eprintln!("Cannot find a data directory. Use --data-dir.");
    }
    store
}

fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

/// Format a tile as a hex color. The placeholder is shown as dashes.
fn tile_label(tile: &Tile) -> String {
    if tile.is_placeholder {
        "-------".to_string()
    } else {
        tile.color.to_hex()
    }
}

fn print_boards(args: &Args) -> u8 {
    let Some(difficulty) = required_difficulty(args) else {
        return 1;
    };
    let mut rng: StdRng = rng(args.seed);

    for i in 0..args.count {
        let board: Board = match Board::generate(difficulty.grid_size(), &mut rng) {
            Ok(b) => b,
            Err(error) => {
                eprintln!("Error: {error}");
                return 1;
            }
        };
        if i > 0 {
            println!();
        }
        for row in board.rows() {
            let labels: Vec<String> = row.iter().map(tile_label).collect();
            println!("{}", labels.join(" "));
        }
    }
    0
}

fn print_entry(rank: usize, entry: &HighScoreEntry) {
    println!(
        "{rank:>2}. {:>6}  level {:>3}  {:<6}  {}",
        entry.score, entry.level, entry.difficulty, entry.date
    );
}

fn print_scores(args: &Args) -> u8 {
    let config: GameConfig = GameConfig::default();
    let Some(store) = open_store(args, &config) else {
        return 1;
    };
    let limit: usize = match args.difficulty {
        Some(_) => config.high_score_cap,
        None => HIGH_SCORES_GLOBAL,
    };
    match store.top_high_scores(args.difficulty, limit) {
        Ok(entries) if entries.is_empty() => println!("No high scores."),
        Ok(entries) => {
            for (i, entry) in entries.iter().enumerate() {
                print_entry(i + 1, entry);
            }
        }
        Err(error) => {
            eprintln!("Error reading the high scores: {error}");
            return 1;
        }
    }
    0
}

fn forget(args: &Args) -> u8 {
    let Some(difficulty) = required_difficulty(args) else {
        return 1;
    };
    let Some(store) = open_store(args, &GameConfig::default()) else {
        return 1;
    };
    match store.delete_progress(difficulty) {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("Error deleting the saved run: {error}");
            1
        }
    }
}

/// Return the two tiles the bot taps next, or None if nothing can be tapped.
///
/// With `mistake`, the two tiles have different colors when possible.
fn next_taps(snapshot: &Snapshot, mistake: bool) -> Option<(usize, usize)> {
    let open: Vec<usize> = (0..snapshot.tiles.len())
        .filter(|i| !snapshot.tiles[*i].is_matched)
        .collect();
    let first: usize = *open.first()?;
    let tile: &Tile = &snapshot.tiles[first];

    let wrong: Option<usize> = open
        .iter()
        .copied()
        .find(|i| !tile.pairs_with(&snapshot.tiles[*i]));
    if let (true, Some(second)) = (mistake, wrong) {
        return Some((first, second));
    }
    open.iter()
        .copied()
        .find(|i| *i != first && tile.pairs_with(&snapshot.tiles[*i]))
        .map(|second| (first, second))
}

fn autoplay(args: &Args) -> u8 {
    let Some(difficulty) = required_difficulty(args) else {
        return 1;
    };
    let config: GameConfig = GameConfig::default();
    let Some(store) = open_store(args, &config) else {
        return 1;
    };
    let game: Game = Game::with_config(difficulty, config, rng(args.seed));
    let session: Session = Session::spawn(game, Box::new(store));
    let mut completed: u32 = 0;
    let mut waiting: bool = false;
    let mut mistake: bool = args.mistakes;

    session.send(Command::Start);
    while let Ok(event) = session.events().recv_blocking() {
        match &event {
            Event::Snapshot(s) => {
                debug!("{:?} level {} score {}", s.phase, s.state.current_level, s.state.score);
                if s.phase != Phase::Play || s.paused || waiting || !s.selection.is_empty() {
                    continue;
                }
                if let Some((first, second)) = next_taps(s, mistake) {
                    waiting = true;
                    mistake = args.mistakes && !mistake;
                    session.send(Command::Tap(first));
                    session.send(Command::Tap(second));
                }
            }
            other => println!("{other:?}"),
        }
        match event {
            Event::ResumeAvailable(_) => {
                session.send(Command::ResumeSaved);
            }
            Event::Matched { .. } | Event::Mismatched { .. } => waiting = false,
            Event::LevelComplete { .. } => {
                completed += 1;
                if completed >= args.levels {
                    break;
                }
            }
            Event::GameOver { .. } => break,
            _ => (),
        }
    }
    session.exit();
    0
}
