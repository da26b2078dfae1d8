/*
session.rs

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

//! Drive a [`Game`] object from a single thread.
//!
//! The session owns the [`Game`] object and processes messages one at a time from a queue.
//! The host (the renderer) sends [`Command`] messages and receives [`Event`] messages.
//! Timers (reveal duration, countdown ticks, and the delays before a pair is resolved) are
//! threads that sleep and then post a message back to the same queue, so that the run is only
//! ever modified by the session thread.
//!
//! The persistence operations run on a separate worker thread that owns the [`Store`] object.
//! Their results come back as messages, and their failures are only logged.
//!
//! ```text
//!   host --Command--> [ queue ] --> session thread --Event--> host
//!                        ^  ^            |
//!             timers ----+  |            | jobs
//!                           +--- store worker thread
//! ```

use async_channel::{Receiver, Sender};
use log::{debug, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::config::Preferences;
use crate::difficulty::Difficulty;
use crate::game::{Game, Phase, Resolution, Snapshot, TapOutcome, TickOutcome};
use crate::highscores::HighScoreEntry;
use crate::progress::GameProgress;
use crate::saver::Store;

/// Requests from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Look for a saved run, then either offer to resume it ([`Event::ResumeAvailable`]) or
    /// start at level 1.
    Start,

    /// Continue the saved run offered by [`Event::ResumeAvailable`].
    ResumeSaved,

    /// Discard the saved run and start at level 1.
    NewGame,

    /// The player tapped a tile.
    Tap(usize),

    /// Freeze the countdown (application in background, exit dialog displayed).
    Pause,

    /// Continue the countdown.
    Resume,

    /// Start a new run after a game over.
    TryAgain,

    /// Save the run if needed and stop the session.
    Exit,
}

/// Audio feedback that the host may play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    MatchFound,
    LevelComplete,
    GameOver,
}

/// Notifications for the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Complete state of the run, sent after every change except the countdown ticks, which
    /// only send [`Event::TimeLeft`].
    Snapshot(Snapshot),

    /// A run was saved for this difficulty. Answer with [`Command::ResumeSaved`] or
    /// [`Command::NewGame`].
    ResumeAvailable(GameProgress),

    /// A tile is face up.
    Selected(usize),

    Matched {
        first: usize,
        second: usize,
        points: u32,
        score: u32,
    },

    Mismatched {
        first: usize,
        second: usize,
    },

    /// All the pairs are matched. The new board is in the memorize phase.
    LevelComplete {
        level: u32,
        bonus: u32,
        time_limit: u32,
    },

    /// Remaining seconds.
    TimeLeft(u32),

    GameOver {
        score: u32,
        level: u32,
    },

    /// The finished run made it to the high scores.
    NewHighScore {
        difficulty: Difficulty,
        position: usize,
    },

    /// Sent only when sound is enabled in the preferences.
    Sound(SoundCue),
}

/// Messages processed by the session thread.
#[derive(Debug)]
enum Message {
    Command(Command),
    PreferencesLoaded(Preferences),
    ProgressLoaded(Option<GameProgress>),
    HighScoreRecorded(Option<usize>),
    RevealDone {
        round: u64,
    },
    ResolveDone {
        round: u64,
        first: usize,
        second: usize,
        at: Instant,
    },
    Tick {
        epoch: u64,
    },
}

/// Persistence operations, processed by the store worker.
#[derive(Debug)]
enum Job {
    LoadPreferences,
    LoadProgress(Difficulty),
    SaveProgress(GameProgress),
    DeleteProgress(Difficulty),
    /// Insert the entry, then trim the scoreboard to the cap.
    InsertHighScore(HighScoreEntry, usize),
}

/// Handle to a running session.
///
/// Dropping the handle exits the session, saving the run if needed.
pub struct Session {
    commands: Sender<Message>,
    events: Receiver<Event>,
    thread: Option<JoinHandle<()>>,
}

impl Session {
    /// Start a session thread for the game.
    pub fn spawn(game: Game, store: Box<dyn Store>) -> Self {
        let (commands, queue) = async_channel::unbounded::<Message>();
        let (events_sender, events) = async_channel::unbounded::<Event>();
        let (jobs, job_queue) = async_channel::unbounded::<Job>();

        let worker: JoinHandle<()> = spawn_store_worker(store, job_queue, commands.clone());
        let _ = jobs.send_blocking(Job::LoadPreferences);

        let actor: SessionActor = SessionActor {
            game,
            preferences: Preferences::default(),
            saved: None,
            round: 0,
            ticker: Arc::new(AtomicU64::new(0)),
            queue_sender: commands.clone(),
            events: events_sender,
            jobs,
        };
        let thread: JoinHandle<()> = thread::spawn(move || {
            actor.run(queue);
            // Wait for the pending saves
            if worker.join().is_err() {
                warn!("The store worker panicked");
            }
        });

        Self {
            commands,
            events,
            thread: Some(thread),
        }
    }

    /// Post a command. Return false if the session is stopped.
    pub fn send(&self, command: Command) -> bool {
        self.commands
            .send_blocking(Message::Command(command))
            .is_ok()
    }

    /// Receiver for the events. The channel is closed when the session stops.
    pub fn events(&self) -> &Receiver<Event> {
        &self.events
    }

    /// Exit the session and wait for the pending saves.
    pub fn exit(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = self.commands.send_blocking(Message::Command(Command::Exit));
            if thread.join().is_err() {
                warn!("The session thread panicked");
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Run the persistence operations in order, until the session drops its sender.
fn spawn_store_worker(
    store: Box<dyn Store>,
    jobs: Receiver<Job>,
    replies: Sender<Message>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(job) = jobs.recv_blocking() {
            debug!("Store job: {job:?}");
            let reply: Option<Message> = match job {
                Job::LoadPreferences => match store.load_preferences() {
                    Ok(p) => Some(Message::PreferencesLoaded(p)),
                    Err(error) => {
                        warn!("Error loading the preferences: {error}");
                        None
                    }
                },
                Job::LoadProgress(difficulty) => match store.load_progress(difficulty) {
                    Ok(p) => Some(Message::ProgressLoaded(p)),
                    Err(error) => {
                        // No resume offer
                        warn!("Error loading the saved run: {error}");
                        Some(Message::ProgressLoaded(None))
                    }
                },
                Job::SaveProgress(progress) => {
                    if let Err(error) = store.save_progress(&progress) {
                        warn!("Error saving the run: {error}");
                    }
                    None
                }
                Job::DeleteProgress(difficulty) => {
                    if let Err(error) = store.delete_progress(difficulty) {
                        warn!("Error deleting the saved run: {error}");
                    }
                    None
                }
                Job::InsertHighScore(entry, cap) => {
                    let difficulty: Difficulty = entry.difficulty;
                    match store.insert_high_score(entry) {
                        Ok(position) => {
                            if let Err(error) = store.evict_below_cap(difficulty, cap) {
                                warn!("Error trimming the high scores: {error}");
                            }
                            Some(Message::HighScoreRecorded(position.filter(|p| *p <= cap)))
                        }
                        Err(error) => {
                            warn!("Error saving the high score: {error}");
                            None
                        }
                    }
                }
            };
            if let Some(message) = reply {
                // The session might be gone already
                let _ = replies.send_blocking(message);
            }
        }
    })
}

/// State of the session thread.
struct SessionActor {
    game: Game,
    preferences: Preferences,

    /// Run offered with [`Event::ResumeAvailable`].
    saved: Option<GameProgress>,

    /// Incremented for every new board, so that stale timers are ignored.
    round: u64,

    /// Incremented to stop the running ticker thread.
    ticker: Arc<AtomicU64>,

    /// Used by the timer threads to post back to the queue.
    queue_sender: Sender<Message>,
    events: Sender<Event>,
    jobs: Sender<Job>,
}

impl SessionActor {
    fn run(mut self, queue: Receiver<Message>) {
        while let Ok(message) = queue.recv_blocking() {
            if !self.handle(message) {
                break;
            }
        }
        self.stop_ticker();
        debug!("Session stopped");
    }

    /// Process a message. Return false to stop the session.
    fn handle(&mut self, message: Message) -> bool {
        match message {
            Message::Command(command) => return self.command(command),
            Message::PreferencesLoaded(p) => {
                debug!("Preferences: {p:?}");
                self.preferences = p;
            }
            Message::ProgressLoaded(progress) => self.progress_loaded(progress),
            Message::HighScoreRecorded(Some(position)) => self.emit(Event::NewHighScore {
                difficulty: self.game.difficulty(),
                position,
            }),
            Message::HighScoreRecorded(None) => (),
            Message::RevealDone { round } => {
                if round == self.round && self.game.end_memorize() {
                    self.start_ticker();
                    self.snapshot();
                }
            }
            Message::ResolveDone {
                round,
                first,
                second,
                at,
            } => {
                if round == self.round {
                    self.resolve(first, second, at);
                }
            }
            Message::Tick { epoch } => {
                if epoch == self.ticker.load(Ordering::SeqCst) {
                    self.tick();
                }
            }
        }
        true
    }

    fn command(&mut self, command: Command) -> bool {
        debug!("Command: {command:?}");
        match command {
            Command::Start => {
                if self.game.phase() == Phase::Idle {
                    self.job(Job::LoadProgress(self.game.difficulty()));
                }
            }
            Command::ResumeSaved => {
                if let Some(progress) = self.saved.take() {
                    match self.game.resume_from(&progress) {
                        Ok(()) => self.begin(),
                        Err(error) => warn!("Cannot resume the saved run: {error}"),
                    }
                }
            }
            Command::NewGame => {
                if self.saved.take().is_some() {
                    self.job(Job::DeleteProgress(self.game.difficulty()));
                }
                self.begin();
            }
            Command::Tap(index) => self.tap(index),
            Command::Pause => {
                self.game.pause();
                self.stop_ticker();
                self.snapshot();
            }
            Command::Resume => {
                // A resume without a pause must not restart the running ticker
                let was_paused: bool = self.game.is_paused();
                self.game.resume();
                if was_paused && matches!(self.game.phase(), Phase::Play | Phase::Resolving) {
                    self.start_ticker();
                }
                self.snapshot();
            }
            Command::TryAgain => match self.game.try_again() {
                Ok(duration) => {
                    self.round += 1;
                    self.schedule_reveal(duration);
                    self.snapshot();
                }
                Err(error) => debug!("Try again ignored: {error}"),
            },
            Command::Exit => {
                if let Some(progress) = self.game.exit_progress() {
                    self.job(Job::SaveProgress(progress));
                }
                return false;
            }
        }
        true
    }

    fn progress_loaded(&mut self, progress: Option<GameProgress>) {
        if self.game.phase() != Phase::Idle {
            return;
        }
        match progress {
            Some(p) => {
                self.saved = Some(p.clone());
                self.emit(Event::ResumeAvailable(p));
            }
            None => self.begin(),
        }
    }

    /// Generate the first board.
    fn begin(&mut self) {
        match self.game.start() {
            Ok(duration) => {
                self.round += 1;
                self.schedule_reveal(duration);
                self.snapshot();
            }
            Err(error) => debug!("Start ignored: {error}"),
        }
    }

    fn tap(&mut self, index: usize) {
        match self.game.tap(index) {
            Ok(TapOutcome::Ignored) => (),
            Ok(TapOutcome::Selected) => {
                self.emit(Event::Selected(index));
                self.snapshot();
            }
            Ok(TapOutcome::PairComplete { is_match }) => {
                let Some((first, second)) = self.game.selection().pair() else {
                    return;
                };
                let delay: Duration = if is_match {
                    self.game.config().match_delay
                } else {
                    self.game.config().mismatch_delay
                };
                self.emit(Event::Selected(index));
                self.snapshot();
                self.post_after(
                    delay,
                    Message::ResolveDone {
                        round: self.round,
                        first,
                        second,
                        at: Instant::now(),
                    },
                );
            }
            Err(error) => debug!("Tap on {index} rejected: {error}"),
        }
    }

    fn resolve(&mut self, first: usize, second: usize, at: Instant) {
        match self.game.resolve(at) {
            None => return,
            Some(Resolution::Mismatch) => self.emit(Event::Mismatched { first, second }),
            Some(Resolution::Match { points, .. }) => {
                self.emit(Event::Matched {
                    first,
                    second,
                    points,
                    score: self.game.state().score,
                });
                self.cue(SoundCue::MatchFound);
            }
            Some(Resolution::LevelComplete {
                points,
                bonus,
                level,
                time_limit,
            }) => {
                self.stop_ticker();
                self.emit(Event::Matched {
                    first,
                    second,
                    points,
                    score: self.game.state().score - bonus,
                });
                self.cue(SoundCue::MatchFound);
                self.emit(Event::LevelComplete {
                    level,
                    bonus,
                    time_limit,
                });
                self.cue(SoundCue::LevelComplete);
                self.round += 1;
                self.schedule_reveal(self.game.memorize_duration());
            }
        }
        self.snapshot();
    }

    fn tick(&mut self) {
        match self.game.tick() {
            TickOutcome::Ignored => (),
            TickOutcome::Running(seconds) => self.emit(Event::TimeLeft(seconds)),
            TickOutcome::GameOver => {
                self.stop_ticker();
                self.emit(Event::TimeLeft(0));
                self.emit(Event::GameOver {
                    score: self.game.state().score,
                    level: self.game.state().current_level,
                });
                self.cue(SoundCue::GameOver);
                if let Some(entry) = self.game.final_entry() {
                    self.job(Job::InsertHighScore(entry, self.game.config().high_score_cap));
                }
                self.snapshot();
            }
        }
    }

    fn schedule_reveal(&self, duration: Duration) {
        self.post_after(duration, Message::RevealDone { round: self.round });
    }

    /// Post the message to the queue after the delay.
    fn post_after(&self, delay: Duration, message: Message) {
        let sender: Sender<Message> = self.queue_sender.clone();
        thread::spawn(move || {
            thread::sleep(delay);
            let _ = sender.send_blocking(message);
        });
    }

    /// Start a thread that posts a tick message every period, until [`Self::stop_ticker`].
    fn start_ticker(&self) {
        if self.game.is_paused() {
            return;
        }
        let epoch: u64 = self.ticker.fetch_add(1, Ordering::SeqCst) + 1;
        let ticker: Arc<AtomicU64> = Arc::clone(&self.ticker);
        let sender: Sender<Message> = self.queue_sender.clone();
        let period: Duration = self.game.config().tick;

        thread::spawn(move || {
            loop {
                thread::sleep(period);
                if ticker.load(Ordering::SeqCst) != epoch
                    || sender.send_blocking(Message::Tick { epoch }).is_err()
                {
                    break;
                }
            }
        });
    }

    fn stop_ticker(&self) {
        self.ticker.fetch_add(1, Ordering::SeqCst);
    }

    fn job(&self, job: Job) {
        if self.jobs.send_blocking(job).is_err() {
            warn!("The store worker is not running");
        }
    }

    fn emit(&self, event: Event) {
        // The host might not listen anymore
        let _ = self.events.send_blocking(event);
    }

    fn cue(&self, cue: SoundCue) {
        if self.preferences.sound_enabled {
            self.emit(Event::Sound(cue));
        }
    }

    fn snapshot(&self) {
        self.emit(Event::Snapshot(self.game.snapshot()));
    }
}
