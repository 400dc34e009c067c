//! Playback state machine.
//!
//! [`transition`] is the whole controller logic: it takes the current state
//! and a [`Transport`] command and returns the next state plus the
//! [`Effect`]s the driver must carry out. It never fails; out-of-range moves
//! are clamped and stale ticks are ignored.

use serde::{Deserialize, Serialize};

use crate::speed::Speed;

/// Where playback is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing has been played since load or reset
    #[default]
    Idle,
    /// Ticks are advancing the cursor
    Playing,
    /// Stopped by the user somewhere on the timeline
    Paused,
    /// Playback ran to the end
    Complete,
}

/// A command from the user or the tick timer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "value", rename_all = "snake_case")]
pub enum Transport {
    Play,
    Pause,
    StepForward,
    StepBackward,
    SkipToBeginning,
    SkipToEnd,
    SetSpeed(f64),
    Reset,
    Tick,
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// The cursor now points at this position
    CursorMoved(usize),
    /// Arm the tick timer
    StartTicking,
    /// Cancel any pending tick
    StopTicking,
    SpeedChanged(Speed),
    /// Playback arrived at the end; fires once per arrival
    Completed,
}

/// Cursor position, phase and speed over a log of `total` steps.
///
/// The cursor counts applied steps, so it ranges over `0..=total`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    cursor: usize,
    total: usize,
    phase: Phase,
    speed: Speed,
    completion_armed: bool,
}

impl PlaybackState {
    pub fn new(total: usize) -> Self {
        Self {
            cursor: 0,
            total,
            phase: Phase::Idle,
            speed: Speed::NORMAL,
            completion_armed: true,
        }
    }

    /// Same speed, fresh timeline of `total` steps.
    pub fn reloaded(self, total: usize) -> Self {
        Self {
            speed: self.speed,
            ..Self::new(total)
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    pub fn is_paused(&self) -> bool {
        self.phase == Phase::Paused
    }

    pub fn at_end(&self) -> bool {
        self.cursor == self.total
    }

    /// Fraction of the log applied, 0.0 - 1.0.
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.cursor as f64 / self.total as f64
        }
    }

    /// Apply one command in place, returning the requested effects.
    pub fn apply(&mut self, transport: Transport) -> Vec<Effect> {
        let mut effects = Vec::new();
        let before = self.cursor;

        match transport {
            Transport::Play => {
                if self.cursor < self.total && self.phase != Phase::Playing {
                    self.phase = Phase::Playing;
                    effects.push(Effect::StartTicking);
                }
            }
            Transport::Pause => {
                if self.phase == Phase::Playing {
                    effects.push(Effect::StopTicking);
                }
                if self.phase != Phase::Complete {
                    self.phase = Phase::Paused;
                }
            }
            Transport::StepForward | Transport::StepBackward => {
                if self.phase == Phase::Playing {
                    effects.push(Effect::StopTicking);
                }
                self.cursor = match transport {
                    Transport::StepForward => (self.cursor + 1).min(self.total),
                    _ => self.cursor.saturating_sub(1),
                };
                self.phase = Phase::Paused;
            }
            Transport::SkipToBeginning => {
                self.cursor = 0;
                if self.phase == Phase::Complete {
                    self.phase = Phase::Idle;
                }
            }
            Transport::SkipToEnd => {
                self.cursor = self.total;
                if self.phase == Phase::Playing {
                    self.phase = Phase::Complete;
                    effects.push(Effect::StopTicking);
                }
            }
            Transport::SetSpeed(value) => {
                let speed = self.speed.adjusted(value);
                if speed != self.speed {
                    self.speed = speed;
                    effects.push(Effect::SpeedChanged(speed));
                }
            }
            Transport::Reset => {
                self.cursor = 0;
                self.phase = Phase::Idle;
                self.completion_armed = true;
                effects.push(Effect::StopTicking);
            }
            Transport::Tick => {
                if self.phase != Phase::Playing {
                    return effects;
                }
                self.cursor = (self.cursor + 1).min(self.total);
                if self.at_end() {
                    self.phase = Phase::Complete;
                    effects.push(Effect::StopTicking);
                }
            }
        }

        if self.cursor != before {
            effects.push(Effect::CursorMoved(self.cursor));
        }

        // Only ticks and skip-to-end count as arriving at the end
        let arrived = matches!(transport, Transport::Tick | Transport::SkipToEnd) && self.at_end();
        if arrived && self.completion_armed {
            self.completion_armed = false;
            effects.push(Effect::Completed);
        }
        if self.cursor < self.total {
            self.completion_armed = true;
        }

        effects
    }
}

/// Pure transition function over [`PlaybackState`].
pub fn transition(mut state: PlaybackState, transport: Transport) -> (PlaybackState, Vec<Effect>) {
    let effects = state.apply(transport);
    (state, effects)
}
