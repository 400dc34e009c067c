//! Playback controller over a single operation log.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use stepwise_trace::{OperationLog, TraceError};

use crate::projector::{project, VisualState};
use crate::speed::Speed;
use crate::state::{Effect, Phase, PlaybackState, Transport};

/// Identifies one loaded log; bumped on every load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub u64);

/// One rendered step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub run: RunId,
    pub cursor: usize,
    pub total: usize,
    pub visual: VisualState,
}

/// Notification delivered to observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlaybackEvent {
    /// The cursor moved
    Frame(Frame),
    /// Playback arrived at the end of the log
    Complete { run: RunId },
}

type Observer = Box<dyn Fn(&PlaybackEvent) + Send + Sync>;

/// Owns a log and its playback state, and notifies observers on change.
pub struct Controller {
    run: RunId,
    log: Arc<OperationLog>,
    state: PlaybackState,
    observers: Vec<Observer>,
}

impl Controller {
    pub fn new(log: Arc<OperationLog>) -> Self {
        let state = PlaybackState::new(log.len());
        Self {
            run: RunId(1),
            log,
            state,
            observers: Vec::new(),
        }
    }

    /// Retire the current run and install `log` with a fresh timeline.
    ///
    /// The caller must cancel any pending tick; the returned effects say so.
    pub fn load(&mut self, log: Arc<OperationLog>) -> Vec<Effect> {
        let previous = self.run;
        self.run = RunId(previous.0 + 1);
        self.state = self.state.reloaded(log.len());
        self.log = log;

        tracing::debug!(
            retired = previous.0,
            run = self.run.0,
            steps = self.log.len(),
            "log loaded"
        );
        self.notify(&[Effect::CursorMoved(0)]);
        vec![Effect::StopTicking, Effect::CursorMoved(0)]
    }

    /// Register an observer for frames and completion.
    pub fn subscribe(&mut self, observer: impl Fn(&PlaybackEvent) + Send + Sync + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Apply a transport command and notify observers of its effects.
    pub fn apply(&mut self, transport: Transport) -> Vec<Effect> {
        let effects = self.state.apply(transport);
        if !effects.is_empty() {
            tracing::trace!(?transport, ?effects, cursor = self.state.cursor(), "transport");
        }
        self.notify(&effects);
        effects
    }

    pub fn play(&mut self) -> Vec<Effect> {
        self.apply(Transport::Play)
    }

    pub fn pause(&mut self) -> Vec<Effect> {
        self.apply(Transport::Pause)
    }

    pub fn reset(&mut self) -> Vec<Effect> {
        self.apply(Transport::Reset)
    }

    pub fn step_forward(&mut self) -> Vec<Effect> {
        self.apply(Transport::StepForward)
    }

    pub fn step_backward(&mut self) -> Vec<Effect> {
        self.apply(Transport::StepBackward)
    }

    pub fn skip_to_beginning(&mut self) -> Vec<Effect> {
        self.apply(Transport::SkipToBeginning)
    }

    pub fn skip_to_end(&mut self) -> Vec<Effect> {
        self.apply(Transport::SkipToEnd)
    }

    pub fn set_speed(&mut self, speed: f64) -> Vec<Effect> {
        self.apply(Transport::SetSpeed(speed))
    }

    pub fn tick(&mut self) -> Vec<Effect> {
        self.apply(Transport::Tick)
    }

    pub fn run(&self) -> RunId {
        self.run
    }

    pub fn log(&self) -> &Arc<OperationLog> {
        &self.log
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn status(&self) -> PlaybackStatus {
        self.into()
    }

    /// Projection of the log at the current cursor.
    pub fn visual_state(&self) -> Result<VisualState, TraceError> {
        project(&self.log, self.state.cursor())
    }

    fn notify(&self, effects: &[Effect]) {
        if self.observers.is_empty() {
            return;
        }
        for effect in effects {
            let event = match effect {
                Effect::CursorMoved(cursor) => match project(&self.log, *cursor) {
                    Ok(visual) => PlaybackEvent::Frame(Frame {
                        run: self.run,
                        cursor: *cursor,
                        total: self.log.len(),
                        visual,
                    }),
                    Err(e) => {
                        tracing::warn!(error = %e, cursor, "projection failed");
                        continue;
                    }
                },
                Effect::Completed => PlaybackEvent::Complete { run: self.run },
                _ => continue,
            };
            for observer in &self.observers {
                observer(&event);
            }
        }
    }
}

/// Playback status for sending to frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackStatus {
    pub run: RunId,
    pub current_step: usize,
    pub total_steps: usize,
    pub is_playing: bool,
    pub is_paused: bool,
    pub speed: Speed,
    pub phase: Phase,
    pub progress: f64,
}

impl From<&Controller> for PlaybackStatus {
    fn from(controller: &Controller) -> Self {
        let state = controller.state();
        Self {
            run: controller.run,
            current_step: state.cursor(),
            total_steps: state.total(),
            is_playing: state.is_playing(),
            is_paused: state.is_paused(),
            speed: state.speed(),
            phase: state.phase(),
            progress: state.progress(),
        }
    }
}
