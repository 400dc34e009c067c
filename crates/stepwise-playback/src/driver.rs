//! Async player: one tokio task owns a [`Controller`] and drives its ticks.
//!
//! Commands arrive over an mpsc channel and are answered over oneshots.
//! There is at most one pending tick, a `sleep_until` deadline in the task's
//! `select!` loop; a `StopTicking` effect clears it, which is how pause, reset
//! and load cancel ticks that were already scheduled. Frames are fanned out
//! to any number of subscribers over a broadcast channel.

use std::sync::Arc;
use std::time::Duration;

use stepwise_trace::{OperationLog, TraceError};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::controller::{Controller, PlaybackEvent, PlaybackStatus, RunId};
use crate::error::{PlaybackError, Result};
use crate::projector::VisualState;
use crate::state::{Effect, Phase, Transport};

/// Player configuration.
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// Tick interval at speed 1.0
    pub base_interval: Duration,
    /// Frames buffered per subscriber before slow ones start lagging
    pub frame_capacity: usize,
    /// Pending commands before senders wait
    pub command_capacity: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            base_interval: Duration::from_millis(1000),
            frame_capacity: 256,
            command_capacity: 64,
        }
    }
}

impl PlaybackConfig {
    #[must_use]
    pub fn with_base_interval(mut self, interval: Duration) -> Self {
        self.base_interval = interval;
        self
    }

    #[must_use]
    pub fn with_frame_capacity(mut self, capacity: usize) -> Self {
        self.frame_capacity = capacity.max(1);
        self
    }

    #[must_use]
    pub fn with_command_capacity(mut self, capacity: usize) -> Self {
        self.command_capacity = capacity.max(1);
        self
    }
}

enum Command {
    Load {
        log: Arc<OperationLog>,
        reply: oneshot::Sender<RunId>,
    },
    Transport {
        transport: Transport,
        reply: oneshot::Sender<PlaybackStatus>,
    },
    Status(oneshot::Sender<PlaybackStatus>),
    Visual(oneshot::Sender<std::result::Result<VisualState, TraceError>>),
    Log(oneshot::Sender<Arc<OperationLog>>),
}

/// Cloneable handle to a running player task.
///
/// The task exits once every handle has been dropped.
#[derive(Clone)]
pub struct Player {
    commands: mpsc::Sender<Command>,
    frames: broadcast::Sender<PlaybackEvent>,
}

impl Player {
    /// Spawn the player task with `log` loaded and idle.
    pub fn spawn(config: PlaybackConfig, log: OperationLog) -> (Self, JoinHandle<()>) {
        let (commands, inbox) = mpsc::channel(config.command_capacity);
        let (frames, _) = broadcast::channel(config.frame_capacity);

        let mut controller = Controller::new(Arc::new(log));
        let fanout = frames.clone();
        controller.subscribe(move |event| {
            // No subscribers is fine
            let _ = fanout.send(event.clone());
        });

        let handle = tokio::spawn(drive(controller, inbox, config.base_interval));
        (Self { commands, frames }, handle)
    }

    /// Receive every frame and completion from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.frames.subscribe()
    }

    /// Retire the current run and load `log`.
    pub async fn load(&self, log: OperationLog) -> Result<RunId> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Load {
            log: Arc::new(log),
            reply,
        })
        .await?;
        rx.await.map_err(|_| PlaybackError::Closed)
    }

    /// Apply one transport command, returning the resulting status.
    pub async fn command(&self, transport: Transport) -> Result<PlaybackStatus> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Transport { transport, reply }).await?;
        rx.await.map_err(|_| PlaybackError::Closed)
    }

    pub async fn play(&self) -> Result<PlaybackStatus> {
        self.command(Transport::Play).await
    }

    pub async fn pause(&self) -> Result<PlaybackStatus> {
        self.command(Transport::Pause).await
    }

    pub async fn reset(&self) -> Result<PlaybackStatus> {
        self.command(Transport::Reset).await
    }

    pub async fn step_forward(&self) -> Result<PlaybackStatus> {
        self.command(Transport::StepForward).await
    }

    pub async fn step_backward(&self) -> Result<PlaybackStatus> {
        self.command(Transport::StepBackward).await
    }

    pub async fn skip_to_beginning(&self) -> Result<PlaybackStatus> {
        self.command(Transport::SkipToBeginning).await
    }

    pub async fn skip_to_end(&self) -> Result<PlaybackStatus> {
        self.command(Transport::SkipToEnd).await
    }

    pub async fn set_speed(&self, speed: f64) -> Result<PlaybackStatus> {
        self.command(Transport::SetSpeed(speed)).await
    }

    pub async fn status(&self) -> Result<PlaybackStatus> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Status(reply)).await?;
        rx.await.map_err(|_| PlaybackError::Closed)
    }

    /// Projection at the current cursor.
    pub async fn visual_state(&self) -> Result<VisualState> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Visual(reply)).await?;
        Ok(rx.await.map_err(|_| PlaybackError::Closed)??)
    }

    /// The log currently loaded.
    pub async fn log(&self) -> Result<Arc<OperationLog>> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Log(reply)).await?;
        rx.await.map_err(|_| PlaybackError::Closed)
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| PlaybackError::Closed)
    }
}

async fn drive(mut controller: Controller, mut inbox: mpsc::Receiver<Command>, base: Duration) {
    let mut deadline: Option<Instant> = None;
    tracing::debug!(steps = controller.log().len(), "player started");

    loop {
        let pending = deadline;
        let tick = async move {
            match pending {
                Some(at) => sleep_until(at).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            command = inbox.recv() => {
                let Some(command) = command else {
                    break;
                };
                match command {
                    Command::Load { log, reply } => {
                        let effects = controller.load(log);
                        schedule(&mut deadline, &effects, &controller, base);
                        let _ = reply.send(controller.run());
                    }
                    Command::Transport { transport, reply } => {
                        let effects = controller.apply(transport);
                        schedule(&mut deadline, &effects, &controller, base);
                        let _ = reply.send(controller.status());
                    }
                    Command::Status(reply) => {
                        let _ = reply.send(controller.status());
                    }
                    Command::Visual(reply) => {
                        let _ = reply.send(controller.visual_state());
                    }
                    Command::Log(reply) => {
                        let _ = reply.send(Arc::clone(controller.log()));
                    }
                }
            }
            () = tick => {
                deadline = None;
                let effects = controller.tick();
                if controller.state().phase() == Phase::Playing {
                    deadline = Some(Instant::now() + controller.state().speed().interval(base));
                }
                schedule(&mut deadline, &effects, &controller, base);
            }
        }
    }

    tracing::debug!("player stopped");
}

/// Arm or clear the tick deadline according to `effects`.
fn schedule(
    deadline: &mut Option<Instant>,
    effects: &[Effect],
    controller: &Controller,
    base: Duration,
) {
    for effect in effects {
        match effect {
            Effect::StartTicking => {
                *deadline = Some(Instant::now() + controller.state().speed().interval(base));
            }
            Effect::StopTicking => *deadline = None,
            _ => {}
        }
    }
}
