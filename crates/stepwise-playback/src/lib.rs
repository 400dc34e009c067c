//! Stepwise Playback
//!
//! Plays an [`OperationLog`](stepwise_trace::OperationLog) back one step at a
//! time.
//!
//! - [`state`]: the pure transport state machine (`transition`)
//! - [`projector`]: folds a log prefix into a [`VisualState`]
//! - [`controller`]: owns a log plus its state and notifies observers
//! - [`driver`]: a tokio task that ticks a controller at the chosen speed
//!
//! Playback never mutates the log. Seeking is re-projection of a prefix, so
//! stepping backwards costs the same as stepping forwards.

pub mod controller;
pub mod driver;
pub mod error;
pub mod projector;
pub mod speed;
pub mod state;

pub use controller::{Controller, Frame, PlaybackEvent, PlaybackStatus, RunId};
pub use driver::{PlaybackConfig, Player};
pub use error::{PlaybackError, Result};
pub use projector::{project, Structure, TaggedTarget, VisualState};
pub use speed::Speed;
pub use state::{transition, Effect, Phase, PlaybackState, Transport};
