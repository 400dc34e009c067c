//! Stepwise Playback Server
//!
//! HTTP and WebSocket front end for the step generators and the player.
//!
//! # Architecture
//!
//! - **Structures**: the current BST, AVL, heap, stack, queue and graph
//! - **Player**: one tokio task playing the most recent log
//! - **REST API**: run operations, control playback, read the projected state
//! - **WebSocket**: streams frames as the player ticks, accepts transport commands
//! - **Scenarios**: named requests that can be saved and re-run
//!
//! # Usage
//!
//! ```ignore
//! let config = VisConfig::from_env()?;
//! let server = VisServer::new(&config);
//! server.serve(config.port).await?;
//! ```

mod config;
mod error;
mod scenarios;
mod server;

pub use config::VisConfig;
pub use error::{Error, Result};
pub use scenarios::{MemoryScenarios, ScenarioStore};
pub use server::VisServer;
