//! Host audio session for Roomtone engines
//!
//! Wraps the audio host (native JACK on Linux, behind the `jack-backend`
//! feature) around any [`BlockEngine`](crate::engine::BlockEngine):
//!
//! - **Setup**: open a client, register the engine's ports, install the
//!   process and notification handlers, activate
//! - **Audio thread**: owns the engine exclusively and calls it once per period
//! - **Notification thread**: forwards port connection changes to the audio
//!   thread through wait-free atomic counters
//! - **Teardown**: deactivate, close the client, hand the engine back
//!
//! # Example Usage
//!
//! ```ignore
//! use roomtone_core::audio::{start_session, AudioConfig};
//! use roomtone_core::engine::{RoomConfig, RoomEngine};
//!
//! let engine = RoomEngine::new(source, RoomConfig::default())?;
//! let atomics = engine.atomics();
//! let session = start_session(&AudioConfig::new("room"), engine)?;
//!
//! roomtone_core::supervisor::wait_for_done(&atomics, DONE_POLL_INTERVAL);
//! let engine = session.stop()?;
//! ```

mod backend;
mod config;
mod error;

#[cfg(all(target_os = "linux", feature = "jack-backend"))]
mod jack_backend;

pub use backend::{start_session, EngineSession};
pub use config::AudioConfig;
pub use error::{AudioError, AudioResult};
