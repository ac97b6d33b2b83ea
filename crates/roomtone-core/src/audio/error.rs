//! Audio host error types

use thiserror::Error;

/// Errors that can occur while setting up or tearing down a host session
#[derive(Error, Debug)]
pub enum AudioError {
    /// Could not open a client on the audio server
    #[error("Failed to create jack client: {0}")]
    SessionOpen(String),

    /// Port registration was refused
    #[error("Failed to create {direction} port '{port}': {reason}")]
    PortRegistration {
        port: &'static str,
        direction: &'static str,
        reason: String,
    },

    /// Engine declares more ports than the backend can hand to it
    #[error("Engine declares {found} {direction} ports, at most {max} supported")]
    TooManyPorts {
        direction: &'static str,
        found: usize,
        max: usize,
    },

    /// Failed to start callback delivery
    #[error("Failed to activate jack client: {0}")]
    Activate(String),

    /// Failed to stop callback delivery
    #[error("Failed to deactivate jack client: {0}")]
    Deactivate(String),

    /// Built without an audio backend for this platform
    #[error("No audio backend available (built without jack-backend)")]
    BackendUnavailable,
}

/// Result type for audio operations
pub type AudioResult<T> = Result<T, AudioError>;
