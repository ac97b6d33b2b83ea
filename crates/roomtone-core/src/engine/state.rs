//! Capture/playback lifecycle and its lock-free view for the supervisor
//!
//! ```text
//! Idle ──Armed──► Armed ──ThresholdReached──► Running ──SourceExhausted──► Done
//! ```
//!
//! No edge leads back to an earlier state and `Done` is terminal.
//!
//! The audio thread owns the authoritative state inside the engine and
//! mirrors it into [`RoomAtomics`]. The `Done` store is the handoff point to
//! the supervisory thread: it uses `Release` so every capture write made
//! before it is visible to a thread that observes `Done` with `Acquire`.

use std::sync::atomic::{AtomicU32, AtomicU64, AtomicU8, Ordering};

/// Lifecycle of the capture/playback engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ProcessState {
    /// Constructed, host not yet ready
    #[default]
    Idle = 0,
    /// Waiting for the required number of port connections
    Armed = 1,
    /// Playing the source and capturing the inputs
    Running = 2,
    /// Source exhausted; further blocks have no effect
    Done = 3,
}

/// Events that drive [`ProcessState`] transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateEvent {
    /// Engine construction finished
    Armed,
    /// Connection count reached the configured threshold
    ThresholdReached,
    /// A block found no frames left in the source
    SourceExhausted,
}

impl ProcessState {
    /// Apply an event, returning the next state
    ///
    /// Events that don't match the current state leave it unchanged.
    pub fn on(self, event: StateEvent) -> Self {
        match (self, event) {
            (ProcessState::Idle, StateEvent::Armed) => ProcessState::Armed,
            (ProcessState::Armed, StateEvent::ThresholdReached) => ProcessState::Running,
            (ProcessState::Running, StateEvent::SourceExhausted) => ProcessState::Done,
            (state, _) => state,
        }
    }

    #[inline]
    pub fn is_running(self) -> bool {
        self == ProcessState::Running
    }

    #[inline]
    pub fn is_done(self) -> bool {
        self == ProcessState::Done
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => ProcessState::Armed,
            2 => ProcessState::Running,
            3 => ProcessState::Done,
            _ => ProcessState::Idle,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ProcessState::Idle => "idle",
            ProcessState::Armed => "armed",
            ProcessState::Running => "running",
            ProcessState::Done => "done",
        }
    }
}

impl std::fmt::Display for ProcessState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Lock-free capture/playback status for the supervisory thread
///
/// Written only by the audio thread. `state` carries the completion handoff
/// (Release/Acquire); the counters are informational and use `Relaxed`.
#[derive(Debug, Default)]
pub struct RoomAtomics {
    state: AtomicU8,
    connections: AtomicU32,
    frames_processed: AtomicU64,
}

impl RoomAtomics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a new state (audio thread)
    #[inline]
    pub(crate) fn publish_state(&self, state: ProcessState) {
        self.state.store(state as u8, Ordering::Release);
    }

    #[inline]
    pub(crate) fn publish_connections(&self, count: u32) {
        self.connections.store(count, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_frames(&self, frames: u64) {
        self.frames_processed.fetch_add(frames, Ordering::Relaxed);
    }

    /// Current state (lock-free, Acquire)
    #[inline]
    pub fn state(&self) -> ProcessState {
        ProcessState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Whether the engine has finished
    ///
    /// Once this returns true, all capture writes are visible to the caller.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.state().is_done()
    }

    #[inline]
    pub fn connections(&self) -> u32 {
        self.connections.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn frames_processed(&self) -> u64 {
        self.frames_processed.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        let s = ProcessState::Idle.on(StateEvent::Armed);
        assert_eq!(s, ProcessState::Armed);
        let s = s.on(StateEvent::ThresholdReached);
        assert_eq!(s, ProcessState::Running);
        let s = s.on(StateEvent::SourceExhausted);
        assert_eq!(s, ProcessState::Done);
    }

    #[test]
    fn test_out_of_order_events_ignored() {
        assert_eq!(ProcessState::Idle.on(StateEvent::ThresholdReached), ProcessState::Idle);
        assert_eq!(ProcessState::Armed.on(StateEvent::SourceExhausted), ProcessState::Armed);
        assert_eq!(ProcessState::Running.on(StateEvent::Armed), ProcessState::Running);
    }

    #[test]
    fn test_done_is_terminal() {
        for event in [StateEvent::Armed, StateEvent::ThresholdReached, StateEvent::SourceExhausted] {
            assert_eq!(ProcessState::Done.on(event), ProcessState::Done);
        }
    }

    #[test]
    fn test_atomics_roundtrip_state() {
        let atomics = RoomAtomics::new();
        assert_eq!(atomics.state(), ProcessState::Idle);
        for state in [ProcessState::Armed, ProcessState::Running, ProcessState::Done] {
            atomics.publish_state(state);
            assert_eq!(atomics.state(), state);
        }
        assert!(atomics.is_done());
    }

    #[test]
    fn test_atomics_counters() {
        let atomics = RoomAtomics::new();
        atomics.publish_connections(3);
        atomics.add_frames(4096);
        atomics.add_frames(10);
        assert_eq!(atomics.connections(), 3);
        assert_eq!(atomics.frames_processed(), 4106);
    }
}
