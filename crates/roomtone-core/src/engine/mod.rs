//! Real-time engines
//!
//! Both engines implement [`BlockEngine`], the contract the host backend
//! drives from its audio thread:
//! - `LevelEngine`: one input, one constant output, a smoothed input level
//! - `RoomEngine`: stereo playback of a source buffer with simultaneous
//!   stereo capture, gated on the port topology
//!
//! [`drive_block`] is what the backend runs once per period: pending
//! topology events first, then the block.

mod level;
mod room;
mod state;
mod topology;

pub use level::*;
pub use room::*;
pub use state::*;
pub use topology::*;

use thiserror::Error;

use crate::types::{PortBinding, Sample};

/// Errors raised by an engine outside its block routine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A port connection was removed; once wired, the graph must stay wired
    #[error("disconnects not allowed")]
    Disconnected,

    /// Source buffer is not stereo
    #[error("Unsupported channel count: expected 2, found {0}")]
    UnsupportedChannelCount(usize),

    /// Capture buffer cannot hold everything the source will play
    #[error("Capture buffer too small: {capture} samples for a {source_len} sample source")]
    CaptureTooSmall { capture: usize, source_len: usize },
}

/// Block-processing contract shared by every engine
///
/// The host calls [`process`](BlockEngine::process) once per period on its
/// real-time thread. Implementations must not block, allocate or do I/O
/// there, and must accept any block length up to the host's maximum.
pub trait BlockEngine: Send + 'static {
    /// Ports to register, in the order their slices are passed to `process`
    const PORTS: &'static [PortBinding];

    /// Process one block
    ///
    /// `inputs` and `outputs` hold one slice per declared port of that
    /// direction, in declaration order.
    fn process(&mut self, inputs: &[&[Sample]], outputs: &mut [&mut [Sample]]);

    /// React to a port connection (`true`) or disconnection (`false`)
    ///
    /// Called on the audio thread before the next block. An error is fatal
    /// for the process.
    fn on_topology_change(&mut self, _connected: bool) -> Result<(), EngineError> {
        Ok(())
    }
}

/// Apply pending topology events, then process one block
///
/// Events are applied before the block, so a block never runs on a stale
/// gate. On error the block is skipped and the error returned; the caller
/// treats it as fatal.
pub fn drive_block<E: BlockEngine>(
    engine: &mut E,
    topology: &mut TopologyReceiver,
    inputs: &[&[Sample]],
    outputs: &mut [&mut [Sample]],
) -> Result<(), EngineError> {
    while let Some(event) = topology.pop() {
        engine.on_topology_change(event.connected)?;
    }
    engine.process(inputs, outputs);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::SampleBuffer;

    fn room_engine() -> RoomEngine {
        let samples = (1..=16).map(|i| i as Sample).collect();
        let source = SampleBuffer::from_interleaved(samples, 2, 48000);
        RoomEngine::new(source, RoomConfig::default().with_source_sample_limit(None)).unwrap()
    }

    fn run_block(
        engine: &mut RoomEngine,
        topology: &mut TopologyReceiver,
    ) -> (Result<(), EngineError>, [Sample; 4], [Sample; 4]) {
        let in1 = [0.5; 4];
        let in2 = [0.25; 4];
        let mut out1 = [0.0; 4];
        let mut out2 = [0.0; 4];
        let result = {
            let inputs: [&[Sample]; 2] = [&in1, &in2];
            let mut outputs: [&mut [Sample]; 2] = [&mut out1, &mut out2];
            drive_block(engine, topology, &inputs, &mut outputs)
        };
        (result, out1, out2)
    }

    #[test]
    fn test_drive_block_applies_topology_first() {
        let mut engine = room_engine();
        let (tx, mut rx) = topology_channel();

        for _ in 0..3 {
            tx.send(TopologyEvent::connected());
        }
        let (result, out1, out2) = run_block(&mut engine, &mut rx);
        assert_eq!(result, Ok(()));
        assert_eq!(engine.connections(), 3);
        assert_eq!(engine.state(), ProcessState::Armed);
        assert_eq!(out1, [0.0; 4]);
        assert_eq!(out2, [0.0; 4]);
        assert_eq!(engine.source().cursor(), 0);

        // The fourth connection opens the gate for this very block
        tx.send(TopologyEvent::connected());
        let (result, out1, out2) = run_block(&mut engine, &mut rx);
        assert_eq!(result, Ok(()));
        assert_eq!(engine.state(), ProcessState::Running);
        assert_eq!(out1, [1.0, 3.0, 5.0, 7.0]);
        assert_eq!(out2, [2.0, 4.0, 6.0, 8.0]);
        assert_eq!(engine.capture().as_slice()[0], 0.5 * DEFAULT_CAPTURE_GAINS[0]);
        assert_eq!(engine.capture().as_slice()[1], 0.25 * DEFAULT_CAPTURE_GAINS[1]);

        tx.send(TopologyEvent::disconnected());
        let (result, out1, _) = run_block(&mut engine, &mut rx);
        assert_eq!(result, Err(EngineError::Disconnected));
        assert_eq!(out1, [0.0; 4]);
        assert_eq!(engine.source().cursor(), 8);
    }

    #[test]
    fn test_drive_block_replays_connection_burst() {
        let mut engine = room_engine();
        let (tx, mut rx) = topology_channel();
        for _ in 0..1000 {
            tx.send(TopologyEvent::connected());
        }

        let (result, out1, _) = run_block(&mut engine, &mut rx);
        assert_eq!(result, Ok(()));
        assert_eq!(engine.connections(), 1000);
        assert_eq!(engine.state(), ProcessState::Running);
        assert_eq!(out1, [1.0, 3.0, 5.0, 7.0]);
    }

    #[test]
    fn test_drive_block_without_events() {
        let mut engine = LevelEngine::default();
        let (_tx, mut rx) = topology_channel();
        let input = [0.5f32; 4];
        let mut out = [0.0f32; 4];
        {
            let inputs: [&[Sample]; 1] = [&input];
            let mut outputs: [&mut [Sample]; 1] = [&mut out];
            assert_eq!(drive_block(&mut engine, &mut rx, &inputs, &mut outputs), Ok(()));
        }
        assert_eq!(out, [DEFAULT_OUTPUT_LEVEL; 4]);
    }
}
