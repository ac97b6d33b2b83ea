//! Room capture/playback engine
//!
//! Plays a pre-loaded stereo source on `out1`/`out2` and records `in1`/`in2`
//! (with a fixed per-channel gain) into a capture buffer of the same
//! layout, sample-for-sample in lockstep with playback. Whatever the host
//! routes back in, typically a microphone pair in the room the source is
//! played into, ends up aligned with the source frame that caused it.
//!
//! Nothing happens until the port graph is fully wired: the engine counts
//! connection events and starts on the `connection_threshold`-th one. It
//! stops for good on the first block that finds the source exhausted.

use std::sync::Arc;

use super::{BlockEngine, EngineError, ProcessState, RoomAtomics, StateEvent};
use crate::buffer::SampleBuffer;
use crate::types::{PortBinding, Sample, STEREO_CHANNELS};

/// Capture gains for `in1` and `in2`, normalizing the two input channels
pub const DEFAULT_CAPTURE_GAINS: [Sample; 2] = [1.059, 1.057];

/// Connection events needed before starting: 2 inputs + 2 outputs wired
pub const DEFAULT_CONNECTION_THRESHOLD: usize = 4;

/// Source length (interleaved samples) used regardless of the decoded length
pub const DEFAULT_SOURCE_SAMPLE_LIMIT: usize = 4096 * 256;

/// Capture/playback settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomConfig {
    /// Gain applied to `in1` and `in2` before capture
    pub capture_gains: [Sample; 2],
    /// Number of connection events that arms playback
    pub connection_threshold: usize,
    /// Force the source to this many interleaved samples
    ///
    /// Longer sources are truncated, shorter ones are padded with silence.
    /// `None` plays the whole decoded source.
    pub source_sample_limit: Option<usize>,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            capture_gains: DEFAULT_CAPTURE_GAINS,
            connection_threshold: DEFAULT_CONNECTION_THRESHOLD,
            source_sample_limit: Some(DEFAULT_SOURCE_SAMPLE_LIMIT),
        }
    }
}

impl RoomConfig {
    pub fn with_capture_gains(mut self, gains: [Sample; 2]) -> Self {
        self.capture_gains = gains;
        self
    }

    pub fn with_connection_threshold(mut self, threshold: usize) -> Self {
        self.connection_threshold = threshold;
        self
    }

    pub fn with_source_sample_limit(mut self, limit: Option<usize>) -> Self {
        self.source_sample_limit = limit;
        self
    }
}

/// Capture/playback engine: two inputs, two outputs
pub struct RoomEngine {
    source: SampleBuffer,
    capture: SampleBuffer,
    state: ProcessState,
    connections: usize,
    config: RoomConfig,
    atomics: Arc<RoomAtomics>,
}

impl RoomEngine {
    pub const IN1: PortBinding = PortBinding::input("in1");
    pub const IN2: PortBinding = PortBinding::input("in2");
    pub const OUT1: PortBinding = PortBinding::output("out1");
    pub const OUT2: PortBinding = PortBinding::output("out2");

    /// Build an engine around `source` with a zeroed capture buffer of equal size
    pub fn new(source: SampleBuffer, config: RoomConfig) -> Result<Self, EngineError> {
        let source = Self::prepare_source(source, &config)?;
        let capture = SampleBuffer::zeroed(source.len(), STEREO_CHANNELS, source.sample_rate());
        Ok(Self::assemble(source, capture, config))
    }

    /// Build an engine with a caller-provided capture buffer
    ///
    /// The capture buffer must hold at least as many samples as the source
    /// (after the length override is applied).
    pub fn with_capture(
        source: SampleBuffer,
        capture: SampleBuffer,
        config: RoomConfig,
    ) -> Result<Self, EngineError> {
        let source = Self::prepare_source(source, &config)?;
        if capture.channels() != STEREO_CHANNELS {
            return Err(EngineError::UnsupportedChannelCount(capture.channels()));
        }
        if capture.len() < source.len() {
            return Err(EngineError::CaptureTooSmall {
                capture: capture.len(),
                source_len: source.len(),
            });
        }
        Ok(Self::assemble(source, capture, config))
    }

    fn prepare_source(
        mut source: SampleBuffer,
        config: &RoomConfig,
    ) -> Result<SampleBuffer, EngineError> {
        if source.channels() != STEREO_CHANNELS {
            return Err(EngineError::UnsupportedChannelCount(source.channels()));
        }
        if let Some(limit) = config.source_sample_limit {
            if limit != source.len() {
                log::warn!(
                    "Source length overridden: {} decoded samples, playing {}",
                    source.len(),
                    limit
                );
                source.set_len(limit);
            }
        }
        Ok(source)
    }

    fn assemble(source: SampleBuffer, capture: SampleBuffer, config: RoomConfig) -> Self {
        let atomics = Arc::new(RoomAtomics::new());
        let state = ProcessState::Idle.on(StateEvent::Armed);
        atomics.publish_state(state);

        log::debug!(
            "Room engine armed: {} frames, waiting for {} connections",
            source.frames(),
            config.connection_threshold
        );

        Self {
            source,
            capture,
            state,
            connections: 0,
            config,
            atomics,
        }
    }

    /// Shared status view for the supervisory thread
    pub fn atomics(&self) -> Arc<RoomAtomics> {
        Arc::clone(&self.atomics)
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    /// Connection events observed so far
    pub fn connections(&self) -> usize {
        self.connections
    }

    pub fn source(&self) -> &SampleBuffer {
        &self.source
    }

    pub fn capture(&self) -> &SampleBuffer {
        &self.capture
    }

    /// Consume the engine, keeping the captured samples
    pub fn into_capture(self) -> SampleBuffer {
        self.capture
    }

    fn transition(&mut self, event: StateEvent) {
        let next = self.state.on(event);
        if next != self.state {
            self.state = next;
            self.atomics.publish_state(next);
        }
    }

    /// Handle a port connection change
    ///
    /// Disconnects are a usage error. Each connection bumps the counter;
    /// reaching the threshold starts playback and capture.
    pub fn on_topology_change(&mut self, connected: bool) -> Result<(), EngineError> {
        if !connected {
            return Err(EngineError::Disconnected);
        }

        self.connections += 1;
        self.atomics.publish_connections(self.connections as u32);

        if self.connections == self.config.connection_threshold {
            self.transition(StateEvent::ThresholdReached);
        }
        Ok(())
    }

    /// Process one block
    ///
    /// A no-op unless running. Handles at most as many frames as the source
    /// has left; a block that finds nothing left finishes the engine. An
    /// empty block from the host does not count as exhaustion.
    pub fn process_block(
        &mut self,
        in1: &[Sample],
        in2: &[Sample],
        out1: &mut [Sample],
        out2: &mut [Sample],
    ) {
        if !self.state.is_running() {
            return;
        }

        let available = self.source.remaining_frames();
        if available == 0 {
            self.transition(StateEvent::SourceExhausted);
            return;
        }

        let block_len = in1.len().min(in2.len()).min(out1.len()).min(out2.len());
        let frames = block_len.min(available);
        if frames == 0 {
            return;
        }

        let [g1, g2] = self.config.capture_gains;
        let played = self.source.read_frames(frames);
        let captured = self.capture.write_frames(frames);

        for (i, (src, dst)) in played
            .chunks_exact(STEREO_CHANNELS)
            .zip(captured.chunks_exact_mut(STEREO_CHANNELS))
            .enumerate()
        {
            dst[0] = in1[i] * g1;
            out1[i] = src[0];

            dst[1] = in2[i] * g2;
            out2[i] = src[1];
        }

        self.atomics.add_frames(frames as u64);
    }
}

impl BlockEngine for RoomEngine {
    const PORTS: &'static [PortBinding] = &[Self::IN1, Self::IN2, Self::OUT1, Self::OUT2];

    fn process(&mut self, inputs: &[&[Sample]], outputs: &mut [&mut [Sample]]) {
        if let ([in1, in2], [out1, out2]) = (inputs, outputs) {
            self.process_block(in1, in2, out1, out2);
        }
    }

    fn on_topology_change(&mut self, connected: bool) -> Result<(), EngineError> {
        RoomEngine::on_topology_change(self, connected)
    }
}
