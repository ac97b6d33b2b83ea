//! Supervisory-thread helpers
//!
//! The supervisor never touches engine data while the audio thread runs.
//! It only polls the lock-free atomics the engines publish.

use std::thread;
use std::time::Duration;

use crate::engine::{LevelAtomics, ProcessState, RoomAtomics};

/// Poll interval while waiting for the room engine to finish
pub const DONE_POLL_INTERVAL: Duration = Duration::from_micros(100);

/// Interval between level reports
pub const LEVEL_REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Block the calling thread until the room engine reports `Done`
///
/// Logs once when playback is first seen running. Returns the number of
/// frames processed. Every capture write is visible to the caller on return.
pub fn wait_for_done(atomics: &RoomAtomics, poll_interval: Duration) -> u64 {
    let mut last = ProcessState::Idle;
    loop {
        let state = atomics.state();
        if state != last {
            match state {
                ProcessState::Armed => log::info!("Waiting for ports to be connected"),
                ProcessState::Running => log::info!("All ports connected, playing and capturing"),
                ProcessState::Done => {
                    let frames = atomics.frames_processed();
                    log::info!("Source exhausted after {} frames", frames);
                    return frames;
                }
                ProcessState::Idle => {}
            }
            last = state;
        }
        thread::sleep(poll_interval);
    }
}

/// Formats the level monitor's status line
#[derive(Debug, Clone, Copy, Default)]
pub struct LevelReporter;

impl LevelReporter {
    /// `in: <value>` with six decimals
    pub fn format(value: f64) -> String {
        format!("in: {:.6}", value)
    }

    /// Status line for the current published level
    pub fn line(atomics: &LevelAtomics) -> String {
        Self::format(atomics.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::SampleBuffer;
    use crate::engine::{LevelEngine, RoomConfig, RoomEngine};

    #[test]
    fn test_wait_for_done_sees_capture() {
        let source = SampleBuffer::from_interleaved(vec![0.5; 64], 2, 48000);
        let config = RoomConfig::default().with_source_sample_limit(None);
        let mut engine = RoomEngine::new(source, config).unwrap();
        let atomics = engine.atomics();

        let audio = thread::spawn(move || {
            for _ in 0..4 {
                engine.on_topology_change(true).unwrap();
            }
            let (in1, in2) = ([1.0f32; 8], [1.0f32; 8]);
            let (mut out1, mut out2) = ([0.0f32; 8], [0.0f32; 8]);
            while !engine.state().is_done() {
                engine.process_block(&in1, &in2, &mut out1, &mut out2);
            }
            engine
        });

        let frames = wait_for_done(&atomics, Duration::from_micros(10));
        assert_eq!(frames, 32);

        let engine = audio.join().unwrap();
        assert!(engine.capture().as_slice().iter().all(|&s| s > 1.0));
    }

    #[test]
    fn test_level_line() {
        assert_eq!(LevelReporter::format(0.5), "in: 0.500000");

        let mut engine = LevelEngine::default();
        let atomics = engine.atomics();
        assert_eq!(LevelReporter::line(&atomics), "in: 0.000000");
        engine.process_block(&[1.0; 4], &mut [0.0; 4]);
        assert_ne!(LevelReporter::line(&atomics), "in: 0.000000");
    }
}
