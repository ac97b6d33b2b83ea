//! Level monitor engine
//!
//! Emits a constant calibration tone on its output and tracks a smoothed,
//! gain-scaled level of its input. The smoothed value is published after
//! every block for a supervisory thread to print.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::BlockEngine;
use crate::filter::{SmoothingFilter, DEFAULT_ALPHA};
use crate::types::{PortBinding, Sample};

/// Calibration factor applied to every input sample (a semitone ratio)
pub const DEFAULT_INPUT_GAIN: f64 = 1.059;

/// Constant written to every output sample
pub const DEFAULT_OUTPUT_LEVEL: Sample = 1.0;

/// Level monitor settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelConfig {
    /// Scale applied to each input sample before smoothing
    pub input_gain: f64,
    /// Weight of the newest sample in the smoothing filter, in `(0, 1]`
    pub alpha: f64,
    /// Value written to every output sample
    pub output_level: Sample,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            input_gain: DEFAULT_INPUT_GAIN,
            alpha: DEFAULT_ALPHA,
            output_level: DEFAULT_OUTPUT_LEVEL,
        }
    }
}

impl LevelConfig {
    pub fn with_input_gain(mut self, gain: f64) -> Self {
        self.input_gain = gain;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_output_level(mut self, level: Sample) -> Self {
        self.output_level = level;
        self
    }
}

/// Lock-free smoothed level for the supervisory thread
///
/// The f64 is stored as raw bits. A single word with no dependent data, so
/// `Relaxed` is enough.
#[derive(Debug, Default)]
pub struct LevelAtomics {
    value_bits: AtomicU64,
}

impl LevelAtomics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn publish(&self, value: f64) {
        self.value_bits.store(value.to_bits(), Ordering::Relaxed);
    }

    /// Latest smoothed level (lock-free)
    #[inline]
    pub fn value(&self) -> f64 {
        f64::from_bits(self.value_bits.load(Ordering::Relaxed))
    }
}

/// Level monitoring engine: one input, one output
pub struct LevelEngine {
    filter: SmoothingFilter,
    input_gain: f64,
    output_level: Sample,
    atomics: Arc<LevelAtomics>,
}

impl LevelEngine {
    pub const INPUT: PortBinding = PortBinding::input("in");
    pub const OUTPUT: PortBinding = PortBinding::output("out");

    pub fn new(config: LevelConfig) -> Self {
        Self {
            filter: SmoothingFilter::new(config.alpha),
            input_gain: config.input_gain,
            output_level: config.output_level,
            atomics: Arc::new(LevelAtomics::new()),
        }
    }

    /// Shared level view for the supervisory thread
    pub fn atomics(&self) -> Arc<LevelAtomics> {
        Arc::clone(&self.atomics)
    }

    /// Current smoothed value (audio-thread view)
    pub fn value(&self) -> f64 {
        self.filter.value()
    }

    /// Process one block: constant output, smoothed input
    pub fn process_block(&mut self, input: &[Sample], output: &mut [Sample]) {
        output.fill(self.output_level);

        for &sample in input {
            self.filter.update(sample as f64 * self.input_gain);
        }

        self.atomics.publish(self.filter.value());
    }
}

impl Default for LevelEngine {
    fn default() -> Self {
        Self::new(LevelConfig::default())
    }
}

impl BlockEngine for LevelEngine {
    const PORTS: &'static [PortBinding] = &[Self::INPUT, Self::OUTPUT];

    fn process(&mut self, inputs: &[&[Sample]], outputs: &mut [&mut [Sample]]) {
        if let ([input], [output]) = (inputs, outputs) {
            self.process_block(input, output);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_output_is_constant() {
        let mut engine = LevelEngine::default();
        let input = [0.3f32, -0.7, 0.1, 0.9];
        let mut output = [0.0f32; 4];

        engine.process_block(&input, &mut output);

        assert_eq!(output, [1.0; 4]);
    }

    #[test]
    fn test_output_ignores_input() {
        let mut engine = LevelEngine::new(LevelConfig::default().with_output_level(0.25));
        let mut output = [9.0f32; 8];
        engine.process_block(&[0.0; 8], &mut output);
        assert!(output.iter().all(|&s| s == 0.25));
    }

    #[test]
    fn test_filter_follows_scaled_input() {
        let mut engine = LevelEngine::default();
        let input = [0.5f32, 0.5];
        let mut output = [0.0f32; 2];

        engine.process_block(&input, &mut output);

        let x = 0.5f64 * 1.059;
        let first = 0.8 * x;
        let second = 0.8 * x + 0.2 * first;
        assert!((engine.value() - second).abs() < 1e-12);
    }

    #[test]
    fn test_value_published_to_atomics() {
        let mut engine = LevelEngine::default();
        let atomics = engine.atomics();
        assert_eq!(atomics.value(), 0.0);

        engine.process_block(&[1.0; 16], &mut [0.0; 16]);

        assert_eq!(atomics.value(), engine.value());
        assert!(atomics.value() > 1.0);
    }

    #[test]
    fn test_empty_block() {
        let mut engine = LevelEngine::default();
        engine.process_block(&[], &mut []);
        assert_eq!(engine.value(), 0.0);
    }

    #[test]
    fn test_block_engine_dispatch() {
        let mut engine = LevelEngine::default();
        let input = [1.0f32; 4];
        let mut out = [0.0f32; 4];
        {
            let inputs: [&[Sample]; 1] = [&input];
            let mut outputs: [&mut [Sample]; 1] = [&mut out];
            engine.process(&inputs, &mut outputs);
        }
        assert_eq!(out, [1.0; 4]);
        assert!(engine.value() > 0.0);
        assert_eq!(LevelEngine::PORTS.len(), 2);
    }

    proptest! {
        #[test]
        fn prop_block_size_independent(
            input in proptest::collection::vec(-1.0f32..1.0, 1..512),
            splits in proptest::collection::vec(1usize..64, 1..16),
        ) {
            let mut whole = LevelEngine::default();
            let mut out = vec![0.0f32; input.len()];
            whole.process_block(&input, &mut out);

            let mut chunked = LevelEngine::default();
            let mut rest: &[f32] = &input;
            let mut i = 0;
            while !rest.is_empty() {
                let n = splits[i % splits.len()].min(rest.len());
                let mut block_out = vec![0.0f32; n];
                chunked.process_block(&rest[..n], &mut block_out);
                rest = &rest[n..];
                i += 1;
            }

            prop_assert_eq!(whole.value(), chunked.value());
        }
    }
}
