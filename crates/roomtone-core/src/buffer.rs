//! Interleaved sample buffer with a read/write cursor
//!
//! `SampleBuffer` is the storage behind both sides of the capture/playback
//! engine: the decoded source that is played out, and the capture sink that
//! records what comes back. It is allocated once at setup; the cursor
//! operations used on the audio thread never allocate and never step past
//! the end of the buffer, whatever frame count they are asked for.

use crate::types::Sample;

/// A fixed-length buffer of interleaved samples
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<Sample>,
    channels: usize,
    sample_rate: u32,
    /// Next unread/unwritten sample index, always a frame boundary
    cursor: usize,
}

impl SampleBuffer {
    /// Create a zero-filled buffer of `len` samples
    ///
    /// `len` is rounded down to a whole number of frames.
    pub fn zeroed(len: usize, channels: usize, sample_rate: u32) -> Self {
        assert!(channels > 0, "SampleBuffer needs at least one channel");
        let len = len - len % channels;
        Self {
            samples: vec![0.0; len],
            channels,
            sample_rate,
            cursor: 0,
        }
    }

    /// Wrap existing interleaved samples
    ///
    /// A trailing partial frame is dropped.
    pub fn from_interleaved(mut samples: Vec<Sample>, channels: usize, sample_rate: u32) -> Self {
        assert!(channels > 0, "SampleBuffer needs at least one channel");
        let whole = samples.len() - samples.len() % channels;
        samples.truncate(whole);
        Self {
            samples,
            channels,
            sample_rate,
            cursor: 0,
        }
    }

    /// Total number of samples (all channels)
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of frames (samples per channel)
    #[inline]
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Samples left between the cursor and the end
    #[inline]
    pub fn remaining(&self) -> usize {
        self.samples.len() - self.cursor
    }

    /// Whole frames left between the cursor and the end
    #[inline]
    pub fn remaining_frames(&self) -> usize {
        self.remaining() / self.channels
    }

    #[inline]
    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }

    /// Take up to `frames` frames from the cursor for reading and advance it
    ///
    /// The request is clamped to `remaining_frames()`, so the returned slice
    /// holds `min(frames, remaining_frames()) * channels` samples.
    #[inline]
    pub fn read_frames(&mut self, frames: usize) -> &[Sample] {
        let range = self.claim(frames);
        &self.samples[range]
    }

    /// Take up to `frames` frames from the cursor for writing and advance it
    ///
    /// Clamped the same way as [`read_frames`](Self::read_frames).
    #[inline]
    pub fn write_frames(&mut self, frames: usize) -> &mut [Sample] {
        let range = self.claim(frames);
        &mut self.samples[range]
    }

    #[inline]
    fn claim(&mut self, frames: usize) -> std::ops::Range<usize> {
        let take = frames.min(self.remaining_frames()) * self.channels;
        let start = self.cursor;
        self.cursor += take;
        start..self.cursor
    }

    /// Truncate or zero-pad to `len` samples (setup only, may allocate)
    ///
    /// `len` is rounded down to a whole number of frames and the cursor is
    /// clamped to the new end.
    pub fn set_len(&mut self, len: usize) {
        let len = len - len % self.channels;
        self.samples.resize(len, 0.0);
        self.cursor = self.cursor.min(len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_rounds_to_frames() {
        let buf = SampleBuffer::zeroed(7, 2, 48000);
        assert_eq!(buf.len(), 6);
        assert_eq!(buf.frames(), 3);
        assert_eq!(buf.cursor(), 0);
        assert!(buf.as_slice().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_from_interleaved_drops_partial_frame() {
        let buf = SampleBuffer::from_interleaved(vec![1.0, 2.0, 3.0], 2, 44100);
        assert_eq!(buf.as_slice(), &[1.0, 2.0]);
    }

    #[test]
    fn test_read_frames_advances_cursor() {
        let mut buf = SampleBuffer::from_interleaved(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 48000);

        assert_eq!(buf.read_frames(2), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(buf.cursor(), 4);
        assert_eq!(buf.remaining_frames(), 1);

        // Clamped to what is left
        assert_eq!(buf.read_frames(10), &[5.0, 6.0]);
        assert_eq!(buf.cursor(), 6);

        // Exhausted: empty slice, cursor stays at the end
        assert!(buf.read_frames(4).is_empty());
        assert_eq!(buf.cursor(), buf.len());
    }

    #[test]
    fn test_write_frames_never_exceeds_len() {
        let mut buf = SampleBuffer::zeroed(4, 2, 48000);

        let dst = buf.write_frames(3);
        assert_eq!(dst.len(), 4);
        dst.copy_from_slice(&[0.1, 0.2, 0.3, 0.4]);

        assert!(buf.write_frames(1).is_empty());
        assert_eq!(buf.cursor(), 4);
        assert_eq!(buf.as_slice(), &[0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn test_set_len_pads_and_truncates() {
        let mut buf = SampleBuffer::from_interleaved(vec![1.0; 4], 2, 48000);
        buf.set_len(8);
        assert_eq!(buf.as_slice(), &[1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0]);

        buf.read_frames(4);
        buf.set_len(3);
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.cursor(), 2);
    }
}
