//! Audio file loading and saving
//!
//! - [`load`] decodes any container/codec symphonia knows (WAV, FLAC, ...)
//!   into an interleaved f32 [`SampleBuffer`]
//! - [`save`] writes a stereo buffer as a 16-bit PCM WAV file

use std::fs::File;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::buffer::SampleBuffer;
use crate::types::{Sample, STEREO_CHANNELS};

/// Upper bound on frames reserved up front from a container header
///
/// Headers can declare absurd lengths; past this the buffer grows as
/// packets decode.
const MAX_PREALLOC_FRAMES: u64 = 1 << 22;

/// Audio file errors
#[derive(Error, Debug)]
pub enum AudioFileError {
    /// File could not be opened
    #[error("Failed to open file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Container or codec not understood
    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    /// Fewer frames decoded than the header declares
    #[error("Expected {expected} samples, only got {found}")]
    ShortRead { expected: u64, found: u64 },

    /// Buffer can't be written as stereo
    #[error("Cannot save a {0}-channel buffer as stereo")]
    NotStereo(usize),

    /// WAV encoder failure (open, write or finalize)
    #[error("Failed to write {path}: {reason}")]
    Encode { path: PathBuf, reason: String },
}

/// Decode an audio file into an interleaved sample buffer
///
/// Fails when the file cannot be opened or decoded, or when fewer frames
/// come out than the container header declares.
pub fn load(path: &Path) -> Result<SampleBuffer, AudioFileError> {
    use symphonia::core::audio::SampleBuffer as DecodeBuffer;
    use symphonia::core::codecs::DecoderOptions;
    use symphonia::core::formats::FormatOptions;
    use symphonia::core::io::MediaSourceStream;
    use symphonia::core::meta::MetadataOptions;
    use symphonia::core::probe::Hint;

    let file = File::open(path).map_err(|e| AudioFileError::Open {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    // Create a hint with the file extension
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| AudioFileError::UnsupportedFormat(e.to_string()))?;

    let mut format = probed.format;

    // Find the first audio track
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .ok_or_else(|| AudioFileError::UnsupportedFormat("No audio track found".to_string()))?;

    let track_id = track.id;
    let declared_frames = track.codec_params.n_frames;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| AudioFileError::UnsupportedFormat("Unknown sample rate".to_string()))?;

    let channels = track
        .codec_params
        .channels
        .map(|c| c.count())
        .ok_or_else(|| AudioFileError::UnsupportedFormat("Unknown channel layout".to_string()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioFileError::UnsupportedFormat(e.to_string()))?;

    let mut samples: Vec<Sample> = Vec::with_capacity(initial_capacity(declared_frames, channels));
    let mut decode_buf: Option<DecodeBuffer<f32>> = None;

    // Decode all packets
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                log::warn!("Error reading packet: {}", e);
                break;
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(e) => {
                log::warn!("Error decoding packet: {}", e);
                continue;
            }
        };

        // Initialize sample buffer on first decode
        if decode_buf.is_none() {
            let spec = *decoded.spec();
            let duration = decoded.capacity() as u64;
            decode_buf = Some(DecodeBuffer::new(duration, spec));
        }

        if let Some(ref mut buf) = decode_buf {
            buf.copy_interleaved_ref(decoded);
            samples.extend_from_slice(buf.samples());
        }
    }

    let decoded_frames = (samples.len() / channels) as u64;
    if let Some(expected) = declared_frames {
        if decoded_frames < expected {
            return Err(AudioFileError::ShortRead {
                expected,
                found: decoded_frames,
            });
        }
    }

    log::info!(
        "Loaded {} samples ({} sample rate) from {}",
        samples.len(),
        sample_rate,
        path.display()
    );

    Ok(SampleBuffer::from_interleaved(samples, channels, sample_rate))
}

/// Write a stereo buffer as a 16-bit PCM WAV file
///
/// Samples are clamped to [-1, 1] before conversion.
pub fn save(path: &Path, buffer: &SampleBuffer) -> Result<(), AudioFileError> {
    if buffer.channels() != STEREO_CHANNELS {
        return Err(AudioFileError::NotStereo(buffer.channels()));
    }

    let encode_err = |e: hound::Error| AudioFileError::Encode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let spec = hound::WavSpec {
        channels: STEREO_CHANNELS as u16,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec).map_err(encode_err)?;

    // Convert f32 samples to i16
    for &sample in buffer.as_slice() {
        writer.write_sample(to_i16(sample)).map_err(encode_err)?;
    }

    writer.finalize().map_err(encode_err)?;

    log::info!(
        "Saved {} frames ({} sample rate) to {}",
        buffer.frames(),
        buffer.sample_rate(),
        path.display()
    );
    Ok(())
}

fn initial_capacity(declared_frames: Option<u64>, channels: usize) -> usize {
    declared_frames.map_or(0, |frames| frames.min(MAX_PREALLOC_FRAMES) as usize * channels)
}

#[inline]
fn to_i16(sample: Sample) -> i16 {
    let clamped = sample.clamp(-1.0, 1.0);
    (clamped * 32767.0) as i16
}
