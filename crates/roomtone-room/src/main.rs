//! Room capture/playback
//!
//! Plays a stereo file through JACK while recording the two inputs, then
//! writes the recording as a 16-bit stereo WAV file.
//!
//! ```text
//! room <input-file> <output-file>
//! ```
//!
//! The run starts once all four ports (in1, in2, out1, out2) have been
//! connected, and ends when the source is exhausted. Any setup failure or a
//! port disconnection aborts with a `FAIL:` diagnostic.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use roomtone_core::audio::{start_session, AudioConfig};
use roomtone_core::audio_file;
use roomtone_core::engine::{RoomConfig, RoomEngine};
use roomtone_core::fail;
use roomtone_core::supervisor::{wait_for_done, DONE_POLL_INTERVAL};

const CLIENT_NAME: &str = "room";

fn main() {
    // Initialize logger - set RUST_LOG=debug for verbose output
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = std::env::args().collect();
    let (input, output) = match args.as_slice() {
        [_, input, output, ..] => (PathBuf::from(input), PathBuf::from(output)),
        _ => fail!("usage: {} <input-file> <output-file>", CLIENT_NAME),
    };

    if let Err(e) = run(&input, &output) {
        fail!("{:#}", e);
    }
}

fn run(input: &Path, output: &Path) -> Result<()> {
    let source = audio_file::load(input)
        .with_context(|| format!("Failed to load input {}", input.display()))?;
    let engine = RoomEngine::new(source, RoomConfig::default()).context("Failed to set up engine")?;
    let atomics = engine.atomics();

    let session = start_session(&AudioConfig::new(CLIENT_NAME), engine)?;
    log::info!(
        "Connect {}:in1, {}:in2, {}:out1 and {}:out2 to start",
        session.client_name(),
        session.client_name(),
        session.client_name(),
        session.client_name()
    );

    wait_for_done(&atomics, DONE_POLL_INTERVAL);

    let engine = session.stop()?;
    let capture = engine.into_capture();

    audio_file::save(output, &capture)
        .with_context(|| format!("Failed to save output {}", output.display()))?;

    Ok(())
}
