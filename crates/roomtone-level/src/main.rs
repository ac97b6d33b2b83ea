//! Level monitor
//!
//! Drives a constant calibration tone on `out` and prints the smoothed,
//! calibrated level of `in` once per second until killed.

use std::thread;

use anyhow::Result;

use roomtone_core::audio::{start_session, AudioConfig};
use roomtone_core::engine::{LevelConfig, LevelEngine};
use roomtone_core::fail;
use roomtone_core::supervisor::{LevelReporter, LEVEL_REPORT_INTERVAL};

const CLIENT_NAME: &str = "level";

fn main() {
    // Initialize logger - set RUST_LOG=debug for verbose output
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    if let Err(e) = run() {
        fail!("{:#}", e);
    }
}

fn run() -> Result<()> {
    let engine = LevelEngine::new(LevelConfig::default());
    let atomics = engine.atomics();

    // Kept alive for the lifetime of the process
    let _session = start_session(&AudioConfig::new(CLIENT_NAME), engine)?;
    log::info!("Monitoring level, Ctrl+C to stop");

    loop {
        thread::sleep(LEVEL_REPORT_INTERVAL);
        println!("{}", LevelReporter::line(&atomics));
    }
}
