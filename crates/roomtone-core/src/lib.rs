//! Roomtone Core - real-time JACK engines for level monitoring and room capture

pub mod audio;
pub mod audio_file;
pub mod buffer;
pub mod engine;
pub mod fail;
pub mod filter;
pub mod supervisor;
pub mod types;

pub use types::*;
