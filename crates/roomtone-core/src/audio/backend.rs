//! Backend-independent session handle
//!
//! Selects the platform backend at compile time:
//! - **Linux with jack-backend feature**: native JACK client
//! - **Otherwise**: no backend; starting a session fails with
//!   [`AudioError::BackendUnavailable`]

use crate::engine::BlockEngine;
use crate::types::{count_ports, PortBinding, PortDirection, MAX_PORTS_PER_DIRECTION};

use super::config::AudioConfig;
use super::error::{AudioError, AudioResult};

/// A running host session driving one engine
///
/// The engine lives on the audio thread until [`stop`](Self::stop) hands it
/// back. Dropping the session without calling `stop` also closes the
/// client, but the engine is lost with it.
pub struct EngineSession<E: BlockEngine> {
    #[cfg(all(target_os = "linux", feature = "jack-backend"))]
    inner: super::jack_backend::JackSession<E>,

    #[cfg(not(all(target_os = "linux", feature = "jack-backend")))]
    _engine: std::marker::PhantomData<E>,
}

impl<E: BlockEngine> EngineSession<E> {
    /// Sample rate of the host
    pub fn sample_rate(&self) -> u32 {
        #[cfg(all(target_os = "linux", feature = "jack-backend"))]
        {
            self.inner.sample_rate()
        }

        #[cfg(not(all(target_os = "linux", feature = "jack-backend")))]
        {
            0
        }
    }

    /// Host period in frames
    pub fn buffer_size(&self) -> u32 {
        #[cfg(all(target_os = "linux", feature = "jack-backend"))]
        {
            self.inner.buffer_size()
        }

        #[cfg(not(all(target_os = "linux", feature = "jack-backend")))]
        {
            0
        }
    }

    /// One-way output latency of a period in milliseconds
    pub fn latency_ms(&self) -> f32 {
        latency_ms(self.buffer_size(), self.sample_rate())
    }

    /// Client name as granted by the server
    pub fn client_name(&self) -> &str {
        #[cfg(all(target_os = "linux", feature = "jack-backend"))]
        {
            self.inner.client_name()
        }

        #[cfg(not(all(target_os = "linux", feature = "jack-backend")))]
        {
            ""
        }
    }

    /// Stop callback delivery, close the client and return the engine
    ///
    /// Only call this once the engine has reached a terminal state; after it
    /// returns no block invocation is in flight.
    pub fn stop(self) -> AudioResult<E> {
        #[cfg(all(target_os = "linux", feature = "jack-backend"))]
        {
            self.inner.stop()
        }

        #[cfg(not(all(target_os = "linux", feature = "jack-backend")))]
        {
            Err(AudioError::BackendUnavailable)
        }
    }

    #[cfg(all(target_os = "linux", feature = "jack-backend"))]
    pub(super) fn from_jack(inner: super::jack_backend::JackSession<E>) -> Self {
        Self { inner }
    }
}

/// Start a host session around `engine`
///
/// Opens the client, registers `E::PORTS`, installs the handlers and
/// activates. Callback delivery has started when this returns.
pub fn start_session<E: BlockEngine>(
    config: &AudioConfig,
    engine: E,
) -> AudioResult<EngineSession<E>> {
    check_port_layout(E::PORTS)?;

    #[cfg(all(target_os = "linux", feature = "jack-backend"))]
    {
        super::jack_backend::start_session(config, engine).map(EngineSession::from_jack)
    }

    #[cfg(not(all(target_os = "linux", feature = "jack-backend")))]
    {
        let _ = (config, engine);
        Err(AudioError::BackendUnavailable)
    }
}

/// Reject layouts with more ports per direction than a block can carry
pub(crate) fn check_port_layout(ports: &[PortBinding]) -> AudioResult<()> {
    for (direction, label) in [(PortDirection::Input, "input"), (PortDirection::Output, "output")] {
        let found = count_ports(ports, direction);
        if found > MAX_PORTS_PER_DIRECTION {
            return Err(AudioError::TooManyPorts {
                direction: label,
                found,
                max: MAX_PORTS_PER_DIRECTION,
            });
        }
    }
    Ok(())
}

pub(crate) fn latency_ms(buffer_size: u32, sample_rate: u32) -> f32 {
    if sample_rate == 0 {
        return 0.0;
    }
    (buffer_size as f32 / sample_rate as f32) * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{LevelEngine, RoomEngine};

    #[test]
    fn test_engine_layouts_fit() {
        assert!(check_port_layout(LevelEngine::PORTS).is_ok());
        assert!(check_port_layout(RoomEngine::PORTS).is_ok());
    }

    #[test]
    fn test_too_many_ports() {
        let ports = [
            PortBinding::input("a"),
            PortBinding::input("b"),
            PortBinding::input("c"),
        ];
        match check_port_layout(&ports) {
            Err(AudioError::TooManyPorts { direction, found, max }) => {
                assert_eq!(direction, "input");
                assert_eq!(found, 3);
                assert_eq!(max, MAX_PORTS_PER_DIRECTION);
            }
            other => panic!("unexpected result: {:?}", other.err()),
        }
    }

    #[test]
    fn test_latency_ms() {
        assert!((latency_ms(4800, 48000) - 100.0).abs() < 1e-3);
        assert_eq!(latency_ms(512, 0), 0.0);
    }
}
