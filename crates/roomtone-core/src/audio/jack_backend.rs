//! Native JACK backend for Linux
//!
//! Registers an engine's ports on a JACK client and drives the engine from
//! the JACK process callback.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐                     ┌─────────────────────┐
//! │ JACK notification│───send()───────────►│  Topology counters  │
//! │     thread       │                     │     (wait-free)     │
//! └──────────────────┘                     └──────────┬──────────┘
//!                                                     │ pop()
//!                                                     ▼
//! ┌──────────────────┐                     ┌─────────────────────┐
//! │  Engine atomics  │◄────────────────────│  JACK RT Thread     │
//! │   (lock-free)    │   Release stores    │  (owns the engine)  │
//! └──────────────────┘                     └─────────────────────┘
//!          ▲
//!          │ Acquire loads
//! ┌──────────────────┐
//! │ Supervisor thread│
//! └──────────────────┘
//! ```

use jack::{AudioIn, AudioOut, Client, ClientOptions, Control, Port, PortId, ProcessScope};

use super::config::AudioConfig;
use super::error::{AudioError, AudioResult};
use crate::engine::{
    drive_block, topology_channel, BlockEngine, TopologyEvent, TopologyReceiver, TopologySender,
};
use crate::types::{PortDirection, Sample, MAX_PORTS_PER_DIRECTION};

/// JACK-specific session
///
/// Keeps the JACK client active until stopped or dropped.
pub struct JackSession<E: BlockEngine> {
    async_client: jack::AsyncClient<JackNotifications, JackProcessor<E>>,
    client_name: String,
    sample_rate: u32,
    buffer_size: u32,
}

impl<E: BlockEngine> JackSession<E> {
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn buffer_size(&self) -> u32 {
        self.buffer_size
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    /// Deactivate, close the client and return the engine
    pub fn stop(self) -> AudioResult<E> {
        let (client, _notifications, processor) = self
            .async_client
            .deactivate()
            .map_err(|e| AudioError::Deactivate(e.to_string()))?;
        log::info!("JACK client '{}' deactivated", self.client_name);

        // Dropping the client closes it
        drop(client);
        Ok(processor.engine)
    }
}

/// JACK process handler
///
/// Owns the engine exclusively - no mutex needed.
struct JackProcessor<E: BlockEngine> {
    inputs: Vec<Port<AudioIn>>,
    outputs: Vec<Port<AudioOut>>,
    engine: E,
    topology_rx: TopologyReceiver,
}

impl<E: BlockEngine> jack::ProcessHandler for JackProcessor<E> {
    fn process(&mut self, _client: &Client, ps: &ProcessScope) -> Control {
        let n_inputs = self.inputs.len();
        let n_outputs = self.outputs.len();

        // Port slices on the stack (RT-safe: no allocation)
        let mut inputs: [&[Sample]; MAX_PORTS_PER_DIRECTION] = Default::default();
        for (slot, port) in inputs.iter_mut().zip(self.inputs.iter()) {
            *slot = port.as_slice(ps);
        }

        let mut outputs: [&mut [Sample]; MAX_PORTS_PER_DIRECTION] = Default::default();
        for (slot, port) in outputs.iter_mut().zip(self.outputs.iter_mut()) {
            *slot = port.as_mut_slice(ps);
        }

        let result = drive_block(
            &mut self.engine,
            &mut self.topology_rx,
            &inputs[..n_inputs],
            &mut outputs[..n_outputs],
        );
        if let Err(e) = result {
            crate::fail!("{}", e);
        }

        Control::Continue
    }
}

/// JACK notification handler
///
/// JACK requires it to be `Sync`; the topology sender only touches atomics.
struct JackNotifications {
    topology_tx: TopologySender,
}

impl jack::NotificationHandler for JackNotifications {
    fn ports_connected(
        &mut self,
        _client: &Client,
        _port_id_a: PortId,
        _port_id_b: PortId,
        are_connected: bool,
    ) {
        self.topology_tx.send(TopologyEvent {
            connected: are_connected,
        });
    }

    fn sample_rate(&mut self, _client: &Client, srate: jack::Frames) -> Control {
        log::info!("JACK sample rate changed to: {}", srate);
        Control::Continue
    }

    fn xrun(&mut self, _client: &Client) -> Control {
        log::warn!("JACK xrun detected");
        Control::Continue
    }
}

/// Start a JACK session around `engine`
pub fn start_session<E: BlockEngine>(
    config: &AudioConfig,
    engine: E,
) -> AudioResult<JackSession<E>> {
    let options = if config.start_server {
        ClientOptions::empty()
    } else {
        ClientOptions::NO_START_SERVER
    };

    // JACK may rename the client if another one has the same name
    let (client, _status) = Client::new(&config.client_name, options)
        .map_err(|e| AudioError::SessionOpen(e.to_string()))?;
    let client_name = client.name().to_string();

    let sample_rate = client.sample_rate() as u32;
    let buffer_size = client.buffer_size();

    log::info!(
        "JACK client '{}' created (sample rate: {}Hz, buffer: {} frames, latency: {:.1}ms)",
        client_name,
        sample_rate,
        buffer_size,
        super::backend::latency_ms(buffer_size, sample_rate)
    );

    let mut inputs = Vec::with_capacity(MAX_PORTS_PER_DIRECTION);
    let mut outputs = Vec::with_capacity(MAX_PORTS_PER_DIRECTION);
    for binding in E::PORTS {
        match binding.direction {
            PortDirection::Input => {
                let port = client
                    .register_port(binding.name, AudioIn::default())
                    .map_err(|e| AudioError::PortRegistration {
                        port: binding.name,
                        direction: "input",
                        reason: e.to_string(),
                    })?;
                inputs.push(port);
            }
            PortDirection::Output => {
                let port = client
                    .register_port(binding.name, AudioOut::default())
                    .map_err(|e| AudioError::PortRegistration {
                        port: binding.name,
                        direction: "output",
                        reason: e.to_string(),
                    })?;
                outputs.push(port);
            }
        }
        log::debug!("Registered port {}", binding);
    }

    let (topology_tx, topology_rx) = topology_channel();

    let processor = JackProcessor {
        inputs,
        outputs,
        engine,
        topology_rx,
    };

    let async_client = client
        .activate_async(JackNotifications { topology_tx }, processor)
        .map_err(|e| AudioError::Activate(e.to_string()))?;

    log::info!("JACK client activated");

    Ok(JackSession {
        async_client,
        client_name,
        sample_rate,
        buffer_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{LevelEngine, RoomEngine};

    fn assert_notification_handler<T: jack::NotificationHandler + Send + Sync + 'static>() {}
    fn assert_process_handler<T: jack::ProcessHandler + Send + 'static>() {}

    #[test]
    fn test_handlers_meet_jack_bounds() {
        assert_notification_handler::<JackNotifications>();
        assert_process_handler::<JackProcessor<LevelEngine>>();
        assert_process_handler::<JackProcessor<RoomEngine>>();
    }
}
