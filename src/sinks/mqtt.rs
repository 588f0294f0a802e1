// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! MQTT transport for the publish sink.
//!
//! The connection to the broker is driven by a background worker thread which
//! owns the `rumqttc` event loop. Publishing only queues a request for that
//! worker, so a slow or unreachable broker never blocks event intake.
//!
//! # Architecture
//!
//! 1. **Client**: Held by [`MqttBus`], queues outgoing publish requests.
//! 2. **Connection worker**: Drives the network connection, reports the
//!    connection lifecycle and reconnects after failures.

use std::{thread, time::Duration};

use rumqttc::{Client, ConnectReturnCode, Connection, Event, MqttOptions, Packet, QoS};
use tracing::{debug, info, warn};

use crate::{
    config::MqttConfig,
    sinks::{BusClient, publish::PublishError},
};

const REQUEST_CAPACITY: usize = 64;

// Delay before the worker lets the event loop attempt to reconnect.
const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// A best-effort MQTT publisher.
pub(crate) struct MqttBus {
    client: Client,
}

impl MqttBus {
    /// Starts connecting to the broker named in `config` and returns without
    /// waiting for the connection to be established.
    pub(crate) fn connect(config: &MqttConfig) -> Self {
        let mut options = MqttOptions::new(&config.client_id, &config.host, config.port);
        options.set_keep_alive(Duration::from_secs(config.keep_alive_secs.max(1)));

        let (client, connection) = Client::new(options, REQUEST_CAPACITY);

        info!(host = %config.host, port = config.port, "Connecting to MQTT broker");
        spawn_connection_worker(connection);

        Self { client }
    }
}

impl BusClient for MqttBus {
    fn send(&self, topic: &str, payload: String) -> Result<(), PublishError> {
        self.client
            .try_publish(topic, QoS::AtMostOnce, false, payload)
            .map_err(|source| PublishError::Send {
                topic: topic.to_string(),
                source,
            })
    }
}

/// Spawns the background worker that drives the broker connection.
///
/// The worker exits once the client has been dropped and every queued request
/// has been processed.
fn spawn_connection_worker(mut connection: Connection) {
    thread::spawn(move || {
        for notification in connection.iter() {
            match notification {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => on_connect(ack.code),
                Ok(event) => debug!(event = ?event, "MQTT event"),
                Err(e) => {
                    warn!(error = %e, "MQTT connection error");
                    thread::sleep(RECONNECT_DELAY);
                }
            }
        }
        debug!("MQTT connection worker finished");
    });
}

fn on_connect(code: ConnectReturnCode) {
    match code {
        ConnectReturnCode::Success => info!(code = ?code, "Connected to MQTT broker"),
        _ => warn!(code = ?code, "MQTT broker refused connection"),
    }
}
