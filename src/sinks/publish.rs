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

//! Event publishing.
//!
//! In publish mode every event is forwarded to a single topic as a JSON
//! object, leaving interpretation to whoever subscribes:
//!
//! ```json
//! {"type":"note_on","note":64,"velocity":100,"control":null,"value":null}
//! ```

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::{events::EventHandler, model::CanonicalEvent, sinks::BusClient};

#[derive(Debug, Error)]
pub(crate) enum PublishError {
    #[error("failed to serialize message")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to queue message for {topic}")]
    Send {
        topic: String,
        #[source]
        source: rumqttc::ClientError,
    },
}

/// The wire representation of an event.
#[derive(Debug, Serialize, PartialEq)]
pub(crate) struct PublishedMessage {
    #[serde(rename = "type")]
    pub(crate) kind: &'static str,
    pub(crate) note: Option<u8>,
    pub(crate) velocity: Option<u8>,
    pub(crate) control: Option<u8>,
    pub(crate) value: Option<u8>,
}

impl From<&CanonicalEvent> for PublishedMessage {
    fn from(event: &CanonicalEvent) -> Self {
        Self {
            kind: event.kind.as_str(),
            note: event.note(),
            velocity: event.velocity(),
            control: event.control(),
            value: event.value(),
        }
    }
}

/// Publishes events to a fixed topic.
pub(crate) struct PublishSink<C> {
    client: C,
    topic: String,
}

impl<C: BusClient> PublishSink<C> {
    pub(crate) fn new(client: C, topic: impl Into<String>) -> Self {
        Self {
            client,
            topic: topic.into(),
        }
    }

    /// Serializes `event` and hands it to the bus client once.
    pub(crate) fn publish(&self, event: &CanonicalEvent) -> Result<String, PublishError> {
        let payload = serde_json::to_string(&PublishedMessage::from(event))?;
        self.client.send(&self.topic, payload.clone())?;

        Ok(payload)
    }
}

impl<C: BusClient> EventHandler for PublishSink<C> {
    fn handle_event(&self, event: &CanonicalEvent) {
        match self.publish(event) {
            Ok(payload) => info!(topic = %self.topic, payload = %payload, "Sent"),
            Err(e) => warn!(topic = %self.topic, error = %e, "Failed to publish event"),
        }
    }
}
