//! WebSocket message types: envelope, commands, and events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Appointment, AppointmentId};
use crate::error::RentalError;

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for requests; server-generated for events.
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    pub payload: serde_json::Value,
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client pushed update.
    Event,
    /// Server → Client error.
    Error,
}

/// Commands that a client can send over WebSocket, carried in the
/// envelope's `payload`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Receive the caller's full appointment list now and after every
    /// change to one of their appointments.
    Subscribe,
    /// Stop the list feed.
    Unsubscribe,
    /// Receive single records whenever they change.
    Watch {
        /// Appointments to watch; the caller must take part in each.
        appointment_ids: Vec<AppointmentId>,
    },
    /// Stop watching records.
    Unwatch {
        /// Appointments to stop watching.
        appointment_ids: Vec<AppointmentId>,
    },
}

/// Updates pushed to the client inside `event` envelopes.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum WsEvent {
    /// Full participant list, newest first.
    Appointments {
        /// The caller's appointments.
        appointments: Vec<Appointment>,
    },
    /// A watched record changed.
    AppointmentUpdated {
        /// The record after the change.
        appointment: Appointment,
    },
}

impl WsMessage {
    /// Response to the command with id `id`.
    #[must_use]
    pub fn response(id: String, payload: serde_json::Value) -> Self {
        Self {
            id,
            msg_type: WsMessageType::Response,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Server-initiated update.
    #[must_use]
    pub fn event(event: &WsEvent) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            msg_type: WsMessageType::Event,
            timestamp: Utc::now(),
            payload: serde_json::to_value(event).unwrap_or_default(),
        }
    }

    /// Error reply with a numeric code.
    #[must_use]
    pub fn error(id: String, code: u32, message: impl Into<String>) -> Self {
        Self {
            id,
            msg_type: WsMessageType::Error,
            timestamp: Utc::now(),
            payload: serde_json::json!({
                "code": code,
                "message": message.into(),
            }),
        }
    }

    /// Error reply for a failed service call.
    #[must_use]
    pub fn from_error(id: String, err: &RentalError) -> Self {
        Self::error(id, err.error_code(), err.to_string())
    }

    /// Serializes the envelope for a text frame.
    #[must_use]
    pub fn to_text(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse_from_payload() {
        let sub = serde_json::json!({ "command": "subscribe" });
        assert!(matches!(
            serde_json::from_value::<WsCommand>(sub),
            Ok(WsCommand::Subscribe)
        ));

        let id = AppointmentId::new();
        let watch = serde_json::json!({ "command": "watch", "appointment_ids": [id] });
        let Ok(WsCommand::Watch { appointment_ids }) = serde_json::from_value::<WsCommand>(watch)
        else {
            panic!("watch should parse");
        };
        assert_eq!(appointment_ids, vec![id]);
    }

    #[test]
    fn unknown_command_is_rejected() {
        let unknown = serde_json::json!({ "command": "book_room" });
        assert!(serde_json::from_value::<WsCommand>(unknown).is_err());
    }

    #[test]
    fn error_envelope_carries_code() {
        let msg = WsMessage::from_error("c-1".to_string(), &RentalError::Unauthenticated);
        assert_eq!(msg.msg_type, WsMessageType::Error);
        assert_eq!(msg.payload.get("code").and_then(serde_json::Value::as_u64), Some(2202));
        assert!(msg.to_text().contains("\"type\":\"error\""));
    }
}
