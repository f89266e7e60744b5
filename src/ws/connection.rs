//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and pushing fresh snapshots when an
//! appointment the client follows changes.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsEvent, WsMessage, WsMessageType};
use super::subscription::{Interest, SubscriptionManager};
use crate::domain::{Appointment, AppointmentEvent, AppointmentId};
use crate::identity::Session;
use crate::service::AppointmentService;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Re-queries and pushes the records that a matching event touched.
/// - On lag, re-sends everything the client follows instead of
///   dropping the connection.
pub async fn run_connection(
    socket: WebSocket,
    session: Session,
    mut event_rx: broadcast::Receiver<AppointmentEvent>,
    service: Arc<AppointmentService>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    'conn: loop {
        let outgoing = tokio::select! {
            // Incoming message from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        handle_text_message(&text, &mut subs, &session, &service).await
                    }
                    Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                    _ => Vec::new(),
                }
            }
            // Event from EventBus
            event = event_rx.recv() => {
                match event {
                    Ok(event) => {
                        let interest = subs.interest(&event, session.user_id());
                        push_updates(interest, event.appointment_id(), &session, &service).await
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, user = %session.user_id(), "ws client lagged behind event bus, resyncing");
                        resync(&subs, &session, &service).await
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        };

        for msg in outgoing {
            if ws_tx.send(Message::text(msg.to_text())).await.is_err() {
                break 'conn;
            }
        }
    }

    tracing::debug!(user = %session.user_id(), "ws connection closed");
}

/// Handles a text frame from the client, returning the messages to send back.
async fn handle_text_message(
    text: &str,
    subs: &mut SubscriptionManager,
    session: &Session,
    service: &AppointmentService,
) -> Vec<WsMessage> {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return vec![WsMessage::error(String::new(), 400, "malformed JSON")];
    };
    if msg.msg_type != WsMessageType::Command {
        return vec![WsMessage::error(msg.id, 400, "expected a command")];
    }
    let command = match serde_json::from_value::<WsCommand>(msg.payload) {
        Ok(command) => command,
        Err(e) => {
            return vec![WsMessage::error(msg.id, 404, format!("unknown command: {e}"))];
        }
    };

    match command {
        WsCommand::Subscribe => {
            subs.subscribe_feed();
            vec![
                WsMessage::response(msg.id, serde_json::json!({ "subscribed": true })),
                list_snapshot(session, service).await,
            ]
        }
        WsCommand::Unsubscribe => {
            subs.unsubscribe_feed();
            vec![WsMessage::response(
                msg.id,
                serde_json::json!({ "subscribed": false }),
            )]
        }
        WsCommand::Watch { appointment_ids } => {
            let mut watched = Vec::new();
            let mut rejected = Vec::new();
            let mut snapshots = Vec::new();
            for id in appointment_ids {
                match service.get_for_participant(id, session).await {
                    Ok(appointment) => {
                        subs.watch(id);
                        watched.push(id);
                        snapshots.push(record_event(appointment));
                    }
                    Err(e) => rejected.push(serde_json::json!({
                        "appointment_id": id,
                        "code": e.error_code(),
                        "message": e.to_string(),
                    })),
                }
            }
            let mut out = vec![WsMessage::response(
                msg.id,
                serde_json::json!({
                    "watched": watched,
                    "rejected": rejected,
                    "count": subs.watched_count(),
                }),
            )];
            out.extend(snapshots);
            out
        }
        WsCommand::Unwatch { appointment_ids } => {
            subs.unwatch(&appointment_ids);
            vec![WsMessage::response(
                msg.id,
                serde_json::json!({
                    "unwatched": appointment_ids,
                    "remaining_count": subs.watched_count(),
                }),
            )]
        }
    }
}

/// Messages owed to the client after an event on `id`.
async fn push_updates(
    interest: Interest,
    id: AppointmentId,
    session: &Session,
    service: &AppointmentService,
) -> Vec<WsMessage> {
    let mut out = Vec::new();
    if interest.list {
        out.push(list_snapshot(session, service).await);
    }
    if interest.record {
        out.push(match service.get_by_id(id).await {
            Ok(appointment) => record_event(appointment),
            Err(e) => WsMessage::from_error(String::new(), &e),
        });
    }
    out
}

/// Re-sends everything the client follows.
async fn resync(
    subs: &SubscriptionManager,
    session: &Session,
    service: &AppointmentService,
) -> Vec<WsMessage> {
    let mut out = Vec::new();
    if subs.feed_active() {
        out.push(list_snapshot(session, service).await);
    }
    for id in subs.watched() {
        out.push(match service.get_by_id(id).await {
            Ok(appointment) => record_event(appointment),
            Err(e) => WsMessage::from_error(String::new(), &e),
        });
    }
    out
}

async fn list_snapshot(session: &Session, service: &AppointmentService) -> WsMessage {
    match service.list_for_participant(session, None).await {
        Ok(appointments) => WsMessage::event(&WsEvent::Appointments { appointments }),
        Err(e) => WsMessage::from_error(String::new(), &e),
    }
}

fn record_event(appointment: Appointment) -> WsMessage {
    WsMessage::event(&WsEvent::AppointmentUpdated { appointment })
}
