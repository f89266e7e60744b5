//! Axum WebSocket upgrade handler.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;

use super::connection::run_connection;
use crate::app_state::AppState;
use crate::identity::Session;

/// `GET /ws` — Upgrade an authenticated HTTP connection to WebSocket.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    session: Session,
) -> impl IntoResponse {
    let event_rx = state.event_bus.subscribe();
    let service = Arc::clone(&state.appointments);
    tracing::debug!(user = %session.user_id(), "ws upgrade");

    ws.on_upgrade(move |socket| run_connection(socket, session, event_rx, service))
}
