//! Preference handlers: favorites, history, and compare sets of the caller.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{
    PreferenceContainsResponse, PreferenceListResponse, PreferenceToggleResponse,
};
use crate::app_state::AppState;
use crate::domain::{PreferenceKey, RoomId, ToggleOutcome};
use crate::error::{ErrorResponse, RentalError};
use crate::identity::Session;

fn parse_key(raw: &str) -> Result<PreferenceKey, RentalError> {
    raw.parse().map_err(RentalError::Validation)
}

/// `GET /me/preferences/{key}` — Contents of one set.
///
/// # Errors
///
/// Returns [`RentalError::Validation`] for an unknown key.
#[utoipa::path(
    get,
    path = "/api/v1/me/preferences/{key}",
    tag = "Preferences",
    summary = "List a preference set",
    params(
        ("key" = String, Path, description = "`favorites`, `history` or `compare`"),
    ),
    responses(
        (status = 200, description = "Set contents", body = PreferenceListResponse),
        (status = 400, description = "Unknown key", body = ErrorResponse),
    )
)]
pub async fn list_preferences(
    State(state): State<AppState>,
    session: Session,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, RentalError> {
    let key = parse_key(&key)?;
    let room_ids = state.preferences.list(session.user_id(), key).await;
    Ok(Json(PreferenceListResponse { key, room_ids }))
}

/// `DELETE /me/preferences/{key}` — Empty one set.
///
/// # Errors
///
/// Returns [`RentalError::Validation`] for an unknown key.
#[utoipa::path(
    delete,
    path = "/api/v1/me/preferences/{key}",
    tag = "Preferences",
    summary = "Clear a preference set",
    params(
        ("key" = String, Path, description = "`favorites`, `history` or `compare`"),
    ),
    responses(
        (status = 204, description = "Set cleared"),
        (status = 400, description = "Unknown key", body = ErrorResponse),
    )
)]
pub async fn clear_preferences(
    State(state): State<AppState>,
    session: Session,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, RentalError> {
    let key = parse_key(&key)?;
    state.preferences.clear(session.user_id(), key).await;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /me/preferences/{key}/{room_id}` — Membership check.
///
/// # Errors
///
/// Returns [`RentalError::Validation`] for an unknown key.
#[utoipa::path(
    get,
    path = "/api/v1/me/preferences/{key}/{room_id}",
    tag = "Preferences",
    summary = "Check set membership",
    params(
        ("key" = String, Path, description = "`favorites`, `history` or `compare`"),
        ("room_id" = uuid::Uuid, Path, description = "Room UUID"),
    ),
    responses(
        (status = 200, description = "Membership", body = PreferenceContainsResponse),
        (status = 400, description = "Unknown key", body = ErrorResponse),
    )
)]
pub async fn contains_preference(
    State(state): State<AppState>,
    session: Session,
    Path((key, room_id)): Path<(String, uuid::Uuid)>,
) -> Result<impl IntoResponse, RentalError> {
    let key = parse_key(&key)?;
    let room_id = RoomId::from_uuid(room_id);
    let contains = state
        .preferences
        .contains(session.user_id(), key, room_id)
        .await;
    Ok(Json(PreferenceContainsResponse {
        key,
        room_id,
        contains,
    }))
}

/// `POST /me/preferences/{key}/{room_id}` — Toggle a room in a set.
///
/// # Errors
///
/// Returns [`RentalError::Validation`] for an unknown key.
#[utoipa::path(
    post,
    path = "/api/v1/me/preferences/{key}/{room_id}",
    tag = "Preferences",
    summary = "Toggle set membership",
    description = "Favorites flip membership. History moves the room to the front and never removes. Compare flips membership but refuses to grow past its cap, answering with `limit_reached` and a warning instead of an error.",
    params(
        ("key" = String, Path, description = "`favorites`, `history` or `compare`"),
        ("room_id" = uuid::Uuid, Path, description = "Room UUID"),
    ),
    responses(
        (status = 200, description = "Toggle outcome", body = PreferenceToggleResponse),
        (status = 400, description = "Unknown key", body = ErrorResponse),
    )
)]
pub async fn toggle_preference(
    State(state): State<AppState>,
    session: Session,
    Path((key, room_id)): Path<(String, uuid::Uuid)>,
) -> Result<impl IntoResponse, RentalError> {
    let key = parse_key(&key)?;
    let room_id = RoomId::from_uuid(room_id);
    let (outcome, room_ids) = state
        .preferences
        .toggle(session.user_id(), key, room_id)
        .await;
    let warning = (outcome == ToggleOutcome::LimitReached)
        .then(|| format!("{key} is full ({} rooms)", room_ids.len()));
    Ok(Json(PreferenceToggleResponse {
        key,
        room_id,
        outcome,
        room_ids,
        warning,
    }))
}

/// Preference routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/me/preferences/{key}",
            get(list_preferences).delete(clear_preferences),
        )
        .route(
            "/me/preferences/{key}/{room_id}",
            get(contains_preference).post(toggle_preference),
        )
}
