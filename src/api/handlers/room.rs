//! Room catalog handlers: search, get, and owner self-service.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{PaginationParams, RoomListParams, RoomListResponse};
use crate::app_state::AppState;
use crate::domain::{NewRoom, Room, RoomId, RoomPatch};
use crate::error::{ErrorResponse, RentalError};
use crate::identity::Session;

/// `GET /rooms` — Search listings.
///
/// # Errors
///
/// Returns [`RentalError`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/rooms",
    tag = "Rooms",
    summary = "Search rooms",
    description = "Returns a paginated list of listings, newest first, filtered by free text, type, price ceiling and owner. Public.",
    params(PaginationParams, RoomListParams),
    responses(
        (status = 200, description = "Paginated room list", body = RoomListResponse),
    )
)]
pub async fn list_rooms(
    State(state): State<AppState>,
    Query(page): Query<PaginationParams>,
    Query(params): Query<RoomListParams>,
) -> Result<impl IntoResponse, RentalError> {
    let rooms = state.rooms.search(&params.into_filter()).await?;
    let (data, pagination) = page.paginate(rooms);
    Ok(Json(RoomListResponse { data, pagination }))
}

/// `POST /rooms` — List a room owned by the caller.
///
/// # Errors
///
/// Returns [`RentalError::Validation`] on a malformed listing.
#[utoipa::path(
    post,
    path = "/api/v1/rooms",
    tag = "Rooms",
    summary = "Create a room",
    request_body = NewRoom,
    responses(
        (status = 201, description = "Room created", body = Room),
        (status = 400, description = "Invalid listing", body = ErrorResponse),
        (status = 401, description = "No caller identity", body = ErrorResponse),
    )
)]
pub async fn create_room(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<NewRoom>,
) -> Result<impl IntoResponse, RentalError> {
    let room = state.rooms.create(&session, req).await?;
    Ok((StatusCode::CREATED, Json(room)))
}

/// `GET /rooms/{id}` — Listing details.
///
/// # Errors
///
/// Returns [`RentalError::NotFound`] if the room does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/rooms/{id}",
    tag = "Rooms",
    summary = "Get a room",
    params(
        ("id" = uuid::Uuid, Path, description = "Room UUID"),
    ),
    responses(
        (status = 200, description = "Room details", body = Room),
        (status = 404, description = "Room not found", body = ErrorResponse),
    )
)]
pub async fn get_room(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, RentalError> {
    let room = state.rooms.get(RoomId::from_uuid(id)).await?;
    Ok(Json(room))
}

/// `PATCH /rooms/{id}` — Edit an owned listing.
///
/// # Errors
///
/// Returns [`RentalError::Forbidden`] for non-owners.
#[utoipa::path(
    patch,
    path = "/api/v1/rooms/{id}",
    tag = "Rooms",
    summary = "Update a room",
    params(
        ("id" = uuid::Uuid, Path, description = "Room UUID"),
    ),
    request_body = RoomPatch,
    responses(
        (status = 200, description = "Room updated", body = Room),
        (status = 403, description = "Caller does not own the room", body = ErrorResponse),
        (status = 404, description = "Room not found", body = ErrorResponse),
    )
)]
pub async fn update_room(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<uuid::Uuid>,
    Json(patch): Json<RoomPatch>,
) -> Result<impl IntoResponse, RentalError> {
    let room = state
        .rooms
        .update(&session, RoomId::from_uuid(id), patch)
        .await?;
    Ok(Json(room))
}

/// `DELETE /rooms/{id}` — Remove an owned listing.
///
/// # Errors
///
/// Returns [`RentalError::Forbidden`] for non-owners.
#[utoipa::path(
    delete,
    path = "/api/v1/rooms/{id}",
    tag = "Rooms",
    summary = "Delete a room",
    description = "Removes the listing. Appointments keep their title and image snapshot.",
    params(
        ("id" = uuid::Uuid, Path, description = "Room UUID"),
    ),
    responses(
        (status = 204, description = "Room deleted"),
        (status = 403, description = "Caller does not own the room", body = ErrorResponse),
        (status = 404, description = "Room not found", body = ErrorResponse),
    )
)]
pub async fn delete_room(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, RentalError> {
    state.rooms.delete(&session, RoomId::from_uuid(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Room catalog routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/rooms", get(list_rooms).post(create_room))
        .route(
            "/rooms/{id}",
            get(get_room).patch(update_room).delete(delete_room),
        )
}
