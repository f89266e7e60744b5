//! Appointment handlers: book, list, get, transition, deposit QR.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    AppointmentListParams, AppointmentListResponse, AppointmentView, CreateAppointmentRequest,
    PaginationParams, TransitionRequest, TransitionResponse,
};
use crate::app_state::AppState;
use crate::domain::{Appointment, AppointmentId, DepositQr};
use crate::error::{ErrorResponse, RentalError};
use crate::identity::Session;

/// `POST /appointments` — Book a viewing or a deposit.
///
/// # Errors
///
/// Returns [`RentalError`] on invalid input, unknown room, or storage failure.
#[utoipa::path(
    post,
    path = "/api/v1/appointments",
    tag = "Appointments",
    summary = "Create a booking",
    description = "Creates a `pending` appointment for the caller on a room. `DEPOSIT` bookings require `deposit_amount`, `start_date` and `end_date`; `VIEW` bookings ignore the amount.",
    request_body = CreateAppointmentRequest,
    responses(
        (status = 201, description = "Booking created", body = Appointment),
        (status = 400, description = "Invalid booking or room closed for booking", body = ErrorResponse),
        (status = 401, description = "No caller identity", body = ErrorResponse),
        (status = 403, description = "Booking on behalf of someone else", body = ErrorResponse),
        (status = 404, description = "Room not found", body = ErrorResponse),
        (status = 503, description = "Storage unavailable", body = ErrorResponse),
    )
)]
pub async fn create_appointment(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<CreateAppointmentRequest>,
) -> Result<impl IntoResponse, RentalError> {
    let appointment = state
        .appointments
        .create_booking(&session, req.into())
        .await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

/// `GET /appointments` — The caller's appointments, newest first.
///
/// # Errors
///
/// Returns [`RentalError`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/appointments",
    tag = "Appointments",
    summary = "List my appointments",
    description = "Returns every appointment where the caller is tenant or host, newest first. `role` narrows the list to one side.",
    params(PaginationParams, AppointmentListParams),
    responses(
        (status = 200, description = "Paginated appointment list", body = AppointmentListResponse),
        (status = 401, description = "No caller identity", body = ErrorResponse),
    )
)]
pub async fn list_appointments(
    State(state): State<AppState>,
    session: Session,
    Query(page): Query<PaginationParams>,
    Query(params): Query<AppointmentListParams>,
) -> Result<impl IntoResponse, RentalError> {
    let list = state
        .appointments
        .list_for_participant(&session, params.role)
        .await?;
    let (data, pagination) = page.paginate(list);
    Ok(Json(AppointmentListResponse { data, pagination }))
}

/// `GET /appointments/{id}` — One appointment, for its participants.
///
/// # Errors
///
/// Returns [`RentalError::NotFound`] or [`RentalError::Forbidden`].
#[utoipa::path(
    get,
    path = "/api/v1/appointments/{id}",
    tag = "Appointments",
    summary = "Get an appointment",
    description = "Returns the record with the caller's roles and the statuses it can move to next.",
    params(
        ("id" = uuid::Uuid, Path, description = "Appointment UUID"),
    ),
    responses(
        (status = 200, description = "Appointment details", body = AppointmentView),
        (status = 403, description = "Caller is not a participant", body = ErrorResponse),
        (status = 404, description = "Appointment not found", body = ErrorResponse),
    )
)]
pub async fn get_appointment(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, RentalError> {
    let appointment = state
        .appointments
        .get_for_participant(AppointmentId::from_uuid(id), &session)
        .await?;
    Ok(Json(AppointmentView::new(appointment, session.user_id())))
}

/// `POST /appointments/{id}/transition` — Move an appointment to a new status.
///
/// # Errors
///
/// Returns [`RentalError::InvalidTransition`], [`RentalError::Forbidden`],
/// [`RentalError::Validation`], or [`RentalError::NotFound`].
#[utoipa::path(
    post,
    path = "/api/v1/appointments/{id}/transition",
    tag = "Appointments",
    summary = "Transition an appointment",
    description = "Applies one edge of the lifecycle table. Hosts approve, reject, confirm funds and complete viewings; tenants submit payment evidence; either side may cancel once the host has responded. Re-sending the current status is a no-op.",
    params(
        ("id" = uuid::Uuid, Path, description = "Appointment UUID"),
    ),
    request_body = TransitionRequest,
    responses(
        (status = 200, description = "Transition applied or already in place", body = TransitionResponse),
        (status = 400, description = "Missing payment evidence", body = ErrorResponse),
        (status = 403, description = "Caller lacks the required role", body = ErrorResponse),
        (status = 404, description = "Appointment not found", body = ErrorResponse),
        (status = 409, description = "Edge not allowed from the current status", body = ErrorResponse),
    )
)]
pub async fn transition_appointment(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<TransitionRequest>,
) -> Result<impl IntoResponse, RentalError> {
    let outcome = state
        .appointments
        .transition(
            AppointmentId::from_uuid(id),
            req.status,
            &session,
            req.evidence(),
        )
        .await?;
    Ok(Json(TransitionResponse {
        applied: outcome.applied,
        view: AppointmentView::new(outcome.appointment, session.user_id()),
    }))
}

/// `GET /appointments/{id}/deposit-qr` — Payment QR for a deposit.
///
/// # Errors
///
/// Returns [`RentalError::Validation`] when no payment is due, or the
/// errors of the detail endpoint.
#[utoipa::path(
    get,
    path = "/api/v1/appointments/{id}/deposit-qr",
    tag = "Appointments",
    summary = "Deposit payment QR",
    description = "Builds a VietQR transfer link carrying the deposit amount and a memo that references the appointment.",
    params(
        ("id" = uuid::Uuid, Path, description = "Appointment UUID"),
    ),
    responses(
        (status = 200, description = "Payment QR", body = DepositQr),
        (status = 400, description = "No payment is due", body = ErrorResponse),
        (status = 403, description = "Caller is not a participant", body = ErrorResponse),
        (status = 404, description = "Appointment not found", body = ErrorResponse),
    )
)]
pub async fn deposit_qr(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, RentalError> {
    let qr = state
        .appointments
        .deposit_qr(AppointmentId::from_uuid(id), &session)
        .await?;
    Ok(Json(qr))
}

/// Appointment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/appointments",
            post(create_appointment).get(list_appointments),
        )
        .route("/appointments/{id}", get(get_appointment))
        .route(
            "/appointments/{id}/transition",
            post(transition_appointment),
        )
        .route("/appointments/{id}/deposit-qr", get(deposit_qr))
}
