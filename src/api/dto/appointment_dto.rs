//! Appointment DTOs for booking, transitions, and participant lists.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::PaginationMeta;
use crate::domain::lifecycle::{next_statuses, roles_of};
use crate::domain::{
    Appointment, AppointmentStatus, BookingType, PaymentEvidence, Role, RoomId, TenantInfo, UserId,
};
use crate::service::BookingRequest;

/// Request body for `POST /appointments`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateAppointmentRequest {
    /// Room to book.
    pub room_id: RoomId,
    /// Tenant id; if given it must be the caller.
    #[serde(default)]
    pub tenant_id: Option<UserId>,
    /// Tenant contact details.
    pub tenant_info: TenantInfo,
    /// `VIEW` or `DEPOSIT`.
    #[serde(rename = "type")]
    pub booking_type: BookingType,
    /// Reservation start; required for `DEPOSIT`.
    #[serde(default)]
    pub start_date: Option<String>,
    /// Reservation end; required for `DEPOSIT`.
    #[serde(default)]
    pub end_date: Option<String>,
    /// Deposit in the smallest currency unit; required for `DEPOSIT`.
    #[serde(default)]
    pub deposit_amount: Option<u64>,
}

impl From<CreateAppointmentRequest> for BookingRequest {
    fn from(req: CreateAppointmentRequest) -> Self {
        Self {
            room_id: req.room_id,
            tenant_id: req.tenant_id,
            tenant_info: req.tenant_info,
            booking_type: req.booking_type,
            start_date: req.start_date,
            end_date: req.end_date,
            deposit_amount: req.deposit_amount,
        }
    }
}

/// Request body for `POST /appointments/{id}/transition`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TransitionRequest {
    /// Target status.
    pub status: AppointmentStatus,
    /// Receipt image, required when paying a deposit.
    #[serde(default)]
    pub bill_image: Option<String>,
    /// Note for the host.
    #[serde(default)]
    pub note: Option<String>,
}

impl TransitionRequest {
    /// Payment evidence carried by the request, if any.
    #[must_use]
    pub fn evidence(&self) -> Option<PaymentEvidence> {
        if self.bill_image.is_none() && self.note.is_none() {
            return None;
        }
        Some(PaymentEvidence {
            bill_image: self.bill_image.clone(),
            note: self.note.clone(),
        })
    }
}

/// An appointment as seen by one of its participants.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AppointmentView {
    /// The stored record.
    pub appointment: Appointment,
    /// Roles the caller holds on it.
    pub roles: Vec<Role>,
    /// Statuses the record can move to next.
    pub next_statuses: Vec<AppointmentStatus>,
}

impl AppointmentView {
    /// Builds the view of `appointment` for `viewer`.
    #[must_use]
    pub fn new(appointment: Appointment, viewer: &UserId) -> Self {
        let roles = roles_of(&appointment, viewer);
        let next_statuses = next_statuses(appointment.status, appointment.booking_type);
        Self {
            appointment,
            roles,
            next_statuses,
        }
    }
}

/// Response body for `POST /appointments/{id}/transition`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransitionResponse {
    /// `false` when the record already had the requested status.
    pub applied: bool,
    /// The record after the call.
    #[serde(flatten)]
    pub view: AppointmentView,
}

/// Query parameters for `GET /appointments`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AppointmentListParams {
    /// Only appointments where the caller holds this role.
    #[serde(default)]
    #[param(value_type = Option<String>, example = "tenant")]
    pub role: Option<Role>,
}

/// Paginated list response for `GET /appointments`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AppointmentListResponse {
    /// Page of appointments, newest first.
    pub data: Vec<Appointment>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn create_request_reads_wire_names() {
        let json = serde_json::json!({
            "room_id": "5b8a5b0e-7d5c-4f44-9a0e-2f3f1f0f6c11",
            "type": "DEPOSIT",
            "tenant_info": { "full_name": "Pham D", "phone_number": "0922222222" },
            "start_date": "01/01/2026",
            "end_date": "01/06/2026",
            "deposit_amount": 5000000
        });
        let Ok(req) = serde_json::from_value::<CreateAppointmentRequest>(json) else {
            panic!("request should parse");
        };
        let booking = BookingRequest::from(req);
        assert_eq!(booking.booking_type, BookingType::Deposit);
        assert_eq!(booking.deposit_amount, Some(5_000_000));
        assert!(booking.tenant_id.is_none());
    }

    #[test]
    fn unknown_status_is_rejected_at_parse_time() {
        let json = serde_json::json!({ "status": "approved" });
        assert!(serde_json::from_value::<TransitionRequest>(json).is_err());
    }

    #[test]
    fn evidence_only_when_supplied() {
        let bare = TransitionRequest {
            status: AppointmentStatus::Confirmed,
            bill_image: None,
            note: None,
        };
        assert!(bare.evidence().is_none());
        let with_bill = TransitionRequest {
            bill_image: Some("https://img.example/b.jpg".to_string()),
            ..bare
        };
        assert!(with_bill.evidence().is_some());
    }
}
