//! Appointment record and its enumerations.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{AppointmentId, RoomId, UserId};

/// Kind of rental-interest request. Immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingType {
    /// Free viewing appointment.
    View,
    /// Paid deposit-to-reserve request.
    Deposit,
}

impl BookingType {
    /// Wire / storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::View => "VIEW",
            Self::Deposit => "DEPOSIT",
        }
    }
}

impl fmt::Display for BookingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VIEW" => Ok(Self::View),
            "DEPOSIT" => Ok(Self::Deposit),
            other => Err(format!("unknown booking type: {other}")),
        }
    }
}

/// Lifecycle state of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Newly created, awaiting the host.
    Pending,
    /// Host approved a deposit request; tenant owes the deposit.
    WaitingDeposit,
    /// Viewing confirmed, or deposit evidence submitted.
    Confirmed,
    /// Host confirmed the deposit funds. Terminal.
    Contracted,
    /// Rejected or cancelled. Terminal.
    Cancelled,
    /// Viewing took place. Terminal.
    Completed,
}

impl AppointmentStatus {
    /// Returns `true` if no transition may leave this status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Contracted | Self::Cancelled | Self::Completed)
    }

    /// Wire / storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::WaitingDeposit => "waiting_deposit",
            Self::Confirmed => "confirmed",
            Self::Contracted => "contracted",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "waiting_deposit" => Ok(Self::WaitingDeposit),
            "confirmed" => Ok(Self::Confirmed),
            "contracted" => Ok(Self::Contracted),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            other => Err(format!("unknown appointment status: {other}")),
        }
    }
}

/// Deposit bookkeeping tracked alongside `status` for `DEPOSIT` bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DepositStatus {
    /// Nothing paid yet.
    Unpaid,
    /// Tenant submitted payment evidence; host has not confirmed funds.
    PendingApproval,
    /// Host confirmed the funds arrived.
    Paid,
}

impl DepositStatus {
    /// Wire / storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::PendingApproval => "pending_approval",
            Self::Paid => "paid",
        }
    }
}

impl FromStr for DepositStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unpaid" => Ok(Self::Unpaid),
            "pending_approval" => Ok(Self::PendingApproval),
            "paid" => Ok(Self::Paid),
            other => Err(format!("unknown deposit status: {other}")),
        }
    }
}

/// Tenant contact details captured once at booking time.
///
/// Not re-validated against any identity authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TenantInfo {
    /// Tenant's full name.
    pub full_name: String,
    /// Contact phone number.
    pub phone_number: String,
    /// National ID card number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_card: Option<String>,
    /// Number of people who will occupy the room.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupants: Option<u32>,
}

/// A tenant's viewing or deposit request, tracked through its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Appointment {
    /// Record identifier.
    pub id: AppointmentId,
    /// Referenced room.
    pub room_id: RoomId,
    /// Room title snapshot taken at creation; never refreshed.
    pub room_title: String,
    /// Room image snapshot taken at creation; never refreshed.
    pub room_image: String,
    /// Requesting actor.
    pub tenant_id: UserId,
    /// Room owner at creation time.
    pub host_id: UserId,
    /// Booking type.
    #[serde(rename = "type")]
    pub booking_type: BookingType,
    /// Lifecycle state.
    pub status: AppointmentStatus,
    /// Deposit bookkeeping.
    pub deposit_status: DepositStatus,
    /// Reservation window start (opaque date string).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// Reservation window end (opaque date string).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// Deposit in the smallest whole currency unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposit_amount: Option<u64>,
    /// Tenant contact details.
    pub tenant_info: TenantInfo,
    /// Payment evidence attachment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bill_image: Option<String>,
    /// Free-form note attached with the payment evidence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Server-assigned creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last applied transition.
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Returns `true` if `user` is the tenant or the host.
    #[must_use]
    pub fn is_participant(&self, user: &UserId) -> bool {
        self.tenant_id == *user || self.host_id == *user
    }
}

/// Fields the service hands to the store when creating an appointment.
///
/// The store assigns `id`, `created_at` and `updated_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    /// Referenced room.
    pub room_id: RoomId,
    /// Room title snapshot.
    pub room_title: String,
    /// Room image snapshot.
    pub room_image: String,
    /// Requesting actor.
    pub tenant_id: UserId,
    /// Room owner.
    pub host_id: UserId,
    /// Booking type.
    pub booking_type: BookingType,
    /// Reservation window start.
    pub start_date: Option<String>,
    /// Reservation window end.
    pub end_date: Option<String>,
    /// Deposit amount.
    pub deposit_amount: Option<u64>,
    /// Tenant contact details.
    pub tenant_info: TenantInfo,
}

impl NewAppointment {
    /// Materializes the record with the initial lifecycle state.
    #[must_use]
    pub fn into_appointment(self, id: AppointmentId, now: DateTime<Utc>) -> Appointment {
        Appointment {
            id,
            room_id: self.room_id,
            room_title: self.room_title,
            room_image: self.room_image,
            tenant_id: self.tenant_id,
            host_id: self.host_id,
            booking_type: self.booking_type,
            status: AppointmentStatus::Pending,
            deposit_status: DepositStatus::Unpaid,
            start_date: self.start_date,
            end_date: self.end_date,
            deposit_amount: self.deposit_amount,
            tenant_info: self.tenant_info,
            bill_image: None,
            note: None,
            created_at: now,
            updated_at: now,
        }
    }
}
