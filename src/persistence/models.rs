//! Database row models for appointments and rooms.
//!
//! Enumerations are stored as their wire strings and nested records as
//! JSONB; conversion back into domain types fails with
//! [`StoreError::Backend`] if a row holds a value outside the enumeration.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::StoreError;
use crate::domain::{
    Appointment, AppointmentId, AppointmentStatus, BookingType, DepositStatus, Room, RoomId,
    RoomType, TenantInfo, UserId,
};

/// A row from the `appointments` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AppointmentRow {
    /// Primary key.
    pub id: Uuid,
    /// Referenced room.
    pub room_id: Uuid,
    /// Room title snapshot.
    pub room_title: String,
    /// Room image snapshot.
    pub room_image: String,
    /// Tenant identifier.
    pub tenant_id: String,
    /// Host identifier.
    pub host_id: String,
    /// `VIEW` or `DEPOSIT`.
    pub booking_type: String,
    /// Lifecycle status string.
    pub status: String,
    /// Deposit bookkeeping string.
    pub deposit_status: String,
    /// Reservation window start.
    pub start_date: Option<String>,
    /// Reservation window end.
    pub end_date: Option<String>,
    /// Deposit amount.
    pub deposit_amount: Option<i64>,
    /// Tenant contact details as JSONB.
    pub tenant_info: serde_json::Value,
    /// Payment receipt.
    pub bill_image: Option<String>,
    /// Payment note.
    pub note: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

fn corrupt(what: &str, detail: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(format!("corrupt {what}: {detail}"))
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = StoreError;

    fn try_from(row: AppointmentRow) -> Result<Self, Self::Error> {
        let tenant_info: TenantInfo = serde_json::from_value(row.tenant_info)
            .map_err(|e| corrupt("tenant_info", e))?;
        let deposit_amount = row
            .deposit_amount
            .map(u64::try_from)
            .transpose()
            .map_err(|e| corrupt("deposit_amount", e))?;
        Ok(Self {
            id: AppointmentId::from_uuid(row.id),
            room_id: RoomId::from_uuid(row.room_id),
            room_title: row.room_title,
            room_image: row.room_image,
            tenant_id: UserId::new(row.tenant_id),
            host_id: UserId::new(row.host_id),
            booking_type: row
                .booking_type
                .parse::<BookingType>()
                .map_err(|e| corrupt("booking_type", e))?,
            status: row
                .status
                .parse::<AppointmentStatus>()
                .map_err(|e| corrupt("status", e))?,
            deposit_status: row
                .deposit_status
                .parse::<DepositStatus>()
                .map_err(|e| corrupt("deposit_status", e))?,
            start_date: row.start_date,
            end_date: row.end_date,
            deposit_amount,
            tenant_info,
            bill_image: row.bill_image,
            note: row.note,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// A row from the `rooms` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RoomRow {
    /// Primary key.
    pub id: Uuid,
    /// Owner identifier.
    pub host_id: String,
    /// Display title.
    pub title: String,
    /// Cover image.
    pub image: String,
    /// Monthly price.
    pub price: i64,
    /// Street address.
    pub address: String,
    /// Accommodation kind string.
    pub room_type: String,
    /// Floor area.
    pub area: f64,
    /// Occupant cap.
    pub max_people: Option<i32>,
    /// Amenity labels as a JSONB array.
    pub amenities: serde_json::Value,
    /// Long description.
    pub description: Option<String>,
    /// Open for booking.
    pub available: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<RoomRow> for Room {
    type Error = StoreError;

    fn try_from(row: RoomRow) -> Result<Self, Self::Error> {
        let room_type = RoomType::parse_filter(&row.room_type)
            .ok_or_else(|| corrupt("room_type", &row.room_type))?;
        Ok(Self {
            id: RoomId::from_uuid(row.id),
            host_id: UserId::new(row.host_id),
            title: row.title,
            image: row.image,
            price: u64::try_from(row.price).map_err(|e| corrupt("price", e))?,
            address: row.address,
            room_type,
            area: row.area,
            max_people: row
                .max_people
                .map(u32::try_from)
                .transpose()
                .map_err(|e| corrupt("max_people", e))?,
            amenities: serde_json::from_value(row.amenities)
                .map_err(|e| corrupt("amenities", e))?,
            description: row.description,
            available: row.available,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn row() -> AppointmentRow {
        AppointmentRow {
            id: Uuid::new_v4(),
            room_id: Uuid::new_v4(),
            room_title: "Room".to_string(),
            room_image: String::new(),
            tenant_id: "t".to_string(),
            host_id: "h".to_string(),
            booking_type: "DEPOSIT".to_string(),
            status: "waiting_deposit".to_string(),
            deposit_status: "unpaid".to_string(),
            start_date: Some("01/01/2026".to_string()),
            end_date: Some("01/06/2026".to_string()),
            deposit_amount: Some(5_000_000),
            tenant_info: serde_json::json!({
                "full_name": "Ngo F",
                "phone_number": "0944444444"
            }),
            bill_image: None,
            note: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn row_converts_to_appointment() {
        let Ok(appt) = Appointment::try_from(row()) else {
            panic!("conversion failed");
        };
        assert_eq!(appt.status, AppointmentStatus::WaitingDeposit);
        assert_eq!(appt.deposit_amount, Some(5_000_000));
        assert_eq!(appt.tenant_info.full_name, "Ngo F");
    }

    #[test]
    fn unknown_status_is_rejected() {
        let mut bad = row();
        bad.status = "approved".to_string();
        assert!(matches!(
            Appointment::try_from(bad),
            Err(StoreError::Backend(_))
        ));
    }

    #[test]
    fn negative_amount_is_rejected() {
        let mut bad = row();
        bad.deposit_amount = Some(-1);
        assert!(Appointment::try_from(bad).is_err());
    }
}
