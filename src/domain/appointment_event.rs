//! Domain events reflecting appointment mutations.
//!
//! Every create or applied transition emits an [`AppointmentEvent`]
//! through the [`super::EventBus`]. Participant feeds and WebSocket
//! connections filter on [`AppointmentEvent::involves`].

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{AppointmentId, AppointmentStatus, BookingType, TransitionEvent, UserId};

/// Domain event emitted after every appointment mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AppointmentEvent {
    /// Emitted when a booking is created.
    AppointmentCreated {
        /// Appointment identifier.
        appointment_id: AppointmentId,
        /// Requesting tenant.
        tenant_id: UserId,
        /// Room owner.
        host_id: UserId,
        /// Booking type.
        booking_type: BookingType,
        /// Creation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted after a transition is written.
    StatusChanged {
        /// Appointment identifier.
        appointment_id: AppointmentId,
        /// Requesting tenant.
        tenant_id: UserId,
        /// Room owner.
        host_id: UserId,
        /// Status before the write.
        from: AppointmentStatus,
        /// Status after the write.
        to: AppointmentStatus,
        /// Which edge was taken.
        event: TransitionEvent,
        /// Actor that triggered it.
        actor: UserId,
        /// Write timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl AppointmentEvent {
    /// Returns the appointment ID associated with this event.
    #[must_use]
    pub fn appointment_id(&self) -> AppointmentId {
        match self {
            Self::AppointmentCreated { appointment_id, .. }
            | Self::StatusChanged { appointment_id, .. } => *appointment_id,
        }
    }

    /// Returns `true` if `user` is the tenant or host of the affected record.
    #[must_use]
    pub fn involves(&self, user: &UserId) -> bool {
        match self {
            Self::AppointmentCreated {
                tenant_id, host_id, ..
            }
            | Self::StatusChanged {
                tenant_id, host_id, ..
            } => tenant_id == user || host_id == user,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::AppointmentCreated { .. } => "appointment_created",
            Self::StatusChanged { .. } => "status_changed",
        }
    }
}
