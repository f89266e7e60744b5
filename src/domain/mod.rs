//! Domain layer: appointment lifecycle, rooms, preferences, and events.
//!
//! This module contains the server-side domain model: typed identifiers,
//! the appointment record with its role-gated transition table, room
//! listings and catalog filters, per-user preference sets, deposit
//! payment links, and the event bus used to fan out changes.

pub mod appointment;
pub mod appointment_event;
pub mod deposit;
pub mod event_bus;
pub mod ids;
pub mod lifecycle;
pub mod preferences;
pub mod room;

pub use appointment::{
    Appointment, AppointmentStatus, BookingType, DepositStatus, NewAppointment, TenantInfo,
};
pub use appointment_event::AppointmentEvent;
pub use deposit::{DepositQr, PaymentAccount};
pub use event_bus::EventBus;
pub use ids::{AppointmentId, RoomId, UserId};
pub use lifecycle::{PaymentEvidence, Role, StatusPatch, TransitionEvent, TransitionPlan};
pub use preferences::{PreferenceKey, PreferenceLimits, PreferenceSet, ToggleOutcome};
pub use room::{NewRoom, Room, RoomFilter, RoomPatch, RoomType};
