//! Service layer: business logic orchestration.
//!
//! [`AppointmentService`] runs the booking lifecycle and emits events
//! through the [`super::domain::EventBus`]; [`RoomService`] and
//! [`PreferenceService`] cover the catalog and the per-user key sets.

pub mod appointment_service;
pub mod feed;
pub mod preference_service;
pub mod room_service;

pub use appointment_service::{AppointmentService, BookingRequest, TransitionOutcome};
pub use feed::{ParticipantFeed, Snapshot, SubscriptionHandle};
pub use preference_service::PreferenceService;
pub use room_service::RoomService;
