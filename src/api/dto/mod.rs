//! Data Transfer Objects for REST request/response serialization.
//!
//! Domain records are serialized as-is; these types only add request
//! shapes, list envelopes and per-caller views.

pub mod appointment_dto;
pub mod common_dto;
pub mod preference_dto;
pub mod room_dto;

pub use appointment_dto::*;
pub use common_dto::*;
pub use preference_dto::*;
pub use room_dto::*;
