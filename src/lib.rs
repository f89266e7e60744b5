//! # rental-gateway
//!
//! REST API and WebSocket gateway for a room-rental marketplace.
//!
//! Tenants book viewings or pay deposits on rooms; hosts approve, reject,
//! and confirm them. The core is the appointment lifecycle: a role-gated
//! transition table applied with a conditional write, so each edge is
//! taken at most once. Room listings, caller identity and per-user
//! preference sets sit behind their own seams.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     ├── Session extractor (identity)
//!     │
//!     ├── AppointmentService / RoomService / PreferenceService (service/)
//!     ├── Transition table, EventBus (domain/)
//!     │
//!     └── AppointmentStore / RoomCatalog (persistence/)
//!           ├── in-memory
//!           └── PostgreSQL
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod identity;
pub mod persistence;
pub mod service;
pub mod ws;
