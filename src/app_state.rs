//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::domain::EventBus;
use crate::identity::{HeaderIdentityProvider, IdentityProvider};
use crate::persistence::{
    AppointmentStore, InMemoryAppointmentStore, InMemoryRoomCatalog, RoomCatalog,
};
use crate::service::{AppointmentService, PreferenceService, RoomService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Booking lifecycle.
    pub appointments: Arc<AppointmentService>,
    /// Room catalog.
    pub rooms: Arc<RoomService>,
    /// Per-user preference sets.
    pub preferences: Arc<PreferenceService>,
    /// Resolves the caller of each request.
    pub identity: Arc<dyn IdentityProvider>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}

impl AppState {
    /// Wires the services over the given stores.
    #[must_use]
    pub fn new(
        config: &GatewayConfig,
        store: Arc<dyn AppointmentStore>,
        catalog: Arc<dyn RoomCatalog>,
    ) -> Self {
        let event_bus = EventBus::new(config.event_bus_capacity);
        let appointments = AppointmentService::new(
            store,
            Arc::clone(&catalog),
            event_bus.clone(),
            config.payment_account.clone(),
        );
        Self {
            appointments: Arc::new(appointments),
            rooms: Arc::new(RoomService::new(catalog)),
            preferences: Arc::new(PreferenceService::new(config.preference_limits)),
            identity: Arc::new(HeaderIdentityProvider::new(config.identity_headers.clone())),
            event_bus,
        }
    }

    /// State backed by the in-memory stores.
    #[must_use]
    pub fn in_memory(config: &GatewayConfig) -> Self {
        Self::new(
            config,
            Arc::new(InMemoryAppointmentStore::new()),
            Arc::new(InMemoryRoomCatalog::new()),
        )
    }
}
