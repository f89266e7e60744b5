//! Per-connection subscription manager.
//!
//! Tracks whether a WebSocket client follows its participant list and
//! which single appointments it watches, and decides what an incoming
//! event should trigger.

use std::collections::HashSet;

use crate::domain::{AppointmentEvent, AppointmentId, UserId};

/// What to push to the client after an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Interest {
    /// Re-send the full participant list.
    pub list: bool,
    /// Re-send the changed record.
    pub record: bool,
}

/// Subscription state of a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Whether the participant list feed is on.
    feed: bool,
    /// Individually watched appointments.
    watched: HashSet<AppointmentId>,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Turns the participant list feed on.
    pub fn subscribe_feed(&mut self) {
        self.feed = true;
    }

    /// Turns the participant list feed off.
    pub fn unsubscribe_feed(&mut self) {
        self.feed = false;
    }

    /// Returns `true` if the participant list feed is on.
    #[must_use]
    pub fn feed_active(&self) -> bool {
        self.feed
    }

    /// Adds one appointment to the watch set.
    pub fn watch(&mut self, id: AppointmentId) {
        self.watched.insert(id);
    }

    /// Removes appointments from the watch set.
    pub fn unwatch(&mut self, ids: &[AppointmentId]) {
        for id in ids {
            self.watched.remove(id);
        }
    }

    /// Watched appointment ids.
    pub fn watched(&self) -> impl Iterator<Item = AppointmentId> + '_ {
        self.watched.iter().copied()
    }

    /// Returns the number of watched appointments.
    #[must_use]
    pub fn watched_count(&self) -> usize {
        self.watched.len()
    }

    /// What `event` should trigger for a connection owned by `user`.
    #[must_use]
    pub fn interest(&self, event: &AppointmentEvent, user: &UserId) -> Interest {
        Interest {
            list: self.feed && event.involves(user),
            record: self.watched.contains(&event.appointment_id()),
        }
    }
}
