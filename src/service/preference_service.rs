//! Per-user preference sets kept in process memory.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::domain::{PreferenceKey, PreferenceLimits, PreferenceSet, RoomId, ToggleOutcome, UserId};

/// Favorites, history and compare sets for every user.
#[derive(Debug, Default)]
pub struct PreferenceService {
    sets: RwLock<HashMap<(UserId, PreferenceKey), PreferenceSet>>,
    limits: PreferenceLimits,
}

impl PreferenceService {
    /// Creates an empty store with the given caps.
    #[must_use]
    pub fn new(limits: PreferenceLimits) -> Self {
        Self {
            sets: RwLock::default(),
            limits,
        }
    }

    /// The ids stored under `key`, in stored order.
    pub async fn list(&self, user: &UserId, key: PreferenceKey) -> Vec<RoomId> {
        self.sets
            .read()
            .await
            .get(&(user.clone(), key))
            .map(|set| set.items().to_vec())
            .unwrap_or_default()
    }

    /// Returns `true` if `id` is stored under `key`.
    pub async fn contains(&self, user: &UserId, key: PreferenceKey, id: RoomId) -> bool {
        self.sets
            .read()
            .await
            .get(&(user.clone(), key))
            .is_some_and(|set| set.contains(id))
    }

    /// Applies the key's toggle rule and returns the outcome with the
    /// resulting set.
    pub async fn toggle(
        &self,
        user: &UserId,
        key: PreferenceKey,
        id: RoomId,
    ) -> (ToggleOutcome, Vec<RoomId>) {
        let mut sets = self.sets.write().await;
        let set = sets.entry((user.clone(), key)).or_default();
        let outcome = set.toggle(key, id, self.limits);
        if outcome == ToggleOutcome::LimitReached {
            tracing::debug!(%user, %key, room_id = %id, "preference set is full");
        }
        (outcome, set.items().to_vec())
    }

    /// Empties the set under `key`.
    pub async fn clear(&self, user: &UserId, key: PreferenceKey) {
        if let Some(set) = self.sets.write().await.get_mut(&(user.clone(), key)) {
            set.clear();
        }
    }
}
