//! Per-user key sets of room ids: favorites, history, compare.
//!
//! No lifecycle and no link to appointments. Each key only differs in
//! what `toggle` does:
//!
//! - favorites: plain membership flip;
//! - history: move to front, truncate to the history limit, never removes;
//! - compare: membership flip, but insertion is refused at the cap.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::RoomId;

/// Default number of rooms kept in history.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Default number of rooms that can be compared at once.
pub const DEFAULT_COMPARE_LIMIT: usize = 4;

/// Which preference set an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceKey {
    /// Saved rooms.
    Favorites,
    /// Recently viewed rooms, newest first.
    History,
    /// Rooms selected for side-by-side comparison.
    Compare,
}

impl fmt::Display for PreferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Favorites => "favorites",
            Self::History => "history",
            Self::Compare => "compare",
        };
        f.write_str(s)
    }
}

impl FromStr for PreferenceKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "favorites" => Ok(Self::Favorites),
            "history" => Ok(Self::History),
            "compare" => Ok(Self::Compare),
            other => Err(format!("unknown preference key: {other}")),
        }
    }
}

/// Result of a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    /// The id is now in the set.
    Added,
    /// The id was removed.
    Removed,
    /// The id was already present and moved to the front.
    MovedToFront,
    /// The set is full; nothing changed. A warning, not an error.
    LimitReached,
}

/// Caps applied to the bounded keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreferenceLimits {
    /// Maximum history length.
    pub history: usize,
    /// Maximum compare set size.
    pub compare: usize,
}

impl Default for PreferenceLimits {
    fn default() -> Self {
        Self {
            history: DEFAULT_HISTORY_LIMIT,
            compare: DEFAULT_COMPARE_LIMIT,
        }
    }
}

/// Ordered set of room ids under one key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceSet {
    items: Vec<RoomId>,
}

impl PreferenceSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `id` is in the set.
    #[must_use]
    pub fn contains(&self, id: RoomId) -> bool {
        self.items.contains(&id)
    }

    /// The ids in stored order.
    #[must_use]
    pub fn items(&self) -> &[RoomId] {
        &self.items
    }

    /// Empties the set.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Applies the key-specific toggle rule.
    pub fn toggle(&mut self, key: PreferenceKey, id: RoomId, limits: PreferenceLimits) -> ToggleOutcome {
        match key {
            PreferenceKey::Favorites => self.flip(id, None),
            PreferenceKey::Compare => self.flip(id, Some(limits.compare)),
            PreferenceKey::History => self.touch(id, limits.history),
        }
    }

    fn flip(&mut self, id: RoomId, cap: Option<usize>) -> ToggleOutcome {
        if let Some(pos) = self.items.iter().position(|x| *x == id) {
            self.items.remove(pos);
            return ToggleOutcome::Removed;
        }
        if cap.is_some_and(|cap| self.items.len() >= cap) {
            return ToggleOutcome::LimitReached;
        }
        self.items.push(id);
        ToggleOutcome::Added
    }

    fn touch(&mut self, id: RoomId, cap: usize) -> ToggleOutcome {
        let outcome = match self.items.iter().position(|x| *x == id) {
            Some(pos) => {
                self.items.remove(pos);
                ToggleOutcome::MovedToFront
            }
            None => ToggleOutcome::Added,
        };
        self.items.insert(0, id);
        self.items.truncate(cap);
        outcome
    }
}
