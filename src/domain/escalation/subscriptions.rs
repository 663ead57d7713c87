use std::collections::BTreeSet;

use crate::domain::foundation::EntityId;

/// Entity ids the client has declared interest in.
///
/// Kept in sorted order so replay after a reconnect is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionSet {
    ids: BTreeSet<EntityId>,
}

impl SubscriptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the id was not already present.
    pub fn insert(&mut self, id: EntityId) -> bool {
        self.ids.insert(id)
    }

    /// Returns true if the id was present.
    pub fn remove(&mut self, id: &EntityId) -> bool {
        self.ids.remove(id)
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityId> {
        self.ids.iter()
    }
}
