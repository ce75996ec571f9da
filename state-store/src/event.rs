//! Change notifications
//!
//! A `ChangeEvent` names the entity and property that changed, not the
//! value. Subscribers read the current value back from the store.

use std::time::Instant;

/// Why a notification was emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// The stored value differs from the previous one
    Changed,
    /// Emitted unconditionally, e.g. to refresh a reconnected surface
    Refreshed,
}

/// A notification for one subscribed property
///
/// # Example
///
/// ```rust,ignore
/// for event in store.iter().try_iter() {
///     if event.property_key == PowerOn::KEY {
///         let power = store.get::<PowerOn>(&event.entity_id);
///         println!("power is now {:?}", power);
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ChangeEvent<Id> {
    /// The entity whose property was notified
    pub entity_id: Id,

    /// Matches `Property::KEY` of the notified property
    pub property_key: &'static str,

    pub kind: ChangeKind,

    /// When the notification was emitted
    pub timestamp: Instant,
}

impl<Id> ChangeEvent<Id> {
    pub fn new(entity_id: Id, property_key: &'static str, kind: ChangeKind) -> Self {
        Self {
            entity_id,
            property_key,
            kind,
            timestamp: Instant::now(),
        }
    }

    pub fn changed(entity_id: Id, property_key: &'static str) -> Self {
        Self::new(entity_id, property_key, ChangeKind::Changed)
    }

    pub fn refreshed(entity_id: Id, property_key: &'static str) -> Self {
        Self::new(entity_id, property_key, ChangeKind::Refreshed)
    }
}

impl<Id: PartialEq> PartialEq for ChangeEvent<Id> {
    fn eq(&self, other: &Self) -> bool {
        // Timestamp not included in equality
        self.entity_id == other.entity_id
            && self.property_key == other.property_key
            && self.kind == other.kind
    }
}
