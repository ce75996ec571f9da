//! Type-erased feedback storage
//!
//! - `PropertyBag`: the properties of a single entity, keyed by type
//! - `StateStore<Id>`: entities plus the subscription set and notification
//!   channel

use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::{mpsc, Arc, Mutex, RwLock};

use crate::event::{ChangeEvent, ChangeKind};
use crate::iter::ChangeIterator;
use crate::property::Property;

// ============================================================================
// PropertyBag - type-erased property storage for a single entity
// ============================================================================

/// Type-erased storage for one entity's properties
///
/// ```rust,ignore
/// let mut bag = PropertyBag::new();
/// assert!(bag.set(Muted(true)));   // new value
/// assert!(!bag.set(Muted(true)));  // same value, no change
/// assert_eq!(bag.get::<Muted>(), Some(Muted(true)));
/// ```
pub struct PropertyBag {
    values: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    pub fn get<P: Property>(&self) -> Option<P> {
        self.values
            .get(&TypeId::of::<P>())
            .and_then(|boxed| boxed.downcast_ref::<P>())
            .cloned()
    }

    /// Store a value, returning whether it differs from the previous one
    pub fn set<P: Property>(&mut self, value: P) -> bool {
        let type_id = TypeId::of::<P>();
        let current = self
            .values
            .get(&type_id)
            .and_then(|boxed| boxed.downcast_ref::<P>());

        if current != Some(&value) {
            self.values.insert(type_id, Box::new(value));
            true
        } else {
            false
        }
    }

    pub fn contains<P: Property>(&self) -> bool {
        self.values.contains_key(&TypeId::of::<P>())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Default for PropertyBag {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PropertyBag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyBag")
            .field("property_count", &self.values.len())
            .finish()
    }
}

// ============================================================================
// StateStore<Id> - observable feedback for a set of entities
// ============================================================================

/// Feedback store with change detection and subscriptions
///
/// Notifications are only emitted for `(entity, property)` pairs that have
/// been subscribed. `set` notifies on change only; `publish` and `refresh`
/// notify unconditionally.
///
/// Clones share the same storage and notification channel.
///
/// # Example
///
/// ```rust
/// use state_store::{Property, StateStore};
///
/// #[derive(Clone, PartialEq, Debug)]
/// struct Muted(bool);
///
/// impl Property for Muted {
///     const KEY: &'static str = "muted";
/// }
///
/// let store = StateStore::<&'static str>::new();
/// store.subscribe("display", Muted::KEY);
///
/// assert!(store.set(&"display", Muted(true)));
/// assert!(!store.set(&"display", Muted(true)));
///
/// assert_eq!(store.iter().try_iter().count(), 1);
/// assert_eq!(store.get::<Muted>(&"display"), Some(Muted(true)));
/// ```
pub struct StateStore<Id>
where
    Id: Clone + Eq + Hash + Send + Sync + 'static,
{
    entities: Arc<RwLock<HashMap<Id, PropertyBag>>>,

    /// Subscribed (entity_id, property_key) pairs
    subscriptions: Arc<RwLock<HashSet<(Id, &'static str)>>>,

    event_tx: mpsc::Sender<ChangeEvent<Id>>,

    event_rx: Arc<Mutex<mpsc::Receiver<ChangeEvent<Id>>>>,
}

impl<Id> StateStore<Id>
where
    Id: Clone + Eq + Hash + Send + Sync + 'static,
{
    pub fn new() -> Self {
        let (event_tx, event_rx) = mpsc::channel();

        Self {
            entities: Arc::new(RwLock::new(HashMap::new())),
            subscriptions: Arc::new(RwLock::new(HashSet::new())),
            event_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        }
    }

    /// Current value of a property, `None` if never set
    pub fn get<P: Property>(&self, entity_id: &Id) -> Option<P> {
        let entities = self.entities.read().ok()?;
        entities.get(entity_id)?.get::<P>()
    }

    /// Store a value and notify subscribers if it changed
    ///
    /// Returns whether the value changed.
    pub fn set<P: Property>(&self, entity_id: &Id, value: P) -> bool {
        let changed = self.store(entity_id, value);
        if changed {
            self.emit(entity_id, P::KEY, ChangeKind::Changed);
        }
        changed
    }

    /// Store a value and notify subscribers whether or not it changed
    pub fn publish<P: Property>(&self, entity_id: &Id, value: P) -> bool {
        let changed = self.store(entity_id, value);
        let kind = if changed {
            ChangeKind::Changed
        } else {
            ChangeKind::Refreshed
        };
        self.emit(entity_id, P::KEY, kind);
        changed
    }

    /// Re-notify subscribers of the current value, if one is set
    pub fn refresh<P: Property>(&self, entity_id: &Id) {
        let present = self
            .entities
            .read()
            .map(|e| e.get(entity_id).map(|bag| bag.contains::<P>()).unwrap_or(false))
            .unwrap_or(false);

        if present {
            self.emit(entity_id, P::KEY, ChangeKind::Refreshed);
        }
    }

    /// Register interest in a property
    pub fn subscribe(&self, entity_id: Id, property_key: &'static str) {
        if let Ok(mut subscriptions) = self.subscriptions.write() {
            subscriptions.insert((entity_id, property_key));
        }
    }

    pub fn unsubscribe(&self, entity_id: &Id, property_key: &'static str) {
        if let Ok(mut subscriptions) = self.subscriptions.write() {
            subscriptions.remove(&(entity_id.clone(), property_key));
        }
    }

    pub fn is_subscribed(&self, entity_id: &Id, property_key: &'static str) -> bool {
        self.subscriptions
            .read()
            .map(|s| s.contains(&(entity_id.clone(), property_key)))
            .unwrap_or(false)
    }

    /// Iterator over notifications for subscribed properties
    pub fn iter(&self) -> ChangeIterator<Id> {
        ChangeIterator::new(Arc::clone(&self.event_rx))
    }

    pub fn entity_count(&self) -> usize {
        self.entities.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn entity_ids(&self) -> Vec<Id> {
        self.entities
            .read()
            .map(|e| e.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn store<P: Property>(&self, entity_id: &Id, value: P) -> bool {
        match self.entities.write() {
            Ok(mut entities) => entities
                .entry(entity_id.clone())
                .or_insert_with(PropertyBag::new)
                .set(value),
            Err(_) => false,
        }
    }

    fn emit(&self, entity_id: &Id, property_key: &'static str, kind: ChangeKind) {
        if self.is_subscribed(entity_id, property_key) {
            let _ = self
                .event_tx
                .send(ChangeEvent::new(entity_id.clone(), property_key, kind));
        }
    }
}

impl<Id> Default for StateStore<Id>
where
    Id: Clone + Eq + Hash + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<Id> Clone for StateStore<Id>
where
    Id: Clone + Eq + Hash + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            entities: Arc::clone(&self.entities),
            subscriptions: Arc::clone(&self.subscriptions),
            event_tx: self.event_tx.clone(),
            event_rx: Arc::clone(&self.event_rx),
        }
    }
}

impl<Id> std::fmt::Debug for StateStore<Id>
where
    Id: Clone + Eq + Hash + Send + Sync + std::fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("entity_count", &self.entity_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Debug)]
    struct PowerOn(bool);

    impl Property for PowerOn {
        const KEY: &'static str = "power_on";
    }

    #[derive(Clone, PartialEq, Debug)]
    struct CurrentInput(String);

    impl Property for CurrentInput {
        const KEY: &'static str = "current_input";
    }

    const DISPLAY: &str = "display";

    #[test]
    fn test_property_bag_change_detection() {
        let mut bag = PropertyBag::new();
        assert!(bag.is_empty());

        assert!(bag.set(PowerOn(true)));
        assert!(!bag.set(PowerOn(true)));
        assert!(bag.set(PowerOn(false)));

        bag.set(CurrentInput("hdmiIn1".to_string()));
        assert_eq!(bag.len(), 2);
        assert_eq!(bag.get::<PowerOn>(), Some(PowerOn(false)));
        assert_eq!(
            bag.get::<CurrentInput>(),
            Some(CurrentInput("hdmiIn1".to_string()))
        );
    }

    #[test]
    fn test_set_notifies_only_subscribed_changes() {
        let store = StateStore::<&'static str>::new();
        let events = store.iter();

        store.set(&DISPLAY, PowerOn(true));
        assert!(events.try_recv().is_none());

        store.subscribe(DISPLAY, PowerOn::KEY);
        store.set(&DISPLAY, PowerOn(false));
        store.set(&DISPLAY, PowerOn(false));

        let received: Vec<_> = events.try_iter().collect();
        assert_eq!(received, vec![ChangeEvent::changed(DISPLAY, PowerOn::KEY)]);
    }

    #[test]
    fn test_publish_notifies_unconditionally() {
        let store = StateStore::<&'static str>::new();
        store.subscribe(DISPLAY, PowerOn::KEY);

        assert!(store.publish(&DISPLAY, PowerOn(true)));
        assert!(!store.publish(&DISPLAY, PowerOn(true)));

        let received: Vec<_> = store.iter().try_iter().collect();
        assert_eq!(
            received,
            vec![
                ChangeEvent::changed(DISPLAY, PowerOn::KEY),
                ChangeEvent::refreshed(DISPLAY, PowerOn::KEY),
            ]
        );
    }

    #[test]
    fn test_refresh_requires_value() {
        let store = StateStore::<&'static str>::new();
        store.subscribe(DISPLAY, PowerOn::KEY);

        store.refresh::<PowerOn>(&DISPLAY);
        assert!(store.iter().try_recv().is_none());

        store.set(&DISPLAY, PowerOn(true));
        store.refresh::<PowerOn>(&DISPLAY);
        let kinds: Vec<_> = store.iter().try_iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ChangeKind::Changed, ChangeKind::Refreshed]);
    }

    #[test]
    fn test_unsubscribe() {
        let store = StateStore::<&'static str>::new();
        store.subscribe(DISPLAY, PowerOn::KEY);
        assert!(store.is_subscribed(&DISPLAY, PowerOn::KEY));

        store.unsubscribe(&DISPLAY, PowerOn::KEY);
        assert!(!store.is_subscribed(&DISPLAY, PowerOn::KEY));
        store.set(&DISPLAY, PowerOn(true));
        assert!(store.iter().try_recv().is_none());
    }

    #[test]
    fn test_clone_shares_state() {
        let store = StateStore::<&'static str>::new();
        let cloned = store.clone();

        store.set(&DISPLAY, PowerOn(true));
        assert_eq!(cloned.get::<PowerOn>(&DISPLAY), Some(PowerOn(true)));
        assert_eq!(cloned.entity_ids(), vec![DISPLAY]);
    }
}
