//! Observable feedback state
//!
//! A small, generic store for the values a device driver reports to the
//! outside world, with change detection and subscriptions.
//!
//! # Features
//!
//! - **Type-safe storage**: one strongly-typed value per property per entity
//! - **Change detection**: `set` only notifies when the value actually changes
//! - **Unconditional publish**: `publish`/`refresh` for surfaces that need a
//!   full re-send (e.g. after reconnecting)
//! - **Subscriptions**: only subscribed properties produce notifications
//! - **Iteration**: blocking or draining iteration over notifications
//!
//! # Architecture
//!
//! ```text
//! StateStore<Id>
//!     │
//!     ├── entities: HashMap<Id, PropertyBag>
//!     │       │
//!     │       └── PropertyBag: HashMap<TypeId, Box<dyn Any>>
//!     │
//!     ├── subscriptions: HashSet<(Id, property_key)>
//!     │
//!     └── event_channel: mpsc::channel<ChangeEvent<Id>>
//!             │
//!             └── ChangeIterator<Id>
//! ```

pub mod event;
pub mod iter;
pub mod property;
pub mod store;

pub use event::{ChangeEvent, ChangeKind};
pub use iter::{ChangeIterator, TryIter};
pub use property::Property;
pub use store::{PropertyBag, StateStore};
