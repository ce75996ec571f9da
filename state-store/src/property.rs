//! Property trait for typed, observable feedback values
//!
//! A property is one observable field of a device: power, mute, the current
//! volume level and so on. Each property type carries a stable key that
//! subscribers use to tell change notifications apart.
//!
//! # Example
//!
//! ```rust
//! use state_store::Property;
//!
//! #[derive(Clone, PartialEq, Debug)]
//! pub struct PowerOn(pub bool);
//!
//! impl Property for PowerOn {
//!     const KEY: &'static str = "power_on";
//! }
//! ```

/// Marker trait for values that can be stored and observed
///
/// `PartialEq` drives change detection: storing a value equal to the
/// current one is not a change and produces no notification.
pub trait Property: Clone + Send + Sync + PartialEq + 'static {
    /// Key identifying this property in change notifications
    const KEY: &'static str;
}
