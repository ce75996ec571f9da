//! Feedback properties published by the driver
//!
//! Every value a control surface can observe is a `Property` stored in a
//! `StateStore<FeedbackTarget>`. Device-wide values live on
//! `FeedbackTarget::Device`; per-input values live on
//! `FeedbackTarget::Input(n)` with `n` the 1-based input number.

use serde::{Deserialize, Serialize};

pub use state_store::Property;

use crate::monitor::MonitorStatus;

/// Entity a feedback value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeedbackTarget {
    Device,
    /// 1-based input number
    Input(usize),
}

/// Which kind of entity a property is stored on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Device,
    Input,
}

/// Extension trait recording where a property lives
pub trait FeedbackProperty: Property {
    const SCOPE: Scope;
}

macro_rules! feedback_property {
    ($(#[$meta:meta])* $name:ident($ty:ty), $key:literal, $scope:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $name(pub $ty);

        impl Property for $name {
            const KEY: &'static str = $key;
        }

        impl FeedbackProperty for $name {
            const SCOPE: Scope = Scope::$scope;
        }
    };
}

// ============================================================================
// Device-scoped properties
// ============================================================================

feedback_property!(PowerOn(bool), "power_on", Device);
feedback_property!(
    /// True from power-on until the warm-up timer expires
    WarmingUp(bool),
    "warming_up",
    Device
);
feedback_property!(
    /// True from power-off feedback until the cool-down timer expires
    CoolingDown(bool),
    "cooling_down",
    Device
);
feedback_property!(Muted(bool), "mute", Device);
feedback_property!(VideoMuted(bool), "video_mute", Device);
feedback_property!(
    /// Volume on the external 0-65535 range
    VolumeLevel(u16),
    "volume",
    Device
);
feedback_property!(
    /// Key of the selected input, empty when unknown
    CurrentInput(String),
    "current_input",
    Device
);
feedback_property!(
    /// 1-based number of the selected input, 0 when unknown
    InputNumber(u16),
    "input_number",
    Device
);
feedback_property!(
    /// Raw input token last reported by the display
    CurrentItem(String),
    "current_item",
    Device
);
feedback_property!(Online(bool), "online", Device);
feedback_property!(CommunicationStatus(MonitorStatus), "communication_status", Device);

// ============================================================================
// Input-scoped properties
// ============================================================================

feedback_property!(InputSelected(bool), "input_selected", Input);
feedback_property!(InputName(String), "input_name", Input);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_unique() {
        let keys = [
            PowerOn::KEY,
            WarmingUp::KEY,
            CoolingDown::KEY,
            Muted::KEY,
            VideoMuted::KEY,
            VolumeLevel::KEY,
            CurrentInput::KEY,
            InputNumber::KEY,
            CurrentItem::KEY,
            Online::KEY,
            CommunicationStatus::KEY,
            InputSelected::KEY,
            InputName::KEY,
        ];
        let unique: std::collections::HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());
    }

    #[test]
    fn test_scopes() {
        assert_eq!(PowerOn::SCOPE, Scope::Device);
        assert_eq!(InputSelected::SCOPE, Scope::Input);
        assert_eq!(InputName::SCOPE, Scope::Input);
    }
}
