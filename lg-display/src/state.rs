//! Device state model
//!
//! `DisplayState` is the driver's belief about the display, updated from
//! acknowledgements and timers. It is plain data; the device owns it behind
//! a lock and publishes changes to the feedback store.

/// Power lifecycle derived from the power, warming and cooling flags
///
/// ```text
///            power on                warm-up timer
///   Off ─────────────────► WarmingUp ─────────────► On
///    ▲                        │  ▲                   │
///    │ cool-down timer        │  │ power on          │ power off
///    │                        ▼  │                   │
///    └───────────────────── CoolingDown ◄────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerState {
    Off,
    WarmingUp,
    On,
    CoolingDown,
}

impl PowerState {
    /// Whether a switching command can be sent right away
    pub fn accepts_commands(&self) -> bool {
        *self == PowerState::On
    }
}

/// Last known state of the display
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayState {
    pub power_on: bool,
    pub warming_up: bool,
    pub cooling_down: bool,
    pub muted: bool,
    pub video_muted: bool,
    /// Last reported volume on the external 0-65535 range
    pub volume: u16,
    /// Volume the ramp steps from; follows feedback unless a ramp is active
    pub last_volume_sent: u16,
    /// 0-based position of the selected input in the input list
    pub current_input: Option<usize>,
    /// Raw token of the last input report
    pub current_item: Option<String>,
    /// Selection flag per input, same order as the input list
    pub input_selected: Vec<bool>,
}

impl DisplayState {
    pub fn new(input_count: usize) -> Self {
        Self {
            input_selected: vec![false; input_count],
            ..Default::default()
        }
    }

    pub fn power_state(&self) -> PowerState {
        match (self.power_on, self.warming_up, self.cooling_down) {
            (true, true, _) => PowerState::WarmingUp,
            (true, false, _) => PowerState::On,
            (false, _, true) => PowerState::CoolingDown,
            (false, _, false) => PowerState::Off,
        }
    }

    /// 1-based input number, 0 when no known input is selected
    pub fn input_number(&self) -> u16 {
        self.current_input
            .map(|index| u16::try_from(index + 1).unwrap_or(u16::MAX))
            .unwrap_or(0)
    }

    /// Mark one input selected and every other one deselected
    ///
    /// Returns false when the input was already the selected one.
    pub fn select_input(&mut self, index: usize) -> bool {
        if self.current_input == Some(index) {
            return false;
        }
        self.current_input = Some(index);
        for (position, selected) in self.input_selected.iter_mut().enumerate() {
            *selected = position == index;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(false, false, false, PowerState::Off)]
    #[case(true, true, false, PowerState::WarmingUp)]
    #[case(true, false, false, PowerState::On)]
    #[case(false, false, true, PowerState::CoolingDown)]
    fn test_power_state(
        #[case] power_on: bool,
        #[case] warming_up: bool,
        #[case] cooling_down: bool,
        #[case] expected: PowerState,
    ) {
        let state = DisplayState {
            power_on,
            warming_up,
            cooling_down,
            ..DisplayState::new(4)
        };
        assert_eq!(state.power_state(), expected);
        assert_eq!(state.power_state().accepts_commands(), expected == PowerState::On);
    }

    #[test]
    fn test_select_input_keeps_single_selection() {
        let mut state = DisplayState::new(4);
        assert_eq!(state.input_number(), 0);

        assert!(state.select_input(1));
        assert_eq!(state.input_selected, vec![false, true, false, false]);
        assert_eq!(state.input_number(), 2);

        assert!(!state.select_input(1));
        assert!(state.select_input(3));
        assert_eq!(state.input_selected, vec![false, false, false, true]);
    }
}
