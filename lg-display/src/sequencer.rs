//! Input/power sequencing
//!
//! Switching commands (input selection and friends) are only accepted by a
//! display that is fully on. Requests made while it is off, cooling down or
//! still warming up are parked in a single slot and replayed once warm-up
//! completes. The slot holds at most one action; a newer request replaces
//! an older one.

use lg_protocol::Command;

use crate::state::PowerState;

/// What to do with a switching request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchDecision {
    /// The display is on; send immediately
    SendNow(Command),
    /// Parked until warm-up completes
    Deferred {
        /// Power-on must be initiated first
        power_on: bool,
        /// Earlier action that this request displaced
        replaced: Option<Command>,
    },
}

/// Single-slot holder for deferred switching actions
#[derive(Debug, Default)]
pub struct PowerSequencer {
    pending: Option<Command>,
}

impl PowerSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, power: PowerState, action: Command) -> SwitchDecision {
        match power {
            PowerState::On => SwitchDecision::SendNow(action),
            PowerState::WarmingUp => SwitchDecision::Deferred {
                power_on: false,
                replaced: self.pending.replace(action),
            },
            PowerState::Off | PowerState::CoolingDown => SwitchDecision::Deferred {
                power_on: true,
                replaced: self.pending.replace(action),
            },
        }
    }

    /// Remove the parked action for execution after warm-up
    pub fn take_pending(&mut self) -> Option<Command> {
        self.pending.take()
    }

    /// Drop the parked action on power-off
    pub fn discard(&mut self) -> Option<Command> {
        let dropped = self.pending.take();
        if let Some(command) = &dropped {
            tracing::debug!("Discarding deferred {:?} command", command.kind);
        }
        dropped
    }

    /// Put back the slot as it was before a request that could not be honoured
    pub fn restore(&mut self, previous: Option<Command>) {
        self.pending = previous;
    }

    pub fn pending(&self) -> Option<&Command> {
        self.pending.as_ref()
    }
}
