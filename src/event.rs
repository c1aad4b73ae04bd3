// MIT License - Copyright (c) 2026 Peter Wright
// AlarmDecoder protocol

use crate::message::KeypadFlags;
use crate::state::ArmState;

/// Changes reported by [`PanelState::apply`](crate::PanelState::apply).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEvent {
    /// Derived arm state changed. `old` is `None` for the first message.
    ArmStateChanged {
        old: Option<ArmState>,
        new: ArmState,
    },
    /// Keypad status flags changed since the previous message
    FlagsChanged {
        old: KeypadFlags,
        new: KeypadFlags,
        changed: KeypadFlags,
    },
    /// Zone reported while the panel was not ready
    ZoneFaulted { zone: String },
    /// Previously faulted zone cleared once the panel reported ready
    ZoneCleared { zone: String },
}
