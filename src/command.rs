// MIT License - Copyright (c) 2026 Peter Wright
// AlarmDecoder protocol

use crate::error::{DecoderError, Result};

/// Keystroke sequences that can be sent to the panel through the device.
///
/// The AlarmDecoder forwards every byte it receives as a keypad key press,
/// so a command is just the keys a user would type:
///
/// | Command | Keys |
/// |---------|------|
/// | Arm stay (home) | `#` `3` |
/// | Arm away | `#` `2` |
/// | Disarm | user code, then `1` |
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeypadCommand {
    /// `#3` — Quick arm in stay/home mode.
    ArmStay,
    /// `#2` — Quick arm in away mode.
    ArmAway,
    /// `<code>1` — Disarm with a user code.
    Disarm { code: String },
    /// Raw key presses, sent verbatim.
    Keys(String),
}

impl KeypadCommand {
    /// Convert the command to the bytes written to the device.
    pub fn to_wire_bytes(&self) -> Result<Vec<u8>> {
        match self {
            KeypadCommand::ArmStay => Ok(b"#3".to_vec()),
            KeypadCommand::ArmAway => Ok(b"#2".to_vec()),
            KeypadCommand::Disarm { code } => {
                // "None" means no code was entered
                if code.is_empty() || code == "None" {
                    return Err(DecoderError::MissingCode);
                }
                let mut bytes = code.as_bytes().to_vec();
                bytes.push(b'1');
                Ok(bytes)
            }
            KeypadCommand::Keys(keys) => Ok(keys.as_bytes().to_vec()),
        }
    }

    /// Short name for logging. Never includes the user code.
    pub fn name(&self) -> &'static str {
        match self {
            KeypadCommand::ArmStay => "arm_stay",
            KeypadCommand::ArmAway => "arm_away",
            KeypadCommand::Disarm { .. } => "disarm",
            KeypadCommand::Keys(_) => "keys",
        }
    }
}
