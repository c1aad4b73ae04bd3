// MIT License - Copyright (c) 2026 Peter Wright
// AlarmDecoder protocol

//! Keypad message decoding.
//!
//! The device emits one line per keypad update:
//!
//! ```text
//! [10000601100000003A--],045,[f71f00000045001c28020000000000],"****DISARMED****  READY TO ARM  "
//! ```
//!
//! | Segment | Content |
//! |---------|---------|
//! | 1 | Bit field, `[` followed by 20 status characters |
//! | 2 | Numeric zone code (usually zero-padded decimal, occasionally hex) |
//! | 3 | Raw panel data, including the keypad address mask |
//! | 4 | Quoted alphanumeric keypad text |

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

use crate::error::ParseError;

/// Number of comma-separated segments in a keypad message.
pub const SEGMENT_COUNT: usize = 4;

/// Bit field position of the beep count digit.
pub const BEEP_POSITION: usize = 6;

/// Bit field position of the Ademco/DSC mode character.
pub const MODE_POSITION: usize = 18;

bitflags! {
    /// Keypad status flags parsed from the message bit field.
    ///
    /// Bit field positions (1-indexed after the opening bracket):
    /// `1-5` and `7-16` are `0`/`1` flags, `6` is the beep count,
    /// `17` is a system-specific hex nibble, `18` is the panel mode.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct KeypadFlags: u16 {
        /// 1 - Panel is READY
        const READY                = 1 << 0;
        /// 2 - Panel is ARMED AWAY
        const ARMED_AWAY           = 1 << 1;
        /// 3 - Panel is ARMED HOME
        const ARMED_HOME           = 1 << 2;
        /// 4 - Keypad backlight is on
        const BACKLIGHT_ON         = 1 << 3;
        /// 5 - Keypad is in programming mode
        const PROGRAMMING_MODE     = 1 << 4;
        /// 7 - A zone has been bypassed
        const ZONE_BYPASSED        = 1 << 5;
        /// 8 - Panel is on AC power
        const AC_POWER             = 1 << 6;
        /// 9 - Chime is enabled
        const CHIME_ENABLED        = 1 << 7;
        /// 10 - An alarm has occurred (sticky, cleared after a second disarm)
        const ALARM_HAS_OCCURRED   = 1 << 8;
        /// 11 - An alarm is sounding (cleared after the first disarm)
        const ALARM_SOUNDING       = 1 << 9;
        /// 12 - Battery is low
        const BATTERY_LOW          = 1 << 10;
        /// 13 - Entry delay is off (ARMED INSTANT/MAX)
        const ENTRY_DELAY_DISABLED = 1 << 11;
        /// 14 - Fire
        const FIRE                 = 1 << 12;
        /// 15 - System issue
        const SYSTEM_ISSUE         = 1 << 13;
        /// 16 - Only the perimeter is armed (ARMED STAY/NIGHT)
        const PERIMETER_ONLY       = 1 << 14;
    }
}

/// Bit field position of each boolean flag.
pub const BIT_FIELD_FLAGS: [(usize, KeypadFlags); 15] = [
    (1, KeypadFlags::READY),
    (2, KeypadFlags::ARMED_AWAY),
    (3, KeypadFlags::ARMED_HOME),
    (4, KeypadFlags::BACKLIGHT_ON),
    (5, KeypadFlags::PROGRAMMING_MODE),
    (7, KeypadFlags::ZONE_BYPASSED),
    (8, KeypadFlags::AC_POWER),
    (9, KeypadFlags::CHIME_ENABLED),
    (10, KeypadFlags::ALARM_HAS_OCCURRED),
    (11, KeypadFlags::ALARM_SOUNDING),
    (12, KeypadFlags::BATTERY_LOW),
    (13, KeypadFlags::ENTRY_DELAY_DISABLED),
    (14, KeypadFlags::FIRE),
    (15, KeypadFlags::SYSTEM_ISSUE),
    (16, KeypadFlags::PERIMETER_ONLY),
];

impl KeypadFlags {
    /// Parse the bracketed bit field segment. Only `'1'` sets a flag.
    ///
    /// The caller guarantees the segment covers every flag position.
    fn from_bit_field(bits: &[u8]) -> Self {
        let mut flags = Self::empty();
        for (pos, flag) in &BIT_FIELD_FLAGS {
            if bits[*pos] == b'1' {
                flags |= *flag;
            }
        }
        flags
    }
}

/// Panel family reported at bit field position 18.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelMode {
    /// `A` - Ademco / Honeywell
    Ademco,
    /// `D` - DSC
    Dsc,
    /// Any other character, kept verbatim
    Other(char),
}

impl PanelMode {
    pub fn from_char(c: char) -> Self {
        match c {
            'A' => Self::Ademco,
            'D' => Self::Dsc,
            other => Self::Other(other),
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Self::Ademco => 'A',
            Self::Dsc => 'D',
            Self::Other(c) => *c,
        }
    }
}

impl fmt::Display for PanelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One decoded keypad message.
///
/// Every field is a projection of [`raw_line`](Self::raw_line); the value is
/// built once by [`parse`] and has no mutating API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmMessage {
    raw_line: String,
    flags: KeypadFlags,
    beeps: u8,
    mode: PanelMode,
    zone: String,
    raw_data: String,
    keypad_text: String,
}

/// Decode one protocol line (without its newline).
pub fn parse(line: &str) -> Result<AlarmMessage, ParseError> {
    let segments: Vec<&str> = line.split(',').collect();
    if segments.len() != SEGMENT_COUNT {
        return Err(ParseError::MalformedFrame {
            count: segments.len(),
            segments: segments.iter().map(|s| s.to_string()).collect(),
        });
    }

    let bits = segments[0].as_bytes();
    if bits.len() <= MODE_POSITION {
        return Err(ParseError::TruncatedBitField {
            len: bits.len(),
            required: MODE_POSITION + 1,
        });
    }

    let beep = bits[BEEP_POSITION];
    if !beep.is_ascii_digit() {
        return Err(ParseError::InvalidBeepCount {
            found: char::from(beep),
        });
    }

    let keypad_segment = segments[3];
    let mut text = keypad_segment.chars();
    if text.next().is_none() || text.next_back().is_none() {
        return Err(ParseError::MalformedKeypadText {
            segment: keypad_segment.to_string(),
        });
    }

    Ok(AlarmMessage {
        raw_line: line.to_string(),
        flags: KeypadFlags::from_bit_field(bits),
        beeps: beep - b'0',
        mode: PanelMode::from_char(char::from(bits[MODE_POSITION])),
        zone: segments[1].to_string(),
        raw_data: segments[2].to_string(),
        keypad_text: text.as_str().trim().to_string(),
    })
}

impl AlarmMessage {
    /// Same as [`parse`].
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        parse(line)
    }

    pub fn raw_line(&self) -> &str {
        &self.raw_line
    }

    pub fn flags(&self) -> KeypadFlags {
        self.flags
    }

    /// Number of beeps associated with the message (0-7 on real panels).
    pub fn beeps(&self) -> u8 {
        self.beeps
    }

    pub fn mode(&self) -> PanelMode {
        self.mode
    }

    /// Zone code affected by the message, e.g. `045` for CHECK ZONE 45.
    pub fn zone(&self) -> &str {
        &self.zone
    }

    pub fn raw_data(&self) -> &str {
        &self.raw_data
    }

    pub fn keypad_text(&self) -> &str {
        &self.keypad_text
    }

    /// The 8 hex digits of the keypad address mask, if the raw data is long enough.
    ///
    /// The mask is the four bytes starting at byte 2 of the bracketed raw
    /// payload. It is returned as text and not interpreted.
    pub fn keypad_address_mask(&self) -> Option<&str> {
        let payload = self.raw_data.strip_prefix('[').unwrap_or(&self.raw_data);
        payload.get(4..12)
    }

    // Convenience accessors
    pub fn is_ready(&self) -> bool { self.flags.contains(KeypadFlags::READY) }
    pub fn is_armed_away(&self) -> bool { self.flags.contains(KeypadFlags::ARMED_AWAY) }
    pub fn is_armed_home(&self) -> bool { self.flags.contains(KeypadFlags::ARMED_HOME) }
    pub fn is_backlight_on(&self) -> bool { self.flags.contains(KeypadFlags::BACKLIGHT_ON) }
    pub fn is_programming_mode(&self) -> bool { self.flags.contains(KeypadFlags::PROGRAMMING_MODE) }
    pub fn is_zone_bypassed(&self) -> bool { self.flags.contains(KeypadFlags::ZONE_BYPASSED) }
    pub fn is_ac_power(&self) -> bool { self.flags.contains(KeypadFlags::AC_POWER) }
    pub fn is_chime_enabled(&self) -> bool { self.flags.contains(KeypadFlags::CHIME_ENABLED) }
    pub fn alarm_has_occurred(&self) -> bool { self.flags.contains(KeypadFlags::ALARM_HAS_OCCURRED) }
    pub fn is_alarm_sounding(&self) -> bool { self.flags.contains(KeypadFlags::ALARM_SOUNDING) }
    pub fn is_battery_low(&self) -> bool { self.flags.contains(KeypadFlags::BATTERY_LOW) }
    pub fn is_entry_delay_disabled(&self) -> bool { self.flags.contains(KeypadFlags::ENTRY_DELAY_DISABLED) }
    pub fn is_fire(&self) -> bool { self.flags.contains(KeypadFlags::FIRE) }
    pub fn is_system_issue(&self) -> bool { self.flags.contains(KeypadFlags::SYSTEM_ISSUE) }
    pub fn is_perimeter_only(&self) -> bool { self.flags.contains(KeypadFlags::PERIMETER_ONLY) }
}

impl FromStr for AlarmMessage {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}
