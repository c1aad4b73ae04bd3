// MIT License - Copyright (c) 2026 Peter Wright
// AlarmDecoder protocol

use std::collections::BTreeSet;
use std::fmt;

use tracing::{debug, info};

use crate::event::PanelEvent;
use crate::message::{AlarmMessage, KeypadFlags};

/// Overall alarm state derived from one keypad message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArmState {
    Triggered,
    ArmedHome,
    ArmedAway,
    /// Disarmed but not ready to arm (a zone is open)
    Pending,
    Disarmed,
}

impl ArmState {
    /// Alarm conditions win over arming, arming over readiness.
    pub fn from_message(msg: &AlarmMessage) -> Self {
        if msg.is_alarm_sounding() || msg.alarm_has_occurred() {
            Self::Triggered
        } else if msg.is_armed_home() {
            Self::ArmedHome
        } else if msg.is_armed_away() {
            Self::ArmedAway
        } else if !msg.is_ready() {
            Self::Pending
        } else {
            Self::Disarmed
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Triggered => "triggered",
            Self::ArmedHome => "armed_home",
            Self::ArmedAway => "armed_away",
            Self::Pending => "pending",
            Self::Disarmed => "disarmed",
        }
    }
}

impl fmt::Display for ArmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Panel state accumulated over a sequence of keypad messages.
///
/// Zone codes are tracked as opaque strings. A zone reported while the panel
/// is not ready becomes faulted; a later ready message clears every faulted
/// zone except the one it reports.
#[derive(Debug, Clone, Default)]
pub struct PanelState {
    arm_state: Option<ArmState>,
    flags: Option<KeypadFlags>,
    faulted: BTreeSet<String>,
}

impl PanelState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one message into the state. Returns the resulting events in order.
    pub fn apply(&mut self, msg: &AlarmMessage) -> Vec<PanelEvent> {
        let mut events = Vec::new();

        let new_flags = msg.flags();
        if let Some(old) = self.flags {
            if old != new_flags {
                events.push(PanelEvent::FlagsChanged {
                    old,
                    new: new_flags,
                    changed: old ^ new_flags,
                });
            }
        }
        self.flags = Some(new_flags);

        let new_state = ArmState::from_message(msg);
        if self.arm_state != Some(new_state) {
            info!("Arm state changed to {}", new_state);
            events.push(PanelEvent::ArmStateChanged {
                old: self.arm_state,
                new: new_state,
            });
            self.arm_state = Some(new_state);
        }

        let zone = msg.zone();
        if !msg.is_ready() && !zone.is_empty() && self.faulted.insert(zone.to_string()) {
            debug!("Zone {:?} faulted", zone);
            events.push(PanelEvent::ZoneFaulted {
                zone: zone.to_string(),
            });
        }

        if msg.is_ready() {
            let cleared: Vec<String> = self
                .faulted
                .iter()
                .filter(|z| z.as_str() != zone)
                .cloned()
                .collect();
            for z in cleared {
                debug!("Zone {:?} cleared", z);
                self.faulted.remove(&z);
                events.push(PanelEvent::ZoneCleared { zone: z });
            }
        }

        events
    }

    pub fn arm_state(&self) -> Option<ArmState> {
        self.arm_state
    }

    pub fn flags(&self) -> Option<KeypadFlags> {
        self.flags
    }

    pub fn is_zone_faulted(&self, zone: &str) -> bool {
        self.faulted.contains(zone)
    }

    /// Faulted zone codes in sorted order.
    pub fn faulted_zones(&self) -> impl Iterator<Item = &str> {
        self.faulted.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn msg(line: &str) -> AlarmMessage {
        AlarmMessage::parse(line).unwrap()
    }

    const READY: &str = r#"[10000001100000003A--],008,[f70000000008001c28020000000000],"****DISARMED****  READY TO ARM  ""#;
    const FAULT_5: &str = r#"[00000001100000003A--],005,[f70000000005001c28020000000000],"FAULT 05 FRONT DOOR""#;
    const FAULT_7: &str = r#"[00000001100000003A--],007,[f70000000007001c28020000000000],"FAULT 07 BACK DOOR""#;
    const AWAY: &str = r#"[01000001100000003A--],008,[f70000000008001c28020000000000],"ARMED ***AWAY***""#;
    const STAY: &str = r#"[00100001100000013A--],008,[f70000000008001c28020000000000],"ARMED ***STAY***""#;
    const ALARM: &str = r#"[01000001111000003A--],005,[f70000000005001c28020000000000],"ALARM 05 FRONT DOOR""#;

    #[test]
    fn test_arm_state_priority() {
        assert_eq!(ArmState::from_message(&msg(READY)), ArmState::Disarmed);
        assert_eq!(ArmState::from_message(&msg(FAULT_5)), ArmState::Pending);
        assert_eq!(ArmState::from_message(&msg(AWAY)), ArmState::ArmedAway);
        assert_eq!(ArmState::from_message(&msg(STAY)), ArmState::ArmedHome);
        // Armed away with an alarm still reports triggered
        assert_eq!(ArmState::from_message(&msg(ALARM)), ArmState::Triggered);
        assert_eq!(ArmState::Triggered.to_string(), "triggered");
    }

    #[test]
    fn test_first_message_reports_state() {
        let mut state = PanelState::new();
        let events = state.apply(&msg(READY));
        assert_eq!(
            events,
            vec![PanelEvent::ArmStateChanged {
                old: None,
                new: ArmState::Disarmed,
            }]
        );
        assert!(state.apply(&msg(READY)).is_empty());
    }

    #[test]
    fn test_zone_fault_and_clear() {
        let mut state = PanelState::new();
        state.apply(&msg(READY));

        let events = state.apply(&msg(FAULT_5));
        assert_eq!(
            events,
            vec![
                PanelEvent::FlagsChanged {
                    old: KeypadFlags::READY | KeypadFlags::AC_POWER | KeypadFlags::CHIME_ENABLED,
                    new: KeypadFlags::AC_POWER | KeypadFlags::CHIME_ENABLED,
                    changed: KeypadFlags::READY,
                },
                PanelEvent::ArmStateChanged {
                    old: Some(ArmState::Disarmed),
                    new: ArmState::Pending,
                },
                PanelEvent::ZoneFaulted { zone: "005".to_string() },
            ]
        );

        // Keypad cycles through open zones; repeats are not new faults
        let events = state.apply(&msg(FAULT_7));
        assert_eq!(events, vec![PanelEvent::ZoneFaulted { zone: "007".to_string() }]);
        assert!(state.apply(&msg(FAULT_5)).is_empty());
        assert_eq!(state.faulted_zones().collect::<Vec<_>>(), vec!["005", "007"]);

        let events = state.apply(&msg(READY));
        assert!(events.contains(&PanelEvent::ZoneCleared { zone: "005".to_string() }));
        assert!(events.contains(&PanelEvent::ZoneCleared { zone: "007".to_string() }));
        assert_eq!(state.faulted_zones().count(), 0);
        assert_eq!(state.arm_state(), Some(ArmState::Disarmed));
    }

    #[test]
    fn test_ready_keeps_own_zone() {
        let mut state = PanelState::new();
        state.apply(&msg(r#"[00000001100000003A--],008,,"FAULT 08""#));
        state.apply(&msg(FAULT_5));
        let events = state.apply(&msg(READY));
        assert_eq!(events.len(), 3);
        assert!(state.is_zone_faulted("008"));
        assert!(!state.is_zone_faulted("005"));
    }

    #[test]
    fn test_empty_zone_ignored() {
        let mut state = PanelState::new();
        state.apply(&msg(r#"[00000000000000003A--],,,"NOT READY""#));
        assert_eq!(state.faulted_zones().count(), 0);
    }
}
