// MIT License - Copyright (c) 2026 Peter Wright
// AlarmDecoder protocol
//
//! # alarm-decoder
//!
//! Streaming decoder for the keypad messages emitted by AlarmDecoder
//! devices (AD2PI, AD2USB, ser2sock), which sit on the keypad bus of
//! Ademco/Honeywell and DSC alarm panels.
//!
//! Every line the device sends looks like:
//!
//! ```text
//! [10000601100000003A--],045,[f71f00000045001c28020000000000],"****DISARMED****  READY TO ARM  "
//! ```
//!
//! [`parse`] turns one such line into an [`AlarmMessage`]. [`AlarmDecoder`]
//! wraps a duplex byte stream, splits it into lines and parses them, and
//! writes keystrokes back to the panel.
//!
//! ## Quick Start
//!
//! ```no_run
//! use alarm_decoder::{transport, DecoderError, DeviceConfig, KeypadCommand};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = DeviceConfig::builder().serial("/dev/ttyAMA0").build();
//!     let mut decoder = transport::open(&config).await?;
//!
//!     decoder.send(&KeypadCommand::ArmStay).await?;
//!
//!     loop {
//!         match decoder.read_message().await {
//!             Ok(msg) => println!("{}: {}", msg.zone(), msg.keypad_text()),
//!             Err(e) if e.is_recoverable() => eprintln!("skipping line: {e}"),
//!             Err(DecoderError::TransportClosed) => break,
//!             Err(e) => return Err(e.into()),
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod message;
pub mod reader;
pub mod state;
pub mod transport;

// Re-exports for convenience
pub use command::KeypadCommand;
pub use config::{ConnectionMode, DeviceConfig, DeviceConfigBuilder};
pub use error::{DecoderError, ParseError, ParseErrorKind, Result};
pub use event::PanelEvent;
pub use message::{parse, AlarmMessage, KeypadFlags, PanelMode};
pub use reader::{AlarmDecoder, MAX_LINE_LEN};
pub use state::{ArmState, PanelState};
