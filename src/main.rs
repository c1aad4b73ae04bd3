// MIT License - Copyright (c) 2026 Peter Wright
// AlarmDecoder monitor

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{debug, error, info, warn};

use alarm_decoder::{
    transport, AlarmMessage, ArmState, DecoderError, DeviceConfig, KeypadCommand, PanelEvent,
    PanelState,
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "ad2-monitor")]
#[command(about = "Decode and log keypad messages from an AlarmDecoder device")]
struct Cli {
    /// Serial device path
    #[arg(long, env = "AD_PATH", default_value = "/dev/ttyAMA0")]
    device: String,

    /// Serial baud rate
    #[arg(long, env = "AD_BAUD_RATE", default_value_t = 115200)]
    baud_rate: u32,

    /// ser2sock host; connects over TCP instead of serial when set
    #[arg(long, env = "AD_HOST")]
    host: Option<String>,

    /// ser2sock port
    #[arg(long, env = "AD_PORT", default_value_t = 10000)]
    port: u16,

    /// Print every message as a JSON line on stdout
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn device_config(&self) -> DeviceConfig {
        let builder = DeviceConfig::builder().baud_rate(self.baud_rate).port(self.port);
        let builder = match &self.host {
            Some(host) => builder.tcp(host),
            None => builder.serial(&self.device),
        };
        builder.build()
    }
}

// ---------------------------------------------------------------------------
// JSON output
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct JsonMessage<'a> {
    now: u64,
    state: &'static str,
    ready: bool,
    #[serde(rename = "armedAway")]
    armed_away: bool,
    #[serde(rename = "armedHome")]
    armed_home: bool,
    #[serde(rename = "backlightOn")]
    backlight_on: bool,
    #[serde(rename = "programmingMode")]
    programming_mode: bool,
    beeps: u8,
    #[serde(rename = "zoneBypassed")]
    zone_bypassed: bool,
    #[serde(rename = "acPower")]
    ac_power: bool,
    #[serde(rename = "chimeEnabled")]
    chime_enabled: bool,
    #[serde(rename = "alarmHasOccurred")]
    alarm_has_occurred: bool,
    #[serde(rename = "alarmSounding")]
    alarm_sounding: bool,
    #[serde(rename = "batteryLow")]
    battery_low: bool,
    #[serde(rename = "entryDelayDisabled")]
    entry_delay_disabled: bool,
    fire: bool,
    #[serde(rename = "systemIssue")]
    system_issue: bool,
    #[serde(rename = "perimeterOnly")]
    perimeter_only: bool,
    mode: String,
    zone: &'a str,
    #[serde(rename = "rawData")]
    raw_data: &'a str,
    #[serde(rename = "keypadText")]
    keypad_text: &'a str,
}

impl<'a> JsonMessage<'a> {
    fn new(msg: &'a AlarmMessage) -> Self {
        Self {
            now: Utc::now().timestamp_millis() as u64,
            state: ArmState::from_message(msg).as_str(),
            ready: msg.is_ready(),
            armed_away: msg.is_armed_away(),
            armed_home: msg.is_armed_home(),
            backlight_on: msg.is_backlight_on(),
            programming_mode: msg.is_programming_mode(),
            beeps: msg.beeps(),
            zone_bypassed: msg.is_zone_bypassed(),
            ac_power: msg.is_ac_power(),
            chime_enabled: msg.is_chime_enabled(),
            alarm_has_occurred: msg.alarm_has_occurred(),
            alarm_sounding: msg.is_alarm_sounding(),
            battery_low: msg.is_battery_low(),
            entry_delay_disabled: msg.is_entry_delay_disabled(),
            fire: msg.is_fire(),
            system_issue: msg.is_system_issue(),
            perimeter_only: msg.is_perimeter_only(),
            mode: msg.mode().to_string(),
            zone: msg.zone(),
            raw_data: msg.raw_data(),
            keypad_text: msg.keypad_text(),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Interpret a line typed on stdin.
///
/// `arm-away`, `arm-stay` and `disarm <code>` map to keypad commands; anything
/// else is sent as raw keys.
fn stdin_command(line: &str) -> KeypadCommand {
    let mut words = line.split_whitespace();
    match (words.next(), words.next()) {
        (Some("arm-away"), None) => KeypadCommand::ArmAway,
        (Some("arm-stay"), None) => KeypadCommand::ArmStay,
        (Some("disarm"), code) => KeypadCommand::Disarm {
            code: code.unwrap_or_default().to_string(),
        },
        _ => KeypadCommand::Keys(line.to_string()),
    }
}

fn handle_message(msg: &AlarmMessage, state: &mut PanelState, json: bool) -> Result<()> {
    debug!(
        "Keypad: zone={:?} beeps={} text={:?}",
        msg.zone(),
        msg.beeps(),
        msg.keypad_text()
    );

    for event in state.apply(msg) {
        match event {
            PanelEvent::ZoneFaulted { zone } => info!("Zone {:?} has been triggered", zone),
            PanelEvent::ZoneCleared { zone } => info!("Zone {:?} has been cleared", zone),
            PanelEvent::FlagsChanged { changed, new, .. } => {
                debug!("Flags changed: {:?} (now {:?})", changed, new)
            }
            PanelEvent::ArmStateChanged { .. } => {}
        }
    }

    if json {
        let line = serde_json::to_string(&JsonMessage::new(msg))
            .context("Failed to serialize message")?;
        println!("{line}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity (e.g. RUST_LOG=debug or RUST_LOG=alarm_decoder=trace).
    // Default: info.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // Logs go to stderr so --json output on stdout stays clean
    if std::env::var_os("JOURNAL_STREAM").is_some() {
        tracing_subscriber::fmt()
            .without_time()
            .with_writer(std::io::stderr)
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(env_filter)
            .init();
    }

    let cli = Cli::parse();
    let config = cli.device_config();

    let mut decoder = transport::open(&config)
        .await
        .with_context(|| format!("Failed to open AlarmDecoder at {}", config.endpoint()))?;
    let mut state = PanelState::new();

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut sigterm = signal(SignalKind::terminate())?;

    info!("Monitoring {}. Type keys or commands on stdin, Ctrl+C to stop.", config.endpoint());
    loop {
        tokio::select! {
            result = decoder.read_message() => match result {
                Ok(msg) => handle_message(&msg, &mut state, cli.json)?,
                Err(DecoderError::TransportClosed) => {
                    warn!("Device closed the connection");
                    break;
                }
                Err(e) if e.is_recoverable() => warn!("Unknown message from alarm: {e}"),
                Err(e) => {
                    error!("Read failed: {e}");
                    return Err(e).context("Failed to read from device");
                }
            },
            line = stdin.next_line(), if stdin_open => match line.context("Failed to read stdin")? {
                Some(line) if line.trim().is_empty() => {}
                Some(line) => {
                    let command = stdin_command(line.trim());
                    match decoder.send(&command).await {
                        Ok(()) => info!("Sent {}", command.name()),
                        Err(DecoderError::MissingCode) => warn!("Failed to disarm: no code provided"),
                        Err(e) => return Err(e).context("Failed to write to device"),
                    }
                }
                None => {
                    debug!("stdin closed");
                    stdin_open = false;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Received SIGINT, shutting down...");
                break;
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
                break;
            }
        }
    }

    info!("Shutdown complete");
    Ok(())
}
