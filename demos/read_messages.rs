//! Example: Connect to an AlarmDecoder over ser2sock and print state changes.

use alarm_decoder::{transport, DecoderError, DeviceConfig, PanelEvent, PanelState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = DeviceConfig::builder()
        .tcp("192.168.0.100")
        .port(10000)
        .build();

    let mut decoder = transport::open(&config).await?;
    let mut state = PanelState::new();

    println!("Listening for keypad messages (Ctrl+C to stop)...\n");

    loop {
        tokio::select! {
            result = decoder.read_message() => {
                match result {
                    Ok(msg) => {
                        for event in state.apply(&msg) {
                            match event {
                                PanelEvent::ArmStateChanged { old, new } => {
                                    println!("State: {:?} -> {}", old, new);
                                }
                                PanelEvent::ZoneFaulted { zone } => println!("  + zone {}", zone),
                                PanelEvent::ZoneCleared { zone } => println!("  - zone {}", zone),
                                PanelEvent::FlagsChanged { .. } => {}
                            }
                        }
                        println!("[{}] {}", msg.zone(), msg.keypad_text());
                    }
                    Err(DecoderError::TransportClosed) => {
                        println!("Device disconnected!");
                        break;
                    }
                    Err(e) if e.is_recoverable() => println!("Skipping line: {}", e),
                    Err(e) => return Err(e.into()),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("\nDisconnecting...");
                break;
            }
        }
    }

    Ok(())
}
