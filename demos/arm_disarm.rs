//! Example: Arm the panel in stay mode, then disarm it.

use alarm_decoder::{transport, ArmState, DeviceConfig, KeypadCommand};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let code = std::env::var("AD_CODE").unwrap_or_default();
    let config = DeviceConfig::builder().serial("/dev/ttyUSB0").build();
    let mut decoder = transport::open(&config).await?;

    println!("Arming in stay mode...");
    decoder.send(&KeypadCommand::ArmStay).await?;
    wait_for(&mut decoder, ArmState::ArmedHome).await?;
    println!("Panel armed (stay)");

    tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;

    println!("\nDisarming...");
    match decoder.send(&KeypadCommand::Disarm { code }).await {
        Ok(()) => {
            wait_for(&mut decoder, ArmState::Disarmed).await?;
            println!("Panel disarmed");
        }
        Err(e) => println!("Error disarming: {}", e),
    }

    Ok(())
}

async fn wait_for(
    decoder: &mut alarm_decoder::AlarmDecoder<transport::BoxedStream>,
    wanted: ArmState,
) -> anyhow::Result<()> {
    loop {
        match decoder.read_message().await {
            Ok(msg) if ArmState::from_message(&msg) == wanted => return Ok(()),
            Ok(msg) => println!("  {}", msg.keypad_text()),
            Err(e) if e.is_recoverable() => continue,
            Err(e) => return Err(e.into()),
        }
    }
}
