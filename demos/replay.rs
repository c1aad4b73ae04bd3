//! Example: Replay a captured AlarmDecoder log file through the decoder.
//!
//! Usage: `cargo run --example replay -- capture.log`

use alarm_decoder::{AlarmDecoder, DecoderError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: replay <capture file>"))?;
    let file = tokio::fs::File::open(&path).await?;
    let mut decoder = AlarmDecoder::new(file);

    let (mut ok, mut bad) = (0u32, 0u32);
    loop {
        match decoder.read_message().await {
            Ok(msg) => {
                ok += 1;
                println!(
                    "{:>4} ready={} away={} home={} beeps={} {:?}",
                    msg.zone(),
                    msg.is_ready(),
                    msg.is_armed_away(),
                    msg.is_armed_home(),
                    msg.beeps(),
                    msg.keypad_text()
                );
            }
            Err(DecoderError::TransportClosed) => break,
            Err(e) if e.is_recoverable() => {
                bad += 1;
                println!("  !! {}", e);
            }
            Err(e) => return Err(e.into()),
        }
    }

    println!("\n{} messages decoded, {} lines skipped", ok, bad);
    Ok(())
}
