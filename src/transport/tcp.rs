// MIT License - Copyright (c) 2026 Peter Wright
// AlarmDecoder protocol

use tokio::net::TcpStream;
use tokio::time::{timeout, Duration};
use tracing::{debug, error};

use crate::config::DeviceConfig;
use crate::error::{DecoderError, Result};

/// Connect to a ser2sock-style TCP relay.
pub async fn connect(config: &DeviceConfig) -> Result<TcpStream> {
    let addr = format!("{}:{}", config.host, config.port);
    let stream = timeout(
        Duration::from_millis(config.connect_timeout_ms),
        TcpStream::connect(&addr),
    )
    .await
    .map_err(|_| {
        error!("TCP connect to {} timed out", addr);
        DecoderError::ConnectionTimeout
    })?
    .map_err(|e| {
        error!("TCP connect failed: {}", e);
        DecoderError::Io(e)
    })?;

    stream.set_nodelay(true)?;
    debug!("TCP socket connected to {}", addr);
    Ok(stream)
}
