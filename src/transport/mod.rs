// MIT License - Copyright (c) 2026 Peter Wright
// AlarmDecoder protocol

pub mod serial;
pub mod tcp;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::info;

use crate::config::{ConnectionMode, DeviceConfig};
use crate::error::Result;
use crate::reader::AlarmDecoder;

/// Duplex byte stream an [`AlarmDecoder`] can run over.
pub trait DeviceStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> DeviceStream for T {}

pub type BoxedStream = Box<dyn DeviceStream>;

/// Open the transport described by `config` and wrap it in a decoder.
pub async fn open(config: &DeviceConfig) -> Result<AlarmDecoder<BoxedStream>> {
    info!("Opening AlarmDecoder at {}", config.endpoint());
    let stream: BoxedStream = match config.mode {
        ConnectionMode::Serial => Box::new(serial::open(config)?),
        ConnectionMode::Tcp => Box::new(tcp::connect(config).await?),
    };
    Ok(AlarmDecoder::new(stream))
}
