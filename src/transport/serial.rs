// MIT License - Copyright (c) 2026 Peter Wright
// AlarmDecoder protocol

use tokio_serial::{DataBits, FlowControl, Parity, SerialPortBuilderExt, SerialStream, StopBits};
use tracing::{debug, error};

use crate::config::DeviceConfig;
use crate::error::{DecoderError, Result};

/// Open the serial device, 8N1 without flow control.
pub fn open(config: &DeviceConfig) -> Result<SerialStream> {
    let port = tokio_serial::new(config.device_path.as_str(), config.baud_rate)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .open_native_async()
        .map_err(|e| {
            error!("Failed to open serial port {}: {}", config.device_path, e);
            DecoderError::Serial(e)
        })?;

    debug!("Serial port {} open", config.device_path);
    Ok(port)
}
