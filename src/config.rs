// MIT License - Copyright (c) 2026 Peter Wright
// AlarmDecoder protocol

/// How the AlarmDecoder is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Local serial device (AD2PI on the Pi UART, AD2USB on a USB tty)
    Serial,
    /// ser2sock or any TCP server relaying the serial stream
    Tcp,
}

/// Configuration for opening an AlarmDecoder device.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Connection mode
    pub mode: ConnectionMode,
    /// Serial device path (default: /dev/ttyAMA0)
    pub device_path: String,
    /// Serial baud rate (default: 115200, 8N1)
    pub baud_rate: u32,
    /// TCP host
    pub host: String,
    /// TCP port (default: 10000, the ser2sock port)
    pub port: u16,
    /// TCP connect timeout in milliseconds
    pub connect_timeout_ms: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            mode: ConnectionMode::Serial,
            device_path: "/dev/ttyAMA0".to_string(),
            baud_rate: 115200,
            host: "localhost".to_string(),
            port: 10000,
            connect_timeout_ms: 5000,
        }
    }
}

impl DeviceConfig {
    /// Create a new config builder starting from defaults.
    pub fn builder() -> DeviceConfigBuilder {
        DeviceConfigBuilder::default()
    }

    /// Human-readable endpoint for logging.
    pub fn endpoint(&self) -> String {
        match self.mode {
            ConnectionMode::Serial => format!("{} @ {} baud", self.device_path, self.baud_rate),
            ConnectionMode::Tcp => format!("{}:{}", self.host, self.port),
        }
    }
}

/// Builder for DeviceConfig.
#[derive(Debug, Clone, Default)]
pub struct DeviceConfigBuilder {
    config: DeviceConfig,
}

impl DeviceConfigBuilder {
    /// Use a serial device at `path`.
    pub fn serial(mut self, path: impl Into<String>) -> Self {
        self.config.mode = ConnectionMode::Serial;
        self.config.device_path = path.into();
        self
    }

    /// Use a TCP connection to `host`.
    pub fn tcp(mut self, host: impl Into<String>) -> Self {
        self.config.mode = ConnectionMode::Tcp;
        self.config.host = host.into();
        self
    }

    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.config.baud_rate = baud_rate;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    pub fn build(self) -> DeviceConfig {
        self.config
    }
}
