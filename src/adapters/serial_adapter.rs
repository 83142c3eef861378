use log::debug;
use std::time::Duration;

#[cfg(feature = "instrument_serial")]
use serialport::SerialPort;
#[cfg(feature = "instrument_serial")]
use std::io::{Read, Write};
#[cfg(feature = "instrument_serial")]
use std::time::Instant;

use super::Transport;
use crate::config::DeviceConfig;
use crate::error::TransportError;

/// Port settings for [`SerialAdapter`].
#[derive(Debug, Clone, PartialEq)]
pub struct SerialSettings {
    /// Port name (e.g., "/dev/ttyUSB0", "COM3")
    pub port_name: String,

    /// Baud rate (e.g., 9600, 115200)
    pub baud_rate: u32,

    /// Overall timeout for one reply line
    pub timeout: Duration,

    /// Line terminator appended to commands
    pub line_terminator: String,

    /// Character that ends a reply line
    pub response_delimiter: u8,
}

impl SerialSettings {
    /// Settings with the defaults used by the HP 8131A (9600 baud, `\n` both ways).
    pub fn new(port_name: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            baud_rate: 9600,
            timeout: Duration::from_secs(2),
            line_terminator: "\n".to_string(),
            response_delimiter: b'\n',
        }
    }

    /// Set the baud rate
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Set the reply timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl From<&DeviceConfig> for SerialSettings {
    fn from(config: &DeviceConfig) -> Self {
        let mut settings = SerialSettings::new(config.address.clone())
            .with_baud_rate(config.baud_rate)
            .with_timeout(Duration::from_millis(config.timeout_ms));
        settings.line_terminator = config.write_terminator.clone();
        settings
    }
}

/// Serial adapter for RS-232 communication
///
/// Wraps the serialport crate. All I/O blocks the calling thread.
pub struct SerialAdapter {
    settings: SerialSettings,

    #[cfg(feature = "instrument_serial")]
    port: Box<dyn SerialPort>,
}

impl SerialAdapter {
    /// Open the serial port described by `settings`.
    ///
    /// # Errors
    /// Returns a [`TransportError`] if the port cannot be opened.
    #[cfg(feature = "instrument_serial")]
    pub fn open(settings: SerialSettings) -> Result<Self, TransportError> {
        let port = serialport::new(&settings.port_name, settings.baud_rate)
            .timeout(Duration::from_millis(100)) // Internal read timeout
            .open()?;

        debug!(
            "Serial port '{}' opened at {} baud",
            settings.port_name, settings.baud_rate
        );
        Ok(Self { settings, port })
    }

    #[cfg(not(feature = "instrument_serial"))]
    pub fn open(settings: SerialSettings) -> Result<Self, TransportError> {
        let _ = settings;
        Err(TransportError::SerialFeatureDisabled)
    }

    /// Settings this adapter was opened with
    pub fn settings(&self) -> &SerialSettings {
        &self.settings
    }

    #[cfg(feature = "instrument_serial")]
    fn write_line(&mut self, command: &str) -> Result<(), TransportError> {
        let line = format!("{}{}", command, self.settings.line_terminator);
        self.port.write_all(line.as_bytes())?;
        self.port.flush()?;
        debug!("Sent serial command: {}", command.trim());
        Ok(())
    }

    #[cfg(feature = "instrument_serial")]
    fn read_line(&mut self) -> Result<String, TransportError> {
        let mut response = Vec::new();
        let mut buffer = [0u8; 1];
        let start = Instant::now();

        loop {
            if start.elapsed() > self.settings.timeout {
                return Err(TransportError::Timeout(self.settings.timeout));
            }

            match self.port.read(&mut buffer) {
                Ok(0) => return Err(TransportError::UnexpectedEof),
                Ok(_) => {
                    if buffer[0] == self.settings.response_delimiter {
                        break;
                    }
                    response.push(buffer[0]);
                }
                // Port timeout is shorter than our overall timeout
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => continue,
                Err(e) => return Err(e.into()),
            }
        }

        let response = String::from_utf8_lossy(&response).trim().to_string();
        debug!("Received serial response: {}", response);
        Ok(response)
    }
}

impl Transport for SerialAdapter {
    fn query(&mut self, command: &str) -> Result<String, TransportError> {
        #[cfg(feature = "instrument_serial")]
        {
            self.write_line(command)?;
            self.read_line()
        }

        #[cfg(not(feature = "instrument_serial"))]
        {
            let _ = command;
            Err(TransportError::SerialFeatureDisabled)
        }
    }

    fn send(&mut self, command: &str) -> Result<(), TransportError> {
        #[cfg(feature = "instrument_serial")]
        {
            self.write_line(command)
        }

        #[cfg(not(feature = "instrument_serial"))]
        {
            let _ = command;
            Err(TransportError::SerialFeatureDisabled)
        }
    }

    fn info(&self) -> String {
        format!(
            "SerialAdapter({} @ {} baud, {}ms timeout)",
            self.settings.port_name,
            self.settings.baud_rate,
            self.settings.timeout.as_millis()
        )
    }
}
