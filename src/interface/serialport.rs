use std::io::{Read, Write};
use std::time::{Duration, Instant};

use tracing::{info, trace};

use super::{ByteChannel, SerialParams};
use crate::constants::{DEFAULT_BAUD_RATE, DEFAULT_PORT, SERIAL_TIMEOUT_MS};
use crate::error::{AtError, AtResult};

pub type ComPort = String;
pub type BaudRate = u32;

/// Serial port channel. The port is closed when this is dropped.
pub struct SerialPortChannel {
    serial_port: Box<dyn serialport::SerialPort>,
}

impl SerialPortChannel {
    pub fn new(port: ComPort, baud: BaudRate) -> AtResult<SerialPortChannel> {
        info!("Opening port '{}' at {} baud", port, baud);
        let serial_port = serialport::new(port.as_str(), baud)
            .timeout(Duration::from_millis(SERIAL_TIMEOUT_MS))
            .open()
            .map_err(|e| open_error(&port, e))?;

        Ok(SerialPortChannel { serial_port })
    }

    pub fn from_params(params: SerialParams) -> AtResult<SerialPortChannel> {
        Self::new(
            params.port.unwrap_or_else(|| DEFAULT_PORT.to_string()),
            params.baud.unwrap_or(DEFAULT_BAUD_RATE),
        )
    }

    pub fn name(&self) -> String {
        self.serial_port.name().unwrap_or_else(|| "?".to_string())
    }
}

fn open_error(port: &str, e: serialport::Error) -> AtError {
    match e.kind() {
        serialport::ErrorKind::NoDevice
        | serialport::ErrorKind::Io(std::io::ErrorKind::NotFound) => {
            AtError::DeviceNotFound(format!("{}: {}", port, e))
        }
        _ => AtError::PortOpen(format!("{}: {}", port, e)),
    }
}

impl ByteChannel for SerialPortChannel {
    fn bytes_available(&mut self) -> AtResult<usize> {
        let waiting = self
            .serial_port
            .bytes_to_read()
            .map_err(|e| AtError::Communication(format!("{:?}", e)))?;
        Ok(waiting as usize)
    }

    fn read_nonblocking(&mut self, buf: &mut [u8]) -> AtResult<usize> {
        let size = self
            .serial_port
            .read(buf)
            // Timeout error is fine, nothing was waiting
            .or_else(|e| {
                if e.kind() == std::io::ErrorKind::TimedOut {
                    Ok(0)
                } else {
                    Err(e)
                }
            })
            .map_err(|e| AtError::Communication(format!("{:?}", e)))?;

        trace!("Read {} bytes", size);
        Ok(size)
    }

    fn write_blocking(&mut self, data: &[u8], timeout: Duration) -> AtResult<usize> {
        let previous = self.serial_port.timeout();
        self.serial_port
            .set_timeout(timeout)
            .map_err(|e| AtError::Communication(format!("Failed to set write timeout: {}", e)))?;

        let deadline = Instant::now() + timeout;
        let mut written = 0;
        let mut failure = None;
        while written < data.len() && Instant::now() < deadline {
            match self.serial_port.write(&data[written..]) {
                Ok(0) => break,
                Ok(n) => written += n,
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => break,
                Err(e) => {
                    failure = Some(AtError::Write(format!("{:?}", e)));
                    break;
                }
            }
        }
        if failure.is_none() {
            if let Err(e) = self.serial_port.flush() {
                failure = Some(AtError::Write(format!("Failed to flush: {:?}", e)));
            }
        }

        let _ = self.serial_port.set_timeout(previous);

        if let Some(e) = failure {
            return Err(e);
        }
        if written == 0 && !data.is_empty() {
            return Err(AtError::WriteTimeout(timeout.as_millis()));
        }

        trace!("Wrote {} of {} bytes", written, data.len());
        Ok(written)
    }
}

/// Names of the serial ports the OS reports
pub fn available_ports() -> AtResult<Vec<String>> {
    let ports = serialport::available_ports().map_err(|e| {
        AtError::Configuration(format!("Could not get available ports. Err {:?}", e))
    })?;

    Ok(ports.into_iter().map(|p| p.port_name).collect())
}
