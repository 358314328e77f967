//! Blocking line reader that stops at the first valid fix.

use std::io::{self, BufRead, BufReader, Read};
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

use crate::error::GpsError;
use crate::nmea::{self, Fix};

/// Serial port parameters for the GPS module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSettings {
    pub path: String,
    pub baud_rate: u32,
    /// Read timeout; an idle line times out and is retried.
    pub timeout: Duration,
    pub retry_delay: Duration,
}

impl Default for PortSettings {
    fn default() -> Self {
        Self {
            path: crate::DEFAULT_PORT.into(),
            baud_rate: crate::DEFAULT_BAUD_RATE,
            timeout: crate::DEFAULT_TIMEOUT,
            retry_delay: crate::DEFAULT_RETRY_DELAY,
        }
    }
}

/// Opens the serial device as 8N1 without flow control.
pub fn open_port(settings: &PortSettings) -> Result<Box<dyn SerialPort>, GpsError> {
    let port = serialport::new(&settings.path, settings.baud_rate)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .timeout(settings.timeout)
        .open()?;

    tracing::info!(
        path = %settings.path,
        baud_rate = settings.baud_rate,
        "opened GPS serial port"
    );
    Ok(port)
}

/// Opens the port, reads until the first valid fix and closes it again.
pub fn read_fix_from_port(settings: &PortSettings) -> Result<Option<Fix>, GpsError> {
    let port = open_port(settings)?;
    FixReader::new(port, settings.retry_delay).read_fix()
}

/// Scans NMEA lines from any byte source for a valid fix.
pub struct FixReader<R> {
    reader: BufReader<R>,
    retry_delay: Duration,
    line: Vec<u8>,
}

impl<R: Read> FixReader<R> {
    pub fn new(inner: R, retry_delay: Duration) -> Self {
        Self {
            reader: BufReader::new(inner),
            retry_delay,
            line: Vec::new(),
        }
    }

    /// Reads lines until one yields a valid fix.
    ///
    /// Non-sentence lines and sentences that fail to parse are skipped. A read
    /// timeout keeps any partial line and retries after `retry_delay`. Returns
    /// `Ok(None)` when the source reaches end of stream.
    pub fn read_fix(&mut self) -> Result<Option<Fix>, GpsError> {
        loop {
            match self.reader.read_until(b'\n', &mut self.line) {
                Ok(0) if self.line.is_empty() => return Ok(None),
                Ok(_) => {}
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
                    ) =>
                {
                    std::thread::sleep(self.retry_delay);
                    continue;
                }
                Err(e) => return Err(e.into()),
            }

            let text = String::from_utf8_lossy(&self.line).trim().to_string();
            self.line.clear();

            if !text.starts_with('$') {
                continue;
            }

            match nmea::parse(&text) {
                Ok(sentence) => {
                    if let Some(fix) = sentence.fix() {
                        return Ok(Some(fix));
                    }
                }
                Err(error) => tracing::trace!(%error, line = %text, "skipping unparsable sentence"),
            }
        }
    }
}
