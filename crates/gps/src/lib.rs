//! Serial GPS fix reader.
//!
//! Reads NMEA 0183 sentences from a serial GPS module until one carries a
//! valid position (RMC status `A`, or GGA fix quality GPS/DGPS), then returns
//! it. There is no persistent state: each call opens, reads and closes.

pub mod error;
pub mod nmea;
pub mod reader;

pub use error::{GpsError, NmeaError};
pub use nmea::{Altitude, Fix, Gga, Position, Rmc, Sentence};
pub use reader::{FixReader, PortSettings, open_port, read_fix_from_port};

use std::time::Duration;

/// Default serial device on a Raspberry Pi with the module on the GPIO UART.
pub const DEFAULT_PORT: &str = "/dev/serial0";

/// Default baud rate of u-blox M10 modules.
pub const DEFAULT_BAUD_RATE: u32 = 38_400;

/// Read timeout on the serial port.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Pause after a read timeout before trying again.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(100);
