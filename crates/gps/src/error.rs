//! Error types for the GPS reader.

/// Errors that end a fix read.
#[derive(Debug, thiserror::Error)]
pub enum GpsError {
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a line could not be parsed as an NMEA sentence.
///
/// These are expected on a noisy line; the reader skips the sentence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NmeaError {
    #[error("sentence does not start with '$'")]
    MissingStart,

    #[error("checksum field is not two hex digits: {0:?}")]
    InvalidChecksum(String),

    #[error("checksum mismatch: sentence says {expected:02X}, computed {computed:02X}")]
    Checksum { expected: u8, computed: u8 },

    #[error("invalid {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },
}
