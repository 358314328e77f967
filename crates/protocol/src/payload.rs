//! Transmitter payload decoding.
//!
//! # Wire format
//!
//! ```text
//! three-channel sender:  "<int>,<int>,<int>"
//! one-channel sender:    "<int>"
//! ```
//!
//! Payloads are UTF-8 text. Surrounding whitespace (including a trailing
//! newline) is ignored, as is whitespace around each comma-separated field.
//! Integers are base-10 with an optional sign and no range check beyond `i64`.

use std::fmt;
use std::num::ParseIntError;
use std::str::Utf8Error;

use crate::role::SenderRole;

/// Why a datagram body could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedPayload {
    #[error("payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] Utf8Error),

    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("field {field} is not an integer: {value:?} ({source})")]
    InvalidInteger {
        field: usize,
        value: String,
        source: ParseIntError,
    },
}

/// A fully decoded payload, tagged by the role that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reading {
    ThreeChannel([i64; 3]),
    OneChannel(i64),
}

impl Reading {
    /// The sender role whose channels this reading updates.
    pub fn role(&self) -> SenderRole {
        match self {
            Reading::ThreeChannel(_) => SenderRole::ThreeChannel,
            Reading::OneChannel(_) => SenderRole::OneChannel,
        }
    }
}

/// Renders the reading in its wire format.
impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::ThreeChannel([a, b, c]) => write!(f, "{a},{b},{c}"),
            Reading::OneChannel(v) => write!(f, "{v}"),
        }
    }
}

/// Decodes a datagram body according to the sender's role.
///
/// A three-channel payload is all-or-nothing: if any field fails to parse no
/// values are returned, so the caller never applies a partial group.
pub fn decode(role: SenderRole, raw: &[u8]) -> Result<Reading, MalformedPayload> {
    let text = std::str::from_utf8(raw)?.trim();

    match role {
        SenderRole::ThreeChannel => {
            let fields: Vec<&str> = text.split(',').collect();
            let [a, b, c] = fields[..] else {
                return Err(MalformedPayload::FieldCount {
                    expected: role.field_count(),
                    found: fields.len(),
                });
            };
            Ok(Reading::ThreeChannel([
                parse_field(0, a)?,
                parse_field(1, b)?,
                parse_field(2, c)?,
            ]))
        }
        SenderRole::OneChannel => Ok(Reading::OneChannel(parse_field(0, text)?)),
    }
}

fn parse_field(field: usize, value: &str) -> Result<i64, MalformedPayload> {
    let value = value.trim();
    value
        .parse::<i64>()
        .map_err(|source| MalformedPayload::InvalidInteger {
            field,
            value: value.to_string(),
            source,
        })
}
