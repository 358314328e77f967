//! Payload formats for SensorLink telemetry.
//!
//! Remote ADC transmitters send short UTF-8 text datagrams; this crate knows
//! which shape each sender role uses, how to decode it, and how the aggregated
//! snapshot is rendered on the CSV egress stream.

pub mod payload;
pub mod role;
pub mod snapshot;

pub use payload::{MalformedPayload, Reading, decode};
pub use role::SenderRole;
pub use snapshot::{CSV_HEADER, Snapshot};
