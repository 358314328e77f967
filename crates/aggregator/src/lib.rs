//! UDP telemetry aggregation for SensorLink.
//!
//! A single [`Emitter`] owns the bound [`UdpDatagramSource`], classifies each
//! datagram by sender address, decodes it per role and keeps the latest value
//! of every channel in [`TelemetryState`]. Once per interval it writes the
//! current [`Snapshot`](sensorlink_protocol::Snapshot) as a CSV row, whether or
//! not anything arrived.

pub mod classifier;
pub mod emitter;
pub mod error;
pub mod source;
pub mod state;

pub use classifier::Classifier;
pub use emitter::{Emitter, Outcome, SkipReason, Stats};
pub use error::AggregatorError;
pub use source::{Datagram, DatagramSource, UdpDatagramSource};
pub use state::TelemetryState;

use std::time::Duration;

/// Default UDP port the transmitters send to.
pub const DEFAULT_PORT: u16 = 4210;

/// Default receive buffer size; longer datagrams are truncated by the transport.
pub const DEFAULT_BUFFER_SIZE: usize = 255;

/// Default emission interval, matching the transmitters' send cadence.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);
