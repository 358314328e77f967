//! Error types for the aggregation loop.

use std::net::SocketAddr;

/// Errors that stop the aggregator.
///
/// Everything else (unknown senders, malformed payloads, transient socket
/// errors) is absorbed by the loop and reported as a
/// [`SkipReason`](crate::SkipReason).
#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error("failed to bind UDP socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("failed to write telemetry output: {0}")]
    Emit(#[from] std::io::Error),
}
