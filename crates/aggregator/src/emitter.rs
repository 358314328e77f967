//! Fixed-cadence emission loop.
//!
//! Each iteration makes exactly one non-blocking receive attempt, applies the
//! datagram if it classifies and decodes cleanly, then writes the current
//! snapshot and sleeps for the configured interval. Nothing that happens to a
//! single datagram changes the cadence.

use std::io::{self, Write};
use std::net::IpAddr;
use std::time::Duration;

use sensorlink_protocol::{CSV_HEADER, MalformedPayload, Reading, SenderRole, Snapshot, decode};
use tokio_util::sync::CancellationToken;

use crate::AggregatorError;
use crate::classifier::Classifier;
use crate::source::DatagramSource;
use crate::state::TelemetryState;

/// Result of one receive attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A reading was decoded and applied to the state.
    Updated(Reading),
    /// Nothing was applied this iteration.
    Skipped(SkipReason),
}

/// Why an iteration left the state untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoData,
    UnknownSender(IpAddr),
    Malformed {
        role: SenderRole,
        error: MalformedPayload,
    },
    /// Socket error other than "would block"; treated as no data.
    Transient(io::ErrorKind),
}

/// Per-outcome iteration counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub iterations: u64,
    pub updated: u64,
    pub no_data: u64,
    pub unknown_sender: u64,
    pub malformed: u64,
    pub transient: u64,
}

impl Stats {
    fn record(&mut self, outcome: &Outcome) {
        self.iterations += 1;
        let counter = match outcome {
            Outcome::Updated(_) => &mut self.updated,
            Outcome::Skipped(SkipReason::NoData) => &mut self.no_data,
            Outcome::Skipped(SkipReason::UnknownSender(_)) => &mut self.unknown_sender,
            Outcome::Skipped(SkipReason::Malformed { .. }) => &mut self.malformed,
            Outcome::Skipped(SkipReason::Transient(_)) => &mut self.transient,
        };
        *counter += 1;
    }
}

/// Owns the datagram source and the telemetry state for the process lifetime.
pub struct Emitter<S> {
    source: S,
    classifier: Classifier,
    state: TelemetryState,
    interval: Duration,
    stats: Stats,
}

impl<S: DatagramSource> Emitter<S> {
    pub fn new(source: S, classifier: Classifier, interval: Duration) -> Self {
        Self {
            source,
            classifier,
            state: TelemetryState::new(),
            interval,
            stats: Stats::default(),
        }
    }

    /// Receives at most one datagram and applies it if valid.
    pub fn poll_once(&mut self) -> Outcome {
        let outcome = match self.source.try_receive() {
            Ok(None) => Outcome::Skipped(SkipReason::NoData),
            Err(e) => {
                tracing::debug!(error = %e, "socket error during poll");
                Outcome::Skipped(SkipReason::Transient(e.kind()))
            }
            Ok(Some(datagram)) => {
                let ip = datagram.from.ip();
                match self.classifier.classify(ip) {
                    None => {
                        tracing::trace!(%ip, "datagram from unknown sender dropped");
                        Outcome::Skipped(SkipReason::UnknownSender(ip))
                    }
                    Some(role) => match decode(role, datagram.payload) {
                        Ok(reading) => {
                            self.state.apply(&reading);
                            tracing::trace!(%role, %reading, "reading applied");
                            Outcome::Updated(reading)
                        }
                        Err(error) => {
                            tracing::debug!(%role, %error, "malformed payload dropped");
                            Outcome::Skipped(SkipReason::Malformed { role, error })
                        }
                    },
                }
            }
        };

        self.stats.record(&outcome);
        outcome
    }

    /// Writes the current snapshot as one CSV row and flushes.
    pub fn emit<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", self.state.snapshot())?;
        out.flush()
    }

    /// Runs until `cancel` fires: header once, then poll, emit and sleep.
    ///
    /// Returns the iteration counters. Fails only if `out` stops accepting
    /// writes.
    pub async fn run<W: Write>(
        &mut self,
        out: &mut W,
        cancel: CancellationToken,
    ) -> Result<Stats, AggregatorError> {
        writeln!(out, "{CSV_HEADER}")?;
        out.flush()?;

        tracing::debug!(interval_ms = self.interval.as_millis() as u64, "emission loop started");

        while !cancel.is_cancelled() {
            self.poll_once();
            self.emit(out)?;

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        tracing::debug!(stats = ?self.stats, "emission loop stopped");
        Ok(self.stats)
    }

    /// Current channel values.
    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }
}
