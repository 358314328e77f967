//! Command orchestration: wires configuration to the aggregator and GPS reader.

use std::io::Write;

use anyhow::{Context, bail};
use sensorlink_aggregator::{DatagramSource, Emitter, Stats, UdpDatagramSource};
use sensorlink_protocol::SenderRole;
use tokio_util::sync::CancellationToken;

use crate::config::{GpsConfig, ReceiverConfig};

/// What the binary was asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Stream UDP telemetry as CSV until interrupted (default).
    Receive,
    /// Read one GPS fix, print it and exit.
    Gps,
}

impl Command {
    /// Parses the arguments following the program name.
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> anyhow::Result<Self> {
        let mut args = args.into_iter();
        let command = match args.next().as_deref() {
            None | Some("receive") => Command::Receive,
            Some("gps") => Command::Gps,
            Some(other) => bail!("unknown command {other:?} (expected `receive` or `gps`)"),
        };
        if let Some(extra) = args.next() {
            bail!("unexpected argument {extra:?}");
        }
        Ok(command)
    }
}

/// Returns a token that is cancelled on the first Ctrl+C.
///
/// Must be called from within a tokio runtime.
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("SIGINT received, shutting down");
                on_signal.cancel();
            }
            Err(e) => tracing::error!("failed to listen for Ctrl+C: {e}"),
        }
    });
    cancel
}

/// Runs the UDP aggregation loop, writing CSV to `out` until `cancel` fires.
///
/// A bind failure is returned before anything is written to `out`. The socket
/// is released before this returns.
pub async fn run_receiver<W: Write>(
    config: ReceiverConfig,
    out: &mut W,
    cancel: CancellationToken,
) -> anyhow::Result<Stats> {
    let source = UdpDatagramSource::bind(config.bind_addr(), config.buffer_size)
        .await
        .context("UDP receiver could not start; check whether the port is already in use or needs extra permissions")?;
    let classifier = config.classifier();

    tracing::info!(
        addr = %source.local_addr()?,
        buffer_size = source.buffer_size(),
        three_channel_sender = %classifier.address(SenderRole::ThreeChannel),
        one_channel_sender = %classifier.address(SenderRole::OneChannel),
        interval_ms = config.interval_ms,
        "UDP listening"
    );

    let mut emitter = Emitter::new(source, classifier, config.interval());
    let stats = emitter.run(out, cancel).await?;

    tracing::info!(
        iterations = stats.iterations,
        updated = stats.updated,
        malformed = stats.malformed,
        unknown_sender = stats.unknown_sender,
        "receiver terminated by user"
    );

    // Dropping the emitter closes the socket.
    drop(emitter);
    Ok(stats)
}

/// Blocks until the GPS module reports a valid fix, then prints it.
pub fn read_gps_fix(config: &GpsConfig) -> anyhow::Result<()> {
    let settings = config.port_settings();
    let fix = sensorlink_gps::read_fix_from_port(&settings).with_context(|| {
        format!(
            "GPS read failed on {}; check the port name and that no other process (e.g. gpsd) is using it",
            settings.path
        )
    })?;

    match fix {
        Some(fix) => {
            let mut out = std::io::stdout().lock();
            writeln!(out, "{fix}")?;
            out.flush()?;
        }
        None => tracing::warn!(path = %settings.path, "GPS stream ended without a valid fix"),
    }
    Ok(())
}
