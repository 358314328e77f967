//! SensorLink receiver entry point.
//!
//! `sensorlink [receive]` streams ADC telemetry as CSV on stdout until Ctrl+C.
//! `sensorlink gps` reads one GPS fix from the serial module and prints it.

mod app;
mod config;

use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // stdout carries the telemetry stream; logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let command = app::Command::from_args(std::env::args().skip(1))?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        ?command,
        "starting SensorLink"
    );

    let config = config::Config::load()?;
    tracing::info!("configuration loaded");

    match command {
        app::Command::Receive => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(async {
                let cancel = app::cancel_on_ctrl_c();
                let mut out = std::io::stdout().lock();
                app::run_receiver(config.receiver, &mut out, cancel).await
            })?;
        }
        app::Command::Gps => app::read_gps_fix(&config.gps)?,
    }

    Ok(())
}
