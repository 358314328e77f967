//! Receiver configuration management.
//!
//! Configuration is stored as TOML:
//! - `$SENSORLINK_CONFIG` when set
//! - Linux: `~/.config/sensorlink/sensorlink.toml`
//! - Windows: `%APPDATA%/sensorlink/sensorlink.toml`
//!
//! It is read once at startup; edits take effect on the next start.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, ensure};
use sensorlink_aggregator::Classifier;
use sensorlink_gps::PortSettings;
use serde::{Deserialize, Serialize};

/// Environment variable that overrides the configuration file location.
const CONFIG_ENV: &str = "SENSORLINK_CONFIG";

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub receiver: ReceiverConfig,

    #[serde(default)]
    pub gps: GpsConfig,
}

/// UDP aggregation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiverConfig {
    /// Local interface to listen on (`0.0.0.0` = all).
    #[serde(default = "default_bind_ip")]
    pub bind_ip: IpAddr,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Receive buffer in bytes; longer datagrams are truncated.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Address of the transmitter sending `"<int>,<int>,<int>"`.
    #[serde(default = "default_three_channel_sender")]
    pub three_channel_sender: IpAddr,

    /// Address of the transmitter sending `"<int>"`.
    #[serde(default = "default_one_channel_sender")]
    pub one_channel_sender: IpAddr,

    /// Emission interval in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

/// Serial GPS settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsConfig {
    #[serde(default = "default_gps_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_bind_ip() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    sensorlink_aggregator::DEFAULT_PORT
}

fn default_buffer_size() -> usize {
    sensorlink_aggregator::DEFAULT_BUFFER_SIZE
}

fn default_three_channel_sender() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(192, 168, 4, 201))
}

fn default_one_channel_sender() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(192, 168, 4, 202))
}

fn default_interval_ms() -> u64 {
    sensorlink_aggregator::DEFAULT_INTERVAL.as_millis() as u64
}

fn default_gps_port() -> String {
    sensorlink_gps::DEFAULT_PORT.into()
}

fn default_baud_rate() -> u32 {
    sensorlink_gps::DEFAULT_BAUD_RATE
}

fn default_timeout_ms() -> u64 {
    sensorlink_gps::DEFAULT_TIMEOUT.as_millis() as u64
}

fn default_retry_delay_ms() -> u64 {
    sensorlink_gps::DEFAULT_RETRY_DELAY.as_millis() as u64
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            bind_ip: default_bind_ip(),
            port: default_port(),
            buffer_size: default_buffer_size(),
            three_channel_sender: default_three_channel_sender(),
            one_channel_sender: default_one_channel_sender(),
            interval_ms: default_interval_ms(),
        }
    }
}

impl Default for GpsConfig {
    fn default() -> Self {
        Self {
            port: default_gps_port(),
            baud_rate: default_baud_rate(),
            timeout_ms: default_timeout_ms(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl ReceiverConfig {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_ip, self.port)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn classifier(&self) -> Classifier {
        Classifier::new(self.three_channel_sender, self.one_channel_sender)
    }
}

impl GpsConfig {
    pub fn port_settings(&self) -> PortSettings {
        PortSettings {
            path: self.port.clone(),
            baud_rate: self.baud_rate,
            timeout: Duration::from_millis(self.timeout_ms),
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

impl Config {
    /// Loads configuration from disk, or creates a default if not found.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&config_path()?)
    }

    /// Loads and validates the file at `path`, writing defaults if it is missing.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("invalid configuration in {}", path.display()))?
        } else {
            let config = Config::default();
            if let Err(e) = config.save_to(path) {
                tracing::warn!(path = %path.display(), "could not write default configuration: {e:#}");
            }
            config
        };

        config.validate()?;
        tracing::debug!(path = %path.display(), "configuration read");
        Ok(config)
    }

    /// Saves the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Rejects settings the receiver cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        let r = &self.receiver;
        ensure!(r.buffer_size > 0, "receiver.buffer_size must be greater than 0");
        ensure!(r.interval_ms > 0, "receiver.interval_ms must be greater than 0");
        ensure!(
            r.three_channel_sender != r.one_channel_sender,
            "receiver.three_channel_sender and receiver.one_channel_sender must differ (both {})",
            r.one_channel_sender
        );
        // Senders are matched exactly, so an IPv6 socket would only ever see
        // IPv4 transmitters as mapped `::ffff:` addresses.
        for (name, sender) in [
            ("three_channel_sender", r.three_channel_sender),
            ("one_channel_sender", r.one_channel_sender),
        ] {
            ensure!(
                sender.is_ipv4() == r.bind_ip.is_ipv4(),
                "receiver.{name} ({sender}) must be the same address family as receiver.bind_ip ({})",
                r.bind_ip
            );
        }
        ensure!(self.gps.baud_rate > 0, "gps.baud_rate must be greater than 0");
        Ok(())
    }
}

/// Returns the configuration file path.
fn config_path() -> anyhow::Result<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }

    #[cfg(target_os = "linux")]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        Ok(PathBuf::from(home)
            .join(".config")
            .join("sensorlink")
            .join("sensorlink.toml"))
    }

    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        Ok(PathBuf::from(appdata)
            .join("sensorlink")
            .join("sensorlink.toml"))
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        Ok(PathBuf::from("/tmp/sensorlink/sensorlink.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.receiver.bind_addr().to_string(), "0.0.0.0:4210");
        assert_eq!(config.receiver.buffer_size, 255);
        assert_eq!(
            config.receiver.three_channel_sender.to_string(),
            "192.168.4.201"
        );
        assert_eq!(config.receiver.one_channel_sender.to_string(), "192.168.4.202");
        assert_eq!(config.receiver.interval(), Duration::from_millis(100));
        assert_eq!(config.gps.port, "/dev/serial0");
        assert_eq!(config.gps.baud_rate, 38_400);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = Config {
            receiver: ReceiverConfig {
                port: 5000,
                interval_ms: 250,
                one_channel_sender: "10.0.0.7".parse().unwrap(),
                ..ReceiverConfig::default()
            },
            gps: GpsConfig {
                port: "/dev/ttyACM0".into(),
                ..GpsConfig::default()
            },
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn config_partial_toml() {
        // Only one field set, the rest should use defaults.
        let toml_str = "[receiver]\nport = 4300\n";
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.receiver.port, 4300);
        assert_eq!(config.receiver.buffer_size, 255);
        assert_eq!(config.gps, GpsConfig::default());
    }

    #[test]
    fn invalid_sender_address_is_rejected() {
        let toml_str = "[receiver]\nthree_channel_sender = \"not-an-ip\"\n";
        assert!(toml::from_str::<Config>(toml_str).is_err());
    }

    #[test]
    fn validation_rejects_unusable_settings() {
        let mut config = Config::default();
        config.receiver.interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.receiver.buffer_size = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.receiver.one_channel_sender = config.receiver.three_channel_sender;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validation_rejects_mixed_address_families() {
        let mut config = Config::default();
        config.receiver.bind_ip = "::".parse().unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("three_channel_sender"));

        config.receiver.three_channel_sender = "fd00::201".parse().unwrap();
        assert!(config.validate().is_err());

        config.receiver.one_channel_sender = "fd00::202".parse().unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn classifier_uses_configured_senders() {
        let receiver = ReceiverConfig::default();
        let classifier = receiver.classifier();
        assert_eq!(
            classifier.classify("192.168.4.202".parse().unwrap()),
            Some(sensorlink_protocol::SenderRole::OneChannel)
        );
    }

    #[test]
    fn gps_port_settings() {
        let settings = GpsConfig::default().port_settings();
        assert_eq!(settings, PortSettings::default());
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("sensorlink.toml");

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn invalid_file_fails_to_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("sensorlink.toml");
        std::fs::write(&path, "[receiver]\ninterval_ms = 0\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn config_path_not_empty() {
        let path = config_path().unwrap();
        assert!(!path.as_os_str().is_empty());
    }
}
