use config::{Config, Environment, File};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::error::ConfigError;

pub const DEFAULT_STATUS_URL: &str = "http://web.mta.info/status/serviceStatus.txt";
const DEFAULT_CONFIG_FILE: &str = "subway-status";

/// Runtime settings.
/// Layered as defaults, then `subway-status.toml` (optional), then `MTA_*` env vars,
/// so `MTA_STATUS_URL` overrides `status_url`.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub status_url: String,
    pub bind_address: String,
    pub request_timeout_secs: u64,
}

impl Settings {
    /// Load settings, reading `path` (required) when given
    /// or the default file (optional) otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = Config::builder()
            .set_default("status_url", DEFAULT_STATUS_URL)?
            .set_default("bind_address", "127.0.0.1:8080")?
            .set_default("request_timeout_secs", 10_i64)?
            .add_source(file)
            .add_source(
                Environment::with_prefix("MTA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        info!(status_url = %settings.status_url, "configuration loaded");
        Ok(settings)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_address
            .parse()
            .map_err(|source| ConfigError::BindAddress {
                address: self.bind_address.clone(),
                source,
            })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn toml_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    #[test]
    #[serial]
    fn test_defaults_apply_with_empty_file() {
        let file = toml_file("");
        let settings = Settings::load(Some(file.path())).unwrap();

        assert_eq!(settings.request_timeout(), Duration::from_secs(10));
        assert_eq!(settings.socket_addr().unwrap().port(), 8080);
        assert!(settings.status_url.starts_with("http"));
    }

    #[test]
    #[serial]
    fn test_file_overrides_defaults() {
        let file = toml_file(
            "status_url = \"http://localhost:9000/status.xml\"\n\
             bind_address = \"0.0.0.0:3000\"\n\
             request_timeout_secs = 3\n",
        );
        let settings = Settings::load(Some(file.path())).unwrap();

        assert_eq!(settings.status_url, "http://localhost:9000/status.xml");
        assert_eq!(settings.socket_addr().unwrap().port(), 3000);
        assert_eq!(settings.request_timeout(), Duration::from_secs(3));
    }

    #[test]
    #[serial]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        assert!(matches!(
            Settings::load(Some(&missing)),
            Err(ConfigError::Load(_))
        ));
    }

    #[test]
    #[serial]
    fn test_bad_bind_address() {
        let file = toml_file("bind_address = \"not-an-address\"\n");
        let settings = Settings::load(Some(file.path())).unwrap();

        assert!(matches!(
            settings.socket_addr(),
            Err(ConfigError::BindAddress { .. })
        ));
    }

    #[test]
    #[serial]
    fn test_environment_overrides_file() {
        let file = toml_file("status_url = \"http://from-file/status.xml\"\n");
        let keys = ["MTA_STATUS_URL", "MTA_REQUEST_TIMEOUT_SECS"];
        let previous: Vec<(&str, Option<String>)> =
            keys.into_iter().map(|key| (key, std::env::var(key).ok())).collect();

        std::env::set_var("MTA_STATUS_URL", "http://from-env/status.xml");
        std::env::set_var("MTA_REQUEST_TIMEOUT_SECS", "4");
        let loaded = Settings::load(Some(file.path()));

        for (key, value) in previous {
            match value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
        }

        let settings = loaded.unwrap();
        assert_eq!(settings.status_url, "http://from-env/status.xml");
        assert_eq!(settings.request_timeout(), Duration::from_secs(4));
    }
}
