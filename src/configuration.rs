use std::net::SocketAddr;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

/// Environment variables override the file, e.g. `TRIVIA_APPLICATION__PORT=8000`.
const ENV_PREFIX: &str = "TRIVIA";

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

impl ApplicationSettings {
    pub fn address(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    pub url: SecretString,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_connections: u32,
}

impl DatabaseSettings {
    pub fn url(&self) -> &str {
        self.url.expose_secret()
    }
}

/// Reads `configuration.{yaml,toml,json}` from the working directory if present.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    get_configuration_from("configuration")
}

pub fn get_configuration_from(base: &str) -> Result<Settings, config::ConfigError> {
    dotenv::dotenv().ok();
    config::Config::builder()
        .set_default("application.host", "127.0.0.1")?
        .set_default("application.port", 5000)?
        .set_default("database.url", "sqlite:trivia.db")?
        .set_default("database.max_connections", 5)?
        .add_source(config::File::with_name(base).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_apply_without_a_file() {
        let settings = get_configuration_from("no-such-configuration").unwrap();
        assert_eq!(settings.application.port, 5000);
        assert_eq!(settings.database.max_connections, 5);
        assert!(settings.database.url().starts_with("sqlite:"));
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "application:\n  host: \"0.0.0.0\"\n  port: \"8080\"\ndatabase:\n  url: \"sqlite::memory:\""
        )
        .unwrap();
        let base = file.path().with_extension("");

        let settings = get_configuration_from(base.to_str().unwrap()).unwrap();
        assert_eq!(settings.application.port, 8080);
        assert_eq!(settings.database.url(), "sqlite::memory:");
        assert_eq!(
            settings.application.address().unwrap().to_string(),
            "0.0.0.0:8080"
        );
    }

    #[test]
    fn secret_url_is_redacted_in_debug() {
        let settings = get_configuration_from("no-such-configuration").unwrap();
        assert!(!format!("{:?}", settings.database).contains("trivia.db"));
    }
}
