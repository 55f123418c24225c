use anyhow::{Result, anyhow};
use config::{Config, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub http: Http,
    pub log: Log,
    pub passport: Passport,
    pub store: Store,
    pub identity: Backend,
    pub messaging: Messaging,
    pub registry: Backend,
    pub password: Backend,
    pub redis: Option<Redis>,
    pub mysql: Option<MySql>,
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub cert_path: String,
    pub key_path: String,
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[derive(Debug, Deserialize)]
pub struct Passport {
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
    #[serde(default = "default_resend_interval_secs")]
    pub default_resend_interval_secs: i64,
}

#[derive(Debug, Deserialize)]
pub struct Store {
    pub backend: String, // "memory" or "redis"
}

#[derive(Debug, Deserialize)]
pub struct Backend {
    pub backend: String, // "fake" or "real"
}

#[derive(Debug, Deserialize)]
pub struct Messaging {
    pub backend: String,   // "fake" or "real"
    pub deliverer: String, // "log" or "kafka"
    #[serde(default = "default_token_ttl_secs")]
    pub code_ttl_secs: u64,
    #[serde(default)]
    pub hmac_secret: String,
    pub kafka_brokers: Option<String>,
    pub kafka_topic: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Redis {
    pub dsn: String,
    pub prefix: String,
}

#[derive(Debug, Deserialize)]
pub struct MySql {
    pub dsn: String,
}

fn default_token_ttl_secs() -> u64 {
    600
}

fn default_resend_interval_secs() -> i64 {
    120
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_dev_settings_parse() {
        let settings = parse_settings(Some("settings/dev.toml")).unwrap();
        assert_eq!(settings.store.backend, "memory");
        assert_eq!(settings.passport.token_ttl_secs, 600);
        assert_eq!(settings.passport.default_resend_interval_secs, 120);
        assert_eq!(settings.messaging.deliverer, "log");
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(parse_settings(Some("settings/does-not-exist.toml")).is_err());
    }
}
