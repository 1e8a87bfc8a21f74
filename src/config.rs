use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub notification_webhook_url: Option<String>,
    pub webhook_secret: Option<String>,
    pub api_rps: u32,
    pub public_rps: u32,
    pub notify_timeout_secs: u64,
    pub id_max_attempts: u32,
    pub log_format: LogFormat,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let notification_webhook_url = optional(&lookup, "NOTIFICATION_WEBHOOK_URL");
        let webhook_secret = optional(&lookup, "WEBHOOK_SECRET");
        if notification_webhook_url.is_some() && webhook_secret.is_none() {
            return Err(Error::Config(
                "WEBHOOK_SECRET is required when NOTIFICATION_WEBHOOK_URL is set".to_string(),
            ));
        }

        let log_format = match optional(&lookup, "LOG_FORMAT").as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(Error::Config(format!(
                    "Invalid value for LOG_FORMAT: {}",
                    other
                )))
            }
        };

        Ok(Self {
            server_address: required(&lookup, "SERVER_ADDRESS")?,
            database_url: optional(&lookup, "DATABASE_URL"),
            jwt_secret: required(&lookup, "JWT_SECRET")?,
            notification_webhook_url,
            webhook_secret,
            api_rps: parse_or(&lookup, "API_RPS", 50)?,
            public_rps: parse_or(&lookup, "PUBLIC_RPS", 20)?,
            notify_timeout_secs: parse_or(&lookup, "NOTIFY_TIMEOUT_SECS", 10)?,
            id_max_attempts: parse_or(&lookup, "ID_MAX_ATTEMPTS", 16)?,
            log_format,
        })
    }
}

fn optional<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|v| !v.trim().is_empty())
}

fn required<F>(lookup: &F, name: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, name)
        .ok_or_else(|| Error::Config(format!("Missing environment variable: {}", name)))
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match optional(lookup, name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
    }
}

pub fn init_config() -> Result<&'static Config> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    get_config()
}

pub fn get_config() -> Result<&'static Config> {
    CONFIG
        .get()
        .ok_or_else(|| Error::Config("Configuration has not been initialized".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("SERVER_ADDRESS", "127.0.0.1:8080"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.database_url, None);
        assert_eq!(config.notification_webhook_url, None);
        assert_eq!(config.api_rps, 50);
        assert_eq!(config.public_rps, 20);
        assert_eq!(config.notify_timeout_secs, 10);
        assert_eq!(config.id_max_attempts, 16);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn missing_jwt_secret_is_a_config_error() {
        let err = Config::from_lookup(lookup(&[("SERVER_ADDRESS", "127.0.0.1:8080")]))
            .unwrap_err();
        assert_eq!(err.kind(), "config_error");
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn webhook_url_requires_secret() {
        let err = Config::from_lookup(lookup(&[
            ("SERVER_ADDRESS", "127.0.0.1:8080"),
            ("JWT_SECRET", "secret"),
            ("NOTIFICATION_WEBHOOK_URL", "http://localhost/notify"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("WEBHOOK_SECRET"));
    }

    #[test]
    fn unparsable_numbers_are_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("SERVER_ADDRESS", "127.0.0.1:8080"),
            ("JWT_SECRET", "secret"),
            ("API_RPS", "many"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("API_RPS"));
    }

    #[test]
    fn json_log_format_is_recognised() {
        let config = Config::from_lookup(lookup(&[
            ("SERVER_ADDRESS", "127.0.0.1:8080"),
            ("JWT_SECRET", "secret"),
            ("LOG_FORMAT", "json"),
        ]))
        .unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
    }
}
