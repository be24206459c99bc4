use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "CardioRisk";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default listen address (the web form posts to 127.0.0.1:8000)
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

/// Default SQLite database location, relative to the working directory
pub const DEFAULT_DATABASE_PATH: &str = "data/cardiorisk.db";

/// Default classifier artifact location, relative to the working directory
pub const DEFAULT_MODEL_PATH: &str = "models/heart_disease_pipeline.json";

/// SMTP relay used for clinician alerts (implicit TLS)
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 465;

/// Environment secrets for the alert mailbox
pub const SENDER_EMAIL_VAR: &str = "SENDER_EMAIL";
pub const SENDER_PASSWORD_VAR: &str = "SENDER_PASSWORD";

const BIND_ADDR_VAR: &str = "CARDIORISK_BIND_ADDR";
const DATABASE_PATH_VAR: &str = "CARDIORISK_DATABASE_PATH";
const MODEL_PATH_VAR: &str = "CARDIORISK_MODEL_PATH";
const SMTP_HOST_VAR: &str = "CARDIORISK_SMTP_HOST";
const SMTP_PORT_VAR: &str = "CARDIORISK_SMTP_PORT";

/// Log filter used when `RUST_LOG` is unset
pub fn default_log_filter() -> &'static str {
    "cardiorisk_lib=info,cardiorisk=info,tower_http=warn"
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

/// SMTP settings. Credentials stay optional: without them alerts are
/// skipped and reported as not sent.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub sender_email: Option<String>,
    pub sender_password: Option<String>,
}

impl SmtpConfig {
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.sender_email.as_deref(), self.sender_password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SMTP_HOST.to_string(),
            port: DEFAULT_SMTP_PORT,
            sender_email: None,
            sender_password: None,
        }
    }
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    pub model_path: PathBuf,
    pub smtp: SmtpConfig,
}

impl Config {
    /// Build configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (tests inject a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_raw = lookup(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|_| ConfigError::InvalidValue {
            var: BIND_ADDR_VAR,
            value: bind_raw.clone(),
        })?;

        let smtp_port = match lookup(SMTP_PORT_VAR) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                var: SMTP_PORT_VAR,
                value: raw.clone(),
            })?,
            None => DEFAULT_SMTP_PORT,
        };

        Ok(Self {
            bind_addr,
            database_path: lookup(DATABASE_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH)),
            model_path: lookup(MODEL_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH)),
            smtp: SmtpConfig {
                host: lookup(SMTP_HOST_VAR).unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
                port: smtp_port,
                sender_email: lookup(SENDER_EMAIL_VAR),
                sender_password: lookup(SENDER_PASSWORD_VAR),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_empty() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DATABASE_PATH));
        assert_eq!(config.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
        assert_eq!(config.smtp.host, "smtp.gmail.com");
        assert_eq!(config.smtp.port, 465);
        assert!(config.smtp.credentials().is_none());
    }

    #[test]
    fn overrides_are_applied() {
        let config = Config::from_lookup(lookup_from(&[
            ("CARDIORISK_BIND_ADDR", "0.0.0.0:9000"),
            ("CARDIORISK_DATABASE_PATH", "/tmp/risk.db"),
            ("CARDIORISK_SMTP_PORT", "2465"),
            ("SENDER_EMAIL", "alerts@clinic.test"),
            ("SENDER_PASSWORD", "hunter2"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.database_path, PathBuf::from("/tmp/risk.db"));
        assert_eq!(config.smtp.port, 2465);
        assert_eq!(
            config.smtp.credentials(),
            Some(("alerts@clinic.test", "hunter2"))
        );
    }

    #[test]
    fn invalid_bind_addr_rejected() {
        let result = Config::from_lookup(lookup_from(&[("CARDIORISK_BIND_ADDR", "nowhere")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { var: "CARDIORISK_BIND_ADDR", .. })
        ));
    }

    #[test]
    fn invalid_smtp_port_rejected() {
        let result = Config::from_lookup(lookup_from(&[("CARDIORISK_SMTP_PORT", "smtp")]));
        assert!(result.is_err());
    }

    #[test]
    fn blank_credentials_are_treated_as_missing() {
        let smtp = SmtpConfig {
            sender_email: Some(String::new()),
            sender_password: Some("x".into()),
            ..SmtpConfig::default()
        };
        assert!(smtp.credentials().is_none());
    }

    #[test]
    fn app_name_is_cardiorisk() {
        assert_eq!(APP_NAME, "CardioRisk");
    }
}
