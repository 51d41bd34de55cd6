use thiserror::Error;

use crate::notify::MailConfig;

const DEFAULT_JWT_SECRET: &str = "gestion-pro-dev-secret";
const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has an invalid value: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Server configuration loaded from environment variables.
///
/// | Env Var                    | Default                              |
/// |----------------------------|--------------------------------------|
/// | `DATABASE_URL`             | required                             |
/// | `HOST`                     | `0.0.0.0`                            |
/// | `PORT`                     | `5000`                               |
/// | `DATABASE_MAX_CONNECTIONS` | `5`                                  |
/// | `CORS_ORIGINS`             | any origin                           |
/// | `JWT_SECRET`               | development secret                   |
/// | `GRAPH_BASE_URL`           | `https://graph.microsoft.com/v1.0`   |
///
/// SMTP settings are described on [`MailConfig`].
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    /// Empty means any origin is allowed.
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub graph_base_url: String,
    /// `None` disables email notifications.
    pub mail: Option<MailConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup (the process environment
    /// in production, a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_or(&lookup, "PORT", 5000)?;
        let max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?;

        let cors_origins = lookup("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty() && s != "*")
                    .collect()
            })
            .unwrap_or_default();

        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!("JWT_SECRET not set, using the development secret");
                DEFAULT_JWT_SECRET.to_string()
            }
        };

        let graph_base_url = lookup("GRAPH_BASE_URL")
            .unwrap_or_else(|| DEFAULT_GRAPH_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let mail = MailConfig::from_lookup(&lookup)?;

        Ok(Config {
            host,
            port,
            database_url,
            max_connections,
            cors_origins,
            jwt_secret,
            graph_base_url,
            mail,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub(crate) fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}
