use std::env;
use chrono_tz::Tz;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub mail_service_url: String,
    pub mail_service_token: String,
    pub jwt_secret_key: String, // Private key (PEM)
    pub jwt_public_key: String, // Public key (PEM)
    pub auth_issuer: String,
    pub business_timezone: Tz,
    pub app_url: String,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub job_poll_interval_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so parsing can be tested without touching the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).filter(|v| !v.is_empty()).ok_or(ConfigError::Missing(key));

        let port = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid { key: "PORT", reason: format!("'{}' is not a port number", raw) })?,
            None => 3000,
        };

        let business_timezone = match lookup("BUSINESS_TIMEZONE") {
            Some(raw) => raw.parse::<Tz>().map_err(|e| ConfigError::Invalid { key: "BUSINESS_TIMEZONE", reason: e.to_string() })?,
            None => chrono_tz::UTC,
        };

        let job_poll_interval_ms = match lookup("JOB_POLL_INTERVAL_MS") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid { key: "JOB_POLL_INTERVAL_MS", reason: format!("'{}' is not a number", raw) })?,
            None => 5000,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            port,
            mail_service_url: lookup("MAIL_SERVICE_URL").unwrap_or_else(|| "http://localhost:8000/api/v1/send".to_string()),
            mail_service_token: lookup("MAIL_SERVICE_TOKEN").unwrap_or_else(|| "test-token-1".to_string()),
            jwt_secret_key: required("JWT_SECRET_KEY")?,
            jwt_public_key: required("JWT_PUBLIC_KEY")?,
            auth_issuer: lookup("AUTH_ISSUER").unwrap_or_else(|| "https://api.booked.local".to_string()),
            business_timezone,
            app_url: lookup("APP_URL").unwrap_or_else(|| "http://localhost:5173".to_string()),
            admin_email: lookup("ADMIN_EMAIL").filter(|v| !v.is_empty()),
            admin_password: lookup("ADMIN_PASSWORD").filter(|v| !v.is_empty()),
            job_poll_interval_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    const BASE: [(&str, &str); 3] = [
        ("DATABASE_URL", "sqlite://booked.db"),
        ("JWT_SECRET_KEY", "priv"),
        ("JWT_PUBLIC_KEY", "pub"),
    ];

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&BASE)).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.business_timezone, chrono_tz::UTC);
        assert_eq!(config.job_poll_interval_ms, 5000);
        assert!(config.admin_email.is_none());
    }

    #[test]
    fn test_missing_required_key() {
        let err = Config::from_lookup(lookup_from(&BASE[..1])).err().unwrap();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET_KEY")));
    }

    #[test]
    fn test_invalid_timezone_and_port() {
        let mut pairs = BASE.to_vec();
        pairs.push(("BUSINESS_TIMEZONE", "Mars/Olympus"));
        assert!(matches!(Config::from_lookup(lookup_from(&pairs)), Err(ConfigError::Invalid { key: "BUSINESS_TIMEZONE", .. })));

        let mut pairs = BASE.to_vec();
        pairs.push(("PORT", "eighty"));
        assert!(matches!(Config::from_lookup(lookup_from(&pairs)), Err(ConfigError::Invalid { key: "PORT", .. })));
    }

    #[test]
    fn test_timezone_override() {
        let mut pairs = BASE.to_vec();
        pairs.push(("BUSINESS_TIMEZONE", "Europe/Berlin"));
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.business_timezone, chrono_tz::Europe::Berlin);
    }
}
