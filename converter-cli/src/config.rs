//! Configuration loading from environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use converter_hex::RetryPolicy;
use rate_table::RateTable;

/// Application configuration.
#[derive(Debug)]
pub struct Config {
    /// JSON rate table; the built-in table is used when unset
    pub rates_file: Option<PathBuf>,
    /// Document store URL; the in-memory store is used when unset
    pub database_url: Option<String>,
    /// `(email, password)` pairs for the identity provider
    pub users: Vec<(String, String)>,
    pub retry: RetryPolicy,
    /// Allowed round-trip deviation for stored inverse rates
    pub inverse_tolerance: f64,
    pub log_json: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let rates_file = lookup("CONVERTER_RATES_FILE")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let database_url = lookup("CONVERTER_DATABASE_URL").filter(|v| !v.is_empty());

        let users = match lookup("CONVERTER_USERS") {
            Some(raw) => parse_users(&raw)?,
            None => Vec::new(),
        };

        let max_attempts: u32 = lookup("CONVERTER_RETRY_ATTEMPTS")
            .unwrap_or_else(|| "3".to_string())
            .parse()
            .context("CONVERTER_RETRY_ATTEMPTS must be a positive integer")?;
        if max_attempts == 0 {
            anyhow::bail!("CONVERTER_RETRY_ATTEMPTS must be at least 1");
        }

        let backoff_ms: u64 = lookup("CONVERTER_RETRY_BACKOFF_MS")
            .unwrap_or_else(|| "100".to_string())
            .parse()
            .context("CONVERTER_RETRY_BACKOFF_MS must be a number of milliseconds")?;

        let inverse_tolerance: f64 = lookup("CONVERTER_INVERSE_TOLERANCE")
            .unwrap_or_else(|| "0.05".to_string())
            .parse()
            .context("CONVERTER_INVERSE_TOLERANCE must be a number")?;

        let log_json = lookup("CONVERTER_LOG_JSON")
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            rates_file,
            database_url,
            users,
            retry: RetryPolicy {
                max_attempts,
                base_backoff: Duration::from_millis(backoff_ms),
                ..RetryPolicy::default()
            },
            inverse_tolerance,
            log_json,
        })
    }

    /// Loads the configured rate table.
    pub fn rate_table(&self) -> anyhow::Result<RateTable> {
        match &self.rates_file {
            Some(path) => RateTable::from_json_file(path)
                .with_context(|| format!("loading rate table from {}", path.display())),
            None => Ok(RateTable::default_table()),
        }
    }
}

/// Parses `email:password` entries separated by commas.
fn parse_users(raw: &str) -> anyhow::Result<Vec<(String, String)>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| -> anyhow::Result<(String, String)> {
            let (email, password) = entry
                .split_once(':')
                .with_context(|| format!("CONVERTER_USERS entry `{}` is not email:password", entry))?;
            if email.is_empty() || password.is_empty() {
                anyhow::bail!("CONVERTER_USERS entry `{}` has an empty field", entry);
            }
            Ok((email.to_string(), password.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert!(config.rates_file.is_none());
        assert!(config.database_url.is_none());
        assert!(config.users.is_empty());
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.base_backoff, Duration::from_millis(100));
        assert_eq!(config.inverse_tolerance, 0.05);
        assert!(!config.log_json);
        assert_eq!(config.rate_table().unwrap(), RateTable::default_table());
    }

    #[test]
    fn test_users_parsed() {
        let config = load(&[(
            "CONVERTER_USERS",
            "ana@example.com:secret, bob@example.com:p:w",
        )])
        .unwrap();

        assert_eq!(
            config.users,
            vec![
                ("ana@example.com".to_string(), "secret".to_string()),
                ("bob@example.com".to_string(), "p:w".to_string()),
            ]
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(load(&[("CONVERTER_USERS", "no-separator")]).is_err());
        assert!(load(&[("CONVERTER_USERS", ":secret")]).is_err());
        assert!(load(&[("CONVERTER_RETRY_ATTEMPTS", "0")]).is_err());
        assert!(load(&[("CONVERTER_RETRY_ATTEMPTS", "many")]).is_err());
        assert!(load(&[("CONVERTER_INVERSE_TOLERANCE", "x")]).is_err());
    }

    #[test]
    fn test_missing_rates_file_is_an_error() {
        let config = load(&[("CONVERTER_RATES_FILE", "/nonexistent/rates.json")]).unwrap();
        assert!(config.rate_table().is_err());
    }
}
