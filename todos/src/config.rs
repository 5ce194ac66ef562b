//! Configuration for the remote todo collection.
//!
//! Loads configuration from environment variables with defaults matching the
//! public JSONPlaceholder collection.

use crate::error::ConfigError;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;
use std::str::FromStr;
use std::time::Duration;

/// Collection used when `TASKLIST_BASE_URL` is not set
pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com/todos";

/// Page size requested by `list_all` when `TASKLIST_PAGE_LIMIT` is not set
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Owner id sent with new todos when `TASKLIST_USER_ID` is not set
pub const DEFAULT_USER_ID: u64 = 1;

/// Remote collection client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Collection endpoint; items live at `{base_url}/{id}`
    pub base_url: String,
    /// `_limit` query parameter sent when listing
    pub page_limit: u32,
    /// `userId` sent in create bodies
    pub user_id: u64,
    /// Per-request timeout; unset means wait indefinitely
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_limit: DEFAULT_PAGE_LIMIT,
            user_id: DEFAULT_USER_ID,
            timeout: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `TASKLIST_BASE_URL` | [`DEFAULT_BASE_URL`] |
    /// | `TASKLIST_PAGE_LIMIT` | [`DEFAULT_PAGE_LIMIT`] |
    /// | `TASKLIST_USER_ID` | [`DEFAULT_USER_ID`] |
    /// | `TASKLIST_TIMEOUT_SECS` | none (must be at least 1 when set) |
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a value is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("TASKLIST_BASE_URL") {
            config = config.with_base_url(url)?;
        }
        if let Some(limit) = parse_var::<u32, _>(&lookup, "TASKLIST_PAGE_LIMIT")? {
            config.page_limit = limit;
        }
        if let Some(user_id) = parse_var::<u64, _>(&lookup, "TASKLIST_USER_ID")? {
            config.user_id = user_id;
        }
        if let Some(secs) = parse_var::<NonZeroU64, _>(&lookup, "TASKLIST_TIMEOUT_SECS")? {
            config.timeout = Some(Duration::from_secs(secs.get()));
        }

        Ok(config)
    }

    /// Set the collection endpoint
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the URL cannot address a
    /// collection.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        parse_base_url(&url)?;
        self.base_url = url;
        Ok(self)
    }

    /// Set the page size requested when listing
    #[must_use]
    pub const fn with_page_limit(mut self, page_limit: u32) -> Self {
        self.page_limit = page_limit;
        self
    }

    /// Set the `userId` sent with new todos
    #[must_use]
    pub const fn with_user_id(mut self, user_id: u64) -> Self {
        self.user_id = user_id;
        self
    }

    /// Set the per-request timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Parse the configured base URL
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the URL cannot address a
    /// collection.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        parse_base_url(&self.base_url)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };

    let mut url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot carry item paths".to_string()));
    }
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }

    // `/todos/` and `/todos` name the same collection
    if url.path().len() > 1 && url.path().ends_with('/') {
        let trimmed = url.path().trim_end_matches('/').to_string();
        url.set_path(&trimmed);
    }
    Ok(url)
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| {
            value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value,
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_match_public_collection() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.base_url, "https://jsonplaceholder.typicode.com/todos");
        assert_eq!(config.page_limit, 10);
        assert_eq!(config.user_id, 1);
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn reads_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("TASKLIST_BASE_URL", "http://localhost:3000/todos"),
            ("TASKLIST_PAGE_LIMIT", "25"),
            ("TASKLIST_USER_ID", "4"),
            ("TASKLIST_TIMEOUT_SECS", " 5 "),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:3000/todos");
        assert_eq!(config.page_limit, 25);
        assert_eq!(config.user_id, 4);
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn rejects_bad_numbers() {
        let error =
            ClientConfig::from_lookup(lookup(&[("TASKLIST_PAGE_LIMIT", "ten")])).unwrap_err();

        assert_eq!(
            error,
            ConfigError::InvalidValue {
                key: "TASKLIST_PAGE_LIMIT".to_string(),
                value: "ten".to_string(),
            }
        );
    }

    #[test]
    fn rejects_zero_timeout() {
        let error =
            ClientConfig::from_lookup(lookup(&[("TASKLIST_TIMEOUT_SECS", "0")])).unwrap_err();

        assert_eq!(
            error,
            ConfigError::InvalidValue {
                key: "TASKLIST_TIMEOUT_SECS".to_string(),
                value: "0".to_string(),
            }
        );
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let config = ClientConfig::default()
            .with_base_url("https://example.com/todos/")
            .unwrap();

        assert_eq!(config.base_url().unwrap().as_str(), "https://example.com/todos");
    }

    #[test]
    fn root_base_url_is_kept() {
        let config = ClientConfig::default()
            .with_base_url("https://example.com/")
            .unwrap();

        assert_eq!(config.base_url().unwrap().as_str(), "https://example.com/");
    }

    #[test]
    fn rejects_unusable_base_urls() {
        for url in ["not a url", "mailto:todos@example.com", "ftp://example.com/todos"] {
            let result = ClientConfig::default().with_base_url(url);
            assert!(
                matches!(result, Err(ConfigError::InvalidBaseUrl { .. })),
                "{url} should be rejected"
            );
        }
    }
}
