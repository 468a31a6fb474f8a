//! Runtime configuration from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `BOOKS_API_URL` | `http://127.0.0.1:5000` |
//! | `BOOKSHELF_TOKEN` | none |
//! | `BOOKSHELF_SEARCH_LIMIT` | `10` |
//! | `BOOKSHELF_DEBOUNCE_MS` | `600` |
//! | `BOOKSHELF_REQUEST_TIMEOUT_SECS` | `30` |
//! | `BOOKSHELF_PREFERENCES` | `$HOME/.config/bookshelf/preferences.json` |
//!
//! A `.env` file in the working directory fills in variables the process
//! environment leaves unset.

use crate::environment::{DEFAULT_DEBOUNCE, DEFAULT_SEARCH_LIMIT};
use bookshelf_api::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, Url, parse_base_url};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Backend URL is not a valid http(s) URL
    #[error("{var} is not a valid backend URL: {reason}")]
    InvalidUrl {
        /// Variable or flag the value came from
        var: &'static str,
        /// Parse failure
        reason: String,
    },

    /// A numeric variable does not parse
    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidNumber {
        /// Variable name
        var: &'static str,
        /// Raw value
        value: String,
    },

    /// The `.env` file exists but cannot be read or parsed
    #[error("Failed to read {path}: {reason}")]
    EnvFile {
        /// File path
        path: String,
        /// Read or parse failure
        reason: String,
    },
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Backend base URL
    pub api_url: Url,
    /// Static bearer token, if one is configured
    pub token: Option<String>,
    /// Results requested per search
    pub search_limit: usize,
    /// Search debounce period
    pub debounce: Duration,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Preference file
    pub preferences_path: PathBuf,
}

impl AppConfig {
    /// Load from the process environment
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from the process environment and `./.env`
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `.env` is malformed or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_env_file(".env")
    }

    /// Load from the process environment, falling back to the dotenv file at `path`
    ///
    /// A missing file is the same as an empty one.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file is malformed or a value is invalid.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let env_file_error = |e: dotenvy::Error| ConfigError::EnvFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        };

        let file: HashMap<String, String> = match dotenvy::from_path_iter(path) {
            Ok(entries) => entries.collect::<Result<_, _>>().map_err(env_file_error)?,
            Err(e) if e.not_found() => HashMap::new(),
            Err(e) => return Err(env_file_error(e)),
        };
        if !file.is_empty() {
            tracing::debug!(path = %path.display(), vars = file.len(), "Loaded dotenv file");
        }

        Self::from_lookup(|key| std::env::var(key).ok().or_else(|| file.get(key).cloned()))
    }

    /// Load from an arbitrary key lookup
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a value is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_url = get("BOOKS_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let api_url = parse_url("BOOKS_API_URL", &api_url)?;

        let search_limit = match get("BOOKSHELF_SEARCH_LIMIT") {
            Some(raw) => parse_positive("BOOKSHELF_SEARCH_LIMIT", &raw)?,
            None => DEFAULT_SEARCH_LIMIT,
        };

        let debounce = match get("BOOKSHELF_DEBOUNCE_MS") {
            Some(raw) => Duration::from_millis(parse_positive("BOOKSHELF_DEBOUNCE_MS", &raw)? as u64),
            None => DEFAULT_DEBOUNCE,
        };

        let request_timeout = match get("BOOKSHELF_REQUEST_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_positive("BOOKSHELF_REQUEST_TIMEOUT_SECS", &raw)? as u64),
            None => DEFAULT_TIMEOUT,
        };

        let preferences_path = get("BOOKSHELF_PREFERENCES").map_or_else(
            || default_preferences_path(get("HOME")),
            PathBuf::from,
        );

        Ok(Self {
            api_url,
            token: get("BOOKSHELF_TOKEN"),
            search_limit,
            debounce,
            request_timeout,
            preferences_path,
        })
    }

    /// Override the backend URL
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if `url` is not an http(s) URL.
    pub fn with_api_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.api_url = parse_url("--api-url", url)?;
        Ok(self)
    }

    /// Override the bearer token
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Override the search limit
    #[must_use]
    pub const fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }

    /// Override the preference file
    #[must_use]
    pub fn with_preferences_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.preferences_path = path.into();
        self
    }
}

fn parse_url(var: &'static str, raw: &str) -> Result<Url, ConfigError> {
    parse_base_url(raw).map_err(|e| ConfigError::InvalidUrl {
        var,
        reason: e.to_string(),
    })
}

fn parse_positive(var: &'static str, raw: &str) -> Result<usize, ConfigError> {
    raw.trim()
        .parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| ConfigError::InvalidNumber {
            var,
            value: raw.to_string(),
        })
}

fn default_preferences_path(home: Option<String>) -> PathBuf {
    home.map_or_else(
        || PathBuf::from("bookshelf-preferences.json"),
        |home| {
            PathBuf::from(home)
                .join(".config")
                .join("bookshelf")
                .join("preferences.json")
        },
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.api_url.as_str(), "http://127.0.0.1:5000/");
        assert_eq!(config.search_limit, 10);
        assert_eq!(config.debounce, Duration::from_millis(600));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.token, None);
        assert_eq!(config.preferences_path, PathBuf::from("bookshelf-preferences.json"));
    }

    #[test]
    fn reads_variables() {
        let config = config(&[
            ("BOOKS_API_URL", "https://books.example.com"),
            ("BOOKSHELF_TOKEN", "abc"),
            ("BOOKSHELF_SEARCH_LIMIT", "25"),
            ("BOOKSHELF_DEBOUNCE_MS", "250"),
            ("HOME", "/home/reader"),
        ])
        .unwrap();

        assert_eq!(config.api_url.host_str(), Some("books.example.com"));
        assert_eq!(config.token.as_deref(), Some("abc"));
        assert_eq!(config.search_limit, 25);
        assert_eq!(config.debounce, Duration::from_millis(250));
        assert_eq!(
            config.preferences_path,
            PathBuf::from("/home/reader/.config/bookshelf/preferences.json")
        );
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            config(&[("BOOKS_API_URL", "ftp://books")]),
            Err(ConfigError::InvalidUrl { var: "BOOKS_API_URL", .. })
        ));
        assert!(matches!(
            config(&[("BOOKSHELF_SEARCH_LIMIT", "0")]),
            Err(ConfigError::InvalidNumber { .. })
        ));
        assert!(config(&[]).unwrap().with_api_url("nope").is_err());
    }

    #[test]
    fn dotenv_file_fills_in_unset_variables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            "# local settings\nBOOKSHELF_TOKEN=from-file\nBOOKSHELF_REQUEST_TIMEOUT_SECS=7\n",
        )
        .unwrap();

        let config = AppConfig::from_env_file(&path).unwrap();
        assert_eq!(config.token.as_deref(), Some("from-file"));
        assert_eq!(config.request_timeout, Duration::from_secs(7));
    }

    #[test]
    fn missing_dotenv_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::from_env_file(dir.path().join(".env")).unwrap();
        assert_eq!(config.search_limit, AppConfig::from_env().unwrap().search_limit);
    }
}
