//! Runtime configuration read from the environment.
//!
//! - `HOST`: bind address (default `127.0.0.1`)
//! - `PORT`: bind port (default `3000`)
//! - `TODO_DB_PATH`: location of the JSON collection (default `db/todos.json`)
//! - `APP_ENV`: `development` (default) | `production`

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DB_PATH: &str = "db/todos.json";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid PORT '{0}': expected an integer between 0 and 65535")]
    InvalidPort(String),

    #[error("invalid APP_ENV '{0}': expected 'development' or 'production'")]
    InvalidEnvironment(String),

    #[error("{0} is not valid UTF-8")]
    NotUnicode(&'static str),
}

/// Controls how much failure detail reaches clients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidEnvironment(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub environment: Environment,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            environment: Environment::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| match env::var(key) {
            Ok(value) => Ok(Some(value)),
            Err(env::VarError::NotPresent) => Ok(None),
            Err(env::VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode(key)),
        })
    }

    /// Builds a config from an arbitrary variable source. Empty or
    /// whitespace-only values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Result<Option<String>, ConfigError>,
    {
        let read = |key: &'static str| -> Result<Option<String>, ConfigError> {
            Ok(lookup(key)?
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()))
        };

        let defaults = Self::default();

        let port = match read("PORT")? {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(value))?,
            None => defaults.port,
        };
        let environment = match read("APP_ENV")? {
            Some(value) => value.parse()?,
            None => defaults.environment,
        };

        Ok(Self {
            host: read("HOST")?.unwrap_or(defaults.host),
            port,
            db_path: read("TODO_DB_PATH")?.map_or(defaults.db_path, PathBuf::from),
            environment,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(
        vars: &[(&'static str, &str)],
    ) -> impl Fn(&'static str) -> Result<Option<String>, ConfigError> {
        let vars: HashMap<&'static str, String> =
            vars.iter().map(|(k, v)| (*k, v.to_string())).collect();
        move |key: &'static str| Ok(vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.addr(), "127.0.0.1:3000");
        assert_eq!(config.db_path, PathBuf::from("db/todos.json"));
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("HOST", "0.0.0.0"),
            ("PORT", "8080"),
            ("TODO_DB_PATH", "/tmp/todos.json"),
            ("APP_ENV", "Production"),
        ]))
        .unwrap();
        assert_eq!(config.addr(), "0.0.0.0:8080");
        assert_eq!(config.db_path, PathBuf::from("/tmp/todos.json"));
        assert!(config.environment.is_production());
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = Config::from_lookup(lookup(&[("PORT", "  "), ("HOST", "")])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.host, "127.0.0.1");
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = Config::from_lookup(lookup(&[("PORT", "70000")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidPort("70000".to_string()));
    }

    #[test]
    fn invalid_environment_is_rejected() {
        let err = Config::from_lookup(lookup(&[("APP_ENV", "staging")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidEnvironment("staging".to_string()));
    }
}
