use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use article_service_cli::FetchSettings;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub export_dir: PathBuf,
    pub public_dir: PathBuf,
    /// Extra wait between the end of a download and deleting its file.
    pub cleanup_delay: Duration,
    pub chrome_path: Option<PathBuf>,
    pub fetch: FetchSettings,
}

impl ServerConfig {
    /// Reads the process environment; call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = FetchSettings::default();
        let fetch = FetchSettings {
            timeout: Duration::from_secs(parse_or(&var, "FETCH_TIMEOUT_SECS", 15)?),
            redirect_limit: parse_or(&var, "FETCH_MAX_REDIRECTS", 5)?,
            accept_language: var("ACCEPT_LANGUAGE")
                .unwrap_or_else(|| defaults.accept_language.clone()),
            ..defaults
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&var, "PORT", 5000)?,
            export_dir: var("EXPORT_DIR").unwrap_or_else(|| "temp".to_string()).into(),
            public_dir: var("PUBLIC_DIR").unwrap_or_else(|| "public".to_string()).into(),
            cleanup_delay: Duration::from_secs(parse_or(&var, "CLEANUP_DELAY_SECS", 3)?),
            chrome_path: var("CHROME_PATH").map(PathBuf::from),
            fetch,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T, F>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}
