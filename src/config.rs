//! Service configuration.
//!
//! One `ServiceConfig` covers every deployment. A `DeploymentProfile`
//! supplies defaults (local development vs. hosted behind a browser
//! extension), and `SENTIMENT_*` environment variables override them.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::inference::BatchMode;

/// Application-level constants
pub const APP_NAME: &str = "Comment Sentiment API";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default location of the exported pipeline artifact.
pub const DEFAULT_MODEL_PATH: &str = "models/sentiment_model.json";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Origins allowed by the hosted profile.
const HOSTED_ORIGINS: &[&str] = &[
    "https://www.youtube.com",
    "https://*.hf.space",
    "https://huggingface.co",
];

/// Tracing filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> String {
    "info,comment_sentiment=debug".to_string()
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentProfile {
    /// Developer machine: port 8000, no CORS.
    #[default]
    Local,
    /// Public host serving the browser extension: port 7860, CORS origins.
    Hosted,
}

impl FromStr for DeploymentProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(DeploymentProfile::Local),
            "hosted" => Ok(DeploymentProfile::Hosted),
            other => Err(format!("unknown profile '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Exact origins or `scheme://*.domain` wildcards. Empty disables CORS.
    pub allowed_origins: Vec<String>,
    /// Serve the API description at `/docs`.
    pub expose_docs: bool,
    pub model_path: PathBuf,
    pub batch_mode: BatchMode,
    /// Upper bound on a single prediction request, enforced at the boundary.
    pub request_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::for_profile(DeploymentProfile::Local)
    }
}

// ═══════════════════════════════════════════════════════════
// Derivation
// ═══════════════════════════════════════════════════════════

impl ServiceConfig {
    pub fn for_profile(profile: DeploymentProfile) -> Self {
        let (port, allowed_origins) = match profile {
            DeploymentProfile::Local => (8000, Vec::new()),
            DeploymentProfile::Hosted => (
                7860,
                HOSTED_ORIGINS.iter().map(|o| o.to_string()).collect(),
            ),
        };
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port,
            allowed_origins,
            expose_docs: true,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            batch_mode: BatchMode::FailFast,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// `SENTIMENT_PROFILE` picks the defaults; every other key overrides
    /// a single field.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let profile = match lookup("SENTIMENT_PROFILE") {
            Some(raw) => parse("SENTIMENT_PROFILE", &raw)?,
            None => DeploymentProfile::default(),
        };
        let mut config = Self::for_profile(profile);

        if let Some(raw) = lookup("SENTIMENT_HOST") {
            config.host = parse("SENTIMENT_HOST", &raw)?;
        }
        if let Some(raw) = lookup("SENTIMENT_PORT") {
            config.port = parse("SENTIMENT_PORT", &raw)?;
        }
        if let Some(raw) = lookup("SENTIMENT_ALLOWED_ORIGINS") {
            config.allowed_origins = raw
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(raw) = lookup("SENTIMENT_EXPOSE_DOCS") {
            config.expose_docs = parse_bool("SENTIMENT_EXPOSE_DOCS", &raw)?;
        }
        if let Some(raw) = lookup("SENTIMENT_MODEL_PATH") {
            config.model_path = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("SENTIMENT_BATCH_MODE") {
            config.batch_mode = parse("SENTIMENT_BATCH_MODE", &raw)?;
        }
        if let Some(raw) = lookup("SENTIMENT_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = parse("SENTIMENT_REQUEST_TIMEOUT_SECS", &raw)?;
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "SENTIMENT_REQUEST_TIMEOUT_SECS",
                    value: raw,
                    reason: "must be at least 1".into(),
                });
            }
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
            reason: "expected a boolean".into(),
        }),
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
