use ls_core::{DEFAULT_MODEL_ID, Provider};
use std::env;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} has an invalid value: {value:?}")]
    Invalid { key: &'static str, value: String },
    #[error("failed to read .env file: {0}")]
    DotEnv(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Http,
    Bridge,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub transport: TransportKind,
    pub api_url: String,
    pub request_timeout: Duration,
    pub poll_interval: Duration,
    pub notice_ttl: Duration,
    pub provider: Provider,
    pub model_id: String,
    pub workers: u32,
    pub batch_size: u32,
    pub max_images: usize,
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            transport: TransportKind::Http,
            api_url: "http://127.0.0.1:5000".to_string(),
            request_timeout: Duration::from_secs(900),
            poll_interval: Duration::from_secs(10),
            notice_ttl: Duration::from_secs(5),
            provider: Provider::ElevenLabs,
            model_id: DEFAULT_MODEL_ID.to_string(),
            workers: 3,
            batch_size: 3,
            max_images: 20,
            log_level: "info".to_string(),
        }
    }
}

impl ClientConfig {
    /// Read `.env` (if present) and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "Loaded .env"),
            Err(err) if err.not_found() => {}
            Err(err) => return Err(ConfigError::DotEnv(err.to_string())),
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut conf = Self::default();

        if let Some(raw) = lookup("LIPSYNC_TRANSPORT") {
            conf.transport = match raw.trim().to_ascii_lowercase().as_str() {
                "http" => TransportKind::Http,
                "bridge" => TransportKind::Bridge,
                _ => return Err(invalid("LIPSYNC_TRANSPORT", raw)),
            };
        }
        if let Some(raw) = lookup("LIPSYNC_API_URL") {
            let url = raw.trim().trim_end_matches('/').to_string();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(invalid("LIPSYNC_API_URL", raw));
            }
            conf.api_url = url;
        }
        if let Some(secs) = parse_num::<u64>(&lookup, "LIPSYNC_REQUEST_TIMEOUT_SECS")? {
            conf.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_num::<u64>(&lookup, "LIPSYNC_POLL_INTERVAL_SECS")? {
            if secs == 0 {
                return Err(invalid("LIPSYNC_POLL_INTERVAL_SECS", secs.to_string()));
            }
            conf.poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_num::<u64>(&lookup, "LIPSYNC_NOTICE_TTL_SECS")? {
            conf.notice_ttl = Duration::from_secs(secs);
        }
        if let Some(raw) = lookup("LIPSYNC_PROVIDER") {
            conf.provider = raw.parse().map_err(|_| invalid("LIPSYNC_PROVIDER", raw))?;
        }
        if let Some(raw) = lookup("LIPSYNC_MODEL_ID") {
            if raw.trim().is_empty() {
                return Err(invalid("LIPSYNC_MODEL_ID", raw));
            }
            conf.model_id = raw.trim().to_string();
        }
        if let Some(workers) = parse_num::<u32>(&lookup, "LIPSYNC_WORKERS")? {
            conf.workers = workers.max(1);
        }
        if let Some(size) = parse_num::<u32>(&lookup, "LIPSYNC_BATCH_SIZE")? {
            conf.batch_size = size.clamp(1, 10);
        }
        if let Some(max) = parse_num::<usize>(&lookup, "LIPSYNC_MAX_IMAGES")? {
            conf.max_images = max.max(1);
        }
        if let Some(level) = lookup("LIPSYNC_LOG_LEVEL") {
            conf.log_level = level.trim().to_string();
        }

        Ok(conf)
    }
}

fn invalid(key: &'static str, value: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.into(),
    }
}

fn parse_num<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| invalid(key, raw)),
        None => Ok(None),
    }
}
