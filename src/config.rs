use std::net::SocketAddr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

use crate::chat::Persona;
use crate::reference::DEFAULT_SAMPLE_SIZE;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-flash-latest";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} missing")]
    Missing(&'static str),
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Credentials and endpoint for one language-model provider.
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    pub api_key: SecretString,
    pub model: String,
    pub base_url: String,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: SecretString,
    pub bind_addr: SocketAddr,
    pub db_max_connections: u32,
    pub gemini: Option<ProviderConfig>,
    pub groq: Option<ProviderConfig>,
    pub llm_timeout: Duration,
    pub persona: Persona,
    pub sample_size: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Reads configuration through `get` so tests never touch the process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut get = move |k: &str| get(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let bind_addr = parse_or(&mut get, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3050)))?;
        let db_max_connections = parse_or(&mut get, "DB_MAX_CONNECTIONS", 5u32)?;
        let timeout_secs = parse_or(&mut get, "LLM_TIMEOUT_SECS", 30u64)?;
        let sample_size = parse_or(&mut get, "EXAMPLE_SAMPLE_SIZE", DEFAULT_SAMPLE_SIZE)?;

        let persona = match get("CHAT_PERSONA") {
            None => Persona::default(),
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "CHAT_PERSONA",
                value: raw,
            })?,
        };

        let gemini = get("GEMINI_API_KEY").map(|key| ProviderConfig {
            api_key: SecretString::new(key.into()),
            model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.into()),
            base_url: get("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.into()),
        });
        let groq = get("GROQ_API_KEY").map(|key| ProviderConfig {
            api_key: SecretString::new(key.into()),
            model: get("GROQ_MODEL").unwrap_or_else(|| DEFAULT_GROQ_MODEL.into()),
            base_url: get("GROQ_BASE_URL").unwrap_or_else(|| DEFAULT_GROQ_BASE_URL.into()),
        });

        Ok(Self {
            database_url: SecretString::new(database_url.into()),
            bind_addr,
            db_max_connections,
            gemini,
            groq,
            llm_timeout: Duration::from_secs(timeout_secs),
            persona,
            sample_size,
        })
    }
}

fn parse_or<F, T>(get: &mut F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: FnMut(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}
