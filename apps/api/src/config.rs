//! Service configuration read from the environment (and `.env`).

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::agents::CrewSettings;
use crate::llm::{GroqConfig, LlmSettings};
use crate::tools::DEFAULT_SEARCH_ENDPOINT;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Web-search tool settings
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    pub endpoint: String,
    /// Character budget for one search result
    pub max_chars: usize,
}

/// Everything the service needs to start
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub groq: GroqConfig,
    pub crew: CrewSettings,
    pub search: SearchSettings,
}

impl AppConfig {
    /// Load from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve each key
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("GROQ_API_KEY").ok_or(ConfigError::Missing("GROQ_API_KEY"))?;

        let mut groq = GroqConfig::new(api_key);
        if let Some(base_url) = get("GROQ_BASE_URL") {
            groq.base_url = base_url;
        }
        groq.timeout = Duration::from_secs(parse_or(&get, "LLM_TIMEOUT_SECS", 60)?);
        groq.max_retries = parse_or(&get, "LLM_MAX_RETRIES", 2)?;

        let defaults = LlmSettings::default();
        let llm = LlmSettings {
            model: get("LLM_MODEL").unwrap_or(defaults.model),
            temperature: parse_or(&get, "LLM_TEMPERATURE", defaults.temperature)?,
            max_tokens: parse_or(&get, "LLM_MAX_TOKENS", defaults.max_tokens)?,
        };

        let max_iter: usize = parse_or(&get, "CREW_MAX_ITER", 2)?;
        if max_iter == 0 {
            return Err(ConfigError::Invalid {
                key: "CREW_MAX_ITER",
                value: "0".to_string(),
            });
        }
        let max_rpm: u32 = parse_or(&get, "CREW_MAX_RPM", 1)?;

        let crew = CrewSettings {
            llm,
            max_iter,
            max_rpm: (max_rpm > 0).then_some(max_rpm),
        };

        let search = SearchSettings {
            endpoint: get("SEARCH_ENDPOINT").unwrap_or_else(|| DEFAULT_SEARCH_ENDPOINT.to_string()),
            max_chars: parse_or(&get, "SEARCH_MAX_CHARS", 800)?,
        };

        let bind_addr = parse_or(&get, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?;

        Ok(Self {
            bind_addr,
            groq,
            crew,
            search,
        })
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}
