use std::str::FromStr;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub llm_endpoint: String,
    pub llm_api_key: Option<String>,
    pub llm_model: String,
    pub llm_temperature: f32,
    pub llm_timeout_secs: u64,
    pub search_endpoint: String,
    pub search_api_key: Option<String>,
    pub search_max_results: usize,
    pub max_tool_rounds: usize,
    pub session_ttl_secs: u64,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let search_max_results: usize = parse_var(&lookup, "SEARCH_MAX_RESULTS", "10")?;

        Ok(Config {
            port: parse_var(&lookup, "PORT", "8080")?,
            llm_endpoint: var("LLM_ENDPOINT", "https://api.mistral.ai/v1/chat/completions"),
            llm_api_key: lookup("LLM_API_KEY").or_else(|| lookup("MISTRAL_API_KEY")),
            llm_model: var("LLM_MODEL", "mistral-small-latest"),
            llm_temperature: parse_var(&lookup, "LLM_TEMPERATURE", "0.2")?,
            llm_timeout_secs: parse_var(&lookup, "LLM_TIMEOUT_SECS", "120")?,
            search_endpoint: var("SEARCH_ENDPOINT", "https://api.exa.ai/search"),
            search_api_key: lookup("SEARCH_API_KEY").or_else(|| lookup("EXA_API_KEY")),
            search_max_results: search_max_results.clamp(1, 10),
            max_tool_rounds: parse_var(&lookup, "MAX_TOOL_ROUNDS", "8")?,
            session_ttl_secs: parse_var(&lookup, "SESSION_TTL_SECS", "3600")?,
            log_level: var("LOG_LEVEL", "info"),
        })
    }
}

fn parse_var<T, F>(lookup: &F, key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    raw.trim()
        .parse()
        .with_context(|| format!("invalid value for {}: {:?}", key, raw))
}
