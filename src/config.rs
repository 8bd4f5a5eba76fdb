use std::env;

use thiserror::Error;

use crate::utils::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Process configuration, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub prefix: char,
    pub max_tokens: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup; `from_env` uses the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let discord_token = var("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let prefix = match var("BOT_PREFIX") {
            None => '!',
            Some(value) => {
                let mut chars = value.trim().chars();
                match (chars.next(), chars.next()) {
                    (Some(prefix), None) => prefix,
                    _ => {
                        return Err(ConfigError::Invalid {
                            key: "BOT_PREFIX",
                            value,
                        });
                    }
                }
            }
        };

        let max_tokens = match var("ASSISTANT_MAX_TOKENS") {
            None => 250,
            Some(value) => value
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|tokens| *tokens > 0)
                .ok_or(ConfigError::Invalid {
                    key: "ASSISTANT_MAX_TOKENS",
                    value,
                })?,
        };

        Ok(Self {
            discord_token,
            openai_api_key: var("OPENAI_API_KEY"),
            openai_base_url: var("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            openai_model: var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            prefix,
            max_tokens,
        })
    }
}
