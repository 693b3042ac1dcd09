// config.rs - Bot Configuration
// Reads botconfig.txt (KEY=VALUE lines) with the same multi-path fallback the
// bot has always used, and turns it into a typed BotConfig.

use crate::lyrics::ExtractionStrategy;
use serenity::constants::MESSAGE_CODE_LIMIT;
use std::collections::HashMap;
use std::fs;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PREFIX: &str = "/";
pub const DEFAULT_GENIUS_API_URL: &str = "https://api.genius.com";
/// Hard per-message limit of the chat transport the bot was written for
pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 4096;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

const CONFIG_PATHS: [&str; 4] = [
    "botconfig.txt",
    "../botconfig.txt",
    "../../botconfig.txt",
    "src/botconfig.txt",
];

const PLACEHOLDERS: [&str; 2] = ["YOUR_BOT_TOKEN_HERE", "YOUR_GENIUS_TOKEN_HERE"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No botconfig.txt file found in any expected location (., .., ../.., src/)")]
    NotFound,

    #[error("{0} not found in botconfig.txt")]
    Missing(&'static str),

    #[error("{0} in botconfig.txt is set to a placeholder value")]
    Placeholder(&'static str),

    #[error("Invalid {key} value: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub discord_token: String,
    pub genius_access_token: String,
    pub prefix: String,
    pub genius_api_url: String,
    pub max_message_length: usize,
    pub http_timeout: Duration,
    pub strategies: Vec<ExtractionStrategy>,
    pub log_filter: Option<String>,
}

/// Load botconfig.txt from the first location that exists
pub fn load_bot_config() -> Result<(BotConfig, &'static str), ConfigError> {
    for config_path in CONFIG_PATHS {
        match fs::read_to_string(config_path) {
            Ok(content) => {
                let config = parse_bot_config(&content)?;
                return Ok((config, config_path));
            }
            Err(_) => continue,
        }
    }

    Err(ConfigError::NotFound)
}

/// Parse the contents of a botconfig.txt file
pub fn parse_bot_config(content: &str) -> Result<BotConfig, ConfigError> {
    // Remove BOM if present
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut map = HashMap::new();

    for line in content.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            map.insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    BotConfig::from_map(&map)
}

impl BotConfig {
    fn from_map(map: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let discord_token = required(map, "DISCORD_TOKEN")?;
        let genius_access_token = required(map, "GENIUS_ACCESS_TOKEN")?;

        let prefix = optional(map, "PREFIX").unwrap_or(DEFAULT_PREFIX).to_string();
        let genius_api_url = optional(map, "GENIUS_API_URL")
            .unwrap_or(DEFAULT_GENIUS_API_URL)
            .trim_end_matches('/')
            .to_string();

        let max_message_length = match optional(map, "MAX_MESSAGE_LENGTH") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(invalid("MAX_MESSAGE_LENGTH", raw)),
            },
            None => DEFAULT_MAX_MESSAGE_LENGTH,
        };

        let timeout_secs = match optional(map, "HTTP_TIMEOUT") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| invalid("HTTP_TIMEOUT", raw))?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        let strategies = match optional(map, "LYRICS_STRATEGIES") {
            Some(raw) => parse_strategies(raw)?,
            None => ExtractionStrategy::default_order(),
        };

        Ok(Self {
            discord_token,
            genius_access_token,
            prefix,
            genius_api_url,
            max_message_length,
            http_timeout: Duration::from_secs(timeout_secs),
            strategies,
            log_filter: optional(map, "RUST_LOG").map(str::to_string),
        })
    }

    /// Chunk size actually used for replies; Discord rejects anything longer
    /// than `MESSAGE_CODE_LIMIT`, whatever botconfig.txt asks for.
    pub fn delivery_message_length(&self) -> usize {
        self.max_message_length.min(MESSAGE_CODE_LIMIT)
    }
}

fn parse_strategies(raw: &str) -> Result<Vec<ExtractionStrategy>, ConfigError> {
    let strategies = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<ExtractionStrategy>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| invalid("LYRICS_STRATEGIES", raw))?;

    if strategies.is_empty() {
        return Err(invalid("LYRICS_STRATEGIES", raw));
    }
    Ok(strategies)
}

fn optional<'a>(map: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    map.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

fn required(map: &HashMap<String, String>, key: &'static str) -> Result<String, ConfigError> {
    let value = optional(map, key).ok_or(ConfigError::Missing(key))?;
    if PLACEHOLDERS.contains(&value) {
        return Err(ConfigError::Placeholder(key));
    }
    Ok(value.to_string())
}

fn invalid(key: &'static str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    }
}
