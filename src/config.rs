// config.rs - Bot Configuration
// Reads botconfig.txt (KEY=VALUE) with multi-path fallback, lets process
// environment variables override it, and validates everything into one
// immutable BotConfig that main.rs hands to the components that need it.
//
// Recognized keys:
// - BOT_TOKEN               Discord bot token (required)
// - CATALOG_API_KEY         YouTube Data API key (required)
// - PREFIX                  Command prefix (default ^)
// - CATALOG_API_BASE        API base URL (default YouTube Data API v3)
// - REQUEST_TIMEOUT_SECS    Per-request timeout (default 15)
// - OPERATION_DEADLINE_SECS Deadline for a whole playlist (default 300)

use crate::youtube::{CatalogSettings, YOUTUBE_API_BASE};
use log::{debug, warn};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::time::Duration;
use thiserror::Error;

const CONFIG_PATHS: [&str; 4] = [
    "botconfig.txt",
    "../botconfig.txt",
    "../../botconfig.txt",
    "src/botconfig.txt",
];

const KNOWN_KEYS: [&str; 6] = [
    "BOT_TOKEN",
    "CATALOG_API_KEY",
    "PREFIX",
    "CATALOG_API_BASE",
    "REQUEST_TIMEOUT_SECS",
    "OPERATION_DEADLINE_SECS",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set (add it to botconfig.txt or the environment)")]
    Missing(&'static str),
    #[error("{0} is still set to a placeholder value")]
    Placeholder(&'static str),
    #[error("{key}={value} is invalid: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub bot_token: String,
    pub prefix: String,
    pub catalog: CatalogSettings,
    pub operation_deadline: Duration,
}

impl BotConfig {
    pub fn from_map(values: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bot_token = required(values, "BOT_TOKEN")?;
        let api_key = required(values, "CATALOG_API_KEY")?;

        let prefix = optional(values, "PREFIX").unwrap_or("^").to_string();

        let base_url = optional(values, "CATALOG_API_BASE").unwrap_or(YOUTUBE_API_BASE);
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                key: "CATALOG_API_BASE",
                value: base_url.to_string(),
                reason: "must start with http:// or https://".to_string(),
            });
        }

        let request_timeout = seconds(values, "REQUEST_TIMEOUT_SECS", 15, 600)?;
        let operation_deadline = seconds(values, "OPERATION_DEADLINE_SECS", 300, 3600)?;

        Ok(BotConfig {
            bot_token,
            prefix,
            catalog: CatalogSettings {
                base_url: base_url.to_string(),
                api_key,
                request_timeout,
            },
            operation_deadline,
        })
    }
}

fn optional<'a>(values: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    values
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn required(values: &HashMap<String, String>, key: &'static str) -> Result<String, ConfigError> {
    let value = optional(values, key).ok_or(ConfigError::Missing(key))?;
    if value.starts_with("YOUR_") && value.ends_with("_HERE") {
        return Err(ConfigError::Placeholder(key));
    }
    Ok(value.to_string())
}

fn seconds(
    values: &HashMap<String, String>,
    key: &'static str,
    default: u64,
    max: u64,
) -> Result<Duration, ConfigError> {
    let Some(raw) = optional(values, key) else {
        return Ok(Duration::from_secs(default));
    };

    let invalid = |reason: String| ConfigError::Invalid {
        key,
        value: raw.to_string(),
        reason,
    };

    let secs = raw
        .parse::<u64>()
        .map_err(|_| invalid("must be a whole number of seconds".to_string()))?;
    if secs == 0 || secs > max {
        return Err(invalid(format!("must be between 1 and {}", max)));
    }
    Ok(Duration::from_secs(secs))
}

/// Parse KEY=VALUE lines, skipping blanks and # comments.
pub fn parse_config_text(content: &str) -> HashMap<String, String> {
    // Remove BOM if present
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut config = HashMap::new();

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match line.split_once('=') {
            Some((key, value)) => {
                config.insert(key.trim().to_string(), value.trim().to_string());
            }
            None => warn!("⚠️ Ignoring invalid config line {}: {}", line_num + 1, line),
        }
    }

    config
}

/// Load botconfig.txt (if any) and apply environment overrides.
pub fn load_bot_config() -> Result<BotConfig, ConfigError> {
    let found = CONFIG_PATHS
        .iter()
        .find_map(|path| fs::read_to_string(path).ok().map(|content| (path, content)));

    let mut values = match found {
        Some((path, content)) => {
            println!("✅ Configuration loaded from {}", path);
            parse_config_text(&content)
        }
        None => {
            warn!("⚠️ No botconfig.txt found (., .., ../.., src/), using environment only");
            HashMap::new()
        }
    };

    for key in KNOWN_KEYS {
        if let Ok(value) = env::var(key) {
            debug!("🔧 {} taken from environment", key);
            values.insert(key.to_string(), value);
        }
    }

    BotConfig::from_map(&values)
}
