//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Environment variable holding the bearer token
pub const TOKEN_ENV: &str = "STAFFSYNC_TOKEN";

/// Staffsync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub remote: RemoteConfig,
    pub cascade: CascadeConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    /// Path segment of the skill collection (`skills` or `qualifications`)
    pub skill_collection: String,
    pub timeout_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CascadeConfig {
    pub max_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub channel_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8089".to_string(),
            skill_collection: "skills".to_string(),
            timeout_secs: 30,
            token: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote: RemoteConfig::default(),
            cascade: CascadeConfig { max_attempts: 3 },
            cache: CacheConfig::default(),
        }
    }
}

impl RemoteConfig {
    pub fn resolved_token(&self) -> anyhow::Result<Option<String>> {
        self.enforce_env_only()?;
        Ok(env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty()))
    }

    pub fn redacted_token(&self) -> anyhow::Result<Option<String>> {
        self.resolved_token()
            .map(|opt| opt.map(|token| redact(&token)))
    }

    pub fn enforce_env_only(&self) -> anyhow::Result<()> {
        if self.token.is_some() {
            return Err(anyhow!(
                "Bearer tokens must be provided via the {} environment variable, not stored in configuration",
                TOKEN_ENV
            ));
        }
        Ok(())
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("STAFFSYNC_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("staffsync")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or fall back to defaults if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::from_toml(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.validate()?;

        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let path = Self::config_path()?;
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        self.remote.enforce_env_only()?;
        if !(1..=10).contains(&self.cascade.max_attempts) {
            return Err(anyhow!("cascade.max_attempts must be between 1 and 10"));
        }
        if self.cache.channel_capacity == 0 {
            return Err(anyhow!("cache.channel_capacity must be positive"));
        }
        Ok(())
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            "remote.base_url" => Ok(self.remote.base_url.clone()),
            "remote.skill_collection" => Ok(self.remote.skill_collection.clone()),
            "remote.timeout_secs" => Ok(self.remote.timeout_secs.to_string()),
            "cascade.max_attempts" => Ok(self.cascade.max_attempts.to_string()),
            "cache.channel_capacity" => Ok(self.cache.channel_capacity.to_string()),

            // Token (special handling - show redacted)
            "remote.token" | "token" => match self.remote.redacted_token()? {
                Some(redacted) => Ok(redacted),
                None => Ok(format!("(not set - use {} env var)", TOKEN_ENV)),
            },

            _ => Err(anyhow!(
                "Unknown configuration key: {}. Use `staffsync config list` to see available keys.",
                key
            )),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "remote.base_url" => {
                let trimmed = value.trim().trim_end_matches('/');
                if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
                    return Err(anyhow!("Base URL must start with http:// or https://"));
                }
                self.remote.base_url = trimmed.to_string();
            }
            "remote.skill_collection" => {
                let valid = ["skills", "qualifications"];
                if !valid.contains(&value) {
                    return Err(anyhow!(
                        "Invalid skill collection: {}. Valid options: {}",
                        value,
                        valid.join(", ")
                    ));
                }
                self.remote.skill_collection = value.to_string();
            }
            "remote.timeout_secs" => {
                self.remote.timeout_secs = value
                    .parse()
                    .with_context(|| format!("Invalid timeout_secs value: {}", value))?;
            }
            "cascade.max_attempts" => {
                let attempts: u32 = value
                    .parse()
                    .with_context(|| format!("Invalid max_attempts value: {}", value))?;
                if !(1..=10).contains(&attempts) {
                    return Err(anyhow!("max_attempts must be between 1 and 10"));
                }
                self.cascade.max_attempts = attempts;
            }
            "cache.channel_capacity" => {
                let capacity: usize = value
                    .parse()
                    .with_context(|| format!("Invalid channel_capacity value: {}", value))?;
                if capacity == 0 {
                    return Err(anyhow!("channel_capacity must be positive"));
                }
                self.cache.channel_capacity = capacity;
            }

            "remote.token" | "token" => {
                return Err(anyhow!(
                    "Tokens cannot be stored in configuration. Set the {} environment variable instead.",
                    TOKEN_ENV
                ));
            }

            _ => {
                return Err(anyhow!(
                    "Unknown configuration key: {}. Use `staffsync config list` to see available keys.",
                    key
                ));
            }
        }
        Ok(())
    }

    /// List all configuration keys and their values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        let keys = [
            "remote.base_url",
            "remote.skill_collection",
            "remote.timeout_secs",
            "remote.token",
            "cascade.max_attempts",
            "cache.channel_capacity",
        ];

        keys.into_iter()
            .map(|key| Ok((key.to_string(), self.get(key)?)))
            .collect()
    }

    /// Reset configuration to defaults
    pub fn reset() -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove config file: {}", path.display()))?;
        }
        Ok(())
    }
}

/// Mask a secret, keeping at most its last four characters
fn redact(token: &str) -> String {
    if token.chars().count() <= 4 {
        return "***".to_string();
    }
    let mut tail: Vec<char> = token.chars().rev().take(4).collect();
    tail.reverse();
    format!("***{}", tail.into_iter().collect::<String>())
}
