use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf};

/// Environment variable holding the OpenWeather API key. Takes precedence
/// over the config file when set to a non-blank value.
pub const API_KEY_ENV: &str = "OPEN_WEATHER_MAP_API_KEY";

const DEFAULT_LANGUAGE: &str = "en";

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Example TOML:
    /// api_key = "..."
    /// language = "en"
    pub api_key: Option<String>,
    pub language: Option<String>,
}

impl Config {
    /// Load config from disk (empty default when the file doesn't exist yet),
    /// then let the environment override the credential.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_file()?;
        cfg.apply_env_key(env::var(API_KEY_ENV).ok());
        Ok(cfg)
    }

    fn load_file() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    fn apply_env_key(&mut self, env_key: Option<String>) {
        if let Some(key) = env_key {
            if !key.trim().is_empty() {
                self.api_key = Some(key);
            }
        }
    }

    /// The configured credential. Missing or blank is a configuration error
    /// surfaced at construction time, never at fetch time.
    pub fn api_key(&self) -> Result<&str> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(anyhow!(
                "No OpenWeather API key configured.\n\
                 Hint: set {API_KEY_ENV} or run `rainbow-cli configure` first."
            )),
        }
    }

    /// Preferred language for provider response texts.
    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "rainbow-watch", "rainbow-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
