use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::constants::config::{
    CONFIG_DIR_NAME, DEFAULT_MIN_INSERTED_LENGTH, LOG_FILE_NAME, SETTINGS_FILE_NAME,
};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default, rename = "codexMonitor")]
    pub codex_monitor: MonitorConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonitorConfig {
    /// Minimum inserted-character count in one edit event that triggers an alert
    #[serde(default = "default_min_inserted_length")]
    pub min_inserted_length: usize,
    /// Try a tone on the default audio output before the shell beep chain
    #[serde(default)]
    pub in_process_tone: bool,
    /// Diagnostic log location, defaults to ~/.codex-monitor/codex-monitor.log
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

fn default_min_inserted_length() -> usize {
    DEFAULT_MIN_INSERTED_LENGTH
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            min_inserted_length: default_min_inserted_length(),
            in_process_tone: false,
            log_file: None,
        }
    }
}

impl Config {
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to get home directory")?;
        Ok(home.join(CONFIG_DIR_NAME))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(SETTINGS_FILE_NAME))
    }

    pub fn default_log_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(LOG_FILE_NAME))
    }

    /// Diagnostic log path, honouring the configured override
    pub fn log_path(&self) -> Result<PathBuf> {
        match &self.codex_monitor.log_file {
            Some(path) => Ok(path.clone()),
            None => Self::default_log_path(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        // Validate configuration after loading
        config.validate()?;

        Ok(config)
    }

    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            // Create default config
            let config = Config::default();
            config.save(path)?;
            tracing::info!("Created default config at: {}", path.display());
            Ok(config)
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.codex_monitor.min_inserted_length == 0 {
            bail!("minInsertedLength must be greater than 0");
        }

        if let Some(log_file) = &self.codex_monitor.log_file {
            if log_file.as_os_str().is_empty() {
                bail!("logFile cannot be empty");
            }
        }

        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(config_dir) = path.parent() {
            fs::create_dir_all(config_dir)
                .context("Failed to create config directory")?;
        }

        let yaml = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs::write(path, yaml)
            .context("Failed to write config file")?;

        Ok(())
    }
}

/// Where the monitor reads its settings from on every edit event
pub trait ConfigSource: Send + Sync {
    fn monitor_config(&self) -> MonitorConfig;
}

/// Re-reads the settings file on every call so edits apply to the next event
#[derive(Debug, Clone)]
pub struct FileConfigSource {
    path: PathBuf,
}

impl FileConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileConfigSource { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for FileConfigSource {
    fn monitor_config(&self) -> MonitorConfig {
        match Config::load(&self.path) {
            Ok(config) => config.codex_monitor,
            Err(e) => {
                tracing::warn!("Using default settings: {:#}", e);
                MonitorConfig::default()
            }
        }
    }
}

/// In-memory settings an embedding host can update at any time
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<MonitorConfig>>,
}

impl SharedConfig {
    pub fn new(config: MonitorConfig) -> Self {
        SharedConfig {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    pub fn with_threshold(min_inserted_length: usize) -> Self {
        Self::new(MonitorConfig {
            min_inserted_length,
            ..MonitorConfig::default()
        })
    }

    pub fn set_min_inserted_length(&self, min_inserted_length: usize) {
        match self.inner.write() {
            Ok(mut config) => config.min_inserted_length = min_inserted_length,
            Err(poisoned) => poisoned.into_inner().min_inserted_length = min_inserted_length,
        }
    }
}

impl ConfigSource for SharedConfig {
    fn monitor_config(&self) -> MonitorConfig {
        match self.inner.read() {
            Ok(config) => config.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
