use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::progression::ScriptLevel;
use crate::engine::shuffle::ShuffleMode;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_script")]
    pub default_script: String,
    #[serde(default = "default_shuffle")]
    pub shuffle: String,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_script() -> String {
    "hiragana".to_string()
}
fn default_shuffle() -> String {
    "none".to_string()
}
fn default_tick_interval_ms() -> u64 {
    100
}
fn default_data_dir() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kanadr")
        .to_string_lossy()
        .to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_script: default_script(),
            shuffle: default_shuffle(),
            tick_interval_ms: default_tick_interval_ms(),
            data_dir: default_data_dir(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };
        config.normalize();
        Ok(config)
    }

    #[allow(dead_code)]
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kanadr")
            .join("config.toml")
    }

    /// Repair stale or hand-edited values. Call after deserialization.
    pub fn normalize(&mut self) {
        if self.script_level().to_key() != self.default_script {
            self.default_script = default_script();
        }
        if ShuffleMode::from_key(&self.shuffle).to_key() != self.shuffle {
            self.shuffle = default_shuffle();
        }
        self.tick_interval_ms = self.tick_interval_ms.clamp(10, 1000);
        if self.data_dir.is_empty() {
            self.data_dir = default_data_dir();
        }
    }

    pub fn script_level(&self) -> ScriptLevel {
        match self.default_script.as_str() {
            "katakana" => ScriptLevel::Katakana,
            "both" => ScriptLevel::Both,
            _ => ScriptLevel::Hiragana,
        }
    }

    pub fn shuffle_mode(&self) -> ShuffleMode {
        ShuffleMode::from_key(&self.shuffle)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }
}
