use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::keyboard::catalog::DEFAULT_LAYOUT_ID;
use crate::text::passages::TextSource;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Last layout the user selected.
    #[serde(default = "default_keyboard_layout")]
    pub keyboard_layout: String,
    /// Zero means untimed.
    #[serde(default = "default_time_limit_secs")]
    pub time_limit_secs: u64,
    #[serde(default = "default_target_wpm")]
    pub target_wpm: u32,
    /// `"bundled"` or a path to a text file with one passage per line.
    #[serde(default = "default_text_source")]
    pub text_source: String,
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_keyboard_layout() -> String {
    DEFAULT_LAYOUT_ID.to_string()
}
fn default_time_limit_secs() -> u64 {
    0
}
fn default_target_wpm() -> u32 {
    20
}
fn default_text_source() -> String {
    "bundled".to_string()
}
fn default_theme() -> String {
    "default".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            keyboard_layout: default_keyboard_layout(),
            time_limit_secs: default_time_limit_secs(),
            target_wpm: default_target_wpm(),
            text_source: default_text_source(),
            theme: default_theme(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("devtype")
    }

    pub fn time_limit(&self) -> Option<Duration> {
        (self.time_limit_secs > 0).then(|| Duration::from_secs(self.time_limit_secs))
    }

    pub fn text_source(&self) -> TextSource {
        TextSource::from_setting(&self.text_source)
    }

    /// Reset a stored layout id that no longer names a known layout.
    pub fn normalize_layout(&mut self, known_ids: &[&str]) {
        if !known_ids.contains(&self.keyboard_layout.as_str()) {
            warn!(
                "configured layout '{}' is unknown, using '{}'",
                self.keyboard_layout, DEFAULT_LAYOUT_ID
            );
            self.keyboard_layout = default_keyboard_layout();
        }
    }
}
