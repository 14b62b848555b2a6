use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub schema_version: u32,

    /// Base URL of the text-generation inference server
    pub endpoint: String,

    /// Path to the tokenizer file (tokenizer.json)
    pub tokenizer_path: Option<PathBuf>,

    // Token budgets
    pub max_input_tokens: usize,
    pub max_output_tokens: u32,

    /// Sentence cap applied to the Subjective section during repair
    #[serde(default = "default_max_subjective_sentences")]
    pub max_subjective_sentences: usize,
}

fn default_max_subjective_sentences() -> usize {
    4
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: 1,
            endpoint: "http://localhost:8080".to_string(),
            tokenizer_path: None,
            max_input_tokens: 2048,
            max_output_tokens: 450,
            max_subjective_sentences: 4,
        }
    }
}

impl Config {
    /// Load config from file, or create default
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content =
                std::fs::read_to_string(path).context("Failed to read config file")?;
            serde_json::from_str(&content).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")
    }

    /// Get the default config directory
    pub fn default_config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to get home directory")?;
        Ok(home.join(".soapgen"))
    }

    /// Get the default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::default_config_dir()?.join("config.json"))
    }

    /// Get the tokenizer file path
    pub fn get_tokenizer_path(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.tokenizer_path {
            Ok(path.clone())
        } else {
            Ok(Self::default_config_dir()?.join("tokenizer.json"))
        }
    }
}
