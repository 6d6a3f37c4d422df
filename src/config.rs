//! TOML configuration.
//!
//! Every section is optional. A missing config file yields
//! [`Config::minimal`], which reproduces the shipped product: image globs
//! for intake, the numbered/Musaddiq grouping rules, and the original
//! search delays.
//!
//! ```toml
//! [intake]
//! include_globs = ["**/*.png", "**/*.jpg"]
//!
//! [[grouping.rules]]
//! name = "numbered"
//! label = "Numbered documents (1-14)"
//! match = { kind = "numbered", min = 1, max = 14 }
//!
//! [[grouping.rules]]
//! name = "musaddiq"
//! match = { kind = "contains", value = "musaddiq" }
//!
//! [search]
//! image_delay_ms = 3000
//! image_jitter_ms = 1000
//! prompt_delay_ms = 500
//! ```

use anyhow::{Context, Result};
use doc_intake_core::grouping::{default_rules, GroupRule, GroupingRules};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub intake: IntakeConfig,
    #[serde(default)]
    pub grouping: GroupingConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IntakeConfig {
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
            follow_symlinks: false,
        }
    }
}

fn default_include_globs() -> Vec<String> {
    vec![
        "**/*.png".to_string(),
        "**/*.jpg".to_string(),
        "**/*.jpeg".to_string(),
    ]
}

#[derive(Debug, Deserialize, Clone)]
pub struct GroupingConfig {
    #[serde(default = "default_rules")]
    pub rules: Vec<GroupRule>,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            rules: default_rules(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_image_delay_ms")]
    pub image_delay_ms: u64,
    #[serde(default = "default_image_jitter_ms")]
    pub image_jitter_ms: u64,
    #[serde(default = "default_prompt_delay_ms")]
    pub prompt_delay_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            image_delay_ms: default_image_delay_ms(),
            image_jitter_ms: default_image_jitter_ms(),
            prompt_delay_ms: default_prompt_delay_ms(),
        }
    }
}

fn default_image_delay_ms() -> u64 {
    3000
}
fn default_image_jitter_ms() -> u64 {
    1000
}
fn default_prompt_delay_ms() -> u64 {
    500
}

impl SearchConfig {
    /// No artificial delay at all. Used by tests and `--no-delay`.
    pub fn immediate() -> Self {
        Self {
            image_delay_ms: 0,
            image_jitter_ms: 0,
            prompt_delay_ms: 0,
        }
    }

    pub fn image_delay(&self) -> Duration {
        Duration::from_millis(self.image_delay_ms)
    }

    pub fn image_jitter(&self) -> Duration {
        Duration::from_millis(self.image_jitter_ms)
    }

    pub fn prompt_delay(&self) -> Duration {
        Duration::from_millis(self.prompt_delay_ms)
    }
}

impl Config {
    /// Built-in defaults, used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }

    /// Compile the configured grouping rules.
    pub fn grouping_rules(&self) -> Result<GroupingRules> {
        GroupingRules::compile(&self.grouping.rules).context("Invalid [grouping] configuration")
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = parse_config(&content)?;
    Ok(config)
}

/// Load `path` if it exists, otherwise fall back to [`Config::minimal`].
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::minimal())
    }
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    // Validate intake
    if config.intake.include_globs.is_empty() {
        anyhow::bail!("intake.include_globs must not be empty");
    }

    // Validate grouping: compile once so bad patterns fail at load time
    config.grouping_rules()?;

    Ok(config)
}
