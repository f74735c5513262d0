use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 200;
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Root configuration structure. Deserialized from the startup config file
/// (`~/.config/hyprstart/config.toml` unless overridden on the command line).
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default, rename = "app")]
    pub apps: Vec<AppRule>,
}

/// Global defaults applied when no per-app override exists.
#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    /// Workspaces to switch through before launching anything, in order.
    #[serde(default)]
    pub prewarm_workspaces: Vec<i32>,
    /// Sleep between window-list polls while waiting for a window. Must be > 0.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Wait budget for apps that declare no `timeout_s` of their own.
    #[serde(default = "default_timeout_secs")]
    pub default_timeout_s: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            prewarm_workspaces: Vec::new(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            default_timeout_s: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Configuration entry for a single application to launch and place.
#[derive(Debug, Deserialize, Clone)]
pub struct AppRule {
    /// Human-readable name used in log lines.
    pub name: String,
    /// Shell command line handed to the launcher.
    pub cmd: String,
    /// Regex searched against each window's class string.
    pub class_regex: String,
    /// Workspace the window is moved to once it appears.
    pub workspace: i32,
    /// Monitor the window is additionally moved to, if set.
    pub monitor: Option<String>,
    /// Overrides the global wait timeout for this app (seconds).
    pub timeout_s: Option<u64>,
}

impl AppRule {
    /// Returns the effective wait timeout, falling back to the global config.
    pub fn effective_timeout_secs(&self, general: &GeneralConfig) -> u64 {
        self.timeout_s.unwrap_or(general.default_timeout_s)
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.general.poll_interval_ms == 0 {
            bail!("poll_interval_ms must be greater than 0");
        }

        for (i, app) in self.apps.iter().enumerate() {
            if app.name.is_empty() {
                bail!("app #{}: name must not be empty", i + 1);
            }
            if app.cmd.is_empty() {
                bail!("app '{}': cmd must not be empty", app.name);
            }
            Regex::new(&app.class_regex)
                .with_context(|| format!("app '{}': invalid class_regex", app.name))?;
        }

        Ok(())
    }
}

/// Loads and validates the config file at `path`.
/// The caller is expected to have checked that the path exists; a missing
/// file is reported as a read error here.
pub fn load(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
