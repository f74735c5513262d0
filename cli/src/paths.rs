/// Canonical location of the startup config file:
///   $HOME/.config/hyprstart/config.toml
/// Overridable with the --config flag.
use std::path::PathBuf;

const APP_DIR_NAME: &str = "hyprstart";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Returns the default config file path under the user's home directory.
pub fn default_config_path() -> PathBuf {
    let home = std::env::var("HOME").expect("HOME environment variable not set");
    PathBuf::from(home)
        .join(".config")
        .join(APP_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}
