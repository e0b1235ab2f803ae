/// Config file loading and creation for the carrot CLI.
///
/// Config lives at ~/.config/carrot/config.toml.
/// All fields are optional; CLI args override config values.
use carrot_core::Preferences;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::bail;

#[derive(Deserialize, Default)]
pub struct CarrotConfig {
    pub api_base: Option<String>,
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub preferences: Preferences,
}

const DEFAULT_CONFIG_TEMPLATE: &str = "\
# carrot configuration
# All values here can be overridden by CLI flags.

# Base URL of the contest API
# api_base = \"https://codeforces.com/api\"

# HTTP timeout in seconds
# timeout_secs = 30

[preferences]
# Show predicted deltas for contests that are running or awaiting ratings
# enable_predict_deltas = true

# Show published deltas (with recomputed performances) for rated contests
# enable_final_deltas = true

# Columns shown for predicted deltas
# show_col_current_performance = true
# show_col_predicted_delta = true
# show_col_rank_up_delta = true

# Columns shown for final deltas
# show_col_final_performance = true
# show_col_final_delta = true
# show_col_rank_change = true
";

/// Returns the default config path: ~/.config/carrot/config.toml
pub fn config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| bail("HOME environment variable not set"));
    PathBuf::from(home).join(".config").join("carrot").join("config.toml")
}

fn parse_config(content: &str) -> Result<CarrotConfig, toml::de::Error> {
    toml::from_str(content)
}

/// Load config from a file path. Returns default (all None) if file doesn't exist.
pub fn load_config(path: &Path) -> CarrotConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_config(&content)
            .unwrap_or_else(|e| bail(format!("Failed to parse config at {}: {e}", path.display()))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => CarrotConfig::default(),
        Err(e) => bail(format!("Failed to read config at {}: {e}", path.display())),
    }
}

/// Create the default config file. Errors if it already exists.
pub fn create_default_config(path: &Path) {
    if path.exists() {
        bail(format!("Config file already exists at {}", path.display()));
    }

    // Create parent directories
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .unwrap_or_else(|e| bail(format!("Failed to create directory {}: {e}", parent.display())));
    }

    std::fs::write(path, DEFAULT_CONFIG_TEMPLATE)
        .unwrap_or_else(|e| bail(format!("Failed to write config to {}: {e}", path.display())));
}
