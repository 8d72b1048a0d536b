use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShellError};

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

// ── Final (merged) config types ──

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    /// Alias name to command name.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    /// Variables defined at session start.
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub prompt: String,
    /// Written once before the first prompt.
    #[serde(default)]
    pub intro: String,
    /// History file of the root context. Empty disables persistence.
    #[serde(default)]
    pub history_file: String,
    /// Key bound to completion. Empty disables the root completion context.
    #[serde(default)]
    pub completion_key: String,
}

// ── Overlay types (user config that merges with defaults) ──

#[derive(Debug, Deserialize, Default)]
struct ConfigOverlay {
    #[serde(default)]
    settings: SettingsOverlay,
    #[serde(default)]
    aliases: MapOverlay,
    #[serde(default)]
    variables: MapOverlay,
}

#[derive(Debug, Deserialize, Default)]
struct SettingsOverlay {
    prompt: Option<String>,
    intro: Option<String>,
    history_file: Option<String>,
    completion_key: Option<String>,
}

/// A table overlay. `replace` and `remove` are reserved keys; everything
/// else is an entry.
#[derive(Debug, Deserialize, Default)]
struct MapOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    remove: Vec<String>,
    #[serde(flatten)]
    entries: BTreeMap<String, String>,
}

// ── Merge logic ──

/// Merge a user table into a default table.
/// In replace mode: user entries replace the defaults entirely.
/// In merge mode: remove keys first, then insert additions (user wins).
fn merge_map(base: &mut BTreeMap<String, String>, overlay: MapOverlay) {
    if overlay.replace {
        *base = overlay.entries;
    } else {
        base.retain(|key, _| !overlay.remove.contains(key));
        base.extend(overlay.entries);
    }
}

impl Config {
    /// Load the default embedded configuration.
    pub fn default_config() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }

    /// Load configuration with resolution order:
    /// 1. Start with embedded defaults
    /// 2. Merge user overlay from ~/.config/cmdloop/config.toml (if exists)
    ///
    /// A broken overlay is reported and the defaults are used.
    pub fn load() -> Self {
        let Some(path) = Self::user_config_path() else {
            return Self::default_config();
        };
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("cmdloop: {e}");
                log::warn!("ignoring {}: {e}", path.display());
                Self::default_config()
            }
        }
    }

    /// Defaults merged with the overlay at `path`. A missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::default_config();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(config),
            Err(e) => {
                return Err(ShellError::Config(format!("{}: {e}", path.display())));
            }
        };
        let overlay: ConfigOverlay = toml::from_str(&content)
            .map_err(|e| ShellError::Config(format!("{}: {e}", path.display())))?;
        config.apply_overlay(overlay);
        Ok(config)
    }

    /// ~/.config/cmdloop/config.toml, when HOME is set.
    pub fn user_config_path() -> Option<PathBuf> {
        let home = std::env::var_os("HOME")?;
        Some(Path::new(&home).join(".config/cmdloop/config.toml"))
    }

    /// The root history file with `~` expanded, if persistence is enabled.
    pub fn history_path(&self) -> Option<PathBuf> {
        let raw = self.settings.history_file.trim();
        if raw.is_empty() {
            return None;
        }
        Some(PathBuf::from(shellexpand::tilde(raw).into_owned()))
    }

    /// The merged configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ShellError::Config(e.to_string()))
    }

    /// Apply an overlay on top of this config (merge semantics).
    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        // Settings: scalar overrides
        let s = overlay.settings;
        if let Some(v) = s.prompt {
            self.settings.prompt = v;
        }
        if let Some(v) = s.intro {
            self.settings.intro = v;
        }
        if let Some(v) = s.history_file {
            self.settings.history_file = v;
        }
        if let Some(v) = s.completion_key {
            self.settings.completion_key = v;
        }

        merge_map(&mut self.aliases, overlay.aliases);
        merge_map(&mut self.variables, overlay.variables);
    }

    /// Apply an overlay from a TOML string. Used for testing.
    #[cfg(test)]
    fn apply_overlay_str(&mut self, toml_str: &str) {
        let overlay: ConfigOverlay = toml::from_str(toml_str).unwrap();
        self.apply_overlay(overlay);
    }
}
