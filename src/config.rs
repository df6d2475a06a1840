//! Configuration for columnar
//!
//! Loads configuration from the TOML file at `~/.config/columnar/config.toml`.
//! A default file is written on first run if none exists.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Gap around every tiled frame, in pixels
    pub inner_gap: u32,
    /// Gap between the tiling area and the output edge, in pixels
    pub outer_gap: u32,
    /// Shell used for launcher, terminal and bound commands
    pub shell: String,
    pub launcher_command: String,
    pub terminal_command: String,
    pub border_width: u32,
    /// Frame background color (hex: 0xRRGGBB)
    pub border_color: u32,
    pub titlebar: TitlebarConfig,
    /// Extra bindings: `[Modifier+]*Keysym` -> shell command
    pub keybindings: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        let keybindings = [
            ("XF86MonBrightnessUp", "brightnessctl set +5%"),
            ("XF86MonBrightnessDown", "brightnessctl set 5%-"),
            ("XF86AudioRaiseVolume", "pactl set-sink-volume @DEFAULT_SINK@ +5%"),
            ("XF86AudioLowerVolume", "pactl set-sink-volume @DEFAULT_SINK@ -5%"),
            ("XF86AudioMute", "pactl set-sink-mute @DEFAULT_SINK@ toggle"),
        ]
        .into_iter()
        .map(|(key, cmd)| (key.to_string(), cmd.to_string()))
        .collect();

        Self {
            inner_gap: 4,
            outer_gap: 4,
            shell: "/bin/sh".to_string(),
            launcher_command: "rofi -show drun".to_string(),
            terminal_command: "alacritty".to_string(),
            border_width: 0,
            border_color: 0xa1d1cf,
            titlebar: TitlebarConfig::default(),
            keybindings,
        }
    }
}

impl Config {
    /// Load configuration from file, or use defaults if the file doesn't
    /// exist. A file that fails to parse is an error.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            info!("Config file not found at {:?}, using defaults", config_path);
            if let Err(e) = Self::save_default(&config_path) {
                warn!("Failed to create default config file: {:#}", e);
            }
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file {:?}", config_path))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file {:?}", config_path))?;

        info!("Configuration loaded from {:?}", config_path);
        debug!("Config: {:?}", config);
        Ok(config)
    }

    /// Parse a configuration document; missing keys keep their defaults.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("columnar");
        Ok(config_dir.join("config.toml"))
    }

    fn save_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(&Self::default())
            .context("Failed to serialize default config")?;
        fs::write(path, toml_string).context("Failed to write default config file")?;

        info!("Created default config file at {:?}", path);
        Ok(())
    }
}

/// Titlebar drawn at the top of every frame window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitlebarConfig {
    /// Height in pixels; 0 disables the titlebar
    pub height: u32,
    pub background: u32,
    pub font_color_active: u32,
    pub font_color_inactive: u32,
}

impl Default for TitlebarConfig {
    fn default() -> Self {
        Self {
            height: 18,
            background: 0xa1d1cf,
            font_color_active: 0x000000,
            font_color_inactive: 0x555555,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            inner_gap = 10
            terminal_command = "xterm"

            [titlebar]
            height = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.inner_gap, 10);
        assert_eq!(config.outer_gap, 4);
        assert_eq!(config.terminal_command, "xterm");
        assert_eq!(config.titlebar.height, 0);
        assert_eq!(config.titlebar.font_color_inactive, 0x555555);
        assert!(config.keybindings.contains_key("XF86AudioMute"));
    }

    #[test]
    fn test_keybindings_table_replaces_defaults() {
        let config = Config::from_toml(
            r#"
            [keybindings]
            "Mod4+p" = "passmenu"
            "#,
        )
        .unwrap();
        assert_eq!(config.keybindings.len(), 1);
        assert_eq!(config.keybindings["Mod4+p"], "passmenu");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        assert!(Config::from_toml("inner_gap = \"wide\"").is_err());
        assert!(Config::from_toml("[titlebar").is_err());
    }

    #[test]
    fn test_default_file_parses_back() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), Config::default());
    }
}
