use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::utils;

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Empty means the profile's data directory
    #[serde(default)]
    pub database_path: String,
    #[serde(default = "default_status_timeout_secs")]
    pub status_timeout_secs: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub key_bindings: KeyBindings,
    #[serde(default = "default_current_theme")]
    pub current_theme: String,
    #[serde(default)]
    pub themes: HashMap<String, Theme>,
    #[serde(default = "default_config_version")]
    pub config_version: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(default = "default_quit")]
    pub quit: String,
    #[serde(default = "default_help")]
    pub help: String,
    #[serde(default = "default_dashboard")]
    pub dashboard: String,
    #[serde(default = "default_tracker")]
    pub tracker: String,
    #[serde(default = "default_analytics")]
    pub analytics: String,
    #[serde(default = "default_calendar")]
    pub calendar: String,
    #[serde(default = "default_logout")]
    pub logout: String,
    #[serde(default = "default_toggle_tracking")]
    pub toggle_tracking: String,
    #[serde(default = "default_toggle_productive")]
    pub toggle_productive: String,
    #[serde(default = "default_next_field")]
    pub next_field: String,
    #[serde(default = "default_previous_field")]
    pub previous_field: String,
    #[serde(default = "default_submit")]
    pub submit: String,
    #[serde(default = "default_undo")]
    pub undo: String,
    #[serde(default = "default_word_left")]
    pub word_left: String,
    #[serde(default = "default_word_right")]
    pub word_right: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "default_fg")]
    pub fg: String,
    #[serde(default = "default_bg")]
    pub bg: String,
    #[serde(default = "default_highlight_bg")]
    pub highlight_bg: String,
    /// Empty means "pick a readable colour for highlight_bg"
    #[serde(default = "default_highlight_fg")]
    pub highlight_fg: String,
    #[serde(default = "default_nav_bg")]
    pub nav_bg: String,
}

impl Default for Config {
    fn default() -> Self {
        let mut themes = HashMap::new();

        // Example custom theme so users can see the shape
        themes.insert(
            "midnight".to_string(),
            Theme {
                fg: "lightcyan".to_string(),
                bg: "black".to_string(),
                highlight_bg: "#1E3A5F".to_string(),
                highlight_fg: String::new(),
                nav_bg: "darkgray".to_string(),
            },
        );

        Self {
            database_path: default_database_path(),
            status_timeout_secs: default_status_timeout_secs(),
            log_level: default_log_level(),
            key_bindings: KeyBindings::default(),
            current_theme: default_current_theme(),
            themes,
            config_version: Some(CURRENT_CONFIG_VERSION),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: default_quit(),
            help: default_help(),
            dashboard: default_dashboard(),
            tracker: default_tracker(),
            analytics: default_analytics(),
            calendar: default_calendar(),
            logout: default_logout(),
            toggle_tracking: default_toggle_tracking(),
            toggle_productive: default_toggle_productive(),
            next_field: default_next_field(),
            previous_field: default_previous_field(),
            submit: default_submit(),
            undo: default_undo(),
            word_left: default_word_left(),
            word_right: default_word_right(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: default_fg(),
            bg: default_bg(),
            highlight_bg: default_highlight_bg(),
            highlight_fg: default_highlight_fg(),
            nav_bg: default_nav_bg(),
        }
    }
}

impl Theme {
    fn preset(fg: &str, bg: &str, highlight_bg: &str, highlight_fg: &str, nav_bg: &str) -> Self {
        Self {
            fg: fg.to_string(),
            bg: bg.to_string(),
            highlight_bg: highlight_bg.to_string(),
            highlight_fg: highlight_fg.to_string(),
            nav_bg: nav_bg.to_string(),
        }
    }

    /// Themes that are always available
    pub fn get_preset_themes() -> HashMap<String, Theme> {
        HashMap::from([
            ("default".to_string(), Theme::default()),
            ("dark".to_string(), Theme::preset("white", "black", "cyan", "black", "darkgray")),
            ("light".to_string(), Theme::preset("black", "white", "blue", "white", "gray")),
            ("green".to_string(), Theme::preset("green", "black", "yellow", "black", "darkgray")),
        ])
    }
}

fn default_database_path() -> String {
    Config::default_database_path_for_profile(utils::Profile::Prod)
}

fn default_status_timeout_secs() -> u64 {
    3
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_current_theme() -> String {
    "default".to_string()
}

fn default_quit() -> String {
    "Ctrl+q".to_string()
}

fn default_help() -> String {
    "F1".to_string()
}

fn default_dashboard() -> String {
    "F2".to_string()
}

fn default_tracker() -> String {
    "F3".to_string()
}

fn default_analytics() -> String {
    "F4".to_string()
}

fn default_calendar() -> String {
    "F5".to_string()
}

fn default_logout() -> String {
    "Ctrl+l".to_string()
}

fn default_toggle_tracking() -> String {
    "Ctrl+t".to_string()
}

fn default_toggle_productive() -> String {
    "Ctrl+p".to_string()
}

fn default_next_field() -> String {
    "Tab".to_string()
}

fn default_previous_field() -> String {
    "BackTab".to_string()
}

fn default_submit() -> String {
    "Enter".to_string()
}

fn default_undo() -> String {
    "Ctrl+z".to_string()
}

fn default_word_left() -> String {
    "Ctrl+Left".to_string()
}

fn default_word_right() -> String {
    "Ctrl+Right".to_string()
}

fn default_fg() -> String {
    "white".to_string()
}

fn default_bg() -> String {
    "black".to_string()
}

fn default_highlight_bg() -> String {
    "blue".to_string()
}

fn default_highlight_fg() -> String {
    "white".to_string()
}

fn default_nav_bg() -> String {
    "gray".to_string()
}

fn default_config_version() -> Option<u32> {
    Some(CURRENT_CONFIG_VERSION)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config directory: {0}")]
    ConfigDirError(String),
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
}

impl Config {
    /// Load the profile's config file, creating it with defaults if missing
    pub fn load_with_profile(profile: utils::Profile) -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path(profile)?;
        Self::load_from(&config_path, &Self::default_database_path_for_profile(profile))
    }

    /// Load from an explicit path. `default_database` fills in a missing or empty database path.
    pub fn load_from(config_path: &Path, default_database: &str) -> Result<Self, ConfigError> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)
                .map_err(|e| ConfigError::ReadError(e.to_string()))?;
            let mut config: Config = toml::from_str(&contents)?;
            if config.database_path.trim().is_empty() {
                config.database_path = default_database.to_string();
            }
            Ok(config)
        } else {
            let mut config = Config {
                database_path: default_database.to_string(),
                ..Config::default()
            };
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    fn save_to(&mut self, config_path: &Path) -> Result<(), ConfigError> {
        self.config_version = Some(CURRENT_CONFIG_VERSION);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {}", e)))?;

        fs::write(config_path, toml_string).map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        let config_dir = utils::get_config_dir(profile).ok_or_else(|| {
            ConfigError::ConfigDirError("Could not determine config directory".to_string())
        })?;
        Ok(config_dir.join("config.toml"))
    }

    fn default_database_path_for_profile(profile: utils::Profile) -> String {
        if let Some(data_dir) = utils::get_data_dir(profile) {
            data_dir.join("app.db").to_string_lossy().to_string()
        } else {
            match profile {
                utils::Profile::Dev => "~/.local/share/timeguru-dev/app.db".to_string(),
                utils::Profile::Prod => "~/.local/share/timeguru/app.db".to_string(),
            }
        }
    }

    /// Database path with `~` expanded
    pub fn get_database_path(&self) -> PathBuf {
        utils::expand_path(&self.database_path)
    }

    /// User themes win over presets; unknown names fall back to "default"
    pub fn get_active_theme(&self) -> Theme {
        use crate::tui::widgets::color::{format_color_for_display, get_contrast_text_color, parse_color};

        let mut theme = self
            .themes
            .get(&self.current_theme)
            .cloned()
            .or_else(|| Theme::get_preset_themes().remove(&self.current_theme))
            .unwrap_or_default();

        if theme.highlight_fg.is_empty() {
            let calculated_fg = get_contrast_text_color(parse_color(&theme.highlight_bg));
            theme.highlight_fg = format_color_for_display(&calculated_fg);
        }

        theme
    }
}
