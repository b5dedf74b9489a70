use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

pub const APP_DIR_NAME: &str = "blog-aggregator";
pub const API_URL_ENV: &str = "AGGREGATOR_API_URL";
const DEFAULT_API_URL: &str = "http://127.0.0.1:8080/api";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub theme: ThemeConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Posts per page on the personal feed.
    pub page_size: u32,
    /// How many posts the Feeds view inspects to infer subscriptions.
    pub subscription_probe_limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub background_color: [u8; 3],
    pub panel_color: [u8; 3],
    pub accent_color: [u8; 3],
    pub text_color: [u8; 3],
    pub secondary_text_color: [u8; 3],
    pub border_color: [u8; 3],
    /// Text inputs and scroll backgrounds.
    pub input_color: [u8; 3],
    /// Striped rows and group frames.
    pub faint_color: [u8; 3],
    pub widget_color: [u8; 3],
    pub hover_color: [u8; 3],
    pub success_color: [u8; 3],
    pub error_color: [u8; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub font_size: f32,
    pub preview_chars: usize,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            page_size: 10,
            subscription_probe_limit: 50,
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            background_color: [30, 30, 30],
            panel_color: [37, 37, 38],
            accent_color: [0, 122, 204],
            text_color: [204, 204, 204],
            secondary_text_color: [150, 150, 150],
            border_color: [62, 62, 66],
            input_color: [25, 25, 25],
            faint_color: [45, 45, 45],
            widget_color: [50, 50, 50],
            hover_color: [46, 46, 46],
            success_color: [67, 160, 71],
            error_color: [229, 57, 53],
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            preview_chars: 200,
            window_width: 900.0,
            window_height: 800.0,
        }
    }
}

/// `~/.config/blog-aggregator` on Linux.
pub fn app_config_dir() -> Result<PathBuf, ConfigError> {
    let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(dir.join(APP_DIR_NAME))
}

impl AppConfig {
    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        Ok(app_config_dir()?.join("config.json"))
    }

    /// Loads the config file, falling back to (and writing) defaults when it
    /// is missing or unreadable. `AGGREGATOR_API_URL` overrides the base url.
    pub fn load() -> Self {
        let mut config = match Self::config_file_path().and_then(|p| Self::load_from(&p)) {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, "could not load configuration, using defaults");
                let defaults = Self::default();
                if let Err(save_err) = defaults.save() {
                    warn!(error = %save_err, "could not save default configuration");
                }
                defaults
            }
        };
        config.apply_env_overrides();
        config
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Self::config_file_path()?)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api.base_url = url.trim().to_string();
            }
        }
    }
}

fn rgb([r, g, b]: [u8; 3]) -> egui::Color32 {
    egui::Color32::from_rgb(r, g, b)
}

impl ThemeConfig {
    pub fn background_color32(&self) -> egui::Color32 {
        rgb(self.background_color)
    }

    pub fn panel_color32(&self) -> egui::Color32 {
        rgb(self.panel_color)
    }

    pub fn accent_color32(&self) -> egui::Color32 {
        rgb(self.accent_color)
    }

    pub fn text_color32(&self) -> egui::Color32 {
        rgb(self.text_color)
    }

    pub fn secondary_text_color32(&self) -> egui::Color32 {
        rgb(self.secondary_text_color)
    }

    pub fn border_color32(&self) -> egui::Color32 {
        rgb(self.border_color)
    }

    pub fn input_color32(&self) -> egui::Color32 {
        rgb(self.input_color)
    }

    pub fn faint_color32(&self) -> egui::Color32 {
        rgb(self.faint_color)
    }

    pub fn widget_color32(&self) -> egui::Color32 {
        rgb(self.widget_color)
    }

    pub fn hover_color32(&self) -> egui::Color32 {
        rgb(self.hover_color)
    }

    pub fn success_color32(&self) -> egui::Color32 {
        rgb(self.success_color)
    }

    pub fn error_color32(&self) -> egui::Color32 {
        rgb(self.error_color)
    }
}
