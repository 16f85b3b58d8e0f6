use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub render: RenderConfig,
    pub capture: CaptureConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    pub initial_zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub zoom_step: f32,
    pub page_gap: f64,
    pub device_pixel_ratio: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            initial_zoom: 1.0,
            min_zoom: 0.25,
            max_zoom: 4.0,
            zoom_step: 1.25,
            page_gap: 16.0,
            device_pixel_ratio: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CaptureFormat {
    #[default]
    Png,
    Jpeg,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CaptureConfig {
    pub min_selection_size: f64,
    pub background: String,
    pub format: CaptureFormat,
    pub jpeg_quality: u8,
    pub default_label: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            min_selection_size: 20.0,
            background: "#ffffff".to_string(),
            format: CaptureFormat::Png,
            jpeg_quality: 85,
            default_label: "math".to_string(),
        }
    }
}

impl CaptureConfig {
    pub fn background_rgba(&self) -> AppResult<[u8; 4]> {
        parse_hex_color(&self.background)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Config {
    pub fn load() -> AppResult<Self> {
        let Some(path) = default_config_path() else {
            return Ok(Self::default());
        };
        Self::load_from_path(path)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        if !path.is_file() {
            return Err(AppError::invalid_argument(format!(
                "config path is not a regular file: {}",
                path.display()
            )));
        }

        let raw = fs::read_to_string(path).map_err(|source| {
            AppError::io_with_context(source, format!("failed to read config: {}", path.display()))
        })?;
        let parsed = toml::from_str::<Self>(&raw).map_err(|source| {
            AppError::invalid_argument(format!(
                "failed to parse config {}: {source}",
                path.display()
            ))
        })?;
        parsed.sanitized()
    }

    fn sanitized(mut self) -> AppResult<Self> {
        let defaults = RenderConfig::default();
        if !is_positive(self.render.min_zoom) {
            self.render.min_zoom = defaults.min_zoom;
        }
        if !is_positive(self.render.max_zoom) || self.render.max_zoom < self.render.min_zoom {
            self.render.max_zoom = defaults.max_zoom.max(self.render.min_zoom);
        }
        if !is_positive(self.render.initial_zoom) {
            self.render.initial_zoom = defaults.initial_zoom;
        }
        self.render.initial_zoom = self
            .render
            .initial_zoom
            .clamp(self.render.min_zoom, self.render.max_zoom);
        if !self.render.zoom_step.is_finite() || self.render.zoom_step <= 1.0 {
            self.render.zoom_step = defaults.zoom_step;
        }
        if !self.render.page_gap.is_finite() || self.render.page_gap < 0.0 {
            self.render.page_gap = defaults.page_gap;
        }
        if !is_positive(self.render.device_pixel_ratio) {
            self.render.device_pixel_ratio = defaults.device_pixel_ratio;
        }

        if !self.capture.min_selection_size.is_finite() || self.capture.min_selection_size < 1.0 {
            self.capture.min_selection_size = CaptureConfig::default().min_selection_size;
        }
        self.capture.jpeg_quality = self.capture.jpeg_quality.clamp(1, 100);
        if self.capture.default_label.trim().is_empty() {
            self.capture.default_label = CaptureConfig::default().default_label;
        }
        self.capture.background_rgba()?;
        Ok(self)
    }
}

fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

/// Parses `#rrggbb` or `#rrggbbaa`.
pub fn parse_hex_color(value: &str) -> AppResult<[u8; 4]> {
    let invalid = || AppError::invalid_argument(format!("invalid color: {value:?}"));
    let hex = value.trim().strip_prefix('#').ok_or_else(invalid)?;
    if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
        return Err(invalid());
    }

    let mut rgba = [0xff_u8; 4];
    for (index, channel) in rgba.iter_mut().enumerate().take(hex.len() / 2) {
        let start = index * 2;
        *channel = u8::from_str_radix(&hex[start..start + 2], 16).map_err(|_| invalid())?;
    }
    Ok(rgba)
}

pub fn default_config_path() -> Option<PathBuf> {
    if let Some(explicit) = std::env::var_os("PRC_CONFIG_PATH")
        && !explicit.is_empty()
    {
        return Some(PathBuf::from(explicit));
    }

    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME")
        && !xdg.is_empty()
    {
        return Some(PathBuf::from(xdg).join("prc").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME")
        && !home.is_empty()
    {
        return Some(
            PathBuf::from(home)
                .join(".config")
                .join("prc")
                .join("config.toml"),
        );
    }
    if let Some(appdata) = std::env::var_os("APPDATA")
        && !appdata.is_empty()
    {
        return Some(PathBuf::from(appdata).join("prc").join("config.toml"));
    }
    None
}
