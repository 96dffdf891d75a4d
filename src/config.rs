use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub view: ViewConfig,
    pub store: StoreConfig,
    pub navigation: NavigationConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewConfig {
    pub initial_zoom: f32,
    pub zoom_step: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            initial_zoom: 1.0,
            zoom_step: 0.2,
            min_zoom: 0.5,
            max_zoom: 3.0,
        }
    }
}

impl ViewConfig {
    pub fn clamp_zoom(&self, value: f32) -> f32 {
        value.clamp(self.min_zoom, self.max_zoom)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    File,
    Memory,
    Http,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub file_path: Option<PathBuf>,
    pub base_url: String,
    pub auth_token: String,
    pub request_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::File,
            file_path: None,
            base_url: "http://localhost:5000/api".to_string(),
            auth_token: String::new(),
            request_timeout_ms: 10_000,
        }
    }
}

impl StoreConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// The configured file, or the per-user data directory default.
    pub fn resolved_file_path(&self) -> Option<PathBuf> {
        self.file_path.clone().or_else(default_store_path)
    }
}

/// What to do with unsaved annotations when leaving a page.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OnDirty {
    #[default]
    Ask,
    Save,
    Discard,
}

impl FromStr for OnDirty {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ask" => Ok(Self::Ask),
            "save" => Ok(Self::Save),
            "discard" => Ok(Self::Discard),
            other => Err(format!("expected ask, save or discard, got {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct NavigationConfig {
    pub on_dirty: OnDirty,
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
        Ok(parsed.sanitized())
    }

    fn sanitized(mut self) -> Self {
        let defaults = ViewConfig::default();
        let view = &mut self.view;
        if !view.min_zoom.is_finite() || view.min_zoom <= 0.0 {
            view.min_zoom = defaults.min_zoom;
        }
        if !view.max_zoom.is_finite() || view.max_zoom < view.min_zoom {
            view.max_zoom = defaults.max_zoom.max(view.min_zoom);
        }
        if !view.zoom_step.is_finite() || view.zoom_step <= 0.0 {
            view.zoom_step = defaults.zoom_step;
        }
        if !view.initial_zoom.is_finite() {
            view.initial_zoom = defaults.initial_zoom;
        }
        view.initial_zoom = view.clamp_zoom(view.initial_zoom);

        self.store.request_timeout_ms = self.store.request_timeout_ms.max(1);
        self.store.base_url = self.store.base_url.trim().to_string();
        if self.store.base_url.is_empty() {
            self.store.base_url = StoreConfig::default().base_url;
        }
        self
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    if let Some(explicit) = std::env::var_os("APDF_CONFIG_PATH")
        && !explicit.is_empty()
    {
        return Some(PathBuf::from(explicit));
    }

    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME")
        && !xdg.is_empty()
    {
        return Some(PathBuf::from(xdg).join("apdf").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME")
        && !home.is_empty()
    {
        return Some(
            PathBuf::from(home)
                .join(".config")
                .join("apdf")
                .join("config.toml"),
        );
    }
    if let Some(appdata) = std::env::var_os("APPDATA")
        && !appdata.is_empty()
    {
        return Some(PathBuf::from(appdata).join("apdf").join("config.toml"));
    }
    None
}

pub fn default_store_path() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME")
        && !xdg.is_empty()
    {
        return Some(PathBuf::from(xdg).join("apdf").join("annotations.json"));
    }
    if let Some(home) = std::env::var_os("HOME")
        && !home.is_empty()
    {
        return Some(
            PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("apdf")
                .join("annotations.json"),
        );
    }
    if let Some(appdata) = std::env::var_os("APPDATA")
        && !appdata.is_empty()
    {
        return Some(PathBuf::from(appdata).join("apdf").join("annotations.json"));
    }
    None
}
