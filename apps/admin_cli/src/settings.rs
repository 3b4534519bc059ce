use std::{fs, path::Path};

use anyhow::{bail, Context};
use serde::Deserialize;
use shared::protocol::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use url::Url;

pub const DEFAULT_SETTINGS_FILE: &str = "admin.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server_url: String,
    pub page_size: u32,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8080".into(),
            page_size: DEFAULT_PAGE_SIZE,
            log_filter: "info".into(),
        }
    }
}

/// Defaults, then the settings file, then environment overrides.
///
/// An explicitly named file must exist; the default `admin.toml` is optional.
pub fn load_settings(explicit_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = match explicit_path {
        Some(path) => read_settings_file(path)?,
        None => {
            let default_path = Path::new(DEFAULT_SETTINGS_FILE);
            if default_path.exists() {
                read_settings_file(default_path)?
            } else {
                Settings::default()
            }
        }
    };
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn read_settings_file(path: &Path) -> anyhow::Result<Settings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    toml::from_str(&raw)
        .with_context(|| format!("failed to parse settings file '{}'", path.display()))
}

pub fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("ADMIN_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = lookup("ADMIN_PAGE_SIZE") {
        if let Ok(parsed) = v.trim().parse::<u32>() {
            settings.page_size = parsed;
        }
    }
    if let Some(v) = lookup("APP__PAGE_SIZE") {
        if let Ok(parsed) = v.trim().parse::<u32>() {
            settings.page_size = parsed;
        }
    }

    if let Some(v) = lookup("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
}

impl Settings {
    /// Checks the server url and clamps the page size to what the server accepts.
    pub fn validated(mut self) -> anyhow::Result<Self> {
        let url = Url::parse(self.server_url.trim())
            .with_context(|| format!("invalid server url '{}'", self.server_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("server url must be http or https, got '{}'", url.scheme());
        }
        self.page_size = self.page_size.clamp(1, MAX_PAGE_SIZE);
        Ok(self)
    }
}
