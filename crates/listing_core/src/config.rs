use std::{fs, num::NonZeroU32, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;
use shared::protocol::Resource;

pub const DEFAULT_CONFIG_FILE: &str = "catalog.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub request_timeout_ms: u64,
    pub shop_page_size: NonZeroU32,
    pub product_page_size: NonZeroU32,
    pub category_page_size: NonZeroU32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api/v1".into(),
            request_timeout_ms: 10_000,
            shop_page_size: NonZeroU32::new(9).unwrap_or(NonZeroU32::MIN),
            product_page_size: NonZeroU32::new(6).unwrap_or(NonZeroU32::MIN),
            category_page_size: NonZeroU32::new(9).unwrap_or(NonZeroU32::MIN),
        }
    }
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn page_size(&self, resource: Resource) -> NonZeroU32 {
        match resource {
            Resource::Shops => self.shop_page_size,
            Resource::Products => self.product_page_size,
            Resource::Categories => self.category_page_size,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_url: Option<String>,
    request_timeout_ms: Option<u64>,
    shop_page_size: Option<u32>,
    product_page_size: Option<u32>,
    category_page_size: Option<u32>,
}

/// Defaults, then the config file, then `APP__*` environment variables.
///
/// An explicit `config_path` must exist; otherwise `catalog.toml` in the
/// working directory is read when present.
pub fn load_settings(config_path: Option<&Path>) -> Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    match config_path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?;
            apply_file(&mut settings, &raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?;
        }
        None => {
            if let Ok(raw) = fs::read_to_string(DEFAULT_CONFIG_FILE) {
                apply_file(&mut settings, &raw)
                    .with_context(|| format!("invalid config file '{DEFAULT_CONFIG_FILE}'"))?;
            }
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut ClientSettings, raw: &str) -> Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;

    if let Some(v) = file_cfg.api_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file_cfg.request_timeout_ms.filter(|ms| *ms > 0) {
        settings.request_timeout_ms = v;
    }
    if let Some(v) = file_cfg.shop_page_size.and_then(NonZeroU32::new) {
        settings.shop_page_size = v;
    }
    if let Some(v) = file_cfg.product_page_size.and_then(NonZeroU32::new) {
        settings.product_page_size = v;
    }
    if let Some(v) = file_cfg.category_page_size.and_then(NonZeroU32::new) {
        settings.category_page_size = v;
    }
    Ok(())
}

fn apply_env(settings: &mut ClientSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("CATALOG_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("APP__API_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = parse_timeout_ms(lookup("APP__REQUEST_TIMEOUT_MS")) {
        settings.request_timeout_ms = v;
    }

    if let Some(v) = parse_page_size(lookup("APP__SHOP_PAGE_SIZE")) {
        settings.shop_page_size = v;
    }
    if let Some(v) = parse_page_size(lookup("APP__PRODUCT_PAGE_SIZE")) {
        settings.product_page_size = v;
    }
    if let Some(v) = parse_page_size(lookup("APP__CATEGORY_PAGE_SIZE")) {
        settings.category_page_size = v;
    }
}

fn parse_timeout_ms(raw: Option<String>) -> Option<u64> {
    raw?.trim().parse::<u64>().ok().filter(|ms| *ms > 0)
}

fn parse_page_size(raw: Option<String>) -> Option<NonZeroU32> {
    raw?.trim().parse::<u32>().ok().and_then(NonZeroU32::new)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
