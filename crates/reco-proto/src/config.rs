use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::platform;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub list: ListConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Where the recommendation service lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Search box behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Queries shorter than this (in characters) never hit the service.
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
    /// Quiet period after the last keystroke. 0 fires on the next tick.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Matches per dropdown page.
    #[serde(default = "default_search_per_page")]
    pub per_page: u32,
}

/// Main result list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConfig {
    #[serde(default = "default_list_per_page")]
    pub per_page: u32,
    /// Page count shown by the pager. The service does not report one, so
    /// this is a fixed guess unless a response carries `total_pages`.
    #[serde(default = "default_total_pages")]
    pub total_pages: u32,
    /// Placeholder cards drawn while a page loads.
    #[serde(default = "default_skeleton_count")]
    pub skeleton_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Songs whose recommendation pages are kept; least recently used goes first.
    #[serde(default = "default_max_songs")]
    pub max_songs: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_len: default_min_query_len(),
            debounce_ms: default_debounce_ms(),
            per_page: default_search_per_page(),
        }
    }
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            per_page: default_list_per_page(),
            total_pages: default_total_pages(),
            skeleton_count: default_skeleton_count(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_songs: default_max_songs(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_min_query_len() -> usize {
    2
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_search_per_page() -> u32 {
    5
}

fn default_list_per_page() -> u32 {
    10
}

fn default_total_pages() -> u32 {
    5
}

fn default_skeleton_count() -> usize {
    10
}

fn default_max_songs() -> usize {
    32
}

impl Config {
    /// Load from the default location, writing defaults on first run.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save_to(&config_path)?;
            return Ok(config);
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.search.min_query_len, 2);
        assert_eq!(config.search.debounce_ms, 300);
        assert_eq!(config.search.per_page, 5);
        assert_eq!(config.list.per_page, 10);
        assert_eq!(config.list.total_pages, 5);
        assert_eq!(config.list.skeleton_count, 10);
        assert!(Config::config_path().ends_with("recoterm/config.toml"));
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let config: Config = toml::from_str(
            r#"
            [api]
            base_url = "http://music.lan:8080"

            [search]
            debounce_ms = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "http://music.lan:8080");
        assert_eq!(config.api.request_timeout_secs, 15);
        assert_eq!(config.search.debounce_ms, 0);
        assert_eq!(config.search.min_query_len, 2);
        assert_eq!(config.cache.max_songs, 32);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.list.total_pages = 9;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.list.total_pages, 9);
        assert_eq!(loaded.api.base_url, config.api.base_url);
    }
}
