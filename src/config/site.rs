//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;
use thiserror::Error;

use crate::pagination::PageWindow;

/// Problems that make a configuration unusable
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("per_page must be greater than zero")]
    ZeroPerPage,

    #[error("page extension must not be empty")]
    EmptyExtension,

    #[error("unsupported page encoding: {0} (only utf-8 is supported)")]
    UnsupportedEncoding(String),
}

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub url: String,
    pub root: String,

    // Flat pages
    pub pages_dir: String,
    pub extension: String,
    pub auto_reload: bool,
    pub encoding: String,
    pub prerender: bool,

    // Directories
    pub static_dir: String,
    pub template_dir: String,

    // Blog
    pub per_page: usize,
    #[serde(default)]
    pub pagination: PageWindow,
    pub date_format: String,

    #[serde(default)]
    pub highlight: HighlightConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Salzburg Python User Group".to_string(),
            description: String::new(),
            url: "http://localhost:5000".to_string(),
            root: "/".to_string(),

            pages_dir: "pages".to_string(),
            extension: ".md".to_string(),
            auto_reload: false,
            encoding: "utf-8".to_string(),
            prerender: false,

            static_dir: "static".to_string(),
            template_dir: "templates".to_string(),

            per_page: 10,
            pagination: PageWindow::default(),
            date_format: "%Y-%m-%d".to_string(),

            highlight: HighlightConfig::default(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        if content.trim().is_empty() {
            return Ok(SiteConfig::default());
        }
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        tracing::debug!("Loaded configuration from {:?}", path.as_ref());
        Ok(config)
    }

    /// Reject values the rest of the site cannot work with
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.per_page == 0 {
            return Err(ConfigError::ZeroPerPage);
        }
        if self.extension.trim_start_matches('.').is_empty() {
            return Err(ConfigError::EmptyExtension);
        }
        let encoding = self.encoding.to_ascii_lowercase().replace('_', "-");
        if encoding != "utf-8" && encoding != "utf8" {
            return Err(ConfigError::UnsupportedEncoding(self.encoding.clone()));
        }
        Ok(())
    }

    /// Articles per blog index page
    pub fn page_size(&self) -> std::result::Result<NonZeroUsize, ConfigError> {
        NonZeroUsize::new(self.per_page).ok_or(ConfigError::ZeroPerPage)
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// syntect theme name
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}
