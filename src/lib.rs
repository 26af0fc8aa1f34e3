//! salzpug: the Salzburg Python User Group's website
//!
//! Markdown "flat pages" with YAML front-matter are served as HTML. Pages
//! with a publish date are articles; they make up a paginated blog index
//! and a yearly archive. Code blocks are highlighted with syntect.

pub mod commands;
pub mod config;
pub mod content;
pub mod helpers;
pub mod pagination;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tera::Context;

use content::{FlatPage, MarkdownRenderer, PageStore};
use templates::{ConfigData, PageData, TemplateRenderer};

/// Everything a request handler needs, built once at startup
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Flat page directory
    pub pages_dir: PathBuf,
    /// Static file directory
    pub static_dir: PathBuf,
    /// Template override directory
    pub template_dir: PathBuf,
    /// Loaded flat pages
    pub pages: PageStore,
    pub markdown: MarkdownRenderer,
    pub templates: TemplateRenderer,
}

impl Site {
    /// Create a site from a directory, reading `_config.yml` if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let config_path = Self::config_path_in(base_dir.as_ref());

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Self::with_config(base_dir, config)
    }

    /// Create a site from a directory and an explicit configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Result<Self> {
        config.validate()?;

        let base_dir = base_dir.as_ref().to_path_buf();
        let pages_dir = base_dir.join(&config.pages_dir);
        let static_dir = base_dir.join(&config.static_dir);
        let template_dir = base_dir.join(&config.template_dir);

        let pages = PageStore::open(&pages_dir, &config.extension, config.auto_reload)?;
        let markdown = MarkdownRenderer::with_options(&config.highlight);
        let templates = TemplateRenderer::new(&config.root, Some(template_dir.clone()))?;

        Ok(Self {
            config,
            base_dir,
            pages_dir,
            static_dir,
            template_dir,
            pages,
            markdown,
            templates,
        })
    }

    pub fn config_path(&self) -> PathBuf {
        Self::config_path_in(&self.base_dir)
    }

    fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join("_config.yml")
    }

    /// Published articles, newest first
    pub fn articles(&self) -> Vec<Arc<FlatPage>> {
        content::published_articles(self.pages.pages())
    }

    /// Context shared by every template
    pub fn base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("config", &self.config_data());
        context
    }

    pub fn config_data(&self) -> ConfigData {
        ConfigData {
            title: self.config.title.clone(),
            description: self.config.description.clone(),
            url: self.config.url.clone(),
            root: self.config.root.clone(),
            date_format: self.config.date_format.clone(),
            extra: self.config.extra.clone(),
        }
    }

    /// Render a page body to HTML, prerendering it first when enabled
    pub fn render_html(&self, page: &FlatPage) -> Result<String> {
        let prerender = page.meta.prerender.unwrap_or(self.config.prerender);
        if !prerender {
            return Ok(self.markdown.render(&page.body));
        }

        let mut context = self.base_context();
        context.insert("meta", &page.meta);
        context.insert("path", &page.path);
        let source = self
            .templates
            .prerender(&page.body, &context)
            .map_err(|e| anyhow::anyhow!("prerendering {} failed: {:#}", page.path, e))?;
        Ok(self.markdown.render(&source))
    }

    /// Template view of a page, with its body rendered
    pub fn page_data(&self, page: &FlatPage) -> Result<PageData> {
        Ok(PageData {
            path: page.path.clone(),
            url: helpers::page_url(&self.config, &page.path),
            permalink: helpers::page_permalink(&self.config, &page.path),
            title: page.title().to_string(),
            published: page.published().map(|d| d.to_rfc3339()),
            summary: page.meta.summary.as_deref().map(|s| self.markdown.render(s)),
            content: self.render_html(page)?,
            meta: page.meta.extra.clone(),
        })
    }

    /// Template view of a page without rendering its body
    pub fn page_summary(&self, page: &FlatPage) -> PageData {
        PageData {
            path: page.path.clone(),
            url: helpers::page_url(&self.config, &page.path),
            permalink: helpers::page_permalink(&self.config, &page.path),
            title: page.title().to_string(),
            published: page.published().map(|d| d.to_rfc3339()),
            summary: None,
            content: String::new(),
            meta: page.meta.extra.clone(),
        }
    }
}
