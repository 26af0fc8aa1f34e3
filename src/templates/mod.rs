//! Built-in site templates using the Tera template engine
//!
//! The default templates are embedded in the binary. Any `*.html` file in
//! the site's template directory replaces the embedded template of the
//! same name.

use anyhow::{anyhow, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;
use tera::{Context, Tera};

use crate::helpers::url_for_root;

/// Template renderer with embedded default templates
pub struct TemplateRenderer {
    tera: RwLock<Tera>,
    root: String,
    override_dir: Option<PathBuf>,
}

impl TemplateRenderer {
    /// Create a renderer; `root` is the URL prefix used by `url_for`
    pub fn new(root: &str, override_dir: Option<PathBuf>) -> Result<Self> {
        let tera = build(root, override_dir.as_ref())?;
        Ok(Self {
            tera: RwLock::new(tera),
            root: root.to_string(),
            override_dir,
        })
    }

    /// Re-read the override directory
    pub fn reload(&self) -> Result<()> {
        let tera = build(&self.root, self.override_dir.as_ref())?;
        let mut guard = self
            .tera
            .write()
            .map_err(|_| anyhow!("template lock poisoned"))?;
        *guard = tera;
        tracing::info!("Reloaded templates");
        Ok(())
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        let tera = self
            .tera
            .read()
            .map_err(|_| anyhow!("template lock poisoned"))?;
        Ok(tera.render(template_name, context)?)
    }

    /// Run page source through the template engine before Markdown
    ///
    /// The source may use the same filters and functions as the site
    /// templates and include their partials.
    pub fn prerender(&self, source: &str, context: &Context) -> Result<String> {
        let mut tera = self
            .tera
            .read()
            .map_err(|_| anyhow!("template lock poisoned"))?
            .clone();
        Ok(tera.render_str(source, context)?)
    }
}

fn build(root: &str, override_dir: Option<&PathBuf>) -> Result<Tera> {
    let mut tera = Tera::default();

    tera.add_raw_templates(vec![
        ("layout.html", include_str!("default/layout.html")),
        ("index.html", include_str!("default/index.html")),
        ("page.html", include_str!("default/page.html")),
        ("article.html", include_str!("default/article.html")),
        ("archive.html", include_str!("default/archive.html")),
        ("404.html", include_str!("default/404.html")),
        (
            "partials/pager.html",
            include_str!("default/partials/pager.html"),
        ),
    ])?;

    if let Some(dir) = override_dir.filter(|d| d.is_dir()) {
        let pattern = format!("{}/**/*.html", dir.display());
        let mut site_templates = Tera::parse(&pattern)?;
        site_templates.extend(&tera)?;
        tera = site_templates;
        tracing::debug!("Loaded template overrides from {:?}", dir);
    }

    // Page bodies are already HTML
    tera.autoescape_on(vec![]);

    tera.register_filter("strip_html", strip_html_filter);
    tera.register_filter("truncate_chars", truncate_chars_filter);
    tera.register_filter("date_format", date_format_filter);

    let root = root.to_string();
    tera.register_function(
        "url_for",
        move |args: &HashMap<String, tera::Value>| -> tera::Result<tera::Value> {
            let path = match args.get("path") {
                Some(val) => tera::try_get_value!("url_for", "path", String, val),
                None => String::new(),
            };
            Ok(tera::Value::String(url_for_root(&root, &path)))
        },
    );

    Ok(tera)
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    Ok(tera::Value::String(result))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 200,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => " …".to_string(),
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!(
            "{}{}",
            truncated.trim_end(),
            omission
        )))
    }
}

/// Tera filter: reformat an RFC 3339 date with a chrono format string
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "%Y-%m-%d".to_string(),
    };

    match chrono::DateTime::parse_from_rfc3339(&s) {
        Ok(date) => Ok(tera::Value::String(date.format(&format).to_string())),
        Err(_) => Ok(tera::Value::String(s)),
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
    pub description: String,
    pub url: String,
    pub root: String,
    pub date_format: String,
    pub extra: HashMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageData {
    pub path: String,
    pub url: String,
    /// Absolute URL including the site's domain
    pub permalink: String,
    pub title: String,
    /// RFC 3339 publish date, for articles
    pub published: Option<String>,
    pub summary: Option<String>,
    pub content: String,
    pub meta: indexmap::IndexMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageLink {
    /// `None` marks an elided run of pages
    pub number: Option<usize>,
    pub url: Option<String>,
    pub current: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginationData {
    pub page: i64,
    pub pages: usize,
    pub per_page: usize,
    pub total: usize,
    pub has_prev: bool,
    pub has_next: bool,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
    pub links: Vec<PageLink>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArchiveYearData {
    pub year: i32,
    pub articles: Vec<PageData>,
}
