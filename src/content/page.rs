//! Flat page model

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

use super::Meta;

/// A content unit loaded from a Markdown file
#[derive(Debug, Clone, PartialEq)]
pub struct FlatPage {
    /// URL path without the extension, e.g. `blog/first-meetup`
    pub path: String,

    /// Parsed front-matter
    pub meta: Meta,

    /// Raw Markdown after the front-matter
    pub body: String,

    /// Source file
    pub source: PathBuf,
}

impl FlatPage {
    /// Build a page from file contents
    pub fn parse(path: impl Into<String>, content: &str, source: &Path) -> Self {
        let (meta, body) = Meta::parse(content);
        Self {
            path: path.into(),
            meta,
            body: body.to_string(),
            source: source.to_path_buf(),
        }
    }

    /// Title from metadata, or the last path segment
    pub fn title(&self) -> &str {
        let fallback = self.path.rsplit('/').next().unwrap_or(&self.path);
        self.meta.title_or(fallback)
    }

    pub fn published(&self) -> Option<&DateTime<Local>> {
        self.meta.published.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_falls_back_to_path() {
        let page = FlatPage::parse("blog/hello-world", "Body only.\n", Path::new("x.md"));
        assert_eq!(page.title(), "hello-world");
        assert!(page.published().is_none());

        let page = FlatPage::parse(
            "blog/hello-world",
            "title: Hello, World\npublished: 2014-02-03\n\nBody.\n",
            Path::new("x.md"),
        );
        assert_eq!(page.title(), "Hello, World");
        assert!(page.published().is_some());
        assert_eq!(page.body, "Body.\n");
    }
}
