//! List site content

use anyhow::Result;
use std::fmt::Write;

use crate::content::archive;
use crate::Site;

/// List site content by type
pub fn run(site: &Site, content_type: &str) -> Result<()> {
    print!("{}", listing(site, content_type)?);
    Ok(())
}

/// Text listing of pages, articles, or the archive
pub fn listing(site: &Site, content_type: &str) -> Result<String> {
    let mut out = String::new();

    match content_type {
        "page" | "pages" => {
            let pages = site.pages.pages();
            writeln!(out, "Pages ({}):", pages.len())?;
            for page in pages {
                writeln!(out, "  /{}/ - {}", page.path, page.title())?;
            }
        }
        "article" | "articles" | "post" | "posts" => {
            let articles = site.articles();
            writeln!(out, "Articles ({}):", articles.len())?;
            for article in articles {
                let date = article
                    .published()
                    .map(|d| d.format(&site.config.date_format).to_string())
                    .unwrap_or_default();
                writeln!(out, "  {} - {} [{}]", date, article.title(), article.path)?;
            }
        }
        "archive" | "archives" => {
            for year in archive(&site.articles()) {
                writeln!(out, "{} ({})", year.year, year.articles.len())?;
                for article in &year.articles {
                    writeln!(out, "  {}", article.title())?;
                }
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: pages, articles, archive",
                content_type
            );
        }
    }

    Ok(out)
}
