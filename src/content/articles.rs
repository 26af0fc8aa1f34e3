//! Article selection and archives

use chrono::Datelike;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::FlatPage;

/// Published pages, newest first
///
/// Pages without a publish date are dropped. Equal dates fall back to path
/// order so the result is stable between requests.
pub fn published_articles<I>(pages: I) -> Vec<Arc<FlatPage>>
where
    I: IntoIterator<Item = Arc<FlatPage>>,
{
    let mut articles: Vec<_> = pages
        .into_iter()
        .filter(|p| p.meta.is_article())
        .collect();

    articles.sort_by(|a, b| {
        b.meta
            .published
            .cmp(&a.meta.published)
            .then_with(|| a.path.cmp(&b.path))
    });

    articles
}

/// Articles published in one year
#[derive(Debug, Clone)]
pub struct ArchiveYear {
    pub year: i32,
    pub articles: Vec<Arc<FlatPage>>,
}

/// Group date-sorted articles by year, newest year first
pub fn archive(articles: &[Arc<FlatPage>]) -> Vec<ArchiveYear> {
    let mut years: BTreeMap<i32, Vec<Arc<FlatPage>>> = BTreeMap::new();

    for article in articles {
        if let Some(date) = article.published() {
            years.entry(date.year()).or_default().push(Arc::clone(article));
        }
    }

    years
        .into_iter()
        .rev()
        .map(|(year, articles)| ArchiveYear { year, articles })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn page(path: &str, published: Option<&str>) -> Arc<FlatPage> {
        let content = match published {
            Some(date) => format!("title: {}\npublished: {}\n\nBody.\n", path, date),
            None => format!("title: {}\n\nBody.\n", path),
        };
        Arc::new(FlatPage::parse(path, &content, Path::new("test.md")))
    }

    #[test]
    fn test_published_articles_sorted_newest_first() {
        let pages = vec![
            page("about", None),
            page("blog/old", Some("2012-01-10")),
            page("blog/new", Some("2014-06-01")),
            page("blog/mid", Some("2013-03-15 19:00")),
        ];

        let articles = published_articles(pages);
        let paths: Vec<_> = articles.iter().map(|a| a.path.as_str()).collect();
        assert_eq!(paths, vec!["blog/new", "blog/mid", "blog/old"]);
    }

    #[test]
    fn test_same_date_ordered_by_path() {
        let pages = vec![
            page("blog/b", Some("2013-01-01")),
            page("blog/a", Some("2013-01-01")),
        ];
        let paths: Vec<_> = published_articles(pages)
            .iter()
            .map(|a| a.path.clone())
            .collect();
        assert_eq!(paths, vec!["blog/a", "blog/b"]);
    }

    #[test]
    fn test_archive_groups_by_year() {
        let articles = published_articles(vec![
            page("blog/a", Some("2013-01-01")),
            page("blog/b", Some("2014-02-01")),
            page("blog/c", Some("2013-12-24")),
        ]);

        let years = archive(&articles);
        assert_eq!(years.len(), 2);
        assert_eq!(years[0].year, 2014);
        assert_eq!(years[1].year, 2013);
        let paths: Vec<_> = years[1].articles.iter().map(|a| a.path.as_str()).collect();
        assert_eq!(paths, vec!["blog/c", "blog/a"]);
    }

    #[test]
    fn test_archive_of_nothing() {
        assert!(archive(&[]).is_empty());
    }
}
