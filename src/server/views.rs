//! Request handlers

use axum::{
    extract::{Path, State},
    http::Uri,
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use super::{ServerError, ServerState};
use crate::config::SiteConfig;
use crate::content::{archive as group_by_year, FlatPage};
use crate::helpers::{blog_page_url, encode_url, url_for};
use crate::pagination::Pagination;
use crate::templates::{ArchiveYearData, PageLink, PaginationData};
use crate::Site;

type ViewResult = Result<Response, ServerError>;

/// `/`: the `index` flat page, or the first blog page without one
pub(super) async fn home(State(state): State<Arc<ServerState>>) -> Response {
    state.respond("", home_view(&state.site))
}

/// `/blog/`
pub(super) async fn blog_index(State(state): State<Arc<ServerState>>) -> Response {
    state.respond("blog/", blog_view(&state.site, 1))
}

/// `/blog/page/{n}/`
pub(super) async fn blog_page(
    State(state): State<Arc<ServerState>>,
    Path(raw): Path<String>,
) -> Response {
    let path = format!("blog/page/{}/", raw);
    let result = match raw.parse::<i64>() {
        Ok(1) => Ok(Redirect::permanent(&blog_page_url(&state.site.config, 1)).into_response()),
        Ok(page) => blog_view(&state.site, page),
        Err(_) => Err(ServerError::not_found(&path)),
    };
    state.respond(&path, result)
}

/// `/blog` -> `/blog/`
pub(super) async fn blog_redirect(State(state): State<Arc<ServerState>>) -> Redirect {
    Redirect::permanent(&url_for(&state.site.config, "blog/"))
}

/// `/blog/page/{n}` -> `/blog/page/{n}/`
pub(super) async fn blog_page_redirect(
    State(state): State<Arc<ServerState>>,
    Path(raw): Path<String>,
) -> Redirect {
    let path = format!("blog/page/{}/", encode_url(&raw));
    Redirect::permanent(&url_for(&state.site.config, &path))
}

/// `/archive` -> `/archive/`
pub(super) async fn archive_redirect(State(state): State<Arc<ServerState>>) -> Redirect {
    Redirect::permanent(&url_for(&state.site.config, "archive/"))
}

/// `/archive/`
pub(super) async fn archive(State(state): State<Arc<ServerState>>) -> Response {
    state.respond("archive/", archive_view(&state.site))
}

/// Everything else is looked up as a flat page
pub(super) async fn flat_page(State(state): State<Arc<ServerState>>, uri: Uri) -> Response {
    let decoded = percent_encoding::percent_decode_str(uri.path()).decode_utf8_lossy();
    let path = decoded.trim_matches('/').to_string();

    let result = if path.is_empty() {
        home_view(&state.site)
    } else {
        match state.site.pages.get(&path) {
            Some(page) => render_flat_page(&state.site, &page),
            None => Err(ServerError::not_found(&path)),
        }
    };
    state.respond(&path, result)
}

fn home_view(site: &Site) -> ViewResult {
    match site.pages.get("index") {
        Some(page) => render_flat_page(site, &page),
        None => blog_view(site, 1),
    }
}

fn blog_view(site: &Site, page: i64) -> ViewResult {
    let per_page = site.config.page_size()?;
    let pagination = Pagination::new(site.articles(), page, per_page);

    if pagination.items().is_empty() && page != 1 {
        return Err(ServerError::not_found(&format!("blog/page/{}/", page)));
    }

    let articles = pagination
        .items()
        .iter()
        .map(|a| site.page_data(a))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut context = site.base_context();
    context.insert("articles", &articles);
    context.insert("pagination", &pagination_data(&site.config, &pagination));

    let html = site.templates.render("index.html", &context)?;
    Ok(Html(html).into_response())
}

fn archive_view(site: &Site) -> ViewResult {
    let years: Vec<ArchiveYearData> = group_by_year(&site.articles())
        .into_iter()
        .map(|y| ArchiveYearData {
            year: y.year,
            articles: y.articles.iter().map(|a| site.page_summary(a)).collect(),
        })
        .collect();

    let mut context = site.base_context();
    context.insert("years", &years);

    let html = site.templates.render("archive.html", &context)?;
    Ok(Html(html).into_response())
}

fn render_flat_page(site: &Site, page: &FlatPage) -> ViewResult {
    let template = match &page.meta.template {
        Some(name) => name.as_str(),
        None if page.meta.is_article() => "article.html",
        None => "page.html",
    };

    let mut context = site.base_context();
    context.insert("page", &site.page_data(page)?);
    context.insert("path", &page.path);

    let html = site.templates.render(template, &context)?;
    Ok(Html(html).into_response())
}

/// Pager data for the blog index templates
pub fn pagination_data<T>(config: &SiteConfig, pagination: &Pagination<T>) -> PaginationData {
    let current = pagination.page();

    let links = pagination
        .iter_pages(config.pagination)
        .map(|number| PageLink {
            number,
            url: number.map(|n| blog_page_url(config, n)),
            current: number.is_some_and(|n| n as i64 == current),
        })
        .collect();

    let prev_url = pagination
        .has_prev()
        .then(|| blog_page_url(config, (current - 1) as usize));
    let next_url = pagination
        .has_next()
        .then(|| blog_page_url(config, (current + 1).max(1) as usize));

    PaginationData {
        page: current,
        pages: pagination.pages(),
        per_page: pagination.per_page(),
        total: pagination.total(),
        has_prev: pagination.has_prev(),
        has_next: pagination.has_next(),
        prev_url,
        next_url,
        links,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::PageWindow;
    use std::num::NonZeroUsize;

    #[test]
    fn test_pagination_data_links() {
        let config = SiteConfig {
            pagination: PageWindow {
                left_current: 1,
                right_current: 1,
                ..Default::default()
            },
            ..Default::default()
        };
        let pagination = Pagination::new(0..19, 5, NonZeroUsize::new(2).unwrap());
        let data = pagination_data(&config, &pagination);

        assert_eq!(data.pages, 10);
        assert_eq!(data.prev_url.as_deref(), Some("/blog/page/4/"));
        assert_eq!(data.next_url.as_deref(), Some("/blog/page/6/"));

        let numbers: Vec<_> = data.links.iter().map(|l| l.number).collect();
        assert_eq!(
            numbers,
            vec![
                Some(1),
                Some(2),
                None,
                Some(4),
                Some(5),
                Some(6),
                None,
                Some(9),
                Some(10)
            ]
        );
        assert_eq!(data.links[0].url.as_deref(), Some("/blog/"));
        assert!(data.links[2].url.is_none());
        assert!(data.links[4].current);
        assert_eq!(data.links.iter().filter(|l| l.current).count(), 1);
    }

    #[test]
    fn test_pagination_data_second_page_links_back_to_blog_root() {
        let config = SiteConfig::default();
        let pagination = Pagination::new(0..15, 2, NonZeroUsize::new(10).unwrap());
        let data = pagination_data(&config, &pagination);
        assert_eq!(data.prev_url.as_deref(), Some("/blog/"));
        assert!(data.next_url.is_none());
    }
}
