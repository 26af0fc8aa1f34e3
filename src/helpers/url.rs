//! URL helper functions

use crate::config::SiteConfig;

/// Join a path onto the URL root
///
/// # Examples
/// ```ignore
/// url_for_root("/pyugs/", "/static/style.css") // -> "/pyugs/static/style.css"
/// ```
pub fn url_for_root(root: &str, path: &str) -> String {
    let root = root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a URL with the configured root path
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    url_for_root(&config.root, path)
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/about/") // -> "https://pyugs.example/about/"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

/// URL of a flat page, with a trailing slash
pub fn page_url(config: &SiteConfig, page_path: &str) -> String {
    url_for(config, &page_route(page_path))
}

/// Absolute URL of a flat page, for canonical links
pub fn page_permalink(config: &SiteConfig, page_path: &str) -> String {
    full_url_for(config, &page_route(page_path))
}

/// `blog/über uns` -> `blog/%C3%BCber%20uns/`; `index` is the site root
fn page_route(page_path: &str) -> String {
    let page_path = page_path.trim_matches('/');
    if page_path.is_empty() || page_path == "index" {
        return String::new();
    }

    let encoded = page_path
        .split('/')
        .map(encode_url)
        .collect::<Vec<_>>()
        .join("/");
    format!("{}/", encoded)
}

/// URL of a blog index page; page 1 is the blog root
pub fn blog_page_url(config: &SiteConfig, page: usize) -> String {
    if page <= 1 {
        url_for(config, "blog/")
    } else {
        url_for(config, &format!("blog/page/{}/", page))
    }
}

/// Encode a URL path segment
pub fn encode_url(segment: &str) -> String {
    percent_encoding::utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Characters escaped inside a path segment
const SEGMENT: &percent_encoding::AsciiSet = &percent_encoding::NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');
