//! Content module - flat pages, their metadata, and Markdown rendering

mod articles;
mod frontmatter;
mod markdown;
mod page;
mod store;

pub use articles::{archive, published_articles, ArchiveYear};
pub use frontmatter::{parse_date_string, Meta};
pub use markdown::{html_escape, MarkdownRenderer};
pub use page::FlatPage;
pub use store::PageStore;
