//! Front-matter parsing

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

lazy_static! {
    /// `key:` or `key: value`, where key is a plain identifier
    static ref YAML_KEY: Regex = Regex::new(r"^([A-Za-z0-9_-]+):(\s|$)").unwrap();
}

/// Typed metadata from the head of a flat page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Meta {
    pub title: Option<String>,

    /// Publish date; its presence makes the page an article
    #[serde(deserialize_with = "date_or_none", serialize_with = "serialize_date")]
    pub published: Option<DateTime<Local>>,

    /// Template used instead of the default page/article template
    pub template: Option<String>,

    /// Short Markdown teaser shown on the blog index
    pub summary: Option<String>,

    /// Per-page override of the prerender setting
    pub prerender: Option<bool>,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

/// Accepts a date, a datetime, or nothing; unparseable dates become `None`
fn date_or_none<'de, D>(deserializer: D) -> Result<Option<DateTime<Local>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    let raw = match value {
        Some(serde_yaml::Value::String(s)) => s,
        Some(serde_yaml::Value::Number(n)) => n.to_string(),
        _ => return Ok(None),
    };
    let parsed = parse_date_string(&raw);
    if parsed.is_none() {
        tracing::warn!("Ignoring unparseable publish date: {}", raw);
    }
    Ok(parsed)
}

fn serialize_date<S>(date: &Option<DateTime<Local>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match date {
        Some(d) => serializer.serialize_some(&d.to_rfc3339()),
        None => serializer.serialize_none(),
    }
}

impl Meta {
    /// Split `content` into metadata and body
    ///
    /// Two layouts are accepted: a `---` fenced YAML block, or YAML lines
    /// up to the first blank line. Anything that does not look like YAML
    /// metadata is left in the body.
    pub fn parse(content: &str) -> (Self, &str) {
        let trimmed = content.trim_start_matches(['\n', '\r']);

        if let Some(rest) = trimmed.strip_prefix("---") {
            if rest.starts_with('\n') || rest.starts_with("\r\n") {
                return Self::parse_fenced(trimmed, rest);
            }
        }

        Self::parse_leading_block(trimmed)
    }

    fn parse_fenced<'a>(content: &'a str, rest: &'a str) -> (Self, &'a str) {
        let rest = rest
            .strip_prefix("\r\n")
            .or_else(|| rest.strip_prefix('\n'))
            .unwrap_or(rest);

        // The closing fence may directly follow the opening one
        let (yaml_content, after) = match rest.strip_prefix("---") {
            Some(after) => ("", after),
            None => match rest.find("\n---") {
                Some(end_pos) => (&rest[..end_pos], &rest[end_pos + 4..]),
                None => return (Meta::default(), content),
            },
        };
        let remaining = after.trim_start_matches(['\n', '\r']);

        if yaml_content.trim().is_empty() {
            return (Meta::default(), remaining);
        }

        if !looks_like_yaml(yaml_content) {
            return (Meta::default(), content);
        }

        match serde_yaml::from_str::<Meta>(yaml_content) {
            Ok(meta) => (meta, remaining),
            Err(e) => {
                tracing::warn!("Failed to parse YAML front-matter, treating as content: {}", e);
                (Meta::default(), content)
            }
        }
    }

    fn parse_leading_block(content: &str) -> (Self, &str) {
        let (head, body) = split_at_blank_line(content);

        if head.trim().is_empty() || !looks_like_yaml(head) {
            return (Meta::default(), content);
        }

        // Every top-level line must belong to a mapping entry, otherwise
        // this is an ordinary first paragraph that happens to contain a colon.
        let all_keys = head
            .lines()
            .filter(|l| !l.trim().is_empty() && !l.starts_with(char::is_whitespace))
            .all(|l| YAML_KEY.is_match(l) || l.starts_with('#') || l.starts_with("- "));
        if !all_keys {
            return (Meta::default(), content);
        }

        match serde_yaml::from_str::<Meta>(head) {
            Ok(meta) => (meta, body),
            Err(e) => {
                tracing::debug!("Leading block is not front-matter: {}", e);
                (Meta::default(), content)
            }
        }
    }

    /// Title, falling back to the given default
    pub fn title_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.title.as_deref().unwrap_or(fallback)
    }

    pub fn is_article(&self) -> bool {
        self.published.is_some()
    }
}

/// Split at the first blank line; the body is empty if there is none
fn split_at_blank_line(content: &str) -> (&str, &str) {
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        if line.trim().is_empty() {
            let body = &content[offset + line.len()..];
            return (&content[..offset], body.trim_start_matches(['\n', '\r']));
        }
        offset += line.len();
    }
    (content, "")
}

fn looks_like_yaml(block: &str) -> bool {
    block.lines().any(|line| {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return false;
        }
        match YAML_KEY.captures(trimmed) {
            Some(caps) => !matches!(&caps[1], "http" | "https" | "ftp"),
            None => false,
        }
    })
}

/// Parse a date string in various formats
pub fn parse_date_string(s: &str) -> Option<DateTime<Local>> {
    let s = s.trim();

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Local.from_local_datetime(&dt).earliest();
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            let dt = d.and_hms_opt(0, 0, 0)?;
            return Local.from_local_datetime(&dt).earliest();
        }
    }

    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Local))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parse_fenced_frontmatter() {
        let content = r#"---
title: First Meetup
published: 2013-05-02
location: Coworking Salzburg
---

We met for the first time.
"#;

        let (meta, body) = Meta::parse(content);
        assert_eq!(meta.title.as_deref(), Some("First Meetup"));
        let date = meta.published.unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2013, 5, 2));
        assert_eq!(
            meta.extra.get("location").and_then(|v| v.as_str()),
            Some("Coworking Salzburg")
        );
        assert_eq!(body.trim(), "We met for the first time.");
    }

    #[test]
    fn test_parse_empty_fenced_frontmatter() {
        let (meta, body) = Meta::parse("---\n---\nBody\n");
        assert!(meta.title.is_none());
        assert!(meta.extra.is_empty());
        assert_eq!(body, "Body\n");

        let (_, body) = Meta::parse("---\r\n---\r\n\r\nBody\r\n");
        assert_eq!(body, "Body\r\n");
    }

    #[test]
    fn test_parse_blank_line_frontmatter() {
        let content = "title: About\ntemplate: about.html\n\nWho we are.\n\nMore text.\n";
        let (meta, body) = Meta::parse(content);
        assert_eq!(meta.title.as_deref(), Some("About"));
        assert_eq!(meta.template.as_deref(), Some("about.html"));
        assert!(!meta.is_article());
        assert_eq!(body, "Who we are.\n\nMore text.\n");
    }

    #[test]
    fn test_no_frontmatter() {
        let content = "# Hello\n\nJust text.\n";
        let (meta, body) = Meta::parse(content);
        assert_eq!(meta, Meta::default());
        assert_eq!(body, content);
    }

    #[test]
    fn test_prose_with_colon_is_not_metadata() {
        let content = "Note: this is a paragraph, not metadata\nand it goes on.\n\nSecond.\n";
        let (meta, body) = Meta::parse(content);
        assert_eq!(meta.title, None);
        assert_eq!(body, content);
    }

    #[test]
    fn test_url_line_is_not_metadata() {
        let content = "https://example.com/path\n\nText.\n";
        let (meta, body) = Meta::parse(content);
        assert_eq!(meta.title, None);
        assert_eq!(body, content);
    }

    #[test]
    fn test_markdown_separator_not_yaml() {
        let content = "---\n\nSome text.\n- Item 1\n\n---\nMore.\n";
        let (meta, body) = Meta::parse(content);
        assert_eq!(meta.title, None);
        assert!(body.contains("Some text."));
    }

    #[test]
    fn test_unparseable_date_is_not_an_article() {
        let content = "title: Draft\npublished: someday\n\nBody.\n";
        let (meta, _) = Meta::parse(content);
        assert_eq!(meta.title.as_deref(), Some("Draft"));
        assert!(!meta.is_article());
    }

    #[test]
    fn test_parse_date_formats() {
        for s in [
            "2024-01-15",
            "2024/01/15",
            "2024-01-15 10:30",
            "2024-01-15 10:30:00",
            "2024-01-15T10:30:00",
            "2024-01-15T10:30:00+01:00",
        ] {
            let dt = parse_date_string(s).unwrap_or_else(|| panic!("failed on {}", s));
            assert_eq!(dt.format("%Y-%m").to_string(), "2024-01");
        }
        assert!(parse_date_string("yesterday").is_none());
    }
}
