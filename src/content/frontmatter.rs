//! Front-matter parsing for imported markdown posts

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

use super::post::{split_tags, NewPost, PostDraft};
use crate::error::Result;

/// Accepts `tags: a, b` as well as a YAML list
fn string_or_vec<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a comma-separated string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(split_tags(value))
        }

        fn visit_seq<S>(self, mut seq: S) -> std::result::Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_unit<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Front-matter block of an imported post
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    #[serde(deserialize_with = "string_or_vec")]
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    pub published: bool,
    pub date: Option<String>,
}

impl FrontMatter {
    /// Split a document into its YAML front-matter and the remaining body
    ///
    /// Documents without a `---` fenced header, or whose header is not YAML,
    /// come back with default front-matter and the full text as body.
    pub fn parse(content: &str) -> (Self, &str) {
        let trimmed = content.trim_start();
        let Some(rest) = trimmed.strip_prefix("---") else {
            return (FrontMatter::default(), content);
        };
        let rest = rest.trim_start_matches(['\n', '\r']);

        let Some(end_pos) = rest.find("\n---") else {
            return (FrontMatter::default(), content);
        };
        let yaml = &rest[..end_pos];
        let body = rest[end_pos + 4..].trim_start_matches(['\n', '\r']);

        match serde_yaml::from_str::<FrontMatter>(yaml) {
            Ok(fm) => (fm, body),
            Err(e) => {
                tracing::warn!("Failed to parse front-matter, treating as content: {}", e);
                (FrontMatter::default(), content)
            }
        }
    }

    /// Parse the date field
    pub fn parse_date(&self) -> Option<DateTime<Utc>> {
        self.date.as_deref().and_then(parse_date_string)
    }

    /// Build a validated create request from this front-matter and a body
    ///
    /// Goes through the same checks as the editor form. A `date` field
    /// overrides the publication timestamp of published posts.
    pub fn into_new_post(self, body: &str) -> Result<NewPost> {
        let date = self.parse_date();
        let draft = PostDraft {
            title: self.title.unwrap_or_default(),
            slug: self.slug.unwrap_or_default(),
            content: body.to_string(),
            excerpt: self.excerpt.unwrap_or_default(),
            tags: self.tags.join(", "),
            featured_image: self.featured_image.unwrap_or_default(),
            is_published: self.published,
        };

        let mut post = draft.into_new_post()?;
        if post.is_published && date.is_some() {
            post.published_at = date;
        }
        Ok(post)
    }
}

/// Parse a date string in various formats, as UTC
fn parse_date_string(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Hello World
date: 2024-01-15 10:30:00
published: true
tags:
  - rust
  - web
---

This is the content.
"#;

        let (fm, body) = FrontMatter::parse(content);
        assert_eq!(fm.title.as_deref(), Some("Hello World"));
        assert_eq!(fm.tags, vec!["rust", "web"]);
        assert!(fm.published);
        assert!(body.starts_with("This is the content."));
    }

    #[test]
    fn test_comma_separated_tags() {
        let (fm, _) = FrontMatter::parse("---\ntitle: T\ntags: Rust, Backend ,\n---\nBody");
        assert_eq!(fm.tags, vec!["Rust", "Backend"]);
    }

    #[test]
    fn test_no_frontmatter() {
        let (fm, body) = FrontMatter::parse("# Just markdown");
        assert!(fm.title.is_none());
        assert_eq!(body, "# Just markdown");
    }

    #[test]
    fn test_parse_date() {
        let fm = FrontMatter {
            date: Some("2024-01-15 10:30:00".to_string()),
            ..Default::default()
        };
        let dt = fm.parse_date().unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2024-01-15 10:30");

        let fm = FrontMatter {
            date: Some("2024-01-20T14:30:00Z".to_string()),
            ..Default::default()
        };
        assert!(fm.parse_date().is_some());
    }

    #[test]
    fn test_into_new_post() {
        let (fm, body) = FrontMatter::parse(
            "---\ntitle: Imported Post\nexcerpt: Short\npublished: true\ndate: 2024-02-01\n---\nHello",
        );
        let post = fm.into_new_post(body).unwrap();
        assert_eq!(post.slug, "imported-post");
        assert_eq!(post.content, "Hello");
        assert_eq!(
            post.published_at.map(|d| d.format("%Y-%m-%d").to_string()),
            Some("2024-02-01".to_string())
        );
    }

    #[test]
    fn test_into_new_post_requires_excerpt() {
        let (fm, body) = FrontMatter::parse("---\ntitle: No Excerpt\n---\nHello");
        assert!(fm.into_new_post(body).is_err());
    }
}
