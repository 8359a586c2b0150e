//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::helpers::{DEFAULT_DATE_FORMAT, WORDS_PER_MINUTE};
use crate::query::DEFAULT_LIMIT;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,

    // Listing
    pub per_page: usize,
    pub words_per_minute: usize,
    pub date_format: String,

    // Store
    /// Artificial delay applied to every store call, in milliseconds
    pub latency_ms: u64,
    /// YAML file with posts to seed the store with
    pub seed_file: Option<String>,

    // Admin
    pub admin: bool,
    pub unique_slugs: bool,

    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub style: StyleConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Folio".to_string(),
            description: String::new(),

            per_page: DEFAULT_LIMIT,
            words_per_minute: WORDS_PER_MINUTE,
            date_format: DEFAULT_DATE_FORMAT.to_string(),

            latency_ms: 0,
            seed_file: None,

            admin: true,
            unique_slugs: true,

            server: ServerConfig::default(),
            style: StyleConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", path))?;
        Ok(config)
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "localhost".to_string(),
            port: 4000,
        }
    }
}

/// CSS classes attached to rendered article markup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub h1: String,
    pub h2: String,
    pub h3: String,
    pub h4: String,
    pub paragraph: String,
    pub link: String,
    pub pre: String,
    pub code: String,
    /// Inline code directly inside a paragraph
    pub inline_code: String,
    pub ul: String,
    pub ol: String,
    pub li: String,
    pub blockquote: String,
    pub strong: String,
    pub em: String,
}

impl StyleConfig {
    /// Class list for an element name, used for raw HTML passed through the
    /// sanitizer
    pub fn class_for(&self, tag: &str) -> Option<&str> {
        let class = match tag {
            "h1" => &self.h1,
            "h2" => &self.h2,
            "h3" => &self.h3,
            "h4" => &self.h4,
            "p" => &self.paragraph,
            "a" => &self.link,
            "pre" => &self.pre,
            "ul" => &self.ul,
            "ol" => &self.ol,
            "li" => &self.li,
            "blockquote" => &self.blockquote,
            "strong" | "b" => &self.strong,
            "em" | "i" => &self.em,
            _ => return None,
        };
        Some(class.as_str())
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            h1: "text-4xl font-display font-bold text-gray-900 mb-10 mt-16".to_string(),
            h2: "text-3xl font-display font-bold text-gray-900 mb-8 mt-12".to_string(),
            h3: "text-2xl font-display font-semibold text-gray-900 mb-6 mt-10".to_string(),
            h4: "text-xl font-display font-semibold text-gray-900 mb-4 mt-8".to_string(),
            paragraph: "mb-8 leading-relaxed text-gray-700 text-lg".to_string(),
            link: "text-violet-600 hover:text-violet-800 underline font-semibold".to_string(),
            pre: "bg-gray-100 rounded-2xl p-6 my-8 overflow-x-auto border border-gray-200"
                .to_string(),
            code: "text-base font-mono text-gray-800".to_string(),
            inline_code: "bg-violet-100 px-3 py-1 rounded-lg text-base font-mono text-violet-800"
                .to_string(),
            ul: "mb-8".to_string(),
            ol: "mb-8".to_string(),
            li: "ml-6 mb-3 text-lg list-disc".to_string(),
            blockquote: "border-l-4 border-violet-500 pl-6 my-8 italic text-gray-700".to_string(),
            strong: "font-bold text-gray-900".to_string(),
            em: "italic text-gray-700".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.per_page, 6);
        assert_eq!(config.words_per_minute, 200);
        assert_eq!(config.latency(), Duration::ZERO);
        assert!(config.admin);
        assert!(config.unique_slugs);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
per_page: 10
latency_ms: 300
admin: false
server:
  port: 8080
style:
  h1: headline
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.per_page, 10);
        assert_eq!(config.latency(), Duration::from_millis(300));
        assert!(!config.admin);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.ip, "localhost");
        assert_eq!(config.style.h1, "headline");
        assert_eq!(config.style.h2, StyleConfig::default().h2);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "title: From Disk\nunique_slugs: false").unwrap();

        let config = SiteConfig::load(file.path()).unwrap();
        assert_eq!(config.title, "From Disk");
        assert!(!config.unique_slugs);
    }

    #[test]
    fn test_load_reports_bad_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "per_page: [not, a, number]").unwrap();
        assert!(SiteConfig::load(file.path()).is_err());
    }
}
