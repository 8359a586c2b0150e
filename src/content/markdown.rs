//! Markdown rendering: parse, sanitize, then style

use pulldown_cmark::{
    html, CodeBlockKind, CowStr, Event, HeadingLevel, LinkType, Options, Parser, Tag, TagEnd,
};

use super::sanitize::Sanitizer;
use crate::config::StyleConfig;
use crate::helpers::{class_attr, html_escape};

/// Placeholder rendered by [`MarkdownRenderer::render_preview`] for a blank body
pub const EMPTY_PREVIEW: &str = "No content yet...";

/// Markdown renderer producing sanitized, styled HTML
pub struct MarkdownRenderer {
    style: StyleConfig,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_style(StyleConfig::default())
    }

    /// Create with custom classes
    pub fn with_style(style: StyleConfig) -> Self {
        Self { style }
    }

    /// Render markdown to HTML
    ///
    /// Never fails: unclosed constructs degrade to text and unsafe markup is
    /// silently removed.
    pub fn render(&self, markdown: &str) -> String {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_GFM;

        // Single newlines are line breaks
        let parser = Parser::new_ext(markdown, options).map(|event| match event {
            Event::SoftBreak => Event::HardBreak,
            other => other,
        });

        let mut sanitizer = Sanitizer::styled(&self.style);
        let events = sanitizer.run(parser);
        if sanitizer.removed() > 0 {
            tracing::debug!("Sanitizer removed {} items", sanitizer.removed());
        }

        // Image alt text is written from the plain events between Start and
        // End, so nothing inside an image is styled.
        let mut image_depth = 0usize;
        let events = events.into_iter().map(|event| match event {
            Event::Start(Tag::Image { .. }) => {
                image_depth += 1;
                event
            }
            Event::End(TagEnd::Image) => {
                image_depth = image_depth.saturating_sub(1);
                event
            }
            event if image_depth > 0 => event,
            event => self.style_event(event),
        });

        let mut html_output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut html_output, events);

        html_output
    }

    /// Render an editor preview, with a placeholder for an empty body
    pub fn render_preview(&self, markdown: &str) -> String {
        if markdown.trim().is_empty() {
            self.render(EMPTY_PREVIEW)
        } else {
            self.render(markdown)
        }
    }

    /// Attach classes to opening tags. Closing tags are left to the HTML
    /// writer, which emits the same element names.
    fn style_event<'a>(&self, event: Event<'a>) -> Event<'a> {
        match event {
            Event::Start(tag) => match self.open_tag(&tag) {
                Some(markup) => Event::Html(CowStr::from(markup)),
                None => Event::Start(tag),
            },
            Event::Code(code) => Event::InlineHtml(CowStr::from(format!(
                "<code{}>{}</code>",
                class_attr(&self.style.inline_code),
                html_escape(&code)
            ))),
            other => other,
        }
    }

    fn open_tag(&self, tag: &Tag) -> Option<String> {
        let style = &self.style;
        let markup = match tag {
            Tag::Heading { level, .. } => {
                let (name, class) = match level {
                    HeadingLevel::H1 => ("h1", &style.h1),
                    HeadingLevel::H2 => ("h2", &style.h2),
                    HeadingLevel::H3 => ("h3", &style.h3),
                    HeadingLevel::H4 => ("h4", &style.h4),
                    _ => return None,
                };
                format!("<{}{}>", name, class_attr(class))
            }
            Tag::Paragraph => format!("<p{}>", class_attr(&style.paragraph)),
            Tag::BlockQuote(_) => format!("<blockquote{}>\n", class_attr(&style.blockquote)),
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().unwrap_or("").to_string()
                    }
                    CodeBlockKind::Indented => String::new(),
                };
                let class = if lang.is_empty() {
                    style.code.clone()
                } else {
                    format!("{} language-{}", style.code, lang).trim().to_string()
                };
                format!(
                    "<pre{}><code{}>",
                    class_attr(&style.pre),
                    class_attr(&class)
                )
            }
            Tag::List(Some(1)) => format!("<ol{}>\n", class_attr(&style.ol)),
            Tag::List(Some(start)) => {
                format!(r#"<ol{} start="{}">"#, class_attr(&style.ol), start) + "\n"
            }
            Tag::List(None) => format!("<ul{}>\n", class_attr(&style.ul)),
            Tag::Item => format!("<li{}>", class_attr(&style.li)),
            Tag::Strong => format!("<strong{}>", class_attr(&style.strong)),
            Tag::Emphasis => format!("<em{}>", class_attr(&style.em)),
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => {
                let mut markup = format!(
                    r#"<a{} target="_blank" rel="noopener noreferrer""#,
                    class_attr(&style.link)
                );
                if !dest_url.is_empty() {
                    let href = if *link_type == LinkType::Email {
                        format!("mailto:{}", dest_url)
                    } else {
                        dest_url.to_string()
                    };
                    markup.push_str(&format!(r#" href="{}""#, html_escape(&href)));
                }
                if !title.is_empty() {
                    markup.push_str(&format!(r#" title="{}""#, html_escape(title)));
                }
                markup.push('>');
                markup
            }
            _ => return None,
        };
        Some(markup)
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}
