//! HTML sanitization over the markdown event stream
//!
//! Markdown itself cannot produce executable markup; only raw HTML passed
//! through by the parser and link/image destinations can. The sanitizer
//! rewrites exactly those events and leaves the rest of the stream alone.

use lazy_static::lazy_static;
use pulldown_cmark::{CowStr, Event, Tag, TagEnd};
use regex::Regex;

use crate::config::StyleConfig;
use crate::helpers::class_attr;

lazy_static! {
    static ref TAG_RE: Regex =
        Regex::new(r#"^<(/?)([a-zA-Z][a-zA-Z0-9-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#)
            .expect("valid tag regex");
    static ref ATTR_RE: Regex =
        Regex::new(r#"([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
            .expect("valid attribute regex");
}

/// Elements removed together with everything inside them
const DANGEROUS_TAGS: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "noscript", "noembed", "noframes",
    "template", "textarea", "svg", "math", "form", "frame", "frameset", "applet", "base",
    "link", "meta", "title", "xmp",
];

/// Elements kept (with filtered attributes)
const ALLOWED_TAGS: &[&str] = &[
    "a", "abbr", "b", "blockquote", "br", "caption", "cite", "code", "dd", "del", "details",
    "dfn", "div", "dl", "dt", "em", "figcaption", "figure", "h1", "h2", "h3", "h4", "h5", "h6",
    "hr", "i", "img", "ins", "kbd", "li", "mark", "ol", "p", "pre", "q", "s", "samp", "small",
    "span", "strong", "sub", "summary", "sup", "table", "tbody", "td", "tfoot", "th", "thead",
    "tr", "u", "ul", "var",
];

const VOID_TAGS: &[&str] = &["br", "hr", "img", "base", "link", "meta", "embed"];

const ALLOWED_ATTRS: &[&str] = &[
    "href", "src", "alt", "title", "width", "height", "colspan", "rowspan", "align", "start",
    "cite", "datetime", "open", "lang", "dir",
];

const URL_ATTRS: &[&str] = &["href", "src", "cite"];

const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

/// Whether a URL may be emitted into an `href`/`src` attribute
///
/// Relative URLs are allowed. Absolute URLs need a scheme from the allow-list.
/// Whitespace and control characters are ignored the way browsers ignore them,
/// and an `&` before the first path delimiter is rejected since it may hide an
/// entity-encoded colon.
pub fn is_safe_url(url: &str) -> bool {
    let cleaned: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();

    let head_end = cleaned.find(['/', '?', '#']).unwrap_or(cleaned.len());
    let head = &cleaned[..head_end];

    match head.find(':') {
        Some(colon) => {
            let scheme = head[..colon].to_ascii_lowercase();
            SAFE_SCHEMES.contains(&scheme.as_str())
        }
        None => !head.contains('&'),
    }
}

/// Strips script-capable markup from a pulldown-cmark event stream
#[derive(Debug, Default)]
pub struct Sanitizer<'s> {
    /// Dangerous element whose content is being dropped
    skipping: Option<String>,
    /// Inline starts dropped while skipping, whose ends must be dropped too
    dropped_starts: usize,
    /// Number of elements or attributes removed so far
    removed: usize,
    /// Classes for re-emitted raw HTML elements
    style: Option<&'s StyleConfig>,
}

impl<'s> Sanitizer<'s> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also attach `style` classes to allow-listed raw HTML, and open raw
    /// links in a new tab like markdown links
    pub fn styled(style: &'s StyleConfig) -> Self {
        Self {
            style: Some(style),
            ..Self::default()
        }
    }

    /// Number of elements or attributes removed by the last run
    pub fn removed(&self) -> usize {
        self.removed
    }

    /// Sanitize a whole event stream
    pub fn run<'a, I>(&mut self, events: I) -> Vec<Event<'a>>
    where
        I: IntoIterator<Item = Event<'a>>,
    {
        let mut out = Vec::new();
        // Consecutive raw HTML events are cleaned as one chunk so a tag split
        // across lines of an HTML block is still seen whole.
        let mut raw = String::new();
        let mut raw_inline = false;

        for event in events {
            match event {
                Event::Html(html) => {
                    if raw_inline {
                        self.flush(&mut raw, raw_inline, &mut out);
                    }
                    raw_inline = false;
                    raw.push_str(&html);
                }
                Event::InlineHtml(html) => {
                    if !raw_inline {
                        self.flush(&mut raw, raw_inline, &mut out);
                    }
                    raw_inline = true;
                    raw.push_str(&html);
                }
                other => {
                    self.flush(&mut raw, raw_inline, &mut out);
                    if let Some(event) = self.filter(other) {
                        out.push(event);
                    }
                }
            }
        }
        self.flush(&mut raw, raw_inline, &mut out);

        out
    }

    fn flush<'a>(&mut self, raw: &mut String, inline: bool, out: &mut Vec<Event<'a>>) {
        if raw.is_empty() {
            return;
        }
        let cleaned = self.clean_html(raw);
        raw.clear();
        if cleaned.is_empty() {
            return;
        }
        let cleaned = CowStr::from(cleaned);
        out.push(if inline {
            Event::InlineHtml(cleaned)
        } else {
            Event::Html(cleaned)
        });
    }

    /// Handle a non-HTML event
    fn filter<'a>(&mut self, event: Event<'a>) -> Option<Event<'a>> {
        match event {
            Event::End(end) if is_block_end(&end) => {
                // Skipping never leaks past the block it started in
                self.skipping = None;
                self.dropped_starts = 0;
                Some(Event::End(end))
            }
            Event::Start(tag) if self.skipping.is_some() && is_inline_tag(&tag) => {
                self.dropped_starts += 1;
                None
            }
            Event::End(end) if self.dropped_starts > 0 && is_inline_end(&end) => {
                self.dropped_starts -= 1;
                None
            }
            Event::Start(tag) => Some(Event::Start(self.clean_tag(tag))),
            Event::Text(_)
            | Event::Code(_)
            | Event::SoftBreak
            | Event::HardBreak
            | Event::InlineMath(_)
            | Event::DisplayMath(_)
            | Event::FootnoteReference(_)
            | Event::TaskListMarker(_)
                if self.skipping.is_some() =>
            {
                None
            }
            other => Some(other),
        }
    }

    /// Scrub unsafe destinations from markdown links and images
    fn clean_tag<'a>(&mut self, tag: Tag<'a>) -> Tag<'a> {
        match tag {
            Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            } if !is_safe_url(&dest_url) => {
                self.removed += 1;
                tracing::warn!("Removed unsafe link destination: {}", dest_url);
                Tag::Link {
                    link_type,
                    dest_url: CowStr::from(""),
                    title,
                    id,
                }
            }
            Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            } if !is_safe_url(&dest_url) => {
                self.removed += 1;
                tracing::warn!("Removed unsafe image source: {}", dest_url);
                Tag::Image {
                    link_type,
                    dest_url: CowStr::from(""),
                    title,
                    id,
                }
            }
            other => other,
        }
    }

    /// Re-emit a chunk of raw HTML keeping only allow-listed markup
    fn clean_html(&mut self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;

        while !rest.is_empty() {
            let Some(lt) = rest.find('<') else {
                if self.skipping.is_none() {
                    out.push_str(rest);
                }
                break;
            };

            if self.skipping.is_none() {
                out.push_str(&rest[..lt]);
            }
            rest = &rest[lt..];

            if rest.starts_with("<!--") {
                self.removed += 1;
                rest = match rest.find("-->") {
                    Some(end) => &rest[end + 3..],
                    None => "",
                };
                continue;
            }

            if rest.starts_with("<!") || rest.starts_with("<?") {
                self.removed += 1;
                rest = match rest.find('>') {
                    Some(end) => &rest[end + 1..],
                    None => "",
                };
                continue;
            }

            let Some(caps) = TAG_RE.captures(rest) else {
                // A lone '<' is text
                if self.skipping.is_none() {
                    out.push_str("&lt;");
                }
                rest = &rest[1..];
                continue;
            };

            let whole = caps.get(0).map_or(1, |m| m.end());
            let closing = !caps[1].is_empty();
            let name = caps[2].to_ascii_lowercase();
            let attrs = caps.get(3).map_or("", |m| m.as_str());
            rest = &rest[whole..];

            if let Some(skip) = &self.skipping {
                if closing && *skip == name {
                    self.skipping = None;
                }
                continue;
            }

            if DANGEROUS_TAGS.contains(&name.as_str()) {
                self.removed += 1;
                let self_closing = attrs.trim_end().ends_with('/');
                if !closing && !self_closing && !VOID_TAGS.contains(&name.as_str()) {
                    tracing::warn!("Removed <{}> element and its content", name);
                    self.skipping = Some(name);
                }
                continue;
            }

            if !ALLOWED_TAGS.contains(&name.as_str()) {
                self.removed += 1;
                continue;
            }

            if closing {
                if !VOID_TAGS.contains(&name.as_str()) {
                    out.push_str(&format!("</{}>", name));
                }
            } else {
                out.push('<');
                out.push_str(&name);
                out.push_str(&self.clean_attrs(attrs));
                if let Some(style) = self.style {
                    if let Some(class) = style.class_for(&name) {
                        out.push_str(&class_attr(class));
                    }
                    if name == "a" {
                        out.push_str(r#" target="_blank" rel="noopener noreferrer""#);
                    }
                }
                out.push('>');
            }
        }

        out
    }

    fn clean_attrs(&mut self, attrs: &str) -> String {
        let mut out = String::new();

        for caps in ATTR_RE.captures_iter(attrs) {
            let name = caps[1].to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str());

            if name.starts_with("on") || !ALLOWED_ATTRS.contains(&name.as_str()) {
                self.removed += 1;
                continue;
            }

            if URL_ATTRS.contains(&name.as_str()) && !value.is_some_and(is_safe_url) {
                self.removed += 1;
                continue;
            }

            match value {
                Some(value) => out.push_str(&format!(
                    r#" {}="{}""#,
                    name,
                    value
                        .replace('"', "&quot;")
                        .replace('<', "&lt;")
                        .replace('>', "&gt;")
                )),
                None => out.push_str(&format!(" {}", name)),
            }
        }

        out
    }
}

fn is_block_end(end: &TagEnd) -> bool {
    matches!(
        end,
        TagEnd::Paragraph
            | TagEnd::Heading(_)
            | TagEnd::HtmlBlock
            | TagEnd::CodeBlock
            | TagEnd::Item
            | TagEnd::TableCell
            | TagEnd::FootnoteDefinition
    )
}

fn is_inline_tag(tag: &Tag) -> bool {
    matches!(
        tag,
        Tag::Emphasis | Tag::Strong | Tag::Strikethrough | Tag::Link { .. } | Tag::Image { .. }
    )
}

fn is_inline_end(end: &TagEnd) -> bool {
    matches!(
        end,
        TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link | TagEnd::Image
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulldown_cmark::{html, Options, Parser};

    fn sanitize(markdown: &str) -> String {
        let events = Sanitizer::new().run(Parser::new_ext(markdown, Options::ENABLE_GFM));
        let mut out = String::new();
        html::push_html(&mut out, events.into_iter());
        out
    }

    #[test]
    fn test_safe_urls() {
        assert!(is_safe_url("https://example.com/a?b=c"));
        assert!(is_safe_url("/posts/hello"));
        assert!(is_safe_url("#section"));
        assert!(is_safe_url("mailto:me@example.com"));
        assert!(is_safe_url("relative/path"));
    }

    #[test]
    fn test_unsafe_urls() {
        assert!(!is_safe_url("javascript:alert(1)"));
        assert!(!is_safe_url("JaVaScRiPt:alert(1)"));
        assert!(!is_safe_url("java\tscript:alert(1)"));
        assert!(!is_safe_url(" javascript:alert(1)"));
        assert!(!is_safe_url("vbscript:msgbox"));
        assert!(!is_safe_url("data:text/html;base64,PHNjcmlwdD4="));
        assert!(!is_safe_url("javascript&#58;alert(1)"));
    }

    #[test]
    fn test_script_block_removed_following_paragraph_kept() {
        let html = sanitize("<script>\nalert('xss')\n</script>\n\nStill here.");
        assert!(!html.contains("<script"));
        assert!(!html.contains("alert"));
        assert!(html.contains("<p>Still here.</p>"));
    }

    #[test]
    fn test_inline_script_removed() {
        let html = sanitize("Hello <script>alert(1)</script> world");
        assert!(!html.contains("script"));
        assert!(!html.contains("alert"));
        assert!(html.contains("Hello"));
        assert!(html.contains("world"));
    }

    #[test]
    fn test_unterminated_script_is_scoped_to_block() {
        let html = sanitize("Text <script>alert(1)\n\nNext paragraph");
        assert!(!html.contains("alert"));
        assert!(html.contains("<p>Next paragraph</p>"));
    }

    #[test]
    fn test_event_handlers_and_styles_dropped() {
        let html = sanitize(r#"<div onclick="steal()" style="color:red" title="ok">Hi</div>"#);
        assert!(!html.contains("onclick"));
        assert!(!html.contains("style"));
        assert!(html.contains(r#"<div title="ok">"#));
        assert!(html.contains("Hi"));
    }

    #[test]
    fn test_img_onerror_dropped() {
        let html = sanitize(r#"<img src="x.png" onerror="alert(1)">"#);
        assert!(html.contains(r#"<img src="x.png">"#));
        assert!(!html.contains("onerror"));
    }

    #[test]
    fn test_raw_anchor_with_javascript_href() {
        let html = sanitize(r#"<a href="javascript:alert(1)">click</a>"#);
        assert!(!html.contains("javascript"));
        assert!(html.contains("<a>click</a>"));
    }

    #[test]
    fn test_markdown_link_with_javascript_href() {
        let mut sanitizer = Sanitizer::new();
        let events = sanitizer.run(Parser::new("[click](javascript:alert(1))"));
        let mut out = String::new();
        html::push_html(&mut out, events.into_iter());
        assert!(!out.contains("javascript"));
        assert!(out.contains("click"));
        assert_eq!(sanitizer.removed(), 1);
    }

    #[test]
    fn test_unknown_tags_dropped_text_kept() {
        let html = sanitize("<custom-widget>inner text</custom-widget>");
        assert!(!html.contains("custom-widget"));
        assert!(html.contains("inner text"));
    }

    #[test]
    fn test_comments_dropped() {
        let html = sanitize("before <!-- secret --> after");
        assert!(!html.contains("secret"));
        assert!(html.contains("before"));
        assert!(html.contains("after"));
    }

    #[test]
    fn test_plain_markdown_untouched() {
        let html = sanitize("# Title\n\nSome *emphasis* and `code`.");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<em>emphasis</em>"));
        assert!(html.contains("<code>code</code>"));
    }
}
