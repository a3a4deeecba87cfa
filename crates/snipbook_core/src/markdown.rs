//! Markdown to HTML preview rendering using pulldown-cmark.

use crate::text::escape_html;
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

/// Opens a marked run in the input of [`markdown_to_marked_html`].
pub const MARK_START: char = '\u{E000}';
/// Closes a marked run in the input of [`markdown_to_marked_html`].
pub const MARK_END: char = '\u{E001}';

const PREVIEW_STYLE: &str = "code { background-color: #f0f0f0; padding: 1px 4px; border-radius: 3px; font-family: monospace; } \
pre { background-color: #f0f0f0; padding: 8px; } \
pre code { padding: 0; }";

fn document(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        PREVIEW_STYLE, body
    )
}

fn parser(markdown: &str) -> Parser<'_> {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;
    Parser::new_ext(markdown, options)
}

/// Convert Markdown to a complete, minimal HTML document.
pub fn markdown_to_html(markdown: &str) -> String {
    document(&markdown_body_html(markdown))
}

/// Convert Markdown to an HTML fragment without the document shell.
pub fn markdown_body_html(markdown: &str) -> String {
    let mut body = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut body, parser(markdown));
    body
}

/// Convert Markdown whose highlighted runs are delimited by [`MARK_START`] and
/// [`MARK_END`] into a document where each run is wrapped in `open`/`close`.
///
/// Marks are resolved after parsing, so runs inside code blocks and inline
/// code are wrapped too. Marks in link targets and raw HTML are dropped.
pub fn markdown_to_marked_html(markdown: &str, open: &str, close: &str) -> String {
    let mut body = String::with_capacity(markdown.len() * 3 / 2);
    let events = parser(markdown).map(|event| resolve_marks(event, open, close));
    html::push_html(&mut body, events);
    document(&body)
}

/// Remove mark characters from `text`.
pub fn strip_marks(text: &str) -> String {
    text.replace([MARK_START, MARK_END], "")
}

fn has_marks(text: &str) -> bool {
    text.contains([MARK_START, MARK_END])
}

fn strip_cow(text: CowStr<'_>) -> CowStr<'_> {
    if has_marks(&text) {
        strip_marks(&text).into()
    } else {
        text
    }
}

fn marked_text(text: &str, open: &str, close: &str) -> String {
    escape_html(text)
        .replace(MARK_START, open)
        .replace(MARK_END, close)
}

fn resolve_marks<'a>(event: Event<'a>, open: &str, close: &str) -> Event<'a> {
    match event {
        Event::Text(text) if has_marks(&text) => {
            Event::Html(marked_text(&text, open, close).into())
        }
        Event::Code(code) if has_marks(&code) => {
            Event::Html(format!("<code>{}</code>", marked_text(&code, open, close)).into())
        }
        Event::Html(raw) => Event::Html(strip_cow(raw)),
        Event::InlineHtml(raw) => Event::InlineHtml(strip_cow(raw)),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: strip_cow(dest_url),
            title: strip_cow(title),
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: strip_cow(dest_url),
            title: strip_cow(title),
            id,
        }),
        other => other,
    }
}
