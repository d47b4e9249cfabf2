//! Read-only HTML preview of a template. Never used to produce output documents.

use crate::engine::container::{Container, MAIN_PART};
use crate::engine::error::TemplateError;
use crate::engine::extractor::PLACEHOLDER_RE;
use crate::engine::ports::PreviewRenderer;
use crate::engine::xml::{decode_text, encode_text};
use regex::Regex;
use std::sync::LazyLock;

static PARAGRAPH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<w:p[\s>].*?</w:p>|<w:p/>").expect("paragraph pattern is valid")
});

static RUN_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<w:t(?:\s(?:[^>]*[^/>])?)?>(.*?)</w:t>|<w:tab/>|<w:br/>")
        .expect("run pattern is valid")
});

#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlPreview;

impl PreviewRenderer for HtmlPreview {
    fn to_preview_markup(&self, template: &[u8]) -> Result<String, TemplateError> {
        let container = Container::open(template).map_err(|e| TemplateError::Unreadable {
            reason: e.to_string(),
        })?;
        let markup = container
            .text_part(MAIN_PART)
            .ok_or_else(|| TemplateError::Unreadable {
                reason: format!("missing main document part `{}`", MAIN_PART),
            })?;

        let mut html = String::from("<div class=\"template-preview\">");
        for paragraph in PARAGRAPH_RE.find_iter(&markup) {
            html.push_str("<p>");
            html.push_str(&highlight(&paragraph_text(paragraph.as_str())));
            html.push_str("</p>");
        }
        html.push_str("</div>");
        Ok(html)
    }
}

/// Plain text of one paragraph, XML entities resolved.
fn paragraph_text(paragraph: &str) -> String {
    let mut text = String::new();
    for caps in RUN_TEXT_RE.captures_iter(paragraph) {
        match caps.get(1) {
            Some(run) => text.push_str(&decode_text(run.as_str())),
            None if caps[0].starts_with("<w:tab") => text.push('\t'),
            None => text.push('\n'),
        }
    }
    text
}

/// HTML-escapes `text` and wraps every placeholder in a `<mark>`.
fn highlight(text: &str) -> String {
    let mut html = String::new();
    let mut cursor = 0;
    for found in PLACEHOLDER_RE.find_iter(text) {
        html.push_str(&encode_text(&text[cursor..found.start()]));
        html.push_str("<mark class=\"placeholder\">");
        html.push_str(&encode_text(found.as_str()));
        html.push_str("</mark>");
        cursor = found.end();
    }
    html.push_str(&encode_text(&text[cursor..]));
    html.replace('\n', "<br/>")
}
