//! Default rendering engine for `.docx` templates.
//!
//! Substitution works on the text runs (`<w:t>`) of every paragraph in the
//! body, headers, footers and notes. Runs of one paragraph are read as a
//! single string, so `{ho_` + `ten}` split by the word processor still
//! resolves. Replaced text lands in the run holding the opening brace and the
//! remainder of the tag is cut from the following runs; run formatting is left
//! alone.

use crate::engine::container::{Container, MAIN_PART};
use crate::engine::error::RenderError;
use crate::engine::ports::{MergeFields, RenderEngine};
use crate::engine::xml::{decode_text, encode_text};
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static TEXT_RUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(<w:t(?:\s(?:[^>]*[^/>])?)?>)(.*?)</w:t>").expect("text run pattern is valid")
});

static RENDERED_PART_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^word/(document|header\d*|footer\d*|footnotes|endnotes)\.xml$")
        .expect("part pattern is valid")
});

const PARAGRAPH_END: &str = "</w:p>";
const LINE_BREAK: &str = r#"</w:t><w:br/><w:t xml:space="preserve">"#;

/// Fills `.docx` templates in memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxEngine;

impl RenderEngine for DocxEngine {
    fn render(&self, template: Vec<u8>, fields: &MergeFields) -> Result<Vec<u8>, RenderError> {
        let mut container = Container::open(&template).map_err(|e| RenderError::Malformed {
            reason: e.to_string(),
        })?;
        if !container.has_part(MAIN_PART) {
            return Err(RenderError::Malformed {
                reason: format!("missing main document part `{}`", MAIN_PART),
            });
        }

        let parts: Vec<String> = container
            .xml_part_names()
            .filter(|name| RENDERED_PART_RE.is_match(name))
            .map(str::to_string)
            .collect();

        for part in parts {
            let rendered = match container.text_part(&part) {
                Some(markup) => render_part(&part, &markup, fields)?,
                None => continue,
            };
            if let Some(rendered) = rendered {
                container.replace_part(&part, rendered.into_bytes());
            }
        }

        container.to_bytes().map_err(|e| RenderError::Malformed {
            reason: e.to_string(),
        })
    }
}

/// A `<w:t>` element located in the part's markup.
struct TextRun {
    open_tag: Range<usize>,
    text: Range<usize>,
    /// Offset of this run's text within its paragraph's joined text.
    joined_start: usize,
}

/// A complete `{...}` tag within a paragraph's joined text.
struct Tag {
    /// Byte range of the tag, braces included.
    span: Range<usize>,
    replacement: String,
}

/// Renders one XML part. Returns `None` when nothing in it changed.
fn render_part(
    part: &str,
    markup: &str,
    fields: &MergeFields,
) -> Result<Option<String>, RenderError> {
    let paragraph_ends: Vec<usize> = markup
        .match_indices(PARAGRAPH_END)
        .map(|(index, _)| index)
        .collect();

    let mut runs: Vec<TextRun> = Vec::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut current_paragraph = None;
    let mut joined_len = 0;

    for caps in TEXT_RUN_RE.captures_iter(markup) {
        let (Some(open), Some(text)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let paragraph = paragraph_ends.partition_point(|end| *end < open.start());
        if current_paragraph != Some(paragraph) {
            current_paragraph = Some(paragraph);
            groups.push(Vec::new());
            joined_len = 0;
        }
        if let Some(group) = groups.last_mut() {
            group.push(runs.len());
        }
        runs.push(TextRun {
            open_tag: open.range(),
            text: text.range(),
            joined_start: joined_len,
        });
        joined_len += text.len();
    }

    let mut new_texts: Vec<Option<String>> = vec![None; runs.len()];
    for group in &groups {
        let joined: String = group
            .iter()
            .map(|&i| &markup[runs[i].text.clone()])
            .collect();
        let tags = find_tags(part, &joined, fields)?;
        if tags.is_empty() {
            continue;
        }
        for &i in group {
            let run = &runs[i];
            let range = run.joined_start..run.joined_start + run.text.len();
            new_texts[i] = Some(splice_run(&joined, range, &tags));
        }
    }

    if new_texts.iter().all(Option::is_none) {
        return Ok(None);
    }

    let mut out = String::with_capacity(markup.len());
    let mut cursor = 0;
    for (run, new_text) in runs.iter().zip(new_texts) {
        let Some(new_text) = new_text else {
            continue;
        };
        let open_tag = &markup[run.open_tag.clone()];
        out.push_str(&markup[cursor..run.open_tag.start]);
        if open_tag.contains("xml:space") {
            out.push_str(open_tag);
        } else {
            out.push_str(r#"<w:t xml:space="preserve""#);
            out.push_str(&open_tag["<w:t".len()..]);
        }
        out.push_str(&new_text);
        cursor = run.text.end;
    }
    out.push_str(&markup[cursor..]);
    Ok(Some(out))
}

/// Finds every `{...}` tag in a paragraph's joined text and resolves its value.
fn find_tags(part: &str, joined: &str, fields: &MergeFields) -> Result<Vec<Tag>, RenderError> {
    let mut tags = Vec::new();
    let mut open: Option<usize> = None;

    for (index, ch) in joined.char_indices() {
        match ch {
            '{' => {
                if let Some(start) = open {
                    return Err(RenderError::UnclosedTag {
                        part: part.to_string(),
                        fragment: fragment(&joined[start + 1..index]),
                    });
                }
                open = Some(index);
            }
            '}' => {
                let Some(start) = open.take() else {
                    return Err(RenderError::UnopenedTag {
                        part: part.to_string(),
                        fragment: fragment_before(&joined[..index]),
                    });
                };
                let name = decode_text(&joined[start + 1..index]);
                let value = fields.get(name.trim()).map(String::as_str).unwrap_or("");
                tags.push(Tag {
                    span: start..index + 1,
                    replacement: escape_value(value),
                });
            }
            _ => {}
        }
    }

    if let Some(start) = open {
        return Err(RenderError::UnclosedTag {
            part: part.to_string(),
            fragment: fragment(&joined[start + 1..]),
        });
    }
    Ok(tags)
}

/// Rebuilds one run's text: untouched characters are kept, characters inside
/// a tag are dropped, and a tag's replacement goes where its `{` was.
fn splice_run(joined: &str, range: Range<usize>, tags: &[Tag]) -> String {
    let mut out = String::new();
    let mut cursor = range.start;
    for tag in tags {
        if tag.span.end <= range.start || tag.span.start >= range.end {
            continue;
        }
        let start = tag.span.start.max(range.start);
        let end = tag.span.end.min(range.end);
        out.push_str(&joined[cursor..start]);
        if tag.span.start >= range.start {
            out.push_str(&tag.replacement);
        }
        cursor = end;
    }
    out.push_str(&joined[cursor..range.end]);
    out
}

fn fragment(text: &str) -> String {
    text.chars().take(20).collect()
}

fn fragment_before(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let from = chars.len().saturating_sub(20);
    chars[from..].iter().collect()
}

/// Escapes a field value; each `\n` becomes a `<w:br/>` between two runs.
fn escape_value(value: &str) -> String {
    value
        .replace('\r', "")
        .split('\n')
        .map(|line| encode_text(line).into_owned())
        .collect::<Vec<_>>()
        .join(LINE_BREAK)
}
