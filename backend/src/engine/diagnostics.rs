//! Troubleshooting reports.
//!
//! [`inspect_template`] looks into a template whose placeholders could not be
//! recognized: what brackets the visible text uses, which `{...}` fragments the
//! markup holds, and whether the file is a legacy `.doc`. [`recommend`] turns
//! the session's coverage into next steps for the operator.

use crate::engine::container::{Container, MAIN_PART};
use crate::engine::xml::decode_text;
use common::model::diagnostics::{
    BracketCount, BracketStyle, Recommendation, SessionDiagnostics, TemplateDiagnostics,
};
use regex::Regex;
use std::sync::LazyLock;

/// Leading bytes of an OLE compound file, the container of `.doc` files.
const OLE_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

const TEXT_SAMPLE_CHARS: usize = 200;
const MAX_MARKUP_FRAGMENTS: usize = 5;

static CURLY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^}]*\}").expect("curly pattern is valid"));
static SQUARE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]").expect("square pattern is valid"));
static ANGLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("angle pattern is valid"));
static ROUND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("round pattern is valid"));

static TEXT_RUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<w:t(?:\s(?:[^>]*[^/>])?)?>(.*?)</w:t>").expect("text run pattern is valid")
});

pub fn is_legacy_doc(bytes: &[u8]) -> bool {
    bytes.starts_with(&OLE_SIGNATURE)
}

/// Inspects a template's main part. Bytes that do not open as a container
/// only get `legacy_doc` filled in.
pub fn inspect_template(bytes: &[u8]) -> TemplateDiagnostics {
    let mut diagnostics = TemplateDiagnostics {
        legacy_doc: is_legacy_doc(bytes),
        ..TemplateDiagnostics::default()
    };
    let Ok(container) = Container::open(bytes) else {
        return diagnostics;
    };
    let Some(markup) = container.text_part(MAIN_PART) else {
        return diagnostics;
    };

    diagnostics.has_body = markup.contains("<w:body");
    diagnostics.has_paragraphs = markup.contains("<w:p>") || markup.contains("<w:p ");
    diagnostics.has_text = TEXT_RUN_RE.is_match(&markup);
    diagnostics.markup_fragments = CURLY_RE
        .find_iter(&markup)
        .take(MAX_MARKUP_FRAGMENTS)
        .map(|m| m.as_str().to_string())
        .collect();

    let text = visible_text(&markup);
    let styles: [(BracketStyle, &Regex); 4] = [
        (BracketStyle::Curly, &*CURLY_RE),
        (BracketStyle::Square, &*SQUARE_RE),
        (BracketStyle::Angle, &*ANGLE_RE),
        (BracketStyle::Round, &*ROUND_RE),
    ];
    diagnostics.brackets = styles
        .into_iter()
        .filter_map(|(style, re)| {
            let count = re.find_iter(&text).count();
            (count > 0).then_some(BracketCount { style, count })
        })
        .collect();
    diagnostics.text_candidates = CURLY_RE
        .find_iter(&text)
        .map(|m| m.as_str().to_string())
        .collect();
    diagnostics.text_sample = text.chars().take(TEXT_SAMPLE_CHARS).collect();
    diagnostics
}

/// Text runs of `markup`, decoded and joined with single spaces.
fn visible_text(markup: &str) -> String {
    TEXT_RUN_RE
        .captures_iter(markup)
        .map(|caps| decode_text(&caps[1]).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Next steps for a session, in the order the operator would take them.
/// `ReadyToGenerate` stands alone when nothing else is missing.
pub fn recommend(session: &SessionDiagnostics, missing_row_templates: bool) -> Vec<Recommendation> {
    let mut steps = Vec::new();
    if session.row_count == 0 {
        steps.push(Recommendation::UploadData);
    }
    if session.template_count == 0 {
        steps.push(Recommendation::UploadTemplate);
    } else if session.placeholder_count == 0 {
        steps.push(Recommendation::AddPlaceholders);
    }
    if session.placeholder_count > 0 && session.mapped_count == 0 {
        steps.push(Recommendation::MapPlaceholders);
    }
    if session.template_count > 0 && missing_row_templates {
        steps.push(Recommendation::SelectRowTemplates);
    }
    if steps.is_empty() {
        steps.push(Recommendation::ReadyToGenerate);
    }
    steps
}
