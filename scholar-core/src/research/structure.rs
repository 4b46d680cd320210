//! Report text structuring: turns a free-text narrative into numbered
//! sections of bullets or paragraphs.
//!
//! The classifier is rule-based and order-sensitive. Every rule is a separate
//! pure function so it can be tested in isolation.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Lines at least this many characters long are never headers.
pub const MAX_HEADER_CHARS: usize = 100;

/// Title of an opening section that is dropped as redundant.
pub const REDUNDANT_TITLE: &str = "research summary";

/// Lower-case fragments that mark a line as a section header.
pub const SECTION_KEYWORDS: &[&str] = &[
    "introduction",
    "methodology",
    "approach",
    "key insights",
    "challenges",
    "research gaps",
    "real-world applications",
    "future scope",
    "opportunities",
    "conclusion",
    "references",
    "summary",
    "analysis",
    "results",
    "discussion",
    "applications",
    "research summary",
];

static HEADER_MARKERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#+[ \t]*").expect("header marker pattern is valid"));
static NUMBERED_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s+[A-Z]").expect("numbered heading pattern is valid"));
static TITLE_CASE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*\s*$").expect("title case pattern is valid")
});
static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern is valid"));
static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*(.*?)\*").expect("italic pattern is valid"));
static NUMBER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s*").expect("number prefix pattern is valid"));
static BULLET_GLYPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[•*\-]\s*").expect("bullet glyph pattern is valid"));
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// One titled block of the structured report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSection {
    /// Sequential from 1; `None` for untitled sections.
    pub number: Option<usize>,
    /// Cleaned title; `None` for untitled sections.
    pub title: Option<String>,
    /// Raw content lines, in source order.
    pub content: Vec<String>,
    pub is_bulleted: bool,
}

/// A rendered line of section content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum SectionBlock {
    Bullet(String),
    Paragraph(String),
}

impl SectionBlock {
    pub fn text(&self) -> &str {
        match self {
            SectionBlock::Bullet(t) | SectionBlock::Paragraph(t) => t,
        }
    }
}

impl ReportSection {
    fn untitled() -> Self {
        Self {
            number: None,
            title: None,
            content: Vec::new(),
            is_bulleted: false,
        }
    }

    fn titled(number: usize, title: String) -> Self {
        Self {
            number: Some(number),
            title: Some(title),
            ..Self::untitled()
        }
    }

    fn has_body(&self) -> bool {
        self.title.is_some() || !self.content.is_empty()
    }

    /// Numbered heading, e.g. `"2. Key Insights"`.
    pub fn heading(&self) -> Option<String> {
        match (&self.number, &self.title) {
            (Some(n), Some(title)) => Some(format!("{n}. {title}")),
            (None, Some(title)) => Some(title.clone()),
            _ => None,
        }
    }

    /// Content lines with markup removed.
    ///
    /// In a bulleted section every line becomes a bullet item with its marker
    /// stripped; otherwise each line is one paragraph.
    pub fn blocks(&self) -> Vec<SectionBlock> {
        self.content
            .iter()
            .filter_map(|line| {
                let clean = strip_inline_markup(line);
                let clean = clean.trim();
                if self.is_bulleted {
                    let item = bullet_item(clean).unwrap_or_else(|| clean.to_string());
                    (!item.is_empty()).then_some(SectionBlock::Bullet(item))
                } else {
                    (!clean.is_empty()).then(|| SectionBlock::Paragraph(clean.to_string()))
                }
            })
            .collect()
    }
}

/// Remove every `#` run (and the spaces after it) from `text`.
pub fn strip_header_markers(text: &str) -> String {
    HEADER_MARKERS.replace_all(text, "").into_owned()
}

/// Remove bold and italic markers and residual header markers.
pub fn strip_inline_markup(line: &str) -> String {
    let without_bold = BOLD.replace_all(line, "$1");
    let without_italic = ITALIC.replace_all(&without_bold, "$1");
    strip_header_markers(&without_italic)
}

/// Whether a trimmed line opens a new section.
pub fn is_section_header(line: &str) -> bool {
    if line.chars().count() >= MAX_HEADER_CHARS {
        return false;
    }
    is_numbered_heading(line) || is_title_case_line(line) || contains_section_keyword(line)
}

/// `"3. Key Insights"`: a number, a dot, then a capital letter.
pub fn is_numbered_heading(line: &str) -> bool {
    NUMBERED_HEADING.is_match(line)
}

/// `"Future Scope"`: every word capitalised, letters only.
pub fn is_title_case_line(line: &str) -> bool {
    TITLE_CASE_LINE.is_match(line)
}

pub fn contains_section_keyword(line: &str) -> bool {
    let lower = line.to_lowercase();
    SECTION_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Whether a markup-free line starts with a bullet glyph or a list number.
pub fn is_bullet_line(line: &str) -> bool {
    line.starts_with(['•', '*', '-']) || NUMBER_PREFIX.is_match(line)
}

/// The text of a bullet line without its marker, or `None` if `line` is not a bullet.
pub fn bullet_item(line: &str) -> Option<String> {
    if !is_bullet_line(line) {
        return None;
    }
    let item = BULLET_GLYPH.replace(line, "");
    let item = NUMBER_PREFIX.replace(&item, "");
    Some(item.trim().to_string())
}

/// Drop any leading `"N."` and collapse internal whitespace.
pub fn clean_title(raw: &str) -> String {
    let plain = strip_inline_markup(raw);
    let unnumbered = NUMBER_PREFIX.replace(plain.trim(), "");
    WHITESPACE_RUN
        .replace_all(&unnumbered, " ")
        .trim()
        .to_string()
}

/// Split a narrative into sections.
///
/// Never fails: text without any header yields one untitled section holding
/// every non-blank line. An opening section titled "Research Summary" is
/// dropped with its content and does not consume a number.
pub fn structure_narrative(text: &str) -> Vec<ReportSection> {
    let cleaned = strip_header_markers(text);
    let mut sections = Vec::new();
    let mut current = ReportSection::untitled();
    let mut counter = 0;
    let mut skipping = false;

    for line in cleaned.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if is_section_header(line) {
            if current.has_body() {
                sections.push(std::mem::replace(&mut current, ReportSection::untitled()));
            }
            let title = clean_title(line);
            skipping = counter == 0 && title.eq_ignore_ascii_case(REDUNDANT_TITLE);
            if skipping {
                continue;
            }
            counter += 1;
            current = ReportSection::titled(counter, title);
        } else if !skipping {
            if is_bullet_line(strip_inline_markup(line).trim()) {
                current.is_bulleted = true;
            }
            current.content.push(line.to_string());
        }
    }

    if current.has_body() {
        sections.push(current);
    }
    sections
}
