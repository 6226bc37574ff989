//! Section extraction for 10-K filings
//!
//! Pulls the Business, Risk Factors and MD&A items out of a filing's full
//! text. Sections are emitted in a fixed order (not document order), each
//! tagged with the header text that matched. When none of them is found the
//! first pages of the filing are used instead.

use crate::config::PipelineConfig;
use crate::error::ExtractorError;
use regex::{Regex, RegexBuilder};
use tracing::{debug, warn};

/// Section start patterns, in output order
const SECTION_PATTERNS: [(&str, &str); 3] = [
    ("business", r"Item\s+1\.\s+Business"),
    ("risk_factors", r"Item\s+1A\.\s+Risk\s+Factors"),
    ("mdna", r"Item\s+7\.\s+Management['’]s\s+Discussion\s+and\s+Analysis"),
];

/// Items that end any of the extracted sections
const BOUNDARY_PATTERN: &str = r"Item\s+(1B|2|7A|8)\.";

/// Page size used to split text that carries no page breaks
pub const APPROX_PAGE_CHARS: usize = 3000;

/// Page break emitted by PDF text extraction
const PAGE_BREAK: char = '\x0C';

/// Text of a source document, page by page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceText {
    pages: Vec<String>,
}

impl SourceText {
    /// Build from already separated pages
    pub fn from_pages(pages: Vec<String>) -> Self {
        Self { pages }
    }

    /// Build from page-concatenated text.
    ///
    /// Pages are split on form feeds. Text without any form feed is cut into
    /// units of [`APPROX_PAGE_CHARS`] characters so the fallback prefix stays
    /// bounded.
    pub fn from_text(text: &str) -> Self {
        if text.contains(PAGE_BREAK) {
            return Self::from_pages(text.split(PAGE_BREAK).map(str::to_string).collect());
        }

        let chars: Vec<char> = text.chars().collect();
        let pages = chars
            .chunks(APPROX_PAGE_CHARS)
            .map(|unit| unit.iter().collect())
            .collect();
        Self::from_pages(pages)
    }

    /// All pages concatenated
    pub fn full_text(&self) -> String {
        self.pages.concat()
    }

    /// The first `count` pages concatenated
    pub fn prefix(&self, count: usize) -> String {
        self.pages.iter().take(count).map(String::as_str).collect()
    }

    /// Number of pages
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Character count of the text with surrounding whitespace removed
    pub fn trimmed_len(&self) -> usize {
        self.full_text().trim().chars().count()
    }
}

/// Output of section extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionExtraction {
    /// Extracted section text (or the fallback prefix)
    pub content: String,

    /// True when no named section was found
    pub used_fallback: bool,
}

/// Refuse text shorter than `required` characters once trimmed
pub fn ensure_min_length(text: &str, required: usize) -> Result<(), ExtractorError> {
    let found = text.trim().chars().count();
    if found < required {
        return Err(ExtractorError::InsufficientText { found, required });
    }
    Ok(())
}

struct SectionPattern {
    name: &'static str,
    regex: Regex,
}

/// Extracts the named 10-K sections from a filing
pub struct SectionExtractor {
    sections: Vec<SectionPattern>,
    boundary: Regex,
    min_text_length: usize,
    fallback_pages: usize,
    boundary_offset: usize,
}

fn case_insensitive(pattern: &str) -> Result<Regex, ExtractorError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| ExtractorError::Config(format!("Invalid section pattern: {}", e)))
}

impl SectionExtractor {
    /// Create a section extractor using the limits in `config`
    pub fn new(config: &PipelineConfig) -> Result<Self, ExtractorError> {
        let sections = SECTION_PATTERNS
            .iter()
            .map(|&(name, pattern)| {
                Ok(SectionPattern {
                    name,
                    regex: case_insensitive(pattern)?,
                })
            })
            .collect::<Result<Vec<_>, ExtractorError>>()?;

        Ok(Self {
            sections,
            boundary: case_insensitive(BOUNDARY_PATTERN)?,
            min_text_length: config.min_text_length,
            fallback_pages: config.fallback_pages,
            boundary_offset: config.section_boundary_offset,
        })
    }

    /// Extract sections from a source document.
    ///
    /// Fails with [`ExtractorError::InsufficientText`] when the source is
    /// nearly empty (a scanned or image-only PDF); no fallback is produced
    /// in that case.
    pub fn extract(&self, source: &SourceText) -> Result<SectionExtraction, ExtractorError> {
        let full_text = source.full_text();
        ensure_min_length(&full_text, self.min_text_length)?;

        let content = self.extract_sections(&full_text);
        if !content.is_empty() {
            return Ok(SectionExtraction {
                content,
                used_fallback: false,
            });
        }

        warn!(
            pages = self.fallback_pages,
            "Standard 10-K sections not found, falling back to first pages"
        );
        Ok(SectionExtraction {
            content: source.prefix(self.fallback_pages),
            used_fallback: true,
        })
    }

    /// Concatenate every matched section, or return an empty string
    pub fn extract_sections(&self, full_text: &str) -> String {
        let mut content = String::new();

        for section in &self.sections {
            let Some(start) = section.regex.find(full_text) else {
                debug!(section = section.name, "Section not found");
                continue;
            };

            let search_from = ceil_char_boundary(full_text, start.start() + self.boundary_offset);
            let end = self
                .boundary
                .find_at(full_text, search_from)
                .map(|m| m.start())
                .unwrap_or(full_text.len());

            debug!(
                section = section.name,
                start = start.start(),
                end,
                "Extracted section"
            );

            content.push_str("\n\n--- EXTRACTED SECTION: ");
            content.push_str(start.as_str());
            content.push_str(" ---\n\n");
            content.push_str(&full_text[start.start()..end]);
        }

        content
    }
}

/// Smallest char boundary at or after `index`, clamped to the text length
fn ceil_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index += 1;
    }
    index
}
