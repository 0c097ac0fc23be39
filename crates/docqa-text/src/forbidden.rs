//! Forbidden-pattern detection using regex patterns.
//!
//! Generated answers must be grounded in the OCR text itself: phrasings
//! that point the reader at a table, graph or the whole image are
//! banned. Patterns are applied in a fixed order; matches from earlier
//! patterns come first, no overlap de-duplication.

use docqa_core::Violation;
use once_cell::sync::Lazy;
use regex::Regex;

pub const CATEGORY_GRAPH_REF: &str = "그래프참조";
pub const CATEGORY_WHOLE_IMAGE: &str = "전체이미지";

// Compiled once, reused.
static DEICTIC_FIGURE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(위|아래|해당|본|이)\s*(표|그래프|차트|그림|도표)").unwrap()
});
static FIGURE_REFERENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(표|그래프|차트|도표)(를|을|에서)?\s*(참조|참고|보면|통해|확인)").unwrap()
});
static IMAGE_WHOLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(이미지|문서|페이지)\s*전체").unwrap());
static WHOLE_IMAGE_REQUEST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"전체\s*(이미지|문서|페이지)(를|을)?\s*(보여|설명|묘사|확인)").unwrap()
});

static FORBIDDEN_PATTERNS: Lazy<Vec<(&'static str, &'static Regex)>> = Lazy::new(|| {
    vec![
        (CATEGORY_GRAPH_REF, &*DEICTIC_FIGURE_RE),
        (CATEGORY_GRAPH_REF, &*FIGURE_REFERENCE_RE),
        (CATEGORY_WHOLE_IMAGE, &*IMAGE_WHOLE_RE),
        (CATEGORY_WHOLE_IMAGE, &*WHOLE_IMAGE_REQUEST_RE),
    ]
});

// Narrower markdown set used during answer validation.
static LEADING_BULLET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*[-*•]\s").unwrap());
static BOLD_MARKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*").unwrap());
static UNDERSCORE_MARKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"__").unwrap());

static FORMATTING_PATTERNS: Lazy<Vec<(&'static str, &'static Regex)>> = Lazy::new(|| {
    vec![
        ("불릿", &*LEADING_BULLET_RE),
        ("굵은글씨", &*BOLD_MARKER_RE),
        ("밑줄강조", &*UNDERSCORE_MARKER_RE),
    ]
});

fn scan(patterns: &[(&'static str, &'static Regex)], text: &str) -> Vec<Violation> {
    let mut violations = Vec::new();
    for (category, regex) in patterns {
        for m in regex.find_iter(text) {
            violations.push(Violation {
                category,
                matched_text: m.as_str().to_string(),
                position: m.start(),
            });
        }
    }
    violations
}

/// Find banned phrasings in generated text. Empty result means clean.
pub fn find_violations(text: &str) -> Vec<Violation> {
    scan(&FORBIDDEN_PATTERNS, text)
}

/// Find markdown-formatting violations (leading bullets, bold,
/// underscore emphasis) used by the quality scorer and advisory
/// validation.
pub fn find_formatting_violations(text: &str) -> Vec<Violation> {
    scan(&FORMATTING_PATTERNS, text)
}
