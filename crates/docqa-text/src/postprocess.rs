//! Answer post-processing pipeline.
//!
//! Takes raw LLM output (plain text or embedded structured JSON) and
//! the target query type, and produces presentation-ready text obeying
//! per-type length and markdown rules. Pure functions, fixed step
//! order; the broken-decimal repair must run before any bullet
//! transform because it matches the literal bullet marker.

use docqa_core::QueryType;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::sentences::{cap_sentences, split_sentences, truncate_sentencewise};
use crate::structured;

static OUTPUT_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?output>").unwrap());
// OCR artifact: a decimal wrapped onto a bullet-like next line.
static BROKEN_DECIMAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d)[ \t]*\n[ \t]*-[ \t]*(\d)").unwrap());
static TRIPLE_STAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*{3,}").unwrap());
static HALF_BOLD_TRAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*([^*\n]+)\*([^*]|$)").unwrap());
// The emphasized span must not open with whitespace, so a line-leading
// bullet star followed by a space never pairs with a later `**`.
static HALF_BOLD_LEAD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[^*])\*([^\s*][^*\n]*)\*\*").unwrap());
static HEADER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#{2,3}\s*(.+)$").unwrap());
static STAR_BULLET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*\*\s+(\*\*)").unwrap());
static BULLET_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[-*•]\s*").unwrap());
static LEADING_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*(?:[-*•]\s+|#{1,6}\s+)").unwrap());
static SECTION_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(근거|추론|결론|배경|요약)\s*[:\-]\s*").unwrap());
static COLON_BREAK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r":[ \t]*\n([^\n])").unwrap());
static MULTI_NEWLINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());
static MULTI_SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").unwrap());
static PARAGRAPH_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]*\n").unwrap());

/// Remove `<output>` / `</output>` wrapper tags.
pub fn strip_output_tags(text: &str) -> String {
    OUTPUT_TAG_RE.replace_all(text, "").trim().to_string()
}

/// Merge `<digit>\n- <digit>` back into `<digit>.<digit>`.
fn repair_broken_decimals(text: &str) -> String {
    BROKEN_DECIMAL_RE.replace_all(text, "$1.$2").into_owned()
}

/// Pair up partial bold markers (`**text*`, `*text**`) and drop stray
/// single stars. Line-leading bullet stars are spared so the star-
/// bullet conversion can still see them.
fn normalize_bold(text: &str) -> String {
    let text = TRIPLE_STAR_RE.replace_all(text, "**");
    let text = HALF_BOLD_TRAIL_RE.replace_all(&text, "**$1**$2");
    let text = HALF_BOLD_LEAD_RE.replace_all(&text, "$1**$2**");
    remove_stray_stars(&text, true)
}

/// Drop `*` characters that are not part of a `**` pair. When
/// `keep_bullets` is set, a star opening a line followed by whitespace
/// survives.
fn remove_stray_stars(text: &str, keep_bullets: bool) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0usize;
    let mut at_line_start = true;

    while i < chars.len() {
        let c = chars[i];
        if c == '*' {
            if chars.get(i + 1) == Some(&'*') {
                out.push_str("**");
                i += 2;
                at_line_start = false;
                continue;
            }
            if keep_bullets && at_line_start && chars.get(i + 1).is_some_and(|n| *n == ' ') {
                out.push('*');
                i += 1;
                at_line_start = false;
                continue;
            }
            i += 1;
            continue;
        }
        out.push(c);
        if c == '\n' {
            at_line_start = true;
        } else if !c.is_whitespace() {
            at_line_start = false;
        }
        i += 1;
    }
    out
}

/// `###`/`##` headers become a bold line with surrounding blank lines.
fn convert_headers(text: &str) -> String {
    HEADER_RE.replace_all(text, "\n**$1**\n").into_owned()
}

/// `* **label**:` bullets become `- **label**:` bullets.
fn convert_star_bullets(text: &str) -> String {
    STAR_BULLET_RE.replace_all(text, "- $1").into_owned()
}

/// Strip all emphasis and bullets, collapse to flowing plain text.
fn flatten_to_plain(text: &str) -> String {
    let text = text.replace("**", "").replace("__", "");
    let text = remove_stray_stars(&text, false);
    let lines: Vec<String> = text
        .lines()
        .map(|line| BULLET_PREFIX_RE.replace(line.trim(), "").to_string())
        .filter(|line| !line.is_empty())
        .collect();
    let joined = lines.join(" ");
    MULTI_SPACE_RE.replace_all(&joined, " ").trim().to_string()
}

/// Short-answer shaping: plain sentences, hard sentence cap, no
/// trailing period for the one-sentence variant.
fn shape_target(text: &str, short: bool) -> String {
    let plain = flatten_to_plain(text);
    let keep = if short { 1 } else { 4 };
    let sentences = split_sentences(&plain);
    let mut shaped = sentences
        .into_iter()
        .take(keep)
        .collect::<Vec<_>>()
        .join(" ");
    if short {
        shaped = shaped.trim_end_matches('.').trim_end().to_string();
    }
    shaped
}

/// Explanatory shaping: strip leading bullets per line, merge lines
/// within each blank-line-delimited paragraph into flowing sentences,
/// collapse a line break right after a colon. Reasoning additionally
/// drops leading section-label words.
fn shape_explanatory(text: &str, reasoning: bool) -> String {
    let text = COLON_BREAK_RE.replace_all(text, ": $1");
    let mut paragraphs = Vec::new();

    for para in PARAGRAPH_SPLIT_RE.split(&text) {
        let lines: Vec<String> = para
            .lines()
            .map(|line| {
                let line = BULLET_PREFIX_RE.replace(line.trim(), "");
                if reasoning {
                    SECTION_LABEL_RE.replace(&line, "").to_string()
                } else {
                    line.to_string()
                }
            })
            .filter(|line| !line.is_empty())
            .collect();
        if lines.is_empty() {
            continue;
        }
        let merged = lines.join(" ");
        paragraphs.push(MULTI_SPACE_RE.replace_all(&merged, " ").trim().to_string());
    }

    paragraphs.join("\n\n")
}

/// Ensure the text ends with a sentence terminator. Idempotent: text
/// already closed by `.`, `?`, `!` or an ellipsis is unchanged.
fn ensure_terminal_period(text: &str) -> String {
    let trimmed = text.trim_end();
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.ends_with(['.', '?', '!', '…']) {
        return trimmed.to_string();
    }
    format!("{}.", trimmed)
}

fn collapse_newlines(text: &str) -> String {
    MULTI_NEWLINE_RE.replace_all(text, "\n\n").into_owned()
}

/// Default character cap per query type, used when the caller passes
/// no explicit limit.
pub fn default_max_length(query_type: QueryType) -> Option<usize> {
    match query_type {
        QueryType::GlobalExplanation => Some(700),
        QueryType::Explanation => Some(600),
        QueryType::Summary => Some(400),
        _ => None,
    }
}

/// The full post-processing pipeline. Deterministic, no I/O.
pub fn postprocess_answer(answer: &str, query_type: QueryType, max_length: Option<usize>) -> String {
    let text = strip_output_tags(answer);
    let text = repair_broken_decimals(&text);
    let text = normalize_bold(&text);
    let text = convert_headers(&text);
    let text = convert_star_bullets(&text);

    // Structured JSON: render and finish, except the target family
    // which keeps only the intro and continues through shaping.
    let text = match structured::try_parse(&text) {
        Some(parsed) if !query_type.is_target() => {
            // No shaping and no sentence-wise caps past this point:
            // both would collapse the rendered bullet/section layout.
            let rendered = structured::render(&parsed, query_type);
            return ensure_terminal_period(&collapse_newlines(&rendered));
        }
        Some(parsed) => structured::render(&parsed, query_type),
        None => text,
    };

    let mut text = match query_type {
        QueryType::TargetShort => shape_target(&text, true),
        QueryType::TargetLong => shape_target(&text, false),
        QueryType::GlobalExplanation | QueryType::Explanation => shape_explanatory(&text, false),
        QueryType::Reasoning => shape_explanatory(&text, true),
        _ => text,
    };

    text = remove_stray_stars(&text, false);
    text = LEADING_MARKER_RE.replace_all(&text, "").into_owned();
    text = collapse_newlines(&text).trim().to_string();

    if !query_type.is_target() {
        text = ensure_terminal_period(&text);
    }

    if query_type == QueryType::Reasoning {
        text = cap_sentences(&text, 5);
    } else if !query_type.is_target() {
        if let Some(max) = max_length {
            text = truncate_sentencewise(&text, max);
        }
    }

    text
}

/// Final strict sanitization applied by the executor regardless of
/// query type: all emphasis markers out, bullets collapsed, whitespace
/// normalized.
pub fn sanitize_plain(text: &str) -> String {
    let text = text.replace("**", "").replace("__", "");
    let text = remove_stray_stars(&text, false);
    let text = LEADING_MARKER_RE.replace_all(&text, "");
    let text = MULTI_SPACE_RE.replace_all(&text, " ");
    collapse_newlines(&text).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broken_decimal_repaired() {
        let out = postprocess_answer("61\n- 7만건", QueryType::Explanation, None);
        assert!(out.contains("61.7만건"), "got {:?}", out);
    }

    #[test]
    fn test_output_tags_stripped() {
        let out = postprocess_answer(
            "<output>정답은 42입니다.</output>",
            QueryType::Explanation,
            None,
        );
        assert_eq!(out, "정답은 42입니다.");
    }

    #[test]
    fn test_partial_bold_normalized() {
        let out = postprocess_answer("**핵심* 내용입니다.", QueryType::General, None);
        assert!(out.contains("**핵심**"), "got {:?}", out);
    }

    #[test]
    fn test_lead_half_bold_repaired() {
        let out = postprocess_answer("*강조** 표현입니다.", QueryType::General, None);
        assert!(out.contains("**강조**"), "got {:?}", out);
    }

    #[test]
    fn test_bullet_star_not_consumed_by_bold_repair() {
        let text = "요약입니다.\n* **매출**: 100억원입니다.";
        let out = postprocess_answer(text, QueryType::General, None);
        assert!(out.contains("**매출**: 100억원입니다."), "got {:?}", out);
        assert!(!out.contains("** **"));
        assert!(!out.contains("* **"));
    }

    #[test]
    fn test_headers_become_bold() {
        let out = postprocess_answer("### 제목\n내용입니다.", QueryType::General, None);
        assert!(out.contains("**제목**"));
        assert!(!out.contains('#'));
    }

    #[test]
    fn test_star_bullets_become_hyphens() {
        let out = postprocess_answer("* **항목**: 값입니다.", QueryType::General, None);
        assert!(out.contains("**항목**: 값입니다."));
        assert!(!out.contains("* **"));
    }

    #[test]
    fn test_structured_json_reasoning() {
        let json = r#"{"intro":"도입.","sections":[{"title":"핵심","items":[{"label":"A","text":"B"}]}],"conclusion":"끝"}"#;
        let out = postprocess_answer(json, QueryType::Reasoning, None);
        assert!(out.starts_with("도입."));
        assert!(out.contains("**핵심**"));
        assert!(out.contains("- **A**: B"));
        assert!(out.contains("종합하면, 끝"));
    }

    #[test]
    fn test_structured_rendering_ignores_length_cap() {
        let json = r#"{"intro":"도입.","sections":[{"title":"핵심","items":[{"label":"A","text":"B"}]}],"conclusion":"끝"}"#;
        let capped = postprocess_answer(json, QueryType::Explanation, Some(5));
        let uncapped = postprocess_answer(json, QueryType::Explanation, None);
        assert_eq!(capped, uncapped);
        assert!(capped.contains("- **A**: B"));
    }

    #[test]
    fn test_structured_json_target_keeps_intro_only() {
        let json = r#"{"intro":"핵심 수치는 100억원","sections":[{"title":"핵심","items":[{"label":"A","text":"B"}]}],"conclusion":"끝"}"#;
        let out = postprocess_answer(json, QueryType::TargetShort, None);
        assert!(out.contains("100억원"));
        assert!(!out.contains("끝"));
        assert!(!out.contains("**"));
    }

    #[test]
    fn test_target_shaping() {
        let out = postprocess_answer("짧은 답변입니다", QueryType::TargetShort, None);
        assert!(!out.contains("**"));
        assert!(!out.starts_with('-'));
        assert!(split_sentences(&out).len() <= 2);
        assert!(!out.ends_with('.'));
    }

    #[test]
    fn test_target_long_caps_four_sentences() {
        let text = "하나입니다. 둘입니다. 셋입니다. 넷입니다. 다섯입니다.";
        let out = postprocess_answer(text, QueryType::TargetLong, None);
        assert_eq!(split_sentences(&out).len(), 4);
    }

    #[test]
    fn test_explanatory_merges_bullets() {
        let text = "- 첫 번째 항목입니다.\n- 두 번째 항목입니다.";
        let out = postprocess_answer(text, QueryType::Explanation, None);
        assert!(!out.contains("- "));
        assert!(out.contains("첫 번째 항목입니다."));
        assert!(out.contains("두 번째 항목입니다."));
    }

    #[test]
    fn test_reasoning_strips_section_labels() {
        let text = "근거: 매출이 늘었다.\n결론: 성장했다.";
        let out = postprocess_answer(text, QueryType::Reasoning, None);
        assert!(!out.contains("근거:"));
        assert!(!out.contains("결론:"));
        assert!(out.contains("매출이 늘었다."));
    }

    #[test]
    fn test_reasoning_five_sentence_cap() {
        let text = "일. 이. 삼. 사. 오. 육. 칠.";
        let out = postprocess_answer(text, QueryType::Reasoning, None);
        assert_eq!(split_sentences(&out).len(), 5);
    }

    #[test]
    fn test_period_addition_idempotent() {
        for closed in ["끝났습니다.", "정말요?", "좋아요!", "글쎄요..."] {
            let once = postprocess_answer(closed, QueryType::Explanation, None);
            let twice = postprocess_answer(&once, QueryType::Explanation, None);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_max_length_truncates_sentencewise() {
        let text = "첫 문장입니다. 두 번째 문장입니다. 세 번째 문장입니다.";
        let out = postprocess_answer(text, QueryType::Explanation, Some(20));
        assert!(out.ends_with('.'));
        assert!(split_sentences(&out).len() < 3);
    }

    #[test]
    fn test_decimal_survives_full_pipeline() {
        let text = "증가율은 3.7%입니다. 총 27.5만명이 참여했습니다.";
        let out = postprocess_answer(text, QueryType::Explanation, None);
        assert!(out.contains("3.7%"));
        assert!(out.contains("27.5만명"));
    }

    #[test]
    fn test_sanitize_plain() {
        let out = sanitize_plain("**굵게** 그리고\n- 불릿\n\n\n\n__밑줄__");
        assert!(!out.contains("**"));
        assert!(!out.contains("__"));
        assert!(!out.contains("- "));
        assert!(!out.contains("\n\n\n"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(postprocess_answer("", QueryType::Explanation, None), "");
        assert_eq!(postprocess_answer("   ", QueryType::TargetShort, None), "");
    }
}
