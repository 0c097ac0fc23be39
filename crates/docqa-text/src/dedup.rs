//! De-duplication against a prior explanation.
//!
//! When a request carries a `global_explanation_ref`, sentences whose
//! normalized form already appears in the reference are dropped so the
//! new answer only adds novel content.

use docqa_core::QueryType;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::sentences::split_sentences;

/// Last-resort "novel fact" for short answers: a bare number,
/// percentage or currency token.
static NUMBER_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?\s*(?:%|만|억|조|원|명|건|개)?").unwrap());

pub const NO_NOVEL_CONTENT_MSG: &str = "기존 설명과 구별되는 새로운 정보가 없습니다";

/// Lowercase and strip everything except letters and digits, so
/// markdown, punctuation and whitespace differences don't defeat the
/// substring comparison.
fn normalize_for_comparison(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Drop sentences already covered by the reference text. Falls back,
/// in order: numeric token (target_short), fixed no-novel-content
/// message (target family), first original sentence.
pub fn dedupe_against_reference(answer: &str, reference: &str, query_type: QueryType) -> String {
    let norm_ref = normalize_for_comparison(reference);
    if norm_ref.is_empty() {
        return answer.to_string();
    }

    let sentences = split_sentences(answer);
    let kept: Vec<String> = sentences
        .iter()
        .filter(|s| {
            let norm = normalize_for_comparison(s);
            !norm.is_empty() && !norm_ref.contains(&norm)
        })
        .cloned()
        .collect();

    if !kept.is_empty() {
        return kept.join(" ");
    }

    if query_type == QueryType::TargetShort {
        if let Some(m) = NUMBER_TOKEN_RE.find(answer) {
            return m.as_str().trim().to_string();
        }
    }
    if query_type.is_target() {
        return NO_NOVEL_CONTENT_MSG.to_string();
    }

    split_sentences(answer).into_iter().next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_novel_sentences_survive() {
        let answer = "매출은 100억원입니다. 영업이익은 20억원입니다.";
        let reference = "2024년 매출은 100억원입니다.";
        let out = dedupe_against_reference(answer, reference, QueryType::Reasoning);
        assert_eq!(out, "영업이익은 20억원입니다.");
    }

    #[test]
    fn test_markdown_differences_ignored() {
        // Normalization strips the markdown, so the first sentence is
        // a duplicate and only the novel one survives.
        let answer = "**매출은 100억원**입니다. 영업이익은 20억원입니다.";
        let reference = "매출은 100억원입니다";
        let out = dedupe_against_reference(answer, reference, QueryType::Reasoning);
        assert_eq!(out, "영업이익은 20억원입니다.");
    }

    #[test]
    fn test_fully_duplicate_single_sentence_falls_back_to_itself() {
        let answer = "**매출은 100억원**입니다.";
        let reference = "매출은 100억원입니다";
        let out = dedupe_against_reference(answer, reference, QueryType::Reasoning);
        assert_eq!(out, answer);
    }

    #[test]
    fn test_target_short_numeric_fallback() {
        let answer = "매출은 100억원입니다.";
        let reference = "매출은 100억원입니다.";
        let out = dedupe_against_reference(answer, reference, QueryType::TargetShort);
        assert!(out.contains("100억"), "got {:?}", out);
    }

    #[test]
    fn test_target_long_message_fallback() {
        let answer = "같은 내용입니다.";
        let reference = "같은 내용입니다.";
        let out = dedupe_against_reference(answer, reference, QueryType::TargetLong);
        assert_eq!(out, NO_NOVEL_CONTENT_MSG);
    }

    #[test]
    fn test_other_types_keep_first_sentence() {
        let answer = "같은 내용입니다. 역시 같은 내용입니다.";
        let reference = "같은 내용입니다 역시 같은 내용입니다";
        let out = dedupe_against_reference(answer, reference, QueryType::Reasoning);
        assert_eq!(out, "같은 내용입니다.");
    }

    #[test]
    fn test_empty_reference_is_noop() {
        let answer = "그대로 유지됩니다.";
        assert_eq!(
            dedupe_against_reference(answer, "", QueryType::Explanation),
            answer
        );
    }
}
