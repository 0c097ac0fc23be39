//! Docqa Text — pure text pipeline: forbidden-pattern detection,
//! decimal-aware sentence splitting, answer post-processing and
//! de-duplication. No I/O, no async.

pub mod dedup;
pub mod forbidden;
pub mod postprocess;
pub mod sentences;
pub mod structured;

pub use dedup::{dedupe_against_reference, NO_NOVEL_CONTENT_MSG};
pub use forbidden::{find_formatting_violations, find_violations};
pub use postprocess::{default_max_length, postprocess_answer, sanitize_plain, strip_output_tags};
pub use sentences::{cap_sentences, split_sentences, truncate_sentencewise};

/// Truncate at a character boundary (Korean text makes byte slicing
/// unsafe).
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_korean() {
        assert_eq!(truncate_chars("가나다라마", 3), "가나다");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
