//! Decimal-aware sentence splitting.
//!
//! This is the single shared tokenizer used by the post-processor,
//! de-duplication and length truncation. The boundary rule: `?`, `!`
//! and `…` always terminate; `.` terminates only when it is NOT
//! flanked by ASCII digits on both sides, so "3.7%" and "27.5만명"
//! stay inside one sentence. Runs of terminators ("...", "?!")
//! collapse into a single boundary.

/// Split text into trimmed sentences, terminators included.
pub fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut sentences = Vec::new();
    let mut start = 0usize;
    let mut i = 0usize;

    while i < chars.len() {
        let boundary = match chars[i] {
            '?' | '!' | '…' => true,
            '.' => {
                let prev_digit = i > 0 && chars[i - 1].is_ascii_digit();
                let next_digit = chars.get(i + 1).is_some_and(|c| c.is_ascii_digit());
                !(prev_digit && next_digit)
            }
            _ => false,
        };

        if boundary {
            let mut end = i + 1;
            while end < chars.len() && matches!(chars[end], '.' | '?' | '!' | '…') {
                end += 1;
            }
            let sentence: String = chars[start..end].iter().collect();
            let sentence = sentence.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            start = end;
            i = end;
        } else {
            i += 1;
        }
    }

    if start < chars.len() {
        let tail: String = chars[start..].iter().collect();
        let tail = tail.trim();
        if !tail.is_empty() {
            sentences.push(tail.to_string());
        }
    }

    sentences
}

/// Rebuild text from the first `max` sentences.
pub fn cap_sentences(text: &str, max: usize) -> String {
    let sentences = split_sentences(text);
    if sentences.len() <= max {
        return text.trim().to_string();
    }
    sentences[..max].join(" ")
}

/// Truncate to at most `max_chars` characters, dropping whole
/// sentences from the end — never cutting mid-sentence. Always keeps
/// at least the first sentence.
pub fn truncate_sentencewise(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let sentences = split_sentences(text);
    let mut kept: Vec<String> = Vec::new();
    let mut total = 0usize;
    for sentence in sentences {
        let len = sentence.chars().count();
        let sep = if kept.is_empty() { 0 } else { 1 };
        if !kept.is_empty() && total + sep + len > max_chars {
            break;
        }
        total += sep + len;
        kept.push(sentence);
    }
    kept.join(" ")
}
