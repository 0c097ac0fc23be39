//! Structured-JSON answer parsing and markdown rendering.
//!
//! The LLM may emit an intermediate `{intro, sections, conclusion}`
//! object (optionally inside a ```json fence). When the whole answer
//! parses as that shape it is rendered into the final markdown
//! presentation; otherwise the text falls through as already-plain.

use docqa_core::QueryType;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct StructuredAnswer {
    #[serde(default)]
    pub intro: String,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub conclusion: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub text: String,
}

/// Strip an optional ```json ... ``` fence around the payload.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"));
    match inner {
        Some(body) => body.trim(),
        None => trimmed,
    }
}

/// Try to parse the whole answer as a structured object. Returns None
/// when the text is not JSON or carries none of the expected fields.
pub fn try_parse(answer: &str) -> Option<StructuredAnswer> {
    let body = strip_code_fence(answer);
    if !body.starts_with('{') {
        return None;
    }
    let parsed: StructuredAnswer = serde_json::from_str(body).ok()?;
    if parsed.intro.trim().is_empty()
        && parsed.sections.is_empty()
        && parsed.conclusion.trim().is_empty()
    {
        return None;
    }
    Some(parsed)
}

/// Conclusion connector by rhetorical shape.
fn conclusion_connector(query_type: QueryType) -> &'static str {
    match query_type {
        QueryType::GlobalExplanation | QueryType::Explanation => "요약하면, ",
        QueryType::Reasoning => "종합하면, ",
        _ => "",
    }
}

/// Render a structured answer into markdown. The short-answer family
/// keeps only the intro; everything else gets intro paragraph, bold
/// section titles with labelled bullets, and a connected conclusion.
pub fn render(answer: &StructuredAnswer, query_type: QueryType) -> String {
    if query_type.is_target() {
        return answer.intro.trim().to_string();
    }

    let mut out = String::new();

    let intro = answer.intro.trim();
    if !intro.is_empty() {
        out.push_str(intro);
        out.push_str("\n\n");
    }

    for section in &answer.sections {
        let title = section.title.trim();
        if !title.is_empty() {
            out.push_str(&format!("**{}**\n", title));
        }
        for item in &section.items {
            let label = item.label.trim();
            let text = item.text.trim();
            if label.is_empty() {
                out.push_str(&format!("- {}\n", text));
            } else {
                out.push_str(&format!("- **{}**: {}\n", label, text));
            }
        }
        out.push('\n');
    }

    let conclusion = answer.conclusion.trim();
    if !conclusion.is_empty() {
        out.push_str(conclusion_connector(query_type));
        out.push_str(conclusion);
    }

    out.trim_end().to_string()
}
