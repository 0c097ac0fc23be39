//! Shared value objects for the QA-generation pipeline.

use serde::{Deserialize, Serialize};

/// Rhetorical shape of the requested answer. Drives length and
/// markdown rules throughout the post-processing pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    GlobalExplanation,
    Explanation,
    Reasoning,
    TargetShort,
    TargetLong,
    Summary,
    Factual,
    General,
}

impl QueryType {
    /// Parse a wire string. Accepts the bare `"target"` alias used by
    /// older clients for the short-answer family.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "global_explanation" => Some(Self::GlobalExplanation),
            "explanation" => Some(Self::Explanation),
            "reasoning" => Some(Self::Reasoning),
            "target_short" | "target" => Some(Self::TargetShort),
            "target_long" => Some(Self::TargetLong),
            "summary" => Some(Self::Summary),
            "factual" => Some(Self::Factual),
            "general" => Some(Self::General),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GlobalExplanation => "global_explanation",
            Self::Explanation => "explanation",
            Self::Reasoning => "reasoning",
            Self::TargetShort => "target_short",
            Self::TargetLong => "target_long",
            Self::Summary => "summary",
            Self::Factual => "factual",
            Self::General => "general",
        }
    }

    /// Short-answer family: plain sentences, no markdown, hard
    /// sentence caps.
    pub fn is_target(&self) -> bool {
        matches!(self, Self::TargetShort | Self::TargetLong)
    }
}

/// One of the seven generation/edit modes, derived from which of
/// {query, answer, edit_request} a request populates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowType {
    FullGeneration,
    EditQuery,
    EditAnswer,
    EditBoth,
    QueryGeneration,
    AnswerGeneration,
    Rewrite,
}

impl WorkflowType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullGeneration => "full_generation",
            Self::EditQuery => "edit_query",
            Self::EditAnswer => "edit_answer",
            Self::EditBoth => "edit_both",
            Self::QueryGeneration => "query_generation",
            Self::AnswerGeneration => "answer_generation",
            Self::Rewrite => "rewrite",
        }
    }
}

/// Mutable generation state for one request. Owned exclusively by one
/// executor invocation; never shared across requests.
#[derive(Debug, Clone)]
pub struct WorkflowContext {
    pub query: Option<String>,
    pub answer: Option<String>,
    pub ocr_text: String,
    pub query_type: QueryType,
    pub edit_request: Option<String>,
    /// Prior explanation text the answer must not repeat.
    pub global_explanation_ref: Option<String>,
    pub use_lats: bool,
}

/// Final output of one executor invocation. Immutable once returned.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowResult {
    pub workflow: WorkflowType,
    pub query: String,
    pub answer: String,
    /// Human-readable log of what the executor did, in order.
    pub changes: Vec<String>,
    pub query_type: QueryType,
}

/// One forbidden-pattern match.
#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    /// Category tag, e.g. "그래프참조" or "전체이미지".
    #[serde(rename = "type")]
    pub category: &'static str,
    pub matched_text: String,
    pub position: usize,
}

/// Immutable scoring weights for one quality preset. Constructed once,
/// never mutated.
#[derive(Debug, Clone, Copy)]
pub struct AnswerQualityWeights {
    pub base_score: f64,
    pub length_weight: f64,
    pub number_match_weight: f64,
    pub no_forbidden_weight: f64,
    pub constraint_weight: f64,
    pub min_length: usize,
    pub max_length: usize,
    pub min_number_overlap: usize,
}

impl AnswerQualityWeights {
    pub const fn explanation() -> Self {
        Self {
            base_score: 0.4,
            length_weight: 0.1,
            number_match_weight: 0.25,
            no_forbidden_weight: 0.15,
            constraint_weight: 0.1,
            min_length: 10,
            max_length: 800,
            min_number_overlap: 1,
        }
    }

    /// Table-derived answers live or die on number fidelity.
    pub const fn table_summary() -> Self {
        Self {
            base_score: 0.3,
            length_weight: 0.1,
            number_match_weight: 0.35,
            no_forbidden_weight: 0.15,
            constraint_weight: 0.1,
            min_length: 10,
            max_length: 600,
            min_number_overlap: 2,
        }
    }

    pub const fn comparison() -> Self {
        Self {
            base_score: 0.35,
            length_weight: 0.1,
            number_match_weight: 0.3,
            no_forbidden_weight: 0.15,
            constraint_weight: 0.1,
            min_length: 20,
            max_length: 700,
            min_number_overlap: 2,
        }
    }

    pub const fn trend_analysis() -> Self {
        Self {
            base_score: 0.35,
            length_weight: 0.15,
            number_match_weight: 0.25,
            no_forbidden_weight: 0.15,
            constraint_weight: 0.1,
            min_length: 30,
            max_length: 800,
            min_number_overlap: 1,
        }
    }

    pub const fn strict() -> Self {
        Self {
            base_score: 0.3,
            length_weight: 0.15,
            number_match_weight: 0.3,
            no_forbidden_weight: 0.2,
            constraint_weight: 0.05,
            min_length: 20,
            max_length: 500,
            min_number_overlap: 2,
        }
    }

    /// Look up a preset by name.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "explanation" => Some(Self::explanation()),
            "table_summary" => Some(Self::table_summary()),
            "comparison" => Some(Self::comparison()),
            "trend_analysis" => Some(Self::trend_analysis()),
            "strict" => Some(Self::strict()),
            _ => None,
        }
    }

    /// Preset best suited to a query type.
    pub fn for_query_type(query_type: QueryType) -> Self {
        match query_type {
            QueryType::Summary => Self::table_summary(),
            QueryType::Reasoning => Self::trend_analysis(),
            QueryType::TargetShort | QueryType::TargetLong => Self::strict(),
            _ => Self::explanation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_type_roundtrip() {
        for qt in [
            QueryType::GlobalExplanation,
            QueryType::Explanation,
            QueryType::Reasoning,
            QueryType::TargetShort,
            QueryType::TargetLong,
            QueryType::Summary,
            QueryType::Factual,
            QueryType::General,
        ] {
            assert_eq!(QueryType::parse(qt.as_str()), Some(qt));
        }
    }

    #[test]
    fn test_query_type_target_alias() {
        assert_eq!(QueryType::parse("target"), Some(QueryType::TargetShort));
        assert_eq!(QueryType::parse("  target_long "), Some(QueryType::TargetLong));
        assert_eq!(QueryType::parse("unknown"), None);
    }

    #[test]
    fn test_preset_lookup() {
        assert!(AnswerQualityWeights::preset("table_summary").is_some());
        assert!(AnswerQualityWeights::preset("nope").is_none());
        let t = AnswerQualityWeights::table_summary();
        assert!(t.number_match_weight > AnswerQualityWeights::explanation().number_match_weight);
    }
}
