//! Built-in generation rules used when the graph is absent or fails.

use docqa_core::QueryType;

const COMMON_RULES: &[&str] = &[
    "문서에 제시된 수치와 단위를 그대로 사용한다",
    "표, 그래프, 이미지 자체를 가리키는 표현을 쓰지 않는다",
    "문서에 없는 내용을 추측하지 않는다",
];

/// Hardcoded default rule list per query type.
pub fn default_rules(query_type: QueryType) -> Vec<String> {
    let extra: &[&str] = match query_type {
        QueryType::TargetShort => &["핵심 사실 하나만 한 문장으로 답한다", "불필요한 배경 설명을 붙이지 않는다"],
        QueryType::TargetLong => &["네 문장 이내로 구체적인 수치를 포함해 답한다"],
        QueryType::Reasoning => &["근거와 결론을 구분하되 라벨 없이 서술한다", "다섯 문장 이내로 작성한다"],
        QueryType::GlobalExplanation => &["문서 전체의 흐름을 한 단락으로 설명한다"],
        QueryType::Explanation => &["주요 수치를 중심으로 흐르는 문장으로 설명한다"],
        QueryType::Summary => &["세 문장 이내로 핵심만 요약한다"],
        QueryType::Factual => &["사실 관계만 간결하게 서술한다"],
        QueryType::General => &["평이한 설명체로 작성한다"],
    };

    COMMON_RULES
        .iter()
        .chain(extra.iter())
        .map(|r| r.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_type_has_rules() {
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
            let rules = default_rules(qt);
            assert!(rules.len() > COMMON_RULES.len());
        }
    }
}
