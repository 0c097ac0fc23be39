//! LATS quality scoring and multi-candidate generation.
//!
//! "Generate several, score, pick best": three fixed-strategy
//! candidates are generated concurrently, scored with an additive
//! heuristic, filtered at a quality threshold and the best survivor
//! wins.

use docqa_core::{AnswerQualityWeights, QueryType, Result};
use docqa_llm::TextGenerator;
use docqa_text::{find_formatting_violations, strip_output_tags, truncate_chars};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};

/// Candidates scoring below this never win.
pub const QUALITY_THRESHOLD: f64 = 0.6;

const OCR_PROMPT_LIMIT: usize = 3000;

/// The three fixed candidate strategies: (name, prompt instruction).
pub const LATS_STRATEGIES: &[(&str, &str)] = &[
    ("숫자_중심", "문서의 수치와 단위를 정확히 인용하는 데 집중해 답변하세요."),
    ("트렌드_중심", "수치의 증감과 추세 변화를 중심으로 답변하세요."),
    ("비교_중심", "항목 간 차이와 비교를 중심으로 답변하세요."),
];

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());

#[derive(Debug, Clone, Serialize)]
pub struct CandidateScore {
    pub strategy: String,
    pub score: f64,
}

/// Outcome of one multi-candidate run. `answer` is None when every
/// candidate fell below the threshold; callers fall back to the
/// single-shot path.
#[derive(Debug, Clone, Serialize)]
pub struct LatsOutcome {
    pub answer: Option<String>,
    pub chosen_strategy: Option<String>,
    pub scores: Vec<CandidateScore>,
    pub average_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

fn unique_numbers(text: &str) -> Vec<String> {
    let mut numbers = Vec::new();
    for m in NUMBER_RE.find_iter(text) {
        let token = m.as_str().to_string();
        if !numbers.contains(&token) {
            numbers.push(token);
        }
    }
    numbers
}

/// Additive heuristic score in [0,1].
///
/// When the OCR text contains no numeric tokens at all, half the
/// number weight is granted unconditionally — non-numeric source
/// material is not penalized. The `min_number_overlap` gate applies
/// only when the OCR text does contain numbers.
pub fn evaluate_answer_quality(
    answer: &str,
    ocr_text: &str,
    weights: &AnswerQualityWeights,
    has_graph: bool,
) -> f64 {
    let mut score = weights.base_score;

    let length = answer.chars().count();
    if length >= weights.min_length && length <= weights.max_length {
        score += weights.length_weight;
    }

    let ocr_numbers = unique_numbers(ocr_text);
    if ocr_numbers.is_empty() {
        score += weights.number_match_weight * 0.5;
    } else {
        let overlap = ocr_numbers
            .iter()
            .filter(|n| answer.contains(n.as_str()))
            .count();
        if overlap >= weights.min_number_overlap {
            let ratio = (overlap as f64 / ocr_numbers.len() as f64).min(1.0);
            score += weights.number_match_weight * ratio;
        }
    }

    if find_formatting_violations(answer).is_empty() {
        score += weights.no_forbidden_weight;
    }

    if has_graph {
        score += weights.constraint_weight * 0.8;
    }

    score.clamp(0.0, 1.0)
}

fn candidate_prompt(strategy_instruction: &str, query: &str, ocr_text: &str) -> String {
    format!(
        "다음 문서를 근거로 질문에 답하세요. {}\n\n문서:\n{}\n\n질문: {}\n\n\
         표나 그래프 자체를 언급하지 말고 본문 수치만 사용하세요.",
        strategy_instruction,
        truncate_chars(ocr_text, OCR_PROMPT_LIMIT),
        query
    )
}

/// Generate the three strategy candidates concurrently, score each and
/// return the best survivor.
pub async fn generate_lats_answer<L: TextGenerator>(
    llm: &L,
    query: &str,
    ocr_text: &str,
    query_type: QueryType,
    has_graph: bool,
) -> Result<LatsOutcome> {
    let weights = AnswerQualityWeights::for_query_type(query_type);

    let prompts = [
        candidate_prompt(LATS_STRATEGIES[0].1, query, ocr_text),
        candidate_prompt(LATS_STRATEGIES[1].1, query, ocr_text),
        candidate_prompt(LATS_STRATEGIES[2].1, query, ocr_text),
    ];
    let (first, second, third) = futures::join!(
        llm.generate(&prompts[0], None, 0.6),
        llm.generate(&prompts[1], None, 0.7),
        llm.generate(&prompts[2], None, 0.7),
    );

    let candidates = [first?, second?, third?];

    let mut scores = Vec::with_capacity(candidates.len());
    let mut best: Option<(usize, f64)> = None;

    for (i, raw) in candidates.iter().enumerate() {
        let cleaned = strip_output_tags(raw);
        let score = evaluate_answer_quality(&cleaned, ocr_text, &weights, has_graph);
        debug!("Candidate {} scored {:.2}", LATS_STRATEGIES[i].0, score);
        scores.push(CandidateScore {
            strategy: LATS_STRATEGIES[i].0.to_string(),
            score,
        });
        if score >= QUALITY_THRESHOLD && best.map_or(true, |(_, s)| score > s) {
            best = Some((i, score));
        }
    }

    let average_score = scores.iter().map(|c| c.score).sum::<f64>() / scores.len() as f64;

    match best {
        Some((i, score)) => {
            info!(
                "LATS picked strategy {} (score {:.2}, avg {:.2})",
                LATS_STRATEGIES[i].0, score, average_score
            );
            Ok(LatsOutcome {
                answer: Some(strip_output_tags(&candidates[i])),
                chosen_strategy: Some(LATS_STRATEGIES[i].0.to_string()),
                scores,
                average_score,
                reason: None,
            })
        }
        None => Ok(LatsOutcome {
            answer: None,
            chosen_strategy: None,
            scores,
            average_score,
            reason: Some("all_low_quality"),
        }),
    }
}
