//! LLM-judged comparison of candidate answers.

use docqa_core::Result;
use serde::Serialize;
use tracing::warn;

use crate::TextGenerator;

/// Outcome of comparing several answers to one question.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub scores: Vec<f64>,
    pub best_index: usize,
    pub best_answer: String,
    pub notes: String,
}

/// Ask the LLM to score each answer in [0,1] and pick the best.
/// Degrades to the first answer when the judge output cannot be
/// parsed.
pub async fn evaluate_answers<L: TextGenerator>(
    llm: &L,
    question: &str,
    answers: &[String],
) -> Result<Evaluation> {
    let listed: String = answers
        .iter()
        .enumerate()
        .map(|(i, a)| format!("[{}]\n{}\n", i, a))
        .collect();

    let prompt = format!(
        "질문에 대한 후보 답변들을 평가하세요.\n\n질문: {}\n\n후보:\n{}\n\
         각 후보에 0.0~1.0 점수를 매기고 JSON으로만 답하세요: \
         {{\"scores\": [..], \"best_index\": N, \"notes\": \"...\"}}",
        question, listed
    );

    let raw = llm.generate(&prompt, Some("답변 품질 평가자"), 0.2).await?;

    let parsed: Option<serde_json::Value> = extract_json(&raw);
    let (scores, best_index, notes) = match parsed {
        Some(v) => {
            let scores: Vec<f64> = v["scores"]
                .as_array()
                .map(|arr| arr.iter().filter_map(|s| s.as_f64()).collect())
                .unwrap_or_default();
            let best = v["best_index"].as_u64().unwrap_or(0) as usize;
            let notes = v["notes"].as_str().unwrap_or("").to_string();
            (scores, best.min(answers.len().saturating_sub(1)), notes)
        }
        None => {
            warn!("Evaluation output was not parseable JSON, defaulting to first answer");
            (Vec::new(), 0, String::new())
        }
    };

    Ok(Evaluation {
        scores,
        best_index,
        best_answer: answers.get(best_index).cloned().unwrap_or_default(),
        notes,
    })
}

/// Pull the first JSON object out of possibly fenced/chatty output.
fn extract_json(raw: &str) -> Option<serde_json::Value> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&raw[start..=end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedLlm(&'static str);

    impl TextGenerator for CannedLlm {
        async fn generate(
            &self,
            _prompt: &str,
            _role: Option<&str>,
            _temperature: f64,
        ) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn test_parses_judge_output() {
        let llm = CannedLlm(r#"{"scores": [0.3, 0.9], "best_index": 1, "notes": "둘째가 낫다"}"#);
        let answers = vec!["첫째".to_string(), "둘째".to_string()];
        let eval = evaluate_answers(&llm, "질문?", &answers).await.unwrap();
        assert_eq!(eval.best_index, 1);
        assert_eq!(eval.best_answer, "둘째");
        assert_eq!(eval.scores, vec![0.3, 0.9]);
    }

    #[tokio::test]
    async fn test_unparseable_defaults_to_first() {
        let llm = CannedLlm("점수를 매길 수 없습니다");
        let answers = vec!["첫째".to_string(), "둘째".to_string()];
        let eval = evaluate_answers(&llm, "질문?", &answers).await.unwrap();
        assert_eq!(eval.best_index, 0);
        assert_eq!(eval.best_answer, "첫째");
    }

    #[tokio::test]
    async fn test_out_of_range_best_index_clamped() {
        let llm = CannedLlm(r#"{"scores": [0.5], "best_index": 9}"#);
        let answers = vec!["하나".to_string(), "둘".to_string()];
        let eval = evaluate_answers(&llm, "질문?", &answers).await.unwrap();
        assert!(eval.best_index < answers.len());
    }
}
