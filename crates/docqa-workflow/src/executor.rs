//! Workspace executor.
//!
//! Drives the sequence of LLM and knowledge-graph calls for one
//! classified workflow, then normalizes the result through the
//! post-processing pipeline. Graph failures degrade to built-in rules;
//! LLM failures propagate to the HTTP layer.

use docqa_core::{QueryType, Result, WorkflowContext, WorkflowResult, WorkflowType};
use docqa_graph::{default_rules, RuleGraph};
use docqa_llm::{edit_content, TextGenerator};
use docqa_text::{
    dedupe_against_reference, default_max_length, find_formatting_violations, find_violations,
    postprocess_answer, sanitize_plain, split_sentences, strip_output_tags, truncate_chars,
};
use tracing::{info, warn};

use crate::quality::generate_lats_answer;

const MAX_GENERATION_ATTEMPTS: usize = 3;
const OCR_PROMPT_LIMIT: usize = 3000;
const REF_QUOTE_LIMIT: usize = 500;
const ANSWER_PREVIEW_LIMIT: usize = 200;
const MAX_EXTRA_RULES: usize = 5;
const QUERY_WORD_LIMIT: usize = 20;

const AUTO_CORRECT_REQUEST: &str = "형식/길이 위반을 자동 교정";

/// Executes one classified workflow against the injected collaborators.
/// The graph is optional; the LLM is required.
pub struct WorkspaceExecutor<'a, L, G> {
    llm: &'a L,
    graph: Option<&'a G>,
}

impl<'a, L: TextGenerator, G: RuleGraph> WorkspaceExecutor<'a, L, G> {
    pub fn new(llm: &'a L, graph: Option<&'a G>) -> Self {
        Self { llm, graph }
    }

    /// Run one workflow to completion. Sub-steps are strictly
    /// sequential; the result is only constructed after everything
    /// finished.
    pub async fn execute(
        &self,
        workflow: WorkflowType,
        ctx: &WorkflowContext,
    ) -> Result<WorkflowResult> {
        info!("Executing workflow {}", workflow.as_str());
        let mut changes = Vec::new();
        let ocr = ctx.ocr_text.as_str();

        let (query, answer, answer_produced) = match workflow {
            WorkflowType::FullGeneration => {
                let query = self.generate_query(ctx, &mut changes).await?;
                let answer = self.generate_answer(ctx, &query, &mut changes).await?;
                (query, answer, true)
            }
            WorkflowType::QueryGeneration => {
                let query = self.generate_query(ctx, &mut changes).await?;
                (query, ctx.answer.clone().unwrap_or_default(), false)
            }
            WorkflowType::AnswerGeneration => {
                let query = ctx.query.clone().unwrap_or_default();
                let answer = self.generate_answer(ctx, &query, &mut changes).await?;
                (query, answer, true)
            }
            WorkflowType::Rewrite => {
                let query = ctx.query.clone().unwrap_or_default();
                let current = ctx.answer.clone().unwrap_or_default();
                let rules = self.build_rules_text(ctx.query_type).await;
                let edited = edit_content(
                    self.llm,
                    &current,
                    ocr,
                    &query,
                    AUTO_CORRECT_REQUEST,
                    Some(&rules),
                )
                .await?;
                changes.push("형식/길이 자동 교정".into());
                (query, strip_output_tags(&edited), true)
            }
            WorkflowType::EditQuery => {
                // The edit step is answer-agnostic text revision: the
                // query takes the content slot, no question block.
                let current = ctx.query.clone().unwrap_or_default();
                let edit_request = ctx.edit_request.clone().unwrap_or_default();
                let edited = edit_content(self.llm, &current, ocr, "", &edit_request, None).await?;
                changes.push(format!("질의 수정: {}", edit_request));
                (
                    strip_output_tags(&edited),
                    ctx.answer.clone().unwrap_or_default(),
                    false,
                )
            }
            WorkflowType::EditAnswer => {
                let query = ctx.query.clone().unwrap_or_default();
                let current = ctx.answer.clone().unwrap_or_default();
                let edit_request = ctx.edit_request.clone().unwrap_or_default();
                let rules = self.build_rules_text(ctx.query_type).await;
                let edited =
                    edit_content(self.llm, &current, ocr, &query, &edit_request, Some(&rules))
                        .await?;
                changes.push(format!("답변 수정: {}", edit_request));
                (query, strip_output_tags(&edited), true)
            }
            WorkflowType::EditBoth => {
                // Answer first: the query-adjustment prompt embeds a
                // preview of the finished new answer.
                let query = ctx.query.clone().unwrap_or_default();
                let current = ctx.answer.clone().unwrap_or_default();
                let edit_request = ctx.edit_request.clone().unwrap_or_default();
                let rules = self.build_rules_text(ctx.query_type).await;
                let new_answer = strip_output_tags(
                    &edit_content(self.llm, &current, ocr, &query, &edit_request, Some(&rules))
                        .await?,
                );
                changes.push(format!("답변 수정: {}", edit_request));

                let follow_up = format!(
                    "다음 답변에 맞게 질의 조정: {}...",
                    truncate_chars(&new_answer, ANSWER_PREVIEW_LIMIT)
                );
                let new_query =
                    strip_output_tags(&edit_content(self.llm, &query, ocr, "", &follow_up, None).await?);
                changes.push("질의를 수정된 답변에 맞게 조정".into());
                (new_query, new_answer, true)
            }
        };

        let answer = if answer_produced && !answer.trim().is_empty() {
            self.post_validate(answer, &query, ctx, &mut changes).await?
        } else {
            answer
        };

        Ok(WorkflowResult {
            workflow,
            query,
            answer,
            changes,
            query_type: ctx.query_type,
        })
    }

    /// Generate a query from the OCR text with a per-type intent hint.
    async fn generate_query(
        &self,
        ctx: &WorkflowContext,
        changes: &mut Vec<String>,
    ) -> Result<String> {
        let mut prompt = format!(
            "다음 문서를 읽고 {}을(를) 한 문장으로 작성하세요.\n\n문서:\n{}",
            query_intent_hint(ctx.query_type),
            truncate_chars(&ctx.ocr_text, OCR_PROMPT_LIMIT),
        );
        if let Some(reference) = non_empty(&ctx.global_explanation_ref) {
            prompt.push_str(&format!(
                "\n\n이미 다음 설명이 제공되었습니다. 중복되는 질문은 피하세요:\n{}",
                truncate_chars(reference, REF_QUOTE_LIMIT)
            ));
        }

        let raw = self.llm.generate(&prompt, Some("문서 질의 생성기"), 0.7).await?;
        let mut query = strip_output_tags(&raw);
        if ctx.query_type == QueryType::TargetShort {
            query = compress_query(&query);
        }
        changes.push("질의 생성".into());
        Ok(query)
    }

    /// Generate an answer with the forbidden-pattern retry loop.
    /// When LATS is requested, the multi-candidate path runs first and
    /// the single-shot path is the fallback.
    async fn generate_answer(
        &self,
        ctx: &WorkflowContext,
        query: &str,
        changes: &mut Vec<String>,
    ) -> Result<String> {
        if ctx.use_lats {
            let outcome = generate_lats_answer(
                self.llm,
                query,
                &ctx.ocr_text,
                ctx.query_type,
                self.graph.is_some(),
            )
            .await?;
            if let (Some(answer), Some(strategy)) = (outcome.answer, outcome.chosen_strategy) {
                changes.push(format!(
                    "LATS 전략 '{}' 선택 (평균 점수 {:.2})",
                    strategy, outcome.average_score
                ));
                return Ok(answer);
            }
            changes.push("LATS 후보 전원 기준 미달, 단일 생성으로 대체".into());
        }

        let rules_text = self.build_rules_text(ctx.query_type).await;
        let base_prompt = build_answer_prompt(ctx, query, &rules_text);

        let mut last_output = String::new();
        let mut last_categories: Vec<&'static str> = Vec::new();

        for attempt in 0..MAX_GENERATION_ATTEMPTS {
            let prompt = if last_categories.is_empty() {
                base_prompt.clone()
            } else {
                format!(
                    "{}\n\n직전 답변에 금지 표현({})이 포함되었습니다. 해당 표현 없이 본문 수치만으로 다시 작성하세요.",
                    base_prompt,
                    last_categories.join(", ")
                )
            };

            let raw = self.llm.generate(&prompt, Some("문서 기반 답변 생성기"), 0.6).await?;
            let output = strip_output_tags(&raw);
            let violations = find_violations(&output);

            if violations.is_empty() {
                if attempt > 0 {
                    changes.push(format!("금지 표현 교정 ({}회 재시도)", attempt));
                } else {
                    changes.push("답변 생성".into());
                }
                return Ok(output);
            }

            warn!(
                "Attempt {} produced {} forbidden-pattern violations",
                attempt + 1,
                violations.len()
            );
            last_categories.clear();
            for v in &violations {
                if !last_categories.contains(&v.category) {
                    last_categories.push(v.category);
                }
            }
            last_output = output;
        }

        warn!("Forbidden patterns remain after {} attempts, returning last", MAX_GENERATION_ATTEMPTS);
        changes.push("금지 표현이 남은 채 마지막 시도 반환".into());
        Ok(last_output)
    }

    /// Rule text for the answer prompt: graph constraints with
    /// default-list fallback, plus up to five extra graph rules. The
    /// executor never fails because the graph is unreachable.
    async fn build_rules_text(&self, query_type: QueryType) -> String {
        let mut rules: Vec<String> = match self.graph {
            Some(graph) => match graph.constraints_for_query_type(query_type).await {
                Ok(constraints) if !constraints.is_empty() => {
                    constraints.into_iter().map(|c| c.description).collect()
                }
                Ok(_) => default_rules(query_type),
                Err(e) => {
                    warn!("Constraint lookup failed, using defaults: {}", e);
                    default_rules(query_type)
                }
            },
            None => default_rules(query_type),
        };

        if let Some(graph) = self.graph {
            match graph.rules_for_query_type(query_type).await {
                Ok(extra) => {
                    for rule in extra.into_iter().take(MAX_EXTRA_RULES) {
                        rules.push(rule.text);
                    }
                }
                Err(e) => warn!("Rule lookup failed: {}", e),
            }
        }

        rules
            .iter()
            .map(|r| format!("- {}", r))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Unconditional post-validation: advisory rule hints, the
    /// post-processing pipeline, de-duplication for the short/reasoning
    /// family, and the final strict sanitize pass.
    async fn post_validate(
        &self,
        answer: String,
        query: &str,
        ctx: &WorkflowContext,
        changes: &mut Vec<String>,
    ) -> Result<String> {
        if let Some(graph) = self.graph {
            match graph.relevant_rules(query, 3).await {
                Ok(hints) => {
                    for hint in hints {
                        changes.push(format!("규칙 참고: {}", hint));
                    }
                }
                Err(e) => warn!("Rule hint lookup failed: {}", e),
            }
        }

        let formatting = find_formatting_violations(&answer);
        if !formatting.is_empty() {
            changes.push(format!("형식 위반 {}건 정리", formatting.len()));
        }

        let mut processed =
            postprocess_answer(&answer, ctx.query_type, default_max_length(ctx.query_type));
        changes.push("후처리 적용".into());

        let dedup_applies = matches!(
            ctx.query_type,
            QueryType::TargetShort | QueryType::TargetLong | QueryType::Reasoning
        );
        if dedup_applies {
            if let Some(reference) = non_empty(&ctx.global_explanation_ref) {
                let before = processed.clone();
                processed = dedupe_against_reference(&processed, reference, ctx.query_type);
                if processed != before {
                    changes.push("기존 설명과 중복되는 문장 제거".into());
                }
            }
        }

        Ok(sanitize_plain(&processed))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Short-fact queries are compressed to the first clause, capped at 20
/// words.
fn compress_query(query: &str) -> String {
    let first = split_sentences(query)
        .into_iter()
        .next()
        .unwrap_or_else(|| query.trim().to_string());
    let words: Vec<&str> = first.split_whitespace().collect();
    if words.len() > QUERY_WORD_LIMIT {
        words[..QUERY_WORD_LIMIT].join(" ")
    } else {
        first
    }
}

fn query_intent_hint(query_type: QueryType) -> &'static str {
    match query_type {
        QueryType::TargetShort => "간단한 사실 확인 질문",
        QueryType::TargetLong => "구체적인 수치를 묻는 질문",
        QueryType::Reasoning => "원인과 근거를 묻는 질문",
        QueryType::GlobalExplanation => "문서 전체의 핵심을 묻는 질문",
        QueryType::Explanation => "주요 내용에 대한 설명을 요구하는 질문",
        QueryType::Summary => "요약을 요구하는 질문",
        QueryType::Factual => "사실 관계를 확인하는 질문",
        QueryType::General => "일반적인 이해를 확인하는 질문",
    }
}

fn length_constraint(query_type: QueryType) -> &'static str {
    match query_type {
        QueryType::TargetShort => "한 문장으로 답하세요",
        QueryType::TargetLong => "네 문장 이내로 답하세요",
        QueryType::Reasoning => "다섯 문장 이내로 답하세요",
        QueryType::GlobalExplanation => "700자 이내 한 단락으로 설명하세요",
        QueryType::Explanation => "600자 이내로 설명하세요",
        QueryType::Summary => "세 문장 이내로 요약하세요",
        QueryType::Factual => "두 문장 이내로 답하세요",
        QueryType::General => "500자 이내로 답하세요",
    }
}

fn build_answer_prompt(ctx: &WorkflowContext, query: &str, rules_text: &str) -> String {
    let mut prompt = format!(
        "다음 규칙을 지켜 문서를 근거로 질문에 답하세요.\n\n규칙:\n{}\n\n문서:\n{}\n\n질문: {}\n\n답변 형식: {}",
        rules_text,
        truncate_chars(&ctx.ocr_text, OCR_PROMPT_LIMIT),
        query,
        length_constraint(ctx.query_type)
    );
    if let Some(reference) = non_empty(&ctx.global_explanation_ref) {
        prompt.push_str(&format!(
            "\n\n이미 제공된 설명과 중복되는 내용은 제외하세요:\n{}",
            truncate_chars(reference, REF_QUOTE_LIMIT)
        ));
    }
    if let Some(edit_request) = non_empty(&ctx.edit_request) {
        prompt.push_str(&format!("\n\n추가 지침: {}", edit_request));
    }
    prompt
}
