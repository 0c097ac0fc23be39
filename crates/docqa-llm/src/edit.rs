//! Revision prompt helper.

use docqa_core::Result;
use docqa_text::truncate_chars;

use crate::TextGenerator;

const OCR_PROMPT_LIMIT: usize = 3000;

/// Build a single revision prompt and return the rewritten text
/// verbatim. The caller applies post-processing; the edit step itself
/// is answer-agnostic text revision and works on queries too.
pub async fn edit_content<L: TextGenerator>(
    llm: &L,
    answer: &str,
    ocr_text: &str,
    query: &str,
    edit_request: &str,
    rules: Option<&str>,
) -> Result<String> {
    let mut prompt = String::from("다음 내용을 수정 요청에 맞게 다시 작성하세요.\n\n");

    if !query.trim().is_empty() {
        prompt.push_str(&format!("질문:\n{}\n\n", query.trim()));
    }
    prompt.push_str(&format!("현재 내용:\n{}\n\n", answer.trim()));
    prompt.push_str(&format!(
        "문서 근거:\n{}\n\n",
        truncate_chars(ocr_text, OCR_PROMPT_LIMIT)
    ));
    if let Some(rules) = rules {
        if !rules.trim().is_empty() {
            prompt.push_str(&format!("작성 규칙:\n{}\n\n", rules.trim()));
        }
    }
    prompt.push_str(&format!(
        "수정 요청: {}\n\n수정된 내용만 출력하세요.",
        edit_request.trim()
    ));

    llm.generate(&prompt, Some("문서 기반 교정 도우미"), 0.4).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records prompts and echoes a fixed reply.
    struct RecordingLlm {
        prompts: Mutex<Vec<String>>,
    }

    impl TextGenerator for RecordingLlm {
        async fn generate(
            &self,
            prompt: &str,
            _role: Option<&str>,
            _temperature: f64,
        ) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("수정된 내용".to_string())
        }
    }

    #[tokio::test]
    async fn test_prompt_contains_all_blocks() {
        let llm = RecordingLlm {
            prompts: Mutex::new(Vec::new()),
        };
        let out = edit_content(
            &llm,
            "기존 답변",
            "문서 텍스트",
            "질문 내용",
            "더 간결하게",
            Some("- 한 문장으로 작성"),
        )
        .await
        .unwrap();
        assert_eq!(out, "수정된 내용");

        let prompts = llm.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("기존 답변"));
        assert!(prompts[0].contains("문서 텍스트"));
        assert!(prompts[0].contains("질문 내용"));
        assert!(prompts[0].contains("더 간결하게"));
        assert!(prompts[0].contains("한 문장으로"));
    }

    #[tokio::test]
    async fn test_empty_query_block_omitted() {
        let llm = RecordingLlm {
            prompts: Mutex::new(Vec::new()),
        };
        edit_content(&llm, "답변", "문서", "", "수정", None)
            .await
            .unwrap();
        let prompts = llm.prompts.lock().unwrap();
        assert!(!prompts[0].contains("질문:"));
        assert!(!prompts[0].contains("작성 규칙:"));
    }
}
