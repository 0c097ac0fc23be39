//! Workflow classification.
//!
//! A pure, total function of the trimmed emptiness of the three
//! optional request fields. Edit intent is checked as a group before
//! the generation fallbacks, so edit_request always wins when present;
//! rewrite is the catch-all for "both exist, no instruction".

use docqa_core::WorkflowType;

fn is_set(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// Map `(query, answer, edit_request)` presence to a workflow.
/// Whitespace-only strings count as unset.
pub fn detect_workflow(
    query: Option<&str>,
    answer: Option<&str>,
    edit_request: Option<&str>,
) -> WorkflowType {
    let has_query = is_set(query);
    let has_answer = is_set(answer);
    let has_edit = is_set(edit_request);

    if !has_query && !has_answer {
        return WorkflowType::FullGeneration;
    }
    if has_edit {
        return match (has_query, has_answer) {
            (true, false) => WorkflowType::EditQuery,
            (false, true) => WorkflowType::EditAnswer,
            (true, true) => WorkflowType::EditBoth,
            (false, false) => unreachable!("handled by full_generation above"),
        };
    }
    match (has_query, has_answer) {
        (false, true) => WorkflowType::QueryGeneration,
        (true, false) => WorkflowType::AnswerGeneration,
        (true, true) => WorkflowType::Rewrite,
        (false, false) => unreachable!("handled by full_generation above"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_core::WorkflowType::*;

    #[test]
    fn test_literal_scenarios() {
        assert_eq!(detect_workflow(Some(""), Some(""), Some("")), FullGeneration);
        assert_eq!(
            detect_workflow(Some("질문"), Some("답변"), Some("더 간결하게")),
            EditBoth
        );
        assert_eq!(detect_workflow(Some("질문"), Some(""), Some("")), AnswerGeneration);
    }

    #[test]
    fn test_exhaustive_emptiness_classes() {
        // Three emptiness classes per field: missing, whitespace-only,
        // non-empty. All 27 combinations collapse onto the 8-row
        // decision table.
        let classes: [Option<&str>; 3] = [None, Some("   "), Some("값")];
        for q in classes {
            for a in classes {
                for e in classes {
                    let has_q = q == Some("값");
                    let has_a = a == Some("값");
                    let has_e = e == Some("값");

                    let expected = match (has_q, has_a, has_e) {
                        (false, false, _) => FullGeneration,
                        (true, false, true) => EditQuery,
                        (false, true, true) => EditAnswer,
                        (true, true, true) => EditBoth,
                        (false, true, false) => QueryGeneration,
                        (true, false, false) => AnswerGeneration,
                        (true, true, false) => Rewrite,
                    };
                    assert_eq!(
                        detect_workflow(q, a, e),
                        expected,
                        "q={:?} a={:?} e={:?}",
                        q,
                        a,
                        e
                    );
                }
            }
        }
    }

    #[test]
    fn test_edit_request_ignored_without_query_and_answer() {
        assert_eq!(detect_workflow(None, None, Some("수정해줘")), FullGeneration);
    }
}
