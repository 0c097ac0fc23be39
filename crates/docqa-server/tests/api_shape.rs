//! API shape tests — validates that response envelopes match what the
//! review-workspace frontend expects.
//!
//! Handlers are thin JSON assembly over the workflow crate, so these
//! tests pin the serialized field names and types without a running
//! server.

use docqa_core::{QueryType, WorkflowResult, WorkflowType};

/// The success envelope: { success, data, metadata, errors }.
#[test]
fn test_success_envelope_shape() {
    let result = WorkflowResult {
        workflow: WorkflowType::FullGeneration,
        query: "매출 추이는 어떠한가?".into(),
        answer: "매출은 100억원으로 증가했습니다.".into(),
        changes: vec!["질의 생성".into(), "답변 생성".into(), "후처리 적용".into()],
        query_type: QueryType::Explanation,
    };

    let envelope = serde_json::json!({
        "success": true,
        "data": result,
        "metadata": {
            "request_id": "3e9c2b10-0000-0000-0000-000000000000",
            "workflow": "full_generation",
            "query_type": "explanation",
            "timestamp": "2025-01-01T00:00:00Z",
        },
        "errors": [],
    });

    assert_eq!(envelope["success"], true);
    assert!(envelope["errors"].as_array().unwrap().is_empty());

    let data = &envelope["data"];
    assert_eq!(data["workflow"], "full_generation");
    assert_eq!(data["query_type"], "explanation");
    assert!(data["query"].is_string());
    assert!(data["answer"].is_string());
    assert_eq!(data["changes"].as_array().unwrap().len(), 3);

    assert!(envelope["metadata"]["request_id"].is_string());
    assert!(envelope["metadata"]["timestamp"].is_string());
}

/// Every workflow serializes to its snake_case wire name.
#[test]
fn test_workflow_wire_names() {
    for (workflow, expected) in [
        (WorkflowType::FullGeneration, "full_generation"),
        (WorkflowType::EditQuery, "edit_query"),
        (WorkflowType::EditAnswer, "edit_answer"),
        (WorkflowType::EditBoth, "edit_both"),
        (WorkflowType::QueryGeneration, "query_generation"),
        (WorkflowType::AnswerGeneration, "answer_generation"),
        (WorkflowType::Rewrite, "rewrite"),
    ] {
        let value = serde_json::to_value(workflow).unwrap();
        assert_eq!(value, expected);
        assert_eq!(workflow.as_str(), expected);
    }
}

/// The error envelope: success=false, null data, non-empty errors.
#[test]
fn test_error_envelope_shape() {
    let envelope = serde_json::json!({
        "success": false,
        "data": null,
        "metadata": {
            "request_id": "3e9c2b10-0000-0000-0000-000000000000",
            "timestamp": "2025-01-01T00:00:00Z",
        },
        "errors": ["ocr_text가 비어 있습니다"],
    });

    assert_eq!(envelope["success"], false);
    assert!(envelope["data"].is_null());
    assert_eq!(envelope["errors"].as_array().unwrap().len(), 1);
    assert!(envelope["errors"][0].as_str().unwrap().contains("ocr_text"));
}

/// Cache summary shape: { total_requests, cache_hits, cache_hit_rate,
/// total_input_tokens, total_output_tokens, total_cost_usd }.
#[test]
fn test_cache_summary_shape() {
    let summary = serde_json::json!({
        "total_requests": 12,
        "cache_hits": 9,
        "cache_hit_rate": 0.75,
        "total_input_tokens": 3400,
        "total_output_tokens": 1200,
        "total_cost_usd": 0.0123,
    });

    assert!(summary["total_requests"].is_number());
    assert!(summary["cache_hit_rate"].is_number());
    assert!(summary["total_cost_usd"].is_number());
}
