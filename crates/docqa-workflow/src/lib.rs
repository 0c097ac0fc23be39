//! Docqa Workflow — classification, execution and LATS quality scoring.
//!
//! `detect_workflow` maps request-field presence to one of seven
//! workflows; `WorkspaceExecutor` runs the chosen workflow against the
//! injected LLM and optional rule graph.

pub mod classify;
pub mod executor;
pub mod quality;

pub use classify::detect_workflow;
pub use executor::WorkspaceExecutor;
pub use quality::{
    evaluate_answer_quality, generate_lats_answer, CandidateScore, LatsOutcome,
    LATS_STRATEGIES, QUALITY_THRESHOLD,
};
