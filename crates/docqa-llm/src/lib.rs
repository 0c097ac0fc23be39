//! Docqa LLM — Gemini client and prompt helpers.

use std::future::Future;

use docqa_core::Result;

pub mod edit;
pub mod evaluate;
pub mod gemini;

pub use edit::edit_content;
pub use evaluate::{evaluate_answers, Evaluation};
pub use gemini::GeminiClient;

/// Text-completion seam. Implemented by `GeminiClient` in production
/// and by in-crate mocks in executor tests; the executor is generic
/// over this trait (static dispatch).
pub trait TextGenerator: Send + Sync {
    fn generate(
        &self,
        prompt: &str,
        role: Option<&str>,
        temperature: f64,
    ) -> impl Future<Output = Result<String>> + Send;
}
