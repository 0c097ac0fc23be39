//! Inspector review log.
//!
//! Every completed workspace request is appended to a JSONL file, one
//! file per UTC day, so human inspectors can audit before/after pairs.
//! Logging is best-effort: a write failure is logged and never fails
//! the request.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Serialize)]
pub struct ReviewEntry<'a> {
    pub timestamp: String,
    pub mode: &'a str,
    pub question: &'a str,
    pub answer_before: &'a str,
    pub answer_after: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_request_used: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inspector_comment: Option<&'a str>,
}

pub struct ReviewLog {
    dir: PathBuf,
}

impl ReviewLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Append one entry to today's file (`review-YYYY-MM-DD.jsonl`).
    pub fn append(&self, entry: &ReviewEntry<'_>) {
        let file = self
            .dir
            .join(format!("review-{}.jsonl", Utc::now().format("%Y-%m-%d")));

        let line = match serde_json::to_string(entry) {
            Ok(line) => line,
            Err(e) => {
                warn!("Review entry serialization failed: {}", e);
                return;
            }
        };

        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file)
            .and_then(|mut f| writeln!(f, "{}", line));

        if let Err(e) = result {
            warn!("Review log write failed: {}", e);
        }
    }
}
