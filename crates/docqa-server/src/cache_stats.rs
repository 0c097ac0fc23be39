//! Cache and token usage accounting.
//!
//! Clients report per-call usage records; the server appends them to a
//! single JSONL file and summarizes on demand. Malformed lines are
//! skipped so one bad write never poisons the summary.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// One reported LLM call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    pub timestamp: String,
    /// "hit" or "miss".
    pub cache_status: String,
    pub token_usage: TokenUsage,
    pub cost_usd: f64,
}

#[derive(Debug, Default, Serialize)]
pub struct UsageSummary {
    pub total_requests: u64,
    pub cache_hits: u64,
    pub cache_hit_rate: f64,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_cost_usd: f64,
}

pub struct CacheStats {
    file: PathBuf,
}

impl CacheStats {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }

    pub fn record(&self, record: &UsageRecord) -> std::io::Result<()> {
        let line = serde_json::to_string(record)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file)?;
        writeln!(file, "{}", line)
    }

    /// Aggregate the whole log. A missing file is an empty summary.
    pub fn summarize(&self) -> UsageSummary {
        let content = std::fs::read_to_string(&self.file).unwrap_or_default();
        let mut summary = UsageSummary::default();

        for line in content.lines() {
            let record: UsageRecord = match serde_json::from_str(line) {
                Ok(record) => record,
                Err(_) => continue,
            };
            summary.total_requests += 1;
            if record.cache_status == "hit" {
                summary.cache_hits += 1;
            }
            summary.total_input_tokens += record.token_usage.input_tokens;
            summary.total_output_tokens += record.token_usage.output_tokens;
            summary.total_cost_usd += record.cost_usd;
        }

        if summary.total_requests > 0 {
            summary.cache_hit_rate = summary.cache_hits as f64 / summary.total_requests as f64;
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(cache_status: &str, input: u64, output: u64, cost: f64) -> UsageRecord {
        UsageRecord {
            timestamp: "2025-01-01T00:00:00Z".into(),
            cache_status: cache_status.into(),
            token_usage: TokenUsage {
                input_tokens: input,
                output_tokens: output,
            },
            cost_usd: cost,
        }
    }

    #[test]
    fn test_summarize_aggregates() {
        let dir = tempfile::tempdir().unwrap();
        let stats = CacheStats::new(dir.path().join("cache-stats.jsonl"));

        stats.record(&record("hit", 100, 50, 0.001)).unwrap();
        stats.record(&record("miss", 200, 80, 0.002)).unwrap();

        let summary = stats.summarize();
        assert_eq!(summary.total_requests, 2);
        assert_eq!(summary.cache_hits, 1);
        assert!((summary.cache_hit_rate - 0.5).abs() < 1e-9);
        assert_eq!(summary.total_input_tokens, 300);
        assert_eq!(summary.total_output_tokens, 130);
        assert!((summary.total_cost_usd - 0.003).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache-stats.jsonl");
        let stats = CacheStats::new(&path);

        stats.record(&record("hit", 10, 5, 0.0)).unwrap();
        std::fs::write(
            &path,
            format!("{}\nnot json at all\n", std::fs::read_to_string(&path).unwrap().trim()),
        )
        .unwrap();

        let summary = stats.summarize();
        assert_eq!(summary.total_requests, 1);
    }

    #[test]
    fn test_missing_file_is_empty_summary() {
        let dir = tempfile::tempdir().unwrap();
        let stats = CacheStats::new(dir.path().join("never-written.jsonl"));
        let summary = stats.summarize();
        assert_eq!(summary.total_requests, 0);
        assert_eq!(summary.cache_hit_rate, 0.0);
    }
}
