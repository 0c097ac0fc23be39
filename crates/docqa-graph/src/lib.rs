//! Docqa Graph — Neo4j rule/constraint lookup.
//!
//! The graph is an optional collaborator: every method returns a
//! `Result`, and the workflow layer degrades to `default_rules` on
//! absence or error instead of failing generation.

use std::future::Future;

use docqa_core::{QueryType, Result};

pub mod client;
pub mod rules;

pub use client::Neo4jClient;
pub use rules::default_rules;

/// A generation constraint attached to a query type in the graph.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub description: String,
}

/// A free-form writing rule.
#[derive(Debug, Clone)]
pub struct Rule {
    pub text: String,
}

/// Rule-lookup seam. Implemented by `Neo4jClient` in production and by
/// in-crate mocks in executor tests.
pub trait RuleGraph: Send + Sync {
    fn constraints_for_query_type(
        &self,
        query_type: QueryType,
    ) -> impl Future<Output = Result<Vec<Constraint>>> + Send;

    fn rules_for_query_type(
        &self,
        query_type: QueryType,
    ) -> impl Future<Output = Result<Vec<Rule>>> + Send;

    fn relevant_rules(
        &self,
        query: &str,
        k: usize,
    ) -> impl Future<Output = Result<Vec<String>>> + Send;
}
