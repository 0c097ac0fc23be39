//! Neo4j client over the HTTP transaction API.

use docqa_core::{Error, Neo4jSettings, QueryType, Result};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::{Constraint, Rule, RuleGraph};

pub struct Neo4jClient {
    client: Client,
    endpoint: String,
    database: String,
    username: String,
    password: String,
}

impl Neo4jClient {
    pub fn new(settings: &Neo4jSettings) -> Self {
        Self {
            client: Client::new(),
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            database: settings.database.clone(),
            username: settings.username.clone(),
            password: settings.password.clone(),
        }
    }

    /// Run one Cypher statement and return the result rows.
    async fn run_cypher(&self, statement: &str, parameters: Value) -> Result<Vec<Value>> {
        let url = format!("{}/db/{}/tx/commit", self.endpoint, self.database);
        let body = json!({
            "statements": [{"statement": statement, "parameters": parameters}]
        });

        debug!("Cypher: {}", statement);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Graph(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Graph(format!("transaction API returned {}", status)));
        }

        let parsed: Value = response
            .json()
            .await
            .map_err(|e| Error::Graph(format!("invalid response body: {}", e)))?;

        if let Some(errors) = parsed["errors"].as_array() {
            if !errors.is_empty() {
                return Err(Error::Graph(format!("cypher error: {}", errors[0])));
            }
        }

        let rows = parsed["results"][0]["data"]
            .as_array()
            .map(|data| {
                data.iter()
                    .filter_map(|d| d["row"].as_array())
                    .filter_map(|row| row.first().cloned())
                    .collect()
            })
            .unwrap_or_default();

        Ok(rows)
    }
}

impl RuleGraph for Neo4jClient {
    async fn constraints_for_query_type(&self, query_type: QueryType) -> Result<Vec<Constraint>> {
        let rows = self
            .run_cypher(
                "MATCH (t:QueryType {name: $name})-[:HAS_CONSTRAINT]->(c:Constraint) \
                 RETURN c.description ORDER BY c.priority",
                json!({"name": query_type.as_str()}),
            )
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|v| v.as_str().map(|s| Constraint { description: s.to_string() }))
            .collect())
    }

    async fn rules_for_query_type(&self, query_type: QueryType) -> Result<Vec<Rule>> {
        let rows = self
            .run_cypher(
                "MATCH (t:QueryType {name: $name})-[:HAS_RULE]->(r:Rule) \
                 RETURN r.text ORDER BY r.priority",
                json!({"name": query_type.as_str()}),
            )
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|v| v.as_str().map(|s| Rule { text: s.to_string() }))
            .collect())
    }

    async fn relevant_rules(&self, query: &str, k: usize) -> Result<Vec<String>> {
        let rows = self
            .run_cypher(
                "MATCH (r:Rule) WHERE any(kw IN r.keywords WHERE $query CONTAINS kw) \
                 RETURN r.text LIMIT $k",
                json!({"query": query, "k": k}),
            )
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect())
    }
}
