//! HTTP client for the OpenSearch-compatible search engine
//!
//! The engine owns indexing, ranking, and k-NN retrieval; this client only
//! speaks its public request/response contract: `_search/template` for
//! keyword search, `_search` with a `knn` query for embedding search, and
//! `_bulk` for loading documents.

use crate::config::EngineConfig;
use crate::error::{AbrError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

/// Client for one engine endpoint
pub struct EngineClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

/// One search hit as returned by the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hit {
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub source: HitSource,
}

/// The indexed document fields this tool renders
///
/// Unknown fields are tolerated so schema additions on the engine side do not
/// break the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HitSource {
    pub company_name: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
}

impl Hit {
    pub fn company_name(&self) -> &str {
        self.source.company_name.as_deref().unwrap_or("N/A")
    }

    pub fn state(&self) -> &str {
        self.source.state.as_deref().unwrap_or("N/A")
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct BulkResponse {
    errors: bool,
    #[serde(default)]
    items: Vec<Value>,
}

/// Outcome of one `_bulk` request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkSummary {
    pub indexed: usize,
    pub failed: usize,
}

impl EngineClient {
    /// Build a client from engine configuration and the resolved password
    pub fn new(config: &EngineConfig, password: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.insecure)
            .build()?;

        Ok(Self {
            http,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password,
        })
    }

    /// Keyword search through a registered search template
    ///
    /// `POST /{index}/_search/template` with `{"id": …, "params": {…}}`.
    pub async fn search_template(
        &self,
        index: &str,
        template_id: &str,
        params: Value,
    ) -> Result<Vec<Hit>> {
        let url = format!("{}/{}/_search/template", self.base_url, index);
        let body = json!({
            "id": template_id,
            "params": params,
        });

        tracing::debug!("Keyword search via template {} on {}", template_id, index);
        let response = self
            .http
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&body)
            .send()
            .await?;

        Self::parse_hits(response).await
    }

    /// Embedding search: k nearest neighbours over a vector field
    ///
    /// `POST /{index}/_search` with a `knn` query clause.
    pub async fn knn_search(
        &self,
        index: &str,
        field: &str,
        vector: &[f32],
        k: usize,
    ) -> Result<Vec<Hit>> {
        let url = format!("{}/{}/_search", self.base_url, index);
        let body = json!({
            "size": k,
            "query": {
                "knn": {
                    field: {
                        "vector": vector,
                        "k": k,
                    }
                }
            }
        });

        tracing::debug!("k-NN search (k={}) over field {} on {}", k, field, index);
        let response = self
            .http
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&body)
            .send()
            .await?;

        Self::parse_hits(response).await
    }

    /// Load a batch of documents via the bulk API
    pub async fn bulk_index(&self, index: &str, docs: &[Value]) -> Result<BulkSummary> {
        if docs.is_empty() {
            return Ok(BulkSummary {
                indexed: 0,
                failed: 0,
            });
        }

        let url = format!("{}/_bulk", self.base_url);
        let body = bulk_body(index, docs)?;

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header("content-type", "application/x-ndjson")
            .body(body)
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let bulk: BulkResponse = response.json().await?;

        let failed = if bulk.errors {
            bulk.items
                .iter()
                .filter(|item| {
                    item.get("index")
                        .and_then(|i| i.get("error"))
                        .is_some()
                })
                .count()
        } else {
            0
        };

        Ok(BulkSummary {
            indexed: docs.len() - failed,
            failed,
        })
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(AbrError::EngineResponse {
            status: status.as_u16(),
            body,
        })
    }

    async fn parse_hits(response: reqwest::Response) -> Result<Vec<Hit>> {
        let response = Self::check_status(response).await?;
        let parsed: SearchResponse = response.json().await?;
        Ok(parsed.hits.hits)
    }
}

/// Serialize documents into the NDJSON bulk body
fn bulk_body(index: &str, docs: &[Value]) -> Result<String> {
    let mut body = String::new();
    let action = json!({ "index": { "_index": index } });
    let action_line = serde_json::to_string(&action).map_err(|e| AbrError::Json {
        source: e,
        context: "Failed to serialize bulk action line".to_string(),
    })?;

    for doc in docs {
        body.push_str(&action_line);
        body.push('\n');
        let doc_line = serde_json::to_string(doc).map_err(|e| AbrError::Json {
            source: e,
            context: "Failed to serialize bulk document".to_string(),
        })?;
        body.push_str(&doc_line);
        body.push('\n');
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bulk_body_alternates_action_and_document() {
        let docs = vec![
            json!({"company_name": "ACME", "state": "NSW"}),
            json!({"company_name": "BETA", "state": "VIC"}),
        ];
        let body = bulk_body("abn", &docs).unwrap();
        let lines: Vec<&str> = body.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], r#"{"index":{"_index":"abn"}}"#);
        assert!(lines[1].contains("ACME"));
        assert_eq!(lines[2], r#"{"index":{"_index":"abn"}}"#);
        assert!(lines[3].contains("BETA"));
        assert!(body.ends_with('\n'));
    }

    #[test]
    fn hit_accessors_default_to_na() {
        let hit: Hit = serde_json::from_value(json!({"_score": 1.5, "_source": {}})).unwrap();
        assert_eq!(hit.company_name(), "N/A");
        assert_eq!(hit.state(), "N/A");
        assert_eq!(hit.score, Some(1.5));
    }

    #[test]
    fn hit_parses_source_fields() {
        let hit: Hit = serde_json::from_value(json!({
            "_score": 2.0,
            "_source": {"company_name": "ACME PTY LTD", "state": "NSW", "postcode": "2000"}
        }))
        .unwrap();
        assert_eq!(hit.company_name(), "ACME PTY LTD");
        assert_eq!(hit.state(), "NSW");
        assert_eq!(hit.source.postcode.as_deref(), Some("2000"));
    }
}
