//! Dual search integration: fake embedding provider + mock engine

use abr_search::config::{EngineConfig, SearchConfig};
use abr_search::embedding::{EmbeddingError, EmbeddingProvider};
use abr_search::engine::EngineClient;
use abr_search::error::AbrError;
use abr_search::search::{render_hits, DualSearcher};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Deterministic provider so tests never download a model
struct FakeProvider;

impl EmbeddingProvider for FakeProvider {
    fn embed_query(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(vec![0.0, 1.0, 0.5])
    }

    fn embed_passages(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|_| vec![0.0, 1.0, 0.5]).collect())
    }

    fn dimension(&self) -> usize {
        3
    }

    fn model_name(&self) -> &str {
        "fake"
    }
}

fn search_config() -> SearchConfig {
    SearchConfig {
        k: 10,
        template_id: "company_keyword_search_template".to_string(),
        vector_field: "company_embeddings".to_string(),
    }
}

fn client_for(server: &MockServer) -> EngineClient {
    let config = EngineConfig {
        endpoint: server.uri(),
        index: "abn".to_string(),
        username: "admin".to_string(),
        password_env: "ABR_ENGINE_PASSWORD".to_string(),
        insecure: false,
        timeout_secs: 5,
    };
    EngineClient::new(&config, "secret".to_string()).unwrap()
}

fn hits_response(hits: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "hits": {"hits": hits}
    }))
}

#[tokio::test]
async fn both_modes_run_over_one_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/abn/_search/template"))
        .and(body_partial_json(json!({"params": {"company_name": "acme"}})))
        .respond_with(hits_response(json!([{
            "_score": 3.1,
            "_source": {"company_name": "ACME PTY LTD", "state": "NSW"}
        }])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/abn/_search"))
        .and(body_partial_json(
            json!({"query": {"knn": {"company_embeddings": {"vector": [0.0, 1.0, 0.5], "k": 10}}}}),
        ))
        .respond_with(hits_response(json!([{
            "_score": 0.87,
            "_source": {"company_name": "ACME PLUMBING", "state": "QLD"}
        }])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let searcher = DualSearcher::new(client_for(&mock_server), "abn", search_config())
        .with_provider(Arc::new(FakeProvider));

    let results = searcher.both("acme").await.unwrap();

    assert_eq!(results.keyword.len(), 1);
    assert_eq!(results.keyword[0].company_name(), "ACME PTY LTD");
    assert_eq!(results.embedding.len(), 1);
    assert_eq!(results.embedding[0].company_name(), "ACME PLUMBING");
}

#[tokio::test]
async fn empty_keyword_results_render_no_results_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/abn/_search/template"))
        .respond_with(hits_response(json!([])))
        .mount(&mock_server)
        .await;

    let searcher = DualSearcher::new(client_for(&mock_server), "abn", search_config());
    let hits = searcher.keyword("nonexistent company").await.unwrap();

    assert!(hits.is_empty());
    assert_eq!(render_hits(&hits), "No results found\n");
}

#[tokio::test]
async fn empty_query_is_rejected() {
    let mock_server = MockServer::start().await;
    let searcher = DualSearcher::new(client_for(&mock_server), "abn", search_config());

    let err = searcher.keyword("   ").await.unwrap_err();
    assert!(matches!(err, AbrError::InvalidQuery(_)));
}

#[tokio::test]
async fn embedding_search_without_provider_is_an_error() {
    let mock_server = MockServer::start().await;
    let searcher = DualSearcher::new(client_for(&mock_server), "abn", search_config());

    let err = searcher.embedding("acme").await.unwrap_err();
    assert!(matches!(err, AbrError::Config(_)));
}

#[tokio::test]
async fn k_override_reaches_the_engine() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/abn/_search"))
        .and(body_partial_json(json!({"size": 3})))
        .respond_with(hits_response(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = search_config();
    config.k = 3;
    let searcher = DualSearcher::new(client_for(&mock_server), "abn", config)
        .with_provider(Arc::new(FakeProvider));

    let hits = searcher.embedding("acme").await.unwrap();
    assert!(hits.is_empty());
}
