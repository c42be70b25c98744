use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;

use super::{Candidate, ChunkRecord, HybridQuery, StoreError, VectorStore};
use crate::config::WeaviateConfig;

/// Weaviate cloud cluster accessed over REST and GraphQL
pub struct WeaviateStore {
    client: Client,
    base_url: String,
    api_key: String,
    collection: String,
    query_timeout: Duration,
    insert_timeout: Duration,
}

impl WeaviateStore {
    /// Open the connection and wait for the cluster to report ready
    pub async fn connect(
        config: &WeaviateConfig,
        url: &str,
        api_key: &str,
    ) -> Result<Self, StoreError> {
        let init_timeout = Duration::from_secs(config.init_timeout_secs);

        let client = Client::builder()
            .connect_timeout(init_timeout)
            .build()?;

        let store = Self {
            client,
            base_url: normalize_url(url),
            api_key: api_key.to_string(),
            collection: config.collection.clone(),
            query_timeout: Duration::from_secs(config.query_timeout_secs),
            insert_timeout: Duration::from_secs(config.insert_timeout_secs),
        };

        let response = store
            .request(Method::GET, "/v1/.well-known/ready")
            .timeout(init_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::NotReady(format!(
                "{} returned {}",
                store.base_url,
                response.status()
            )));
        }

        tracing::info!("Connected to Weaviate at {}", store.base_url);
        Ok(store)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
    }
}

async fn check_status(response: Response) -> Result<Response, StoreError> {
    match response.status() {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(StoreError::AuthFailed),
        status if !status.is_success() => Err(StoreError::Server {
            status: status.as_u16(),
            message: response.text().await.unwrap_or_default(),
        }),
        _ => Ok(response),
    }
}

#[async_trait]
impl VectorStore for WeaviateStore {
    fn collection(&self) -> &str {
        &self.collection
    }

    async fn collection_exists(&self) -> Result<bool, StoreError> {
        let response = self
            .request(Method::GET, &format!("/v1/schema/{}", self.collection))
            .timeout(self.query_timeout)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        check_status(response).await?;
        Ok(true)
    }

    async fn create_collection(&self) -> Result<(), StoreError> {
        let response = self
            .request(Method::POST, "/v1/schema")
            .timeout(self.query_timeout)
            .json(&class_definition(&self.collection))
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }

    async fn delete_collection(&self) -> Result<(), StoreError> {
        let response = self
            .request(Method::DELETE, &format!("/v1/schema/{}", self.collection))
            .timeout(self.query_timeout)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }

    async fn insert_batch(&self, records: &[ChunkRecord]) -> Result<usize, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }

        let response = self
            .request(Method::POST, "/v1/batch/objects")
            .timeout(self.insert_timeout)
            .json(&batch_body(&self.collection, records))
            .send()
            .await?;

        let body: Value = check_status(response).await?.json().await?;

        let messages = batch_errors(&body);
        if !messages.is_empty() {
            return Err(StoreError::Insert {
                failed: messages.len(),
                messages,
            });
        }

        Ok(records.len())
    }

    async fn hybrid_query(&self, query: &HybridQuery<'_>) -> Result<Vec<Candidate>, StoreError> {
        let graphql = hybrid_graphql(&self.collection, query)?;

        let response = self
            .request(Method::POST, "/v1/graphql")
            .timeout(self.query_timeout)
            .json(&json!({ "query": graphql }))
            .send()
            .await?;

        let body: Value = check_status(response).await?.json().await?;
        parse_hybrid_response(&self.collection, &body)
    }
}

/// Cloud consoles hand out bare host names; default those to https
fn normalize_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

fn class_definition(collection: &str) -> Value {
    json!({
        "class": collection,
        "vectorizer": "none",
        "vectorIndexType": "hnsw",
        "vectorIndexConfig": { "distance": "cosine" },
        "properties": [
            { "name": "text", "dataType": ["text"] },
            { "name": "page", "dataType": ["int"] }
        ]
    })
}

fn batch_body(collection: &str, records: &[ChunkRecord]) -> Value {
    let objects: Vec<Value> = records
        .iter()
        .map(|r| {
            json!({
                "class": collection,
                "properties": { "text": r.text, "page": r.page },
                "vector": r.vector,
            })
        })
        .collect();

    json!({ "objects": objects })
}

/// Per-object error messages from a batch reply
fn batch_errors(body: &Value) -> Vec<String> {
    let Some(objects) = body.as_array() else {
        return Vec::new();
    };

    objects
        .iter()
        .filter_map(|o| o.pointer("/result/errors/error"))
        .filter_map(Value::as_array)
        .flatten()
        .map(|e| {
            e.get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string()
        })
        .collect()
}

fn hybrid_graphql(collection: &str, query: &HybridQuery<'_>) -> Result<String, StoreError> {
    // JSON string escaping is valid GraphQL string syntax
    let text = serde_json::to_string(query.text).map_err(|e| StoreError::Query(e.to_string()))?;
    let vector =
        serde_json::to_string(query.vector).map_err(|e| StoreError::Query(e.to_string()))?;

    Ok(format!(
        "{{ Get {{ {collection}(hybrid: {{query: {text}, vector: {vector}, alpha: {alpha}}}, limit: {limit}) \
         {{ text page _additional {{ distance score }} }} }} }}",
        collection = collection,
        text = text,
        vector = vector,
        alpha = query.alpha,
        limit = query.limit,
    ))
}

fn parse_hybrid_response(collection: &str, body: &Value) -> Result<Vec<Candidate>, StoreError> {
    if let Some(errors) = body.get("errors").and_then(Value::as_array) {
        if !errors.is_empty() {
            let messages: Vec<&str> = errors
                .iter()
                .filter_map(|e| e.get("message").and_then(Value::as_str))
                .collect();
            return Err(StoreError::Query(messages.join("; ")));
        }
    }

    let hits = match body.pointer(&format!("/data/Get/{}", collection)) {
        Some(Value::Array(hits)) => hits,
        Some(Value::Null) | None => return Ok(Vec::new()),
        Some(other) => return Err(StoreError::Decode(format!("expected array, got {}", other))),
    };

    hits.iter()
        .map(|hit| -> Result<Candidate, StoreError> {
            let text = hit
                .get("text")
                .and_then(Value::as_str)
                .ok_or_else(|| StoreError::Decode("hit without text".to_string()))?;

            Ok(Candidate {
                text: text.to_string(),
                page: hit.get("page").and_then(Value::as_i64),
                distance: hit.pointer("/_additional/distance").and_then(as_f32),
                score: hit.pointer("/_additional/score").and_then(as_f32),
            })
        })
        .collect()
}

/// Weaviate reports hybrid scores as strings
fn as_f32(value: &Value) -> Option<f32> {
    match value {
        Value::Number(n) => n.as_f64().map(|f| f as f32),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("abc.weaviate.cloud"), "https://abc.weaviate.cloud");
        assert_eq!(normalize_url("http://localhost:8080/"), "http://localhost:8080");
    }

    #[test]
    fn test_class_definition_uses_external_vectors() {
        let def = class_definition("PDFDocument");
        assert_eq!(def["vectorizer"], "none");
        assert_eq!(def["vectorIndexConfig"]["distance"], "cosine");
        assert_eq!(def["properties"][1]["dataType"][0], "int");
    }

    #[test]
    fn test_hybrid_graphql_escapes_query() {
        let vector = [0.5f32, -1.0];
        let query = HybridQuery {
            text: "what is \"sick leave\"?\nplease",
            vector: &vector,
            alpha: 0.3,
            limit: 12,
        };

        let gql = hybrid_graphql("PDFDocument", &query).unwrap();
        assert!(gql.contains(r#"query: "what is \"sick leave\"?\nplease""#));
        assert!(gql.contains("vector: [0.5,-1.0]"));
        assert!(gql.contains("alpha: 0.3"));
        assert!(gql.contains("limit: 12"));
        assert!(gql.contains("_additional { distance score }"));
    }

    #[test]
    fn test_parse_hybrid_response() {
        let body = json!({
            "data": { "Get": { "PDFDocument": [
                { "text": "Annual leave is 25 days.", "page": 3,
                  "_additional": { "distance": null, "score": "0.82" } },
                { "text": "Sick leave policy.", "page": 7,
                  "_additional": { "distance": 0.12, "score": "0.4" } }
            ]}}
        });

        let hits = parse_hybrid_response("PDFDocument", &body).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].page, Some(3));
        assert_eq!(hits[0].distance, None);
        assert_eq!(hits[0].score, Some(0.82));
        assert_eq!(hits[1].distance, Some(0.12));
    }

    #[test]
    fn test_parse_empty_and_null_results() {
        let empty = json!({ "data": { "Get": { "PDFDocument": [] } } });
        assert!(parse_hybrid_response("PDFDocument", &empty).unwrap().is_empty());

        let null = json!({ "data": { "Get": { "PDFDocument": null } } });
        assert!(parse_hybrid_response("PDFDocument", &null).unwrap().is_empty());
    }

    #[test]
    fn test_parse_graphql_errors() {
        let body = json!({ "errors": [ { "message": "class not found" } ] });
        let err = parse_hybrid_response("PDFDocument", &body).unwrap_err();
        assert!(matches!(err, StoreError::Query(m) if m.contains("class not found")));
    }

    #[test]
    fn test_batch_errors_collected() {
        let ok = json!([{ "result": {} }, { "result": {} }]);
        assert!(batch_errors(&ok).is_empty());

        let failed = json!([
            { "result": {} },
            { "result": { "errors": { "error": [ { "message": "vector lengths don't match" } ] } } }
        ]);
        assert_eq!(batch_errors(&failed), vec!["vector lengths don't match"]);
    }

    #[test]
    fn test_batch_body_shape() {
        let records = vec![ChunkRecord {
            text: "hello".to_string(),
            page: 4,
            vector: vec![1.0, 0.0],
        }];
        let body = batch_body("PDFDocument", &records);
        assert_eq!(body["objects"][0]["class"], "PDFDocument");
        assert_eq!(body["objects"][0]["properties"]["page"], 4);
        assert_eq!(body["objects"][0]["vector"][0], 1.0);
    }
}
