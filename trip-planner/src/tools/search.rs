// Web search tool: query coercion at the model boundary plus an Exa-compatible search client

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::llm::ToolDefinition;
use crate::metrics;

pub const SEARCH_TOOL_NAME: &str = "search_web";
pub const MAX_SEARCH_RESULTS: usize = 10;

const SNIPPET_MAX_CHARS: u32 = 1500;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Query must be a string, got {kind}: {value}")]
    InvalidQueryType { kind: &'static str, value: String },
    #[error("search http error: {0}")]
    Http(String),
    #[error("search response error: {0}")]
    Response(String),
}

/// Query as handed over by the model: a plain string or a structured object.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryInput {
    Text(String),
    Structured(Map<String, Value>),
}

impl TryFrom<Value> for QueryInput {
    type Error = SearchError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(text) => Ok(QueryInput::Text(text)),
            Value::Object(map) => Ok(QueryInput::Structured(map)),
            other => Err(invalid_query(&other)),
        }
    }
}

impl QueryInput {
    /// Picks the query out of a tool call's arguments. `{"query": ...}` is the
    /// declared shape; anything else is treated as the query itself.
    pub fn from_arguments(arguments: &Value) -> Result<Self, SearchError> {
        match arguments.get("query") {
            Some(inner) if !inner.is_null() => QueryInput::try_from(inner.clone()),
            _ => QueryInput::try_from(arguments.clone()),
        }
    }

    /// Reduces the input to a query string. Structured inputs yield their
    /// `description`, then their `query`, then their JSON form.
    pub fn into_query(self) -> Result<String, SearchError> {
        match self {
            QueryInput::Text(text) => Ok(text),
            QueryInput::Structured(map) => {
                for key in ["description", "query"] {
                    match map.get(key) {
                        Some(value) if is_truthy(value) => {
                            return match value {
                                Value::String(text) => Ok(text.clone()),
                                other => Err(invalid_query(other)),
                            };
                        }
                        _ => continue,
                    }
                }
                Ok(Value::Object(map).to_string())
            }
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn invalid_query(value: &Value) -> SearchError {
    let kind = match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    SearchError::InvalidQueryType {
        kind,
        value: value.to_string(),
    }
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRecord {
    pub title: String,
    pub href: String,
    pub body: String,
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn text(&self, query: &str, max_results: usize) -> Result<Vec<SearchRecord>, SearchError>;
}

/// The search function exposed to agents.
#[derive(Clone)]
pub struct SearchWebTool {
    provider: Arc<dyn SearchProvider>,
    max_results: usize,
}

impl SearchWebTool {
    pub fn new(provider: Arc<dyn SearchProvider>, max_results: usize) -> Self {
        Self {
            provider,
            max_results: max_results.clamp(1, MAX_SEARCH_RESULTS),
        }
    }

    pub fn definition() -> ToolDefinition {
        ToolDefinition {
            name: SEARCH_TOOL_NAME.to_string(),
            description: "Searches the web and returns results. Accepts a string query."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "The search query"}
                },
                "required": ["query"]
            }),
        }
    }

    /// Runs one search for a tool call and returns the records as JSON text.
    pub async fn invoke(&self, arguments: &Value) -> Result<String, SearchError> {
        let query = QueryInput::from_arguments(arguments)?.into_query()?;
        info!(query = %query, max_results = self.max_results, "web search");

        let outcome = self.provider.text(&query, self.max_results).await;
        metrics::record_search(outcome.is_ok());
        let mut records = outcome?;
        records.truncate(self.max_results);
        info!(query = %query, result_count = records.len(), "web search complete");

        serde_json::to_string(&records).map_err(|e| SearchError::Response(e.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct HttpSearchConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

/// Exa-compatible search API client.
pub struct HttpSearchClient {
    client: reqwest::Client,
    config: HttpSearchConfig,
}

impl HttpSearchClient {
    pub fn new(config: HttpSearchConfig) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SearchError::Http(e.to_string()))?;
        if config.api_key.is_none() {
            warn!("no search API key configured; searches will likely be rejected");
        }
        Ok(Self { client, config })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExaSearchRequest<'a> {
    query: &'a str,
    num_results: usize,
    #[serde(rename = "type")]
    search_type: &'static str,
    contents: ExaContents,
}

#[derive(Serialize)]
struct ExaContents {
    text: ExaTextConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExaTextConfig {
    max_characters: u32,
}

#[derive(Deserialize)]
struct ExaSearchResponse {
    #[serde(default)]
    results: Vec<ExaResult>,
}

#[derive(Deserialize)]
struct ExaResult {
    #[serde(default)]
    title: Option<String>,
    url: String,
    #[serde(default)]
    text: Option<String>,
}

impl From<ExaResult> for SearchRecord {
    fn from(result: ExaResult) -> Self {
        SearchRecord {
            title: result.title.unwrap_or_default(),
            href: result.url,
            body: result.text.unwrap_or_default(),
        }
    }
}

#[async_trait]
impl SearchProvider for HttpSearchClient {
    async fn text(&self, query: &str, max_results: usize) -> Result<Vec<SearchRecord>, SearchError> {
        let request = ExaSearchRequest {
            query,
            num_results: max_results,
            search_type: "auto",
            contents: ExaContents {
                text: ExaTextConfig {
                    max_characters: SNIPPET_MAX_CHARS,
                },
            },
        };

        let mut builder = self.client.post(&self.config.endpoint).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.header("x-api-key", key);
        }
        let response = builder
            .send()
            .await
            .map_err(|e| SearchError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(SearchError::Response(format!("HTTP {}: {}", status, text)));
        }

        let parsed: ExaSearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Response(e.to_string()))?;
        Ok(parsed.results.into_iter().map(SearchRecord::from).collect())
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use std::sync::Mutex;

    use super::*;

    /// Returns `count` canned records per call and remembers each query.
    pub struct CannedSearch {
        pub count: usize,
        pub queries: Mutex<Vec<(String, usize)>>,
    }

    impl CannedSearch {
        pub fn new(count: usize) -> Self {
            Self {
                count,
                queries: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SearchProvider for CannedSearch {
        async fn text(&self, query: &str, max_results: usize) -> Result<Vec<SearchRecord>, SearchError> {
            self.queries
                .lock()
                .unwrap()
                .push((query.to_string(), max_results));
            Ok((0..self.count)
                .map(|i| SearchRecord {
                    title: format!("{} result {}", query, i),
                    href: format!("https://example.com/{}", i),
                    body: "snippet".to_string(),
                })
                .collect())
        }
    }
}
