use async_trait::async_trait;
use serde_json::Value;

use crate::content::queries::{decode, ContentPayload, ContentQuery, ContentType};
use crate::error::AppError;

/// Trait for the CMS content API, enabling mock testing.
#[async_trait]
pub trait ContentClient: Send + Sync {
    /// Run a named query and return the `data` tree of the response.
    async fn fetch_query(&self, query: ContentQuery) -> Result<Value, AppError>;
}

/// Fetch one content type and decode it into its typed payload.
pub async fn fetch_payload(
    client: &dyn ContentClient,
    content_type: ContentType,
) -> Result<ContentPayload, AppError> {
    let data = client.fetch_query(content_type.query()).await?;
    decode(content_type, &data)
}

/// GraphQL implementation of the ContentClient.
#[cfg(feature = "ssr")]
pub struct GraphqlContentClient {
    http: reqwest::Client,
    endpoint: url::Url,
}

#[cfg(feature = "ssr")]
impl GraphqlContentClient {
    /// Create a client for the GraphQL endpoint of `site`.
    ///
    /// The `crafterSite` query parameter is added to `endpoint`.
    pub fn new(endpoint: &str, site: &str, timeout: std::time::Duration) -> Result<Self, AppError> {
        let mut endpoint = url::Url::parse(endpoint)
            .map_err(|e| AppError::Config(format!("Invalid content API URL '{endpoint}': {e}")))?;
        if !site.is_empty() {
            endpoint.query_pairs_mut().append_pair("crafterSite", site);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { http, endpoint })
    }
}

#[cfg(feature = "ssr")]
#[async_trait]
impl ContentClient for GraphqlContentClient {
    async fn fetch_query(&self, query: ContentQuery) -> Result<Value, AppError> {
        tracing::debug!(operation = query.operation_name, "content query");

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&serde_json::json!({
                "operationName": query.operation_name,
                "query": query.text,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::ContentApi(format!(
                "{} returned {status}",
                query.operation_name
            )));
        }

        let body: Value = response.json().await?;
        graphql_data(body)
    }
}

/// Split a GraphQL response into its `data`, surfacing `errors`.
pub fn graphql_data(mut body: Value) -> Result<Value, AppError> {
    if let Some(errors) = body.get("errors").and_then(Value::as_array) {
        if !errors.is_empty() {
            let messages: Vec<&str> = errors
                .iter()
                .filter_map(|e| e.get("message").and_then(Value::as_str))
                .collect();
            return Err(AppError::ContentApi(messages.join("; ")));
        }
    }

    match body.get_mut("data").map(Value::take) {
        Some(data) if !data.is_null() => Ok(data),
        _ => Err(AppError::ContentApi("response has no data".into())),
    }
}
