use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::models::listing::Total;

/// One raw hit from the search index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "_source", default)]
    pub source: Value,
}

/// A search response with the hit list split from everything else.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResponse {
    pub total: Total,
    pub hits: Vec<SearchHit>,
    /// Every other response field, passed through unchanged.
    pub extra: Map<String, Value>,
}

impl SearchResponse {
    /// Normalize a response body.
    ///
    /// Accepts the native index shape `{"hits": {"total": .., "hits": [..]}, ..}`
    /// and the flat shape `{"total": .., "hits": [..], ..}`.
    pub fn from_body(body: Value) -> Result<Self, AppError> {
        let Value::Object(mut fields) = body else {
            return Err(AppError::Search("search response is not an object".into()));
        };

        let (total, hits) = match fields.remove("hits") {
            Some(Value::Object(mut envelope)) => {
                let total = envelope.remove("total").unwrap_or(Value::Null);
                let hits = envelope.remove("hits").unwrap_or(Value::Null);
                for (key, value) in envelope {
                    fields.insert(key, value);
                }
                (total, hits)
            }
            Some(hits) => (fields.remove("total").unwrap_or(Value::Null), hits),
            None => (fields.remove("total").unwrap_or(Value::Null), Value::Null),
        };

        let total = if total.is_null() {
            Total::default()
        } else {
            serde_json::from_value(total)?
        };
        let hits = if hits.is_null() {
            vec![]
        } else {
            serde_json::from_value(hits)?
        };

        Ok(Self {
            total,
            hits,
            extra: fields,
        })
    }
}

/// Trait for the CMS search service, enabling mock testing.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Run a structured query against the index.
    async fn search(&self, query: &Value) -> Result<SearchResponse, AppError>;
}

/// HTTP implementation of the SearchClient.
#[cfg(feature = "ssr")]
pub struct CrafterSearchClient {
    http: reqwest::Client,
    endpoint: url::Url,
}

#[cfg(feature = "ssr")]
impl CrafterSearchClient {
    /// Create a client for the search endpoint of `site`.
    pub fn new(endpoint: &str, site: &str, timeout: std::time::Duration) -> Result<Self, AppError> {
        let mut endpoint = url::Url::parse(endpoint)
            .map_err(|e| AppError::Config(format!("Invalid search URL '{endpoint}': {e}")))?;
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
impl SearchClient for CrafterSearchClient {
    async fn search(&self, query: &Value) -> Result<SearchResponse, AppError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Search(format!("search returned {status}")));
        }

        let body: Value = response.json().await?;
        SearchResponse::from_body(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_native_shape() {
        let body = json!({
            "took": 3,
            "hits": {
                "total": { "value": 2, "relation": "eq" },
                "max_score": 1.5,
                "hits": [ { "_id": "a", "_source": { "objectId": "a" } } ]
            }
        });

        let response = SearchResponse::from_body(body).unwrap();
        assert_eq!(response.total.value(), 2);
        assert_eq!(response.hits[0].id.as_deref(), Some("a"));
        assert_eq!(response.extra["took"], 3);
        assert_eq!(response.extra["max_score"], 1.5);
    }

    #[test]
    fn test_flat_shape() {
        let body = json!({
            "total": 5,
            "hits": [ { "_source": { "objectId": "b" } } ],
            "facets": {}
        });

        let response = SearchResponse::from_body(body).unwrap();
        assert_eq!(response.total, Total::Count(5));
        assert_eq!(response.hits.len(), 1);
        assert!(response.hits[0].id.is_none());
        assert!(response.extra.contains_key("facets"));
    }

    #[test]
    fn test_missing_hits_is_empty() {
        let response = SearchResponse::from_body(json!({ "hits": null })).unwrap();
        assert!(response.hits.is_empty());
        assert_eq!(response.total.value(), 0);
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(matches!(
            SearchResponse::from_body(json!([1, 2])),
            Err(AppError::Search(_))
        ));
    }
}
