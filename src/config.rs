use std::time::Duration;

use serde::Deserialize;

/// Server-side settings for the CMS backends.
///
/// Loaded from defaults, then an optional `editorial.toml`, then
/// `EDITORIAL_*` environment variables (e.g. `EDITORIAL_SEARCH_URL`).
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// GraphQL endpoint of the content API.
    pub content_api_url: String,
    /// Search endpoint of the CMS search service.
    pub search_url: String,
    /// Site name sent as `crafterSite`.
    pub site_name: String,
    /// Timeout applied to every outgoing request, in seconds.
    pub request_timeout_secs: u64,
    /// Where contact-form messages are forwarded. Contact is disabled when unset.
    #[serde(default)]
    pub contact_webhook_url: Option<String>,
}

impl SiteConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(feature = "ssr")]
impl SiteConfig {
    /// Load configuration, reading `editorial.toml` from the working directory if present.
    pub fn load() -> Result<Self, crate::error::AppError> {
        Self::load_from("editorial")
    }

    /// Load configuration with an explicit file stem (without extension).
    pub fn load_from(file_stem: &str) -> Result<Self, crate::error::AppError> {
        use crate::error::AppError;

        let settings = config::Config::builder()
            .set_default("content_api_url", "http://localhost:8080/api/1/site/graphql")
            .and_then(|b| b.set_default("search_url", "http://localhost:8080/api/1/site/elasticsearch/search"))
            .and_then(|b| b.set_default("site_name", "editorial"))
            .and_then(|b| b.set_default("request_timeout_secs", 10))
            .map_err(|e| AppError::Config(e.to_string()))?
            .add_source(config::File::with_name(file_stem).required(false))
            .add_source(config::Environment::with_prefix("EDITORIAL"))
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;

        let config: SiteConfig = settings
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))?;

        if config.request_timeout_secs == 0 {
            return Err(AppError::Config("request_timeout_secs must be positive".into()));
        }

        Ok(config)
    }
}
