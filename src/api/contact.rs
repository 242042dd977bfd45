use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::contact::ContactMessage;

/// Where contact-form messages are delivered.
#[async_trait]
pub trait ContactRelay: Send + Sync {
    async fn deliver(&self, message: &ContactMessage) -> Result<(), AppError>;
}

/// Forwards messages as JSON to a webhook.
#[cfg(feature = "ssr")]
pub struct WebhookContactRelay {
    http: reqwest::Client,
    url: url::Url,
}

#[cfg(feature = "ssr")]
impl WebhookContactRelay {
    pub fn new(url: &str, timeout: std::time::Duration) -> Result<Self, AppError> {
        let url = url::Url::parse(url)
            .map_err(|e| AppError::Config(format!("Invalid contact webhook URL '{url}': {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { http, url })
    }
}

#[cfg(feature = "ssr")]
#[async_trait]
impl ContactRelay for WebhookContactRelay {
    async fn deliver(&self, message: &ContactMessage) -> Result<(), AppError> {
        let response = self.http.post(self.url.clone()).json(message).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Unavailable(format!("contact webhook returned {status}")));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactResponse {
    pub success: bool,
}

/// Core contact logic, separated from the HTTP layer for testability.
pub async fn process_contact(
    relay: Option<&dyn ContactRelay>,
    message: ContactMessage,
) -> Result<ContactResponse, AppError> {
    let relay =
        relay.ok_or_else(|| AppError::Unavailable("contact form is not configured".into()))?;

    if let Err(e) = relay.deliver(&message).await {
        tracing::warn!("contact message not delivered: {e}");
        return Err(e);
    }

    tracing::info!("contact message delivered");
    Ok(ContactResponse { success: true })
}

/// Decode a contact message sent either as JSON or as an urlencoded form.
#[cfg(feature = "ssr")]
async fn read_message(request: axum::extract::Request) -> Result<ContactMessage, AppError> {
    use axum::extract::FromRequest;

    let is_form = request
        .headers()
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

    if is_form {
        let axum::Form(message) = axum::Form::<ContactMessage>::from_request(request, &())
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        Ok(message)
    } else {
        let axum::Json(message) = axum::Json::<ContactMessage>::from_request(request, &())
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        Ok(message)
    }
}

/// Axum handler for `POST /api/contactus.json`.
#[cfg(feature = "ssr")]
pub async fn contact_handler(
    axum::extract::State(state): axum::extract::State<crate::app::AppState>,
    request: axum::extract::Request,
) -> Result<axum::Json<ContactResponse>, AppError> {
    let message = read_message(request).await?;
    let response = process_contact(state.contact_relay.as_deref(), message).await?;
    Ok(axum::Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct MockRelay {
        delivered: Mutex<Vec<ContactMessage>>,
        fail: bool,
    }

    impl MockRelay {
        fn new(fail: bool) -> Self {
            Self {
                delivered: Mutex::new(vec![]),
                fail,
            }
        }
    }

    #[async_trait]
    impl ContactRelay for MockRelay {
        async fn deliver(&self, message: &ContactMessage) -> Result<(), AppError> {
            if self.fail {
                return Err(AppError::Unavailable("webhook down".into()));
            }
            self.delivered.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    fn message() -> ContactMessage {
        ContactMessage {
            name: "Ada".into(),
            phone: "555".into(),
            email: "ada@example.com".into(),
            message: "Hi".into(),
        }
    }

    #[tokio::test]
    async fn test_message_is_delivered() {
        let relay = MockRelay::new(false);
        let response = process_contact(Some(&relay), message()).await.unwrap();
        assert!(response.success);
        assert_eq!(relay.delivered.lock().unwrap()[0].email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_unconfigured_relay_is_unavailable() {
        let err = process_contact(None, message()).await.unwrap_err();
        assert!(matches!(err, AppError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_relay_failure_propagates() {
        let relay = MockRelay::new(true);
        let err = process_contact(Some(&relay), message()).await.unwrap_err();
        assert_eq!(err, AppError::Unavailable("webhook down".into()));
    }
}
