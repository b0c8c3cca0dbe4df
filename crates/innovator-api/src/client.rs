//! Idea service client

use std::time::Duration;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    endpoint::{self, CLARIFY_PATH, GENERATE_PATH},
    error::{Error, Result},
    types::{ClarifyRequest, ClarifyResponse, ErrorBody, GenerateRequest, GenerateResponse},
};

/// Default request timeout; generation ranks many candidates and is slow
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// The two remote operations the client depends on
#[async_trait]
pub trait IdeaService: Send + Sync {
    /// Ask whether a requirement is clear enough, given the dialogue so far
    async fn clarify(&self, request: &ClarifyRequest) -> Result<ClarifyResponse>;

    /// Generate and rank ideas for a confirmed requirement
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse>;
}

/// HTTP implementation of [`IdeaService`]
pub struct HttpIdeaService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpIdeaService {
    /// Create a client for the given base URL with the default timeout
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a specific request timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "no service base URL; pass --base-url or set {}",
                endpoint::BASE_URL_ENV_VAR
            )));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(Error::InvalidConfig(format!(
                "base URL must be absolute (http:// or https://): {}",
                base_url
            )));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// The resolved base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = endpoint::join(&self.base_url, path);
        let response = self.client.post(&url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!("{} returned {}", path, status);
            return Err(error_from_body(status.as_u16(), &text));
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl IdeaService for HttpIdeaService {
    async fn clarify(&self, request: &ClarifyRequest) -> Result<ClarifyResponse> {
        tracing::debug!(
            "POST {} (history: {} turns)",
            CLARIFY_PATH,
            request.conversation_history.len()
        );
        self.post_json(CLARIFY_PATH, request).await
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        tracing::debug!("POST {}", GENERATE_PATH);
        self.post_json(GENERATE_PATH, request).await
    }
}

/// Map a non-2xx body to a service error when it carries `detail`
fn error_from_body(status: u16, body: &str) -> Error {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail_text())
        .map(|detail| Error::service(status, detail))
        .unwrap_or(Error::Status { status })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_from_body_with_detail() {
        let e = error_from_body(429, r#"{"detail": "rate limited"}"#);
        assert_eq!(e.detail(), Some("rate limited"));
        assert_eq!(e.to_string(), "rate limited");
    }

    #[test]
    fn test_error_from_body_html() {
        let e = error_from_body(502, "<html>Bad Gateway</html>");
        assert!(e.detail().is_none());
        assert_eq!(e.to_string(), "Request failed with status code 502");
    }

    #[test]
    fn test_error_from_empty_body() {
        let e = error_from_body(500, "");
        assert!(matches!(e, Error::Status { status: 500 }));
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let err = HttpIdeaService::new("  ").err().expect("should fail");
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_relative_base_url_rejected() {
        let err = HttpIdeaService::new("/api").err().expect("should fail");
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let svc = HttpIdeaService::new("http://localhost:8000/").unwrap();
        assert_eq!(svc.base_url(), "http://localhost:8000");
    }

    #[tokio::test]
    async fn test_unsendable_request_is_transport_error() {
        // Unparseable host: reqwest fails while building the request, before any I/O
        let svc = HttpIdeaService::new("http://[not-a-host").unwrap();
        let err = svc
            .generate(&GenerateRequest {
                requirement: "anything".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Http(_)), "got: {:?}", err);
        assert!(err.is_transport());
        assert!(err.detail().is_none());
        assert!(!err.to_string().trim().is_empty());
    }
}
