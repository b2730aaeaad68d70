//! Transport for the like/unlike endpoints.

use async_trait::async_trait;
use like_schema::{EntityRef, ErrorBody, LikeToggleResponse};
use reqwest::{Client, Method, Response};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{ApiError, Result};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Issues like mutations on behalf of the viewer.
///
/// `Ok(Some(response))` carries the server's authoritative aggregate and
/// the time it was counted; `Ok(None)` means the mutation was accepted but
/// the body was unreadable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LikeApi: Send + Sync {
    async fn like(&self, entity: EntityRef) -> Result<Option<LikeToggleResponse>>;
    async fn unlike(&self, entity: EntityRef) -> Result<Option<LikeToggleResponse>>;
}

#[derive(Debug, Clone)]
pub struct HttpLikeApiConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl HttpLikeApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// reqwest-backed [`LikeApi`].
#[derive(Debug, Clone)]
pub struct HttpLikeApi {
    client: Client,
    config: HttpLikeApiConfig,
}

impl HttpLikeApi {
    pub fn new(config: HttpLikeApiConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.base_url, path);
        let builder = self.client.request(method, url);
        match &self.config.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn mutate(&self, method: Method, entity: EntityRef) -> Result<Option<LikeToggleResponse>> {
        debug!(entity = %entity, method = %method, "Sending like mutation");

        let response = self.request(method, &entity.like_path()).send().await?;
        let response = error_for_status(response).await?;

        // The mutation has already been applied at this point, so an
        // unreadable body only loses the authoritative count.
        let body = response.bytes().await?;
        if body.is_empty() {
            return Ok(None);
        }
        match serde_json::from_slice::<LikeToggleResponse>(&body) {
            Ok(parsed) => Ok(Some(parsed)),
            Err(e) => {
                warn!(entity = %entity, error = %e, "Toggle response body was unreadable");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl LikeApi for HttpLikeApi {
    async fn like(&self, entity: EntityRef) -> Result<Option<LikeToggleResponse>> {
        self.mutate(Method::POST, entity).await
    }

    async fn unlike(&self, entity: EntityRef) -> Result<Option<LikeToggleResponse>> {
        self.mutate(Method::DELETE, entity).await
    }
}

pub(crate) async fn error_for_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or_else(|_| {
            if text.is_empty() {
                status.to_string()
            } else {
                text
            }
        });
    Err(ApiError::from_status(status, message))
}
