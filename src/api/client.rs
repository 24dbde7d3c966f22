//! Shared HTTP client
//!
//! One authenticated JSON client per service; the Transfer and Auth clients
//! are thin typed layers on top of it.

use crate::auth::BoxedAuthProvider;
use crate::error::{ApiError, ApiResult};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Connection settings for one API base URL
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub verify_ssl: bool,
}

/// Authenticated JSON API client
pub struct ApiClient {
    http: Client,
    base_url: String,
    auth: BoxedAuthProvider,
    max_retries: u32,
}

impl ApiClient {
    /// Create a new client
    pub fn new(settings: &HttpSettings, auth: BoxedAuthProvider) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .danger_accept_invalid_certs(!settings.verify_ssl)
            .user_agent(format!("globus-share/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Request)?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            auth,
            max_retries: settings.max_retries,
        })
    }

    /// Build a URL for an API endpoint
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Add authentication to a request
    async fn authenticate(&self, request: RequestBuilder) -> ApiResult<RequestBuilder> {
        let header = self.auth.get_auth_header().await?;
        Ok(request.header(header.header_name(), header.header_value()))
    }

    /// Execute a request, retrying transport failures
    ///
    /// Connect failures are always retried since the request never left.
    /// Timeouts are retried only when `retry_on_timeout` is set: a timed-out
    /// write may already have been applied, and replaying it would turn a
    /// fresh create into `Exists`. HTTP error responses are never retried.
    async fn execute(&self, request: RequestBuilder, retry_on_timeout: bool) -> ApiResult<Response> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_millis(100 * 2u64.pow(attempt - 1));
                tokio::time::sleep(delay).await;
                debug!("Retrying request (attempt {})", attempt + 1);
            }

            let req = request
                .try_clone()
                .ok_or_else(|| ApiError::InvalidResponse("Cannot clone request".to_string()))?;

            match req.send().await {
                Ok(response) => return self.handle_response(response).await,
                Err(e) => {
                    warn!("Request failed: {}", e);
                    let retryable = e.is_connect() || (retry_on_timeout && e.is_timeout());
                    last_error = Some(ApiError::Request(e));
                    if !retryable {
                        break;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ApiError::InvalidResponse("Unknown error".to_string())))
    }

    /// Handle API response
    async fn handle_response(&self, response: Response) -> ApiResult<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(60);
            return Err(ApiError::RateLimited { retry_after });
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_response(status.as_u16(), &body))
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }

    /// Make a GET request
    #[instrument(skip(self), fields(endpoint = %endpoint))]
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<T> {
        let request = self.authenticate(self.http.get(self.url(endpoint))).await?;
        let response = self.execute(request, true).await?;
        Self::parse(response).await
    }

    /// Make a POST request with a JSON body
    ///
    /// Not retried after a timeout.
    #[instrument(skip(self, body), fields(endpoint = %endpoint))]
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ApiResult<T> {
        let request = self
            .authenticate(self.http.post(self.url(endpoint)).json(body))
            .await?;
        let response = self.execute(request, false).await?;
        Self::parse(response).await
    }

    /// Make a DELETE request
    ///
    /// Not retried after a timeout: a replayed delete of an already removed
    /// rule would report a failure for a delete that worked.
    #[instrument(skip(self), fields(endpoint = %endpoint))]
    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<T> {
        let request = self
            .authenticate(self.http.delete(self.url(endpoint)))
            .await?;
        let response = self.execute(request, false).await?;
        Self::parse(response).await
    }
}
