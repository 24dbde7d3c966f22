//! Auth API identity lookup client

use crate::api::client::{ApiClient, HttpSettings};
use crate::api::types::{IdentitiesResponse, Identity};
use crate::auth::BoxedAuthProvider;
use crate::config::AuthConfig;
use crate::error::ApiResult;
use crate::reconciler::IdentityDirectory;
use async_trait::async_trait;

/// Client for `/v2/api/identities`
pub struct IdentityClient {
    api: ApiClient,
}

impl IdentityClient {
    pub fn new(config: &AuthConfig, auth: BoxedAuthProvider) -> ApiResult<Self> {
        let settings = HttpSettings {
            base_url: config.api_url(),
            timeout_secs: config.timeout_secs,
            max_retries: 0,
            verify_ssl: true,
        };
        Ok(Self {
            api: ApiClient::new(&settings, auth)?,
        })
    }
}

#[async_trait]
impl IdentityDirectory for IdentityClient {
    async fn lookup(&self, username: &str) -> ApiResult<Vec<Identity>> {
        let path = format!(
            "/v2/api/identities?usernames={}",
            urlencoding::encode(username)
        );
        let response: IdentitiesResponse = self.api.get(&path).await?;
        Ok(response.identities)
    }
}
