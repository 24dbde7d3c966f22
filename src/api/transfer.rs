//! Transfer API access-rule client

use crate::api::client::{ApiClient, HttpSettings};
use crate::api::types::{AccessList, AccessRule, CreateRuleResponse, NewAccessRule, OperationResult};
use crate::auth::BoxedAuthProvider;
use crate::config::TransferConfig;
use crate::error::ApiResult;
use crate::reconciler::AclStore;
use crate::util::encode_segment;
use async_trait::async_trait;
use tracing::debug;

/// Client for `/endpoint/{id}/access*`
pub struct TransferClient {
    api: ApiClient,
}

impl TransferClient {
    pub fn new(config: &TransferConfig, auth: BoxedAuthProvider) -> ApiResult<Self> {
        let settings = HttpSettings {
            base_url: config.api_url(),
            timeout_secs: config.timeout_secs,
            max_retries: config.max_retries,
            verify_ssl: config.verify_ssl,
        };
        Ok(Self {
            api: ApiClient::new(&settings, auth)?,
        })
    }

    fn access_path(endpoint_id: &str) -> String {
        format!("/endpoint/{}/access", encode_segment(endpoint_id))
    }

    fn rule_path(endpoint_id: &str, rule_id: &str) -> String {
        format!(
            "{}/{}",
            Self::access_path(endpoint_id),
            encode_segment(rule_id)
        )
    }
}

#[async_trait]
impl AclStore for TransferClient {
    async fn create_rule(&self, endpoint_id: &str, rule: &NewAccessRule) -> ApiResult<String> {
        let response: CreateRuleResponse =
            self.api.post(&Self::access_path(endpoint_id), rule).await?;
        debug!(
            rule_id = %response.access_id,
            request_id = response.request_id.as_deref().unwrap_or(""),
            "Access rule created"
        );
        Ok(response.access_id)
    }

    async fn delete_rule(&self, endpoint_id: &str, rule_id: &str) -> ApiResult<()> {
        let response: OperationResult = self
            .api
            .delete(&Self::rule_path(endpoint_id, rule_id))
            .await?;
        debug!(
            rule_id,
            code = response.code.as_deref().unwrap_or(""),
            "Access rule deleted"
        );
        Ok(())
    }

    async fn list_rules(&self, endpoint_id: &str) -> ApiResult<Vec<AccessRule>> {
        let path = format!("/endpoint/{}/access_list", encode_segment(endpoint_id));
        let list: AccessList = self.api.get(&path).await?;
        Ok(list.data)
    }

    async fn get_rule(&self, endpoint_id: &str, rule_id: &str) -> ApiResult<AccessRule> {
        self.api.get(&Self::rule_path(endpoint_id, rule_id)).await
    }
}
