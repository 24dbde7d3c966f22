//! Remote collaborators of the reconciler

use crate::api::types::{AccessRule, Identity, NewAccessRule};
use crate::error::ApiResult;
// async_trait required for dyn-compatibility with Arc<dyn AclStore>
use async_trait::async_trait;

/// The service holding the endpoint's rule set
#[async_trait]
pub trait AclStore: Send + Sync {
    /// Create a rule and return the id the service assigned
    async fn create_rule(&self, endpoint_id: &str, rule: &NewAccessRule) -> ApiResult<String>;

    async fn delete_rule(&self, endpoint_id: &str, rule_id: &str) -> ApiResult<()>;

    /// Abbreviated records of every rule on the endpoint
    async fn list_rules(&self, endpoint_id: &str) -> ApiResult<Vec<AccessRule>>;

    /// Full record of one rule
    async fn get_rule(&self, endpoint_id: &str, rule_id: &str) -> ApiResult<AccessRule>;
}

/// Username to identity lookup
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Every identity matching a fully qualified username
    async fn lookup(&self, username: &str) -> ApiResult<Vec<Identity>>;
}
