//! In-memory stand-ins for the remote services

#![allow(dead_code)]

use async_trait::async_trait;
use globus_share::api::{AccessRule, Identity, NewAccessRule};
use globus_share::error::{ApiError, ApiResult};
use globus_share::reconciler::{AclStore, IdentityDirectory};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const ENDPOINT: &str = "3aca022a-5e5b-11e6-8309-22000b97daec";

/// Rule set of one endpoint, with duplicate detection like the real service
#[derive(Default)]
pub struct MemoryAclStore {
    rules: Mutex<Vec<AccessRule>>,
    next_id: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
    pub fail_creates: Mutex<Option<(u16, String)>>,
    pub fail_lists: Mutex<bool>,
    pub fail_gets: Mutex<Vec<String>>,
}

impl MemoryAclStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicUsize::new(1),
            ..Default::default()
        }
    }

    pub fn with_rules(rules: Vec<AccessRule>) -> Self {
        let store = Self::new();
        store.next_id.store(rules.len() + 1, Ordering::SeqCst);
        *store.rules.lock().unwrap() = rules;
        store
    }

    pub fn rules(&self) -> Vec<AccessRule> {
        self.rules.lock().unwrap().clone()
    }

    pub fn fail_creates_with(&self, status: u16, code: &str) {
        *self.fail_creates.lock().unwrap() = Some((status, code.to_string()));
    }
}

/// Abbreviated list record; detail requests add `create_time`
pub fn rule(id: &str, principal: &str, path: &str) -> AccessRule {
    AccessRule {
        id: Some(id.to_string()),
        ..owner_rule(principal, path)
    }
}

/// Implicit owner rule, listed without an id
pub fn owner_rule(principal: &str, path: &str) -> AccessRule {
    AccessRule {
        id: None,
        principal_type: "identity".to_string(),
        principal: principal.to_string(),
        path: path.to_string(),
        permissions: "rw".to_string(),
        role_id: None,
        role_type: None,
        notify_email: None,
        create_time: None,
        expiration_date: None,
    }
}

fn api_error(status: u16, code: &str) -> ApiError {
    ApiError::Api {
        status,
        code: code.to_string(),
        message: format!("{} from in-memory store", code),
    }
}

#[async_trait]
impl AclStore for MemoryAclStore {
    async fn create_rule(&self, endpoint_id: &str, new_rule: &NewAccessRule) -> ApiResult<String> {
        assert_eq!(endpoint_id, ENDPOINT);
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        if let Some((status, code)) = self.fail_creates.lock().unwrap().clone() {
            return Err(api_error(status, &code));
        }

        let mut rules = self.rules.lock().unwrap();
        if rules
            .iter()
            .any(|r| r.principal == new_rule.principal && r.path == new_rule.path)
        {
            return Err(api_error(409, "Exists"));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        rules.push(AccessRule {
            id: Some(id.clone()),
            principal_type: new_rule.principal_type.to_string(),
            principal: new_rule.principal.clone(),
            path: new_rule.path.clone(),
            permissions: new_rule.permissions.to_string(),
            role_id: None,
            role_type: None,
            notify_email: None,
            create_time: None,
            expiration_date: None,
        });
        Ok(id)
    }

    async fn delete_rule(&self, endpoint_id: &str, rule_id: &str) -> ApiResult<()> {
        assert_eq!(endpoint_id, ENDPOINT);
        let mut rules = self.rules.lock().unwrap();
        let before = rules.len();
        rules.retain(|r| r.id.as_deref() != Some(rule_id));
        if rules.len() == before {
            return Err(api_error(404, "AccessRuleNotFound"));
        }
        Ok(())
    }

    async fn list_rules(&self, endpoint_id: &str) -> ApiResult<Vec<AccessRule>> {
        assert_eq!(endpoint_id, ENDPOINT);
        if *self.fail_lists.lock().unwrap() {
            return Err(api_error(503, "ServiceUnavailable"));
        }
        Ok(self.rules())
    }

    async fn get_rule(&self, endpoint_id: &str, rule_id: &str) -> ApiResult<AccessRule> {
        assert_eq!(endpoint_id, ENDPOINT);
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_gets.lock().unwrap().iter().any(|id| id == rule_id) {
            return Err(api_error(500, "InternalError"));
        }

        let rules = self.rules.lock().unwrap();
        let mut found = rules
            .iter()
            .find(|r| r.id.as_deref() == Some(rule_id))
            .cloned()
            .ok_or_else(|| api_error(404, "AccessRuleNotFound"))?;
        found.create_time = Some("2026-01-01T00:00:00+00:00".to_string());
        Ok(found)
    }
}

/// Username to identity map; a username may map to several identities
#[derive(Default)]
pub struct MemoryIdentityDirectory {
    identities: HashMap<String, Vec<String>>,
    pub lookups: Mutex<Vec<String>>,
    pub unavailable: bool,
}

impl MemoryIdentityDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, username: &str, identity_id: &str) -> Self {
        self.identities
            .entry(username.to_string())
            .or_default()
            .push(identity_id.to_string());
        self
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl IdentityDirectory for MemoryIdentityDirectory {
    async fn lookup(&self, username: &str) -> ApiResult<Vec<Identity>> {
        self.lookups.lock().unwrap().push(username.to_string());
        if self.unavailable {
            return Err(ApiError::Unauthorized);
        }

        Ok(self
            .identities
            .get(username)
            .into_iter()
            .flatten()
            .map(|id| Identity {
                id: id.clone(),
                username: username.to_string(),
                name: None,
                email: None,
                status: Some("used".to_string()),
            })
            .collect())
    }
}
