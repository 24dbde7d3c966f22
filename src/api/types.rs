//! Transfer and Auth API wire types

use serde::{Deserialize, Deserializer, Serialize};

/// Principal type of every rule this tool creates
pub const PRINCIPAL_TYPE_IDENTITY: &str = "identity";

/// The only permission set this tool grants
pub const PERMISSIONS_READ_WRITE: &str = "rw";

/// One access rule on an endpoint
///
/// The list endpoint returns abbreviated records; fields it omits are
/// filled in by the per-rule detail request. The implicit owner rule of a
/// shared endpoint has a null id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRule {
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub principal_type: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub principal: String,
    pub path: String,
    pub permissions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
}

impl AccessRule {
    /// Field/value pairs in display order, skipping absent optional fields
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields = vec![
            ("id", self.id.as_deref().unwrap_or("None")),
            ("principal_type", self.principal_type.as_str()),
            ("principal", self.principal.as_str()),
            ("path", self.path.as_str()),
            ("permissions", self.permissions.as_str()),
        ];
        let optional = [
            ("role_id", &self.role_id),
            ("role_type", &self.role_type),
            ("notify_email", &self.notify_email),
            ("create_time", &self.create_time),
            ("expiration_date", &self.expiration_date),
        ];
        fields.extend(
            optional
                .into_iter()
                .filter_map(|(name, value)| value.as_deref().map(|v| (name, v))),
        );
        fields
    }

    /// Render as `name: value` lines padded to 20/40 columns
    pub fn detail_lines(&self) -> Vec<String> {
        self.fields()
            .into_iter()
            .map(|(name, value)| format!("{:<20}: {:<40}", name, value))
            .collect()
    }
}

/// Body of a create-rule request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAccessRule {
    #[serde(rename = "DATA_TYPE")]
    pub data_type: &'static str,
    pub principal_type: &'static str,
    pub principal: String,
    pub path: String,
    pub permissions: &'static str,
}

impl NewAccessRule {
    /// Read/write grant for one identity
    pub fn read_write(principal: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            data_type: "access",
            principal_type: PRINCIPAL_TYPE_IDENTITY,
            principal: principal.into(),
            path: path.into(),
            permissions: PERMISSIONS_READ_WRITE,
        }
    }
}

/// Response of a create-rule request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRuleResponse {
    #[serde(deserialize_with = "string_or_number")]
    pub access_id: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
}

/// Generic operation result (delete)
#[derive(Debug, Clone, Deserialize)]
pub struct OperationResult {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
}

/// Response of the access list request
#[derive(Debug, Clone, Deserialize)]
pub struct AccessList {
    #[serde(rename = "DATA", default)]
    pub data: Vec<AccessRule>,
}

/// One identity from the Auth identities lookup
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Identity {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Response of the identities lookup
#[derive(Debug, Clone, Deserialize)]
pub struct IdentitiesResponse {
    #[serde(default)]
    pub identities: Vec<Identity>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Number(i64),
}

impl From<WireId> for String {
    fn from(id: WireId) -> Self {
        match id {
            WireId::Text(s) => s,
            WireId::Number(n) => n.to_string(),
        }
    }
}

/// Accept ids sent as JSON numbers or strings
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    WireId::deserialize(deserializer).map(String::from)
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Like `string_or_number`, with `null` as `None`
fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<WireId>::deserialize(deserializer).map(|id| id.map(String::from))
}
