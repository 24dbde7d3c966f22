//! Native-app OAuth2 flow against the Auth service
//!
//! Authorization code grant with PKCE for the one-time interactive
//! bootstrap, and the refresh token grant for unattended renewal.

use crate::config::AuthConfig;
use crate::credentials::store::StoredToken;
use crate::error::{ApiError, CredentialError};
use crate::util::{SecretString, unix_now};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use reqwest::{Client, Url};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Token response from `/v2/oauth2/token`
///
/// The top-level token belongs to one resource server; tokens for the other
/// requested resource servers arrive in `other_tokens`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: SecretString,
    #[serde(default)]
    pub refresh_token: Option<SecretString>,
    pub expires_in: i64,
    pub resource_server: String,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub other_tokens: Vec<TokenResponse>,
}

impl TokenResponse {
    /// Flatten into one stored token per resource server
    pub fn by_resource_server(&self, issued_at: i64) -> Vec<StoredToken> {
        let mut tokens = vec![StoredToken {
            resource_server: self.resource_server.clone(),
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            scope: self.scope.clone(),
            expires_at_seconds: Some(issued_at + self.expires_in),
        }];
        for other in &self.other_tokens {
            tokens.extend(other.by_resource_server(issued_at));
        }
        tokens
    }
}

/// An authorization in progress, waiting for the user to paste a code
pub struct PendingAuthorization {
    pub authorize_url: String,
    verifier: SecretString,
}

/// OAuth client for a registered native app
pub struct NativeAppClient {
    http: Client,
    base_url: String,
    client_id: String,
    redirect_uri: String,
    scopes: Vec<String>,
}

impl NativeAppClient {
    pub fn new(config: &AuthConfig, client_id: impl Into<String>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(format!("globus-share/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Request)?;

        Ok(Self {
            http,
            base_url: config.api_url(),
            client_id: client_id.into(),
            redirect_uri: config.redirect_uri.clone(),
            scopes: config.scopes.clone(),
        })
    }

    /// Begin the authorization code flow
    ///
    /// Requests refresh tokens (`access_type=offline`) so later renewals
    /// need no browser.
    pub fn start_flow(&self) -> Result<PendingAuthorization, ApiError> {
        let verifier = SecretString::new(URL_SAFE_NO_PAD.encode(rand::random::<[u8; 32]>()));
        let challenge = pkce_challenge(verifier.expose_secret());
        let scope = self.scopes.join(" ");

        let url = Url::parse_with_params(
            &format!("{}/v2/oauth2/authorize", self.base_url),
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", scope.as_str()),
                ("state", "_default"),
                ("response_type", "code"),
                ("code_challenge", challenge.as_str()),
                ("code_challenge_method", "S256"),
                ("access_type", "offline"),
            ],
        )
        .map_err(|e| ApiError::InvalidResponse(format!("Invalid authorize URL: {}", e)))?;

        Ok(PendingAuthorization {
            authorize_url: url.to_string(),
            verifier,
        })
    }

    /// Exchange a pasted authorization code for tokens
    #[instrument(skip_all)]
    pub async fn exchange_code(
        &self,
        pending: &PendingAuthorization,
        code: &str,
    ) -> Result<TokenResponse, CredentialError> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code.trim()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("client_id", self.client_id.as_str()),
            ("code_verifier", pending.verifier.expose_secret()),
        ];
        let response = self.token_request(&form).await?;
        info!(
            resource_server = %response.resource_server,
            other_tokens = response.other_tokens.len(),
            "Authorization code exchanged"
        );
        Ok(response)
    }

    /// Mint a new access token from a refresh token
    #[instrument(skip_all)]
    pub async fn refresh(
        &self,
        refresh_token: &SecretString,
    ) -> Result<TokenResponse, CredentialError> {
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.expose_secret()),
            ("client_id", self.client_id.as_str()),
        ];
        self.token_request(&form).await
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse, CredentialError> {
        let url = format!("{}/v2/oauth2/token", self.base_url);
        let response = self
            .http
            .post(&url)
            .form(form)
            .send()
            .await
            .map_err(ApiError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_response(status.as_u16(), &body).into());
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse token response: {}", e))
        })?;
        debug!(
            resource_server = %token.resource_server,
            expires_in = token.expires_in,
            "Token endpoint responded"
        );
        Ok(token)
    }
}

/// S256 code challenge for a PKCE verifier
pub fn pkce_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Convert a refresh grant response into the stored token it replaces
///
/// The Auth service may omit the refresh token on renewal; the previous one
/// stays valid and is kept.
pub fn renewed_token(previous: &StoredToken, response: &TokenResponse) -> StoredToken {
    let issued_at = unix_now();
    StoredToken {
        resource_server: previous.resource_server.clone(),
        access_token: response.access_token.clone(),
        refresh_token: response
            .refresh_token
            .clone()
            .or_else(|| previous.refresh_token.clone()),
        scope: response.scope.clone().or_else(|| previous.scope.clone()),
        expires_at_seconds: Some(issued_at + response.expires_in),
    }
}
