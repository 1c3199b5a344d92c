use super::pkce;
use super::IdentityProvider;
use crate::config::Config;
use crate::error::{identity_error, AppResult};
use crate::session::{AuthFlow, TokenCache};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info};
use url::Url;
use uuid::Uuid;

/// Token endpoint response body
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
}

impl TokenResponse {
    fn into_cache(self) -> TokenCache {
        // Microsoft issues one-hour tokens unless it says otherwise
        let expires_in = self.expires_in.unwrap_or(3600);
        TokenCache {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: Utc::now().timestamp() + expires_in,
        }
    }
}

/// Microsoft identity platform (v2.0 endpoints) client
#[derive(Clone)]
pub struct MicrosoftIdentity {
    client_id: String,
    client_secret: String,
    authority: String,
    redirect_uri: String,
    scopes: Vec<String>,
    client: Client,
}

impl MicrosoftIdentity {
    pub fn new(config: &Config) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            authority: config.authority(),
            redirect_uri: config.redirect_uri.clone(),
            scopes: config.scopes.clone(),
            client: Client::new(),
        }
    }

    fn authorize_endpoint(&self) -> String {
        format!("{}/oauth2/v2.0/authorize", self.authority)
    }

    fn token_endpoint(&self) -> String {
        format!("{}/oauth2/v2.0/token", self.authority)
    }

    /// POST a grant to the token endpoint
    async fn request_token(&self, params: &[(&str, &str)]) -> AppResult<TokenCache> {
        let response = self
            .client
            .post(self.token_endpoint())
            .form(params)
            .send()
            .await
            .map_err(|e| identity_error(&format!("Failed to reach token endpoint: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            error!("Token request failed: HTTP {}", status);
            return Err(identity_error(&format!(
                "Token request failed: HTTP {} - {}",
                status, error_body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| identity_error(&format!("Failed to parse token response: {}", e)))?;

        Ok(token.into_cache())
    }
}

#[async_trait]
impl IdentityProvider for MicrosoftIdentity {
    fn begin_sign_in(&self) -> AppResult<AuthFlow> {
        let state = Uuid::new_v4().to_string();
        let nonce = Uuid::new_v4().to_string();
        let code_verifier = pkce::generate_verifier();

        let mut url = Url::parse(&self.authorize_endpoint())
            .map_err(|e| identity_error(&format!("Failed to parse authority URL: {}", e)))?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_mode", "query")
            .append_pair("scope", &self.scopes.join(" "))
            .append_pair("state", &state)
            .append_pair("nonce", &nonce)
            .append_pair("code_challenge", &pkce::challenge(&code_verifier))
            .append_pair("code_challenge_method", "S256");

        Ok(AuthFlow {
            state,
            nonce,
            code_verifier,
            auth_uri: url.to_string(),
            redirect_uri: self.redirect_uri.clone(),
            scopes: self.scopes.clone(),
        })
    }

    async fn exchange_code(&self, flow: &AuthFlow, code: &str) -> AppResult<TokenCache> {
        info!("Exchanging authorization code for tokens");

        let scope = flow.scopes.join(" ");
        self.request_token(&[
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", scope.as_str()),
            ("code", code),
            ("redirect_uri", flow.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
            ("code_verifier", flow.code_verifier.as_str()),
        ])
        .await
    }

    async fn refresh(&self, refresh_token: &str) -> AppResult<TokenCache> {
        let scope = self.scopes.join(" ");
        self.request_token(&[
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", scope.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ])
        .await
    }
}
