mod microsoft;
pub mod pkce;

pub use microsoft::MicrosoftIdentity;

use crate::error::{AppResult, Error};
use crate::session::{AuthFlow, Session, TokenCache};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info};

/// Seconds before expiry at which a cached access token is refreshed
pub const TOKEN_EXPIRY_LEEWAY_SECONDS: i64 = 60;

/// Parameters the identity platform sends back to the redirect URI
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Sign-in and token operations against an OAuth2 identity platform
#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// Build a new sign-in flow with a fresh state, nonce and PKCE verifier
    fn begin_sign_in(&self) -> AppResult<AuthFlow>;

    /// Redeem an authorization code issued for `flow`
    async fn exchange_code(&self, flow: &AuthFlow, code: &str) -> AppResult<TokenCache>;

    /// Get a new access token with a refresh token
    async fn refresh(&self, refresh_token: &str) -> AppResult<TokenCache>;
}

/// Return a usable access token for the session, refreshing it when needed
pub async fn get_token(identity: &dyn IdentityProvider, session: &mut Session) -> AppResult<String> {
    let cache = session
        .token_cache()
        .cloned()
        .ok_or_else(|| Error::AuthRequired("No token cached for this session".to_string()))?;

    let now = Utc::now().timestamp();
    if cache.is_valid_at(now, TOKEN_EXPIRY_LEEWAY_SECONDS) {
        debug!("Using cached access token");
        return Ok(cache.access_token);
    }

    // Token is expired, refresh it
    let refresh_token = cache
        .refresh_token
        .as_deref()
        .ok_or_else(|| Error::AuthRequired("Access token expired without a refresh token".to_string()))?;

    info!("Access token expired, refreshing");
    let mut refreshed = identity.refresh(refresh_token).await?;

    // Some responses leave the refresh token out, keep the old one then
    if refreshed.refresh_token.is_none() {
        refreshed.refresh_token = cache.refresh_token.clone();
    }

    let access_token = refreshed.access_token.clone();
    session.set_token_cache(refreshed);
    Ok(access_token)
}
