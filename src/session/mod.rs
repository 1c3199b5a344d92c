mod redis_store;
mod store;

pub use redis_store::RedisSessionStore;
pub use store::{InMemorySessionStore, SessionStore};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A one-shot or validation error shown at the top of a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub message: String,
    pub debug: String,
}

impl ErrorMessage {
    pub fn new(message: impl Into<String>, debug: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            debug: debug.into(),
        }
    }
}

/// The signed-in user as kept in the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub is_authenticated: bool,
    pub display_name: String,
    pub email: String,
    /// Mailbox time zone, either a Windows name or an IANA identifier
    pub time_zone: String,
    /// File name of the cached profile photo, if the user has one
    pub pfp_name: Option<String>,
}

impl SessionUser {
    /// The user every visitor starts out as
    pub fn anonymous() -> Self {
        Self {
            is_authenticated: false,
            display_name: String::new(),
            email: String::new(),
            time_zone: String::from("UTC"),
            pfp_name: None,
        }
    }
}

impl Default for SessionUser {
    fn default() -> Self {
        Self::anonymous()
    }
}

/// Pending sign-in started by `/signin` and checked by `/callback`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthFlow {
    pub state: String,
    pub nonce: String,
    pub code_verifier: String,
    pub auth_uri: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
}

/// Tokens obtained for the signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCache {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Expiry as a unix timestamp in seconds
    pub expires_at: i64,
}

impl TokenCache {
    /// Whether the access token is still usable at `now`, allowing `leeway` seconds
    pub fn is_valid_at(&self, now: i64, leeway: i64) -> bool {
        self.expires_at - leeway > now
    }
}

/// Everything stored for one visitor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_flow: Option<AuthFlow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flash_error: Option<ErrorMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_cache: Option<TokenCache>,
}

/// A visitor session loaded for the duration of one request.
///
/// Handlers only go through the typed accessors below. The web layer
/// persists the session afterwards when [`Session::is_modified`] says so.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    data: SessionData,
    modified: bool,
    /// Id this session was stored under before [`Session::rotate_id`]
    replaced_id: Option<String>,
}

impl Session {
    /// Start a fresh session with a random id
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            data: SessionData::default(),
            modified: false,
            replaced_id: None,
        }
    }

    /// Wrap data loaded from a store
    pub fn from_data(id: impl Into<String>, data: SessionData) -> Self {
        Self {
            id: id.into(),
            data,
            modified: false,
            replaced_id: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn data(&self) -> &SessionData {
        &self.data
    }

    /// Move the session to a fresh id, keeping its data
    pub fn rotate_id(&mut self) {
        let old = std::mem::replace(&mut self.id, Uuid::new_v4().to_string());
        // Keep the first id if rotated twice within one request
        self.replaced_id.get_or_insert(old);
        self.modified = true;
    }

    /// Previous id to drop from the store after a rotation
    pub fn replaced_id(&self) -> Option<&str> {
        self.replaced_id.as_deref()
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.data.user.as_ref()
    }

    /// True only for a stored user flagged as authenticated
    pub fn is_authenticated(&self) -> bool {
        self.data.user.as_ref().is_some_and(|u| u.is_authenticated)
    }

    pub fn set_user(&mut self, user: SessionUser) {
        self.data.user = Some(user);
        self.modified = true;
    }

    pub fn auth_flow(&self) -> Option<&AuthFlow> {
        self.data.auth_flow.as_ref()
    }

    /// Replace any pending flow
    pub fn set_auth_flow(&mut self, flow: AuthFlow) {
        self.data.auth_flow = Some(flow);
        self.modified = true;
    }

    pub fn take_auth_flow(&mut self) -> Option<AuthFlow> {
        let flow = self.data.auth_flow.take();
        if flow.is_some() {
            self.modified = true;
        }
        flow
    }

    pub fn set_flash_error(&mut self, error: ErrorMessage) {
        self.data.flash_error = Some(error);
        self.modified = true;
    }

    /// Remove and return the flash error so it is shown only once
    pub fn take_flash_error(&mut self) -> Option<ErrorMessage> {
        let error = self.data.flash_error.take();
        if error.is_some() {
            self.modified = true;
        }
        error
    }

    pub fn token_cache(&self) -> Option<&TokenCache> {
        self.data.token_cache.as_ref()
    }

    pub fn set_token_cache(&mut self, cache: TokenCache) {
        self.data.token_cache = Some(cache);
        self.modified = true;
    }

    /// Forget the signed-in user and their tokens
    pub fn remove_user_and_token(&mut self) {
        if self.data.user.take().is_some() | self.data.token_cache.take().is_some() {
            self.modified = true;
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
