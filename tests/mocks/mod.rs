#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use graph_tutorial::components::graph::models::{
    DateTimeTimeZone, EmailAddress, MailboxSettings, Recipient,
};
use graph_tutorial::components::graph::{Event, GraphUser, NewEvent, ProfilePhoto};
use graph_tutorial::components::{CalendarApi, IdentityProvider, PhotoStore};
use graph_tutorial::error::{AppResult, Error};
use graph_tutorial::handlers::Services;
use graph_tutorial::session::{AuthFlow, Session, SessionUser, TokenCache};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const MOCK_STATE: &str = "state-123";
pub const MOCK_AUTH_URI: &str = "https://login.example.com/authorize?state=state-123";

/// Identity provider that hands out fixed tokens and counts its calls
#[derive(Debug, Default)]
pub struct MockIdentity {
    exchange_calls: AtomicUsize,
    refresh_calls: AtomicUsize,
}

impl MockIdentity {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn exchange_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for MockIdentity {
    fn begin_sign_in(&self) -> AppResult<AuthFlow> {
        Ok(AuthFlow {
            state: MOCK_STATE.to_string(),
            nonce: "nonce-456".to_string(),
            code_verifier: "verifier".to_string(),
            auth_uri: MOCK_AUTH_URI.to_string(),
            redirect_uri: "http://localhost:8000/callback".to_string(),
            scopes: vec!["user.read".to_string()],
        })
    }

    async fn exchange_code(&self, flow: &AuthFlow, code: &str) -> AppResult<TokenCache> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        if flow.state != MOCK_STATE || code.is_empty() {
            return Err(Error::Identity("unexpected exchange".to_string()));
        }

        Ok(TokenCache {
            access_token: "access-token".to_string(),
            refresh_token: Some("refresh-token".to_string()),
            expires_at: Utc::now().timestamp() + 3600,
        })
    }

    async fn refresh(&self, _refresh_token: &str) -> AppResult<TokenCache> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        Ok(TokenCache {
            access_token: "refreshed-token".to_string(),
            refresh_token: None,
            expires_at: Utc::now().timestamp() + 3600,
        })
    }
}

/// Calendar view request as seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventsRequest {
    pub token: String,
    pub start: String,
    pub end: String,
    pub time_zone: String,
}

/// Graph stand-in with a fixed user and recorded requests
#[derive(Debug, Default)]
pub struct MockCalendarApi {
    pub user: GraphUser,
    pub photo: Option<ProfilePhoto>,
    pub events: Vec<Event>,
    requests: Mutex<Vec<EventsRequest>>,
    created: Mutex<Vec<NewEvent>>,
}

impl MockCalendarApi {
    pub fn new() -> Arc<Self> {
        Self::with_photo(Some(sample_photo("user-42.png")))
    }

    /// Same as [`MockCalendarApi::new`] with the given profile photo
    pub fn with_photo(photo: Option<ProfilePhoto>) -> Arc<Self> {
        Arc::new(Self {
            user: sample_user(),
            photo,
            events: vec![sample_event()],
            ..Default::default()
        })
    }

    pub fn requests(&self) -> Vec<EventsRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn created(&self) -> Vec<NewEvent> {
        self.created.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CalendarApi for MockCalendarApi {
    async fn get_user(&self, _token: &str) -> AppResult<GraphUser> {
        Ok(self.user.clone())
    }

    async fn get_photo(&self, _token: &str, _user: &GraphUser) -> AppResult<Option<ProfilePhoto>> {
        Ok(self.photo.clone())
    }

    async fn get_calendar_events(
        &self,
        token: &str,
        start: &str,
        end: &str,
        time_zone: &str,
    ) -> AppResult<Vec<Event>> {
        self.requests.lock().unwrap().push(EventsRequest {
            token: token.to_string(),
            start: start.to_string(),
            end: end.to_string(),
            time_zone: time_zone.to_string(),
        });
        Ok(self.events.clone())
    }

    async fn create_event(&self, _token: &str, event: &NewEvent) -> AppResult<()> {
        self.created.lock().unwrap().push(event.clone());
        Ok(())
    }
}

pub fn sample_user() -> GraphUser {
    GraphUser {
        id: "user-42".to_string(),
        display_name: Some("Megan Bowen".to_string()),
        mail: Some("meganb@contoso.com".to_string()),
        user_principal_name: Some("meganb@contoso.onmicrosoft.com".to_string()),
        mailbox_settings: Some(MailboxSettings {
            time_zone: Some("Pacific Standard Time".to_string()),
        }),
    }
}

pub fn sample_photo(file_name: &str) -> ProfilePhoto {
    ProfilePhoto {
        bytes: Bytes::from_static(b"\x89PNG"),
        file_name: file_name.to_string(),
    }
}

pub fn sample_event() -> Event {
    Event {
        subject: Some("Team sync".to_string()),
        organizer: Some(Recipient {
            email_address: EmailAddress {
                name: Some("Adele Vance".to_string()),
                address: Some("adelev@contoso.com".to_string()),
            },
        }),
        start: DateTimeTimeZone {
            date_time: "2024-05-15T09:00:00.0000000".to_string(),
            time_zone: "Pacific Standard Time".to_string(),
        },
        end: DateTimeTimeZone {
            date_time: "2024-05-15T09:30:00.0000000".to_string(),
            time_zone: "Pacific Standard Time".to_string(),
        },
    }
}

pub fn services(identity: &Arc<MockIdentity>, graph: &Arc<MockCalendarApi>, photo_dir: &Path) -> Services {
    Services {
        identity: identity.clone(),
        graph: graph.clone(),
        photos: PhotoStore::new(photo_dir),
    }
}

/// Session for a signed-in user holding a valid access token
pub fn signed_in_session(time_zone: &str) -> Session {
    let mut session = Session::new();
    session.set_user(SessionUser {
        is_authenticated: true,
        display_name: "Megan Bowen".to_string(),
        email: "meganb@contoso.com".to_string(),
        time_zone: time_zone.to_string(),
        pfp_name: None,
    });
    session.set_token_cache(TokenCache {
        access_token: "access-token".to_string(),
        refresh_token: Some("refresh-token".to_string()),
        expires_at: Utc::now().timestamp() + 3600,
    });
    session
}
