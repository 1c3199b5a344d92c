//! Request handlers for the tutorial pages.
//!
//! Each handler works on an explicit [`Session`] and returns an [`Outcome`];
//! the web layer takes care of cookies, templates and HTTP.

mod context;

pub use context::{initialize_context, PageContext, PHOTO_URL_PREFIX};

use crate::components::graph::timezones::resolve_time_zone;
use crate::components::graph::{CalendarApi, EventView, NewEvent};
use crate::components::identity::{get_token, CallbackParams, IdentityProvider};
use crate::components::photos::PhotoStore;
use crate::error::{AppResult, Error};
use crate::session::{ErrorMessage, Session};
use crate::utils::time::{midnight_today, week_window};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Collaborators the handlers call into
#[derive(Clone)]
pub struct Services {
    pub identity: Arc<dyn IdentityProvider>,
    pub graph: Arc<dyn CalendarApi>,
    pub photos: PhotoStore,
}

/// Named routes handlers redirect to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    SignIn,
    Calendar,
    /// Somewhere outside the app, such as the authorization endpoint
    External(String),
}

impl Route {
    pub fn path(&self) -> &str {
        match self {
            Route::Home => "/",
            Route::SignIn => "/signin",
            Route::Calendar => "/calendar",
            Route::External(uri) => uri.as_str(),
        }
    }
}

/// Pages handlers can render
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Home(PageContext),
    Calendar {
        context: PageContext,
        events: Option<Vec<EventView>>,
    },
    NewEvent(PageContext),
}

/// What the web layer should answer with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Render(Page),
    Redirect(Route),
}

/// Fields posted by the new-event form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewEventForm {
    #[serde(rename = "ev-subject", default)]
    pub subject: String,
    #[serde(rename = "ev-start", default)]
    pub start: String,
    #[serde(rename = "ev-end", default)]
    pub end: String,
    #[serde(rename = "ev-attendees", default)]
    pub attendees: String,
    #[serde(rename = "ev-body", default)]
    pub body: String,
}

/// Split a `;`-delimited attendee list, `None` when there is nobody
pub fn parse_attendees(raw: &str) -> Option<Vec<String>> {
    if raw.is_empty() {
        return None;
    }

    let attendees: Vec<String> = raw
        .split(';')
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .map(str::to_string)
        .collect();

    (!attendees.is_empty()).then_some(attendees)
}

/// Access token for the signed-in user, `None` when they have to sign in again
async fn access_token(services: &Services, session: &mut Session) -> AppResult<Option<String>> {
    match get_token(services.identity.as_ref(), session).await {
        Ok(token) => Ok(Some(token)),
        Err(Error::AuthRequired(reason)) => {
            warn!("Session needs a new sign-in: {}", reason);
            session.remove_user_and_token();
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// `GET /`
pub async fn home(session: &mut Session) -> AppResult<Outcome> {
    let context = initialize_context(session);
    Ok(Outcome::Render(Page::Home(context)))
}

/// `GET /signin`
pub async fn sign_in(services: &Services, session: &mut Session) -> AppResult<Outcome> {
    let flow = services.identity.begin_sign_in()?;
    let auth_uri = flow.auth_uri.clone();

    // Only one sign-in may be pending per session
    session.set_auth_flow(flow);

    Ok(Outcome::Redirect(Route::External(auth_uri)))
}

/// `GET|POST /callback`
pub async fn callback(
    services: &Services,
    session: &mut Session,
    params: CallbackParams,
) -> AppResult<Outcome> {
    if let Some(error) = params.error {
        warn!("Sign-in returned an error: {}", error);
        session.take_auth_flow();
        session.set_flash_error(ErrorMessage::new(
            error,
            params.error_description.unwrap_or_default(),
        ));
        return Ok(Outcome::Redirect(Route::Home));
    }

    let Some(flow) = session.take_auth_flow() else {
        session.set_flash_error(ErrorMessage::new(
            "Sign-in failed",
            "No sign-in was in progress for this session.",
        ));
        return Ok(Outcome::Redirect(Route::Home));
    };

    if params.state.as_deref() != Some(flow.state.as_str()) {
        warn!("Callback state does not match the pending sign-in");
        session.set_flash_error(ErrorMessage::new(
            "Sign-in failed",
            "The sign-in response did not match the pending request.",
        ));
        return Ok(Outcome::Redirect(Route::Home));
    }

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        session.set_flash_error(ErrorMessage::new(
            "Sign-in failed",
            "The sign-in response did not include an authorization code.",
        ));
        return Ok(Outcome::Redirect(Route::Home));
    };

    // Make the token request
    let tokens = services.identity.exchange_code(&flow, &code).await?;

    // Get the user's profile and photo
    let user = services.graph.get_user(&tokens.access_token).await?;
    let photo = services.graph.get_photo(&tokens.access_token, &user).await?;

    // Only remember a photo that is actually on disk
    let pfp_name = match photo {
        Some(photo) => services
            .photos
            .save(&photo.file_name, &photo.bytes)
            .await?
            .then_some(photo.file_name),
        None => None,
    };

    let session_user = user.to_session_user(pfp_name);
    info!("{} signed in", session_user.display_name);

    // New id for the signed-in session, so an id planted before sign-in is useless
    session.rotate_id();
    session.set_token_cache(tokens);
    session.set_user(session_user);

    Ok(Outcome::Redirect(Route::Home))
}

/// `GET /signout`
pub async fn sign_out(services: &Services, session: &mut Session) -> AppResult<Outcome> {
    // Remove the profile picture
    if let Some(pfp_name) = session.user().and_then(|u| u.pfp_name.clone()) {
        services.photos.remove(&pfp_name).await?;
    }

    session.remove_user_and_token();
    Ok(Outcome::Redirect(Route::Home))
}

/// `GET /calendar`
pub async fn calendar(
    services: &Services,
    session: &mut Session,
    now: DateTime<Utc>,
) -> AppResult<Outcome> {
    let context = initialize_context(session);
    if !session.is_authenticated() {
        return Ok(Outcome::Redirect(Route::SignIn));
    }

    // Mailbox time zones can be Windows names, windowing needs IANA
    let today = midnight_today(resolve_time_zone(&context.user.time_zone), now)?;
    let window = week_window(&today)?;

    let Some(token) = access_token(services, session).await? else {
        return Ok(Outcome::Redirect(Route::SignIn));
    };

    let events = services
        .graph
        .get_calendar_events(
            &token,
            &window.start_iso(),
            &window.end_iso(),
            &context.user.time_zone,
        )
        .await?;

    let events = events.into_iter().map(EventView::from).collect();

    Ok(Outcome::Render(Page::Calendar {
        context,
        events: Some(events),
    }))
}

/// `GET|POST /calendar/new`, `form` is `None` for a GET
pub async fn new_event(
    services: &Services,
    session: &mut Session,
    form: Option<NewEventForm>,
) -> AppResult<Outcome> {
    let mut context = initialize_context(session);
    if !session.is_authenticated() {
        return Ok(Outcome::Redirect(Route::SignIn));
    }

    let Some(form) = form else {
        return Ok(Outcome::Render(Page::NewEvent(context)));
    };

    if form.subject.is_empty() || form.start.is_empty() || form.end.is_empty() {
        context.errors = vec![ErrorMessage::new(
            "Invalid values",
            "The subject, start and end fields can't be empty.",
        )];
        return Ok(Outcome::Render(Page::NewEvent(context)));
    }

    let Some(token) = access_token(services, session).await? else {
        return Ok(Outcome::Redirect(Route::SignIn));
    };

    let event = NewEvent {
        attendees: parse_attendees(&form.attendees),
        body: (!form.body.is_empty()).then_some(form.body),
        subject: form.subject,
        start: form.start,
        end: form.end,
        time_zone: context.user.time_zone.clone(),
    };

    services.graph.create_event(&token, &event).await?;

    Ok(Outcome::Redirect(Route::Calendar))
}
