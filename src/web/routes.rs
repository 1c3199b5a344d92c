use super::session::{finish, load_session};
use super::AppState;
use crate::components::identity::CallbackParams;
use crate::error::AppResult;
use crate::handlers::{self, NewEventForm};
use axum::extract::{Form, Query, State};
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;

/// Handler for the home page
pub async fn home_handler(State(state): State<AppState>, jar: CookieJar) -> AppResult<Response> {
    let mut session = load_session(&state, &jar).await?;
    let outcome = handlers::home(&mut session).await?;
    finish(&state, jar, session, outcome).await
}

/// Handler that starts a sign-in
pub async fn sign_in_handler(State(state): State<AppState>, jar: CookieJar) -> AppResult<Response> {
    let mut session = load_session(&state, &jar).await?;
    let outcome = handlers::sign_in(&state.services, &mut session).await?;
    finish(&state, jar, session, outcome).await
}

/// Handler for the redirect back from the identity platform
pub async fn callback_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> AppResult<Response> {
    let mut session = load_session(&state, &jar).await?;
    let outcome = handlers::callback(&state.services, &mut session, params).await?;
    finish(&state, jar, session, outcome).await
}

/// Same as [`callback_handler`] for `response_mode=form_post`
pub async fn callback_form_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(params): Form<CallbackParams>,
) -> AppResult<Response> {
    let mut session = load_session(&state, &jar).await?;
    let outcome = handlers::callback(&state.services, &mut session, params).await?;
    finish(&state, jar, session, outcome).await
}

/// Handler for signing out
pub async fn sign_out_handler(State(state): State<AppState>, jar: CookieJar) -> AppResult<Response> {
    let mut session = load_session(&state, &jar).await?;
    let outcome = handlers::sign_out(&state.services, &mut session).await?;
    finish(&state, jar, session, outcome).await
}

/// Handler for the week view
pub async fn calendar_handler(State(state): State<AppState>, jar: CookieJar) -> AppResult<Response> {
    let mut session = load_session(&state, &jar).await?;
    let outcome = handlers::calendar(&state.services, &mut session, Utc::now()).await?;
    finish(&state, jar, session, outcome).await
}

/// Handler for the new-event form page
pub async fn new_event_form_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<Response> {
    let mut session = load_session(&state, &jar).await?;
    let outcome = handlers::new_event(&state.services, &mut session, None).await?;
    finish(&state, jar, session, outcome).await
}

/// Handler for new-event form submission
pub async fn new_event_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<NewEventForm>,
) -> AppResult<Response> {
    let mut session = load_session(&state, &jar).await?;
    let outcome = handlers::new_event(&state.services, &mut session, Some(form)).await?;
    finish(&state, jar, session, outcome).await
}

// Handler for API health check
pub async fn health_handler() -> &'static str {
    "OK"
}
