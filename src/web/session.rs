use super::views;
use super::AppState;
use crate::error::AppResult;
use crate::handlers::Outcome;
use crate::session::Session;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::debug;

/// Name of the cookie carrying the session id
pub const SESSION_COOKIE: &str = "graph_tutorial_session";

/// Load the session named by the request cookie, or start a new one
pub async fn load_session(state: &AppState, jar: &CookieJar) -> AppResult<Session> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        let id = cookie.value();
        if let Some(data) = state.sessions.load(id).await? {
            return Ok(Session::from_data(id, data));
        }
        debug!("Session cookie refers to an unknown session, starting over");
    }

    Ok(Session::new())
}

/// Persist the session if a handler changed it and turn the outcome into a response
pub async fn finish(
    state: &AppState,
    jar: CookieJar,
    session: Session,
    outcome: Outcome,
) -> AppResult<Response> {
    let jar = if session.is_modified() {
        state.sessions.save(session.id(), session.data()).await?;
        if let Some(old_id) = session.replaced_id() {
            debug!("Session moved to a new id, dropping the old one");
            state.sessions.delete(old_id).await?;
        }

        let ttl = i64::try_from(state.session_ttl_seconds).unwrap_or(i64::MAX);
        let cookie = Cookie::build((SESSION_COOKIE, session.id().to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(ttl));
        jar.add(cookie)
    } else {
        jar
    };

    let response = match outcome {
        Outcome::Redirect(route) => Redirect::to(route.path()).into_response(),
        Outcome::Render(page) => Html(views::render(page)?).into_response(),
    };

    Ok((jar, response).into_response())
}
