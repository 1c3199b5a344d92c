use crate::session::{ErrorMessage, Session, SessionUser};

/// URL prefix profile photos are served under
pub const PHOTO_URL_PREFIX: &str = "/photos";

/// Data every page template gets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    pub errors: Vec<ErrorMessage>,
    pub user: SessionUser,
}

impl PageContext {
    pub fn has_photo(&self) -> bool {
        self.user.pfp_name.is_some()
    }

    /// Link to the cached profile photo, empty when there is none
    pub fn photo_url(&self) -> String {
        self.user
            .pfp_name
            .as_ref()
            .map(|name| format!("{}/{}", PHOTO_URL_PREFIX, urlencoding::encode(name)))
            .unwrap_or_default()
    }
}

/// Build the page context for a request.
///
/// Consumes the session's flash error so it shows up exactly once.
pub fn initialize_context(session: &mut Session) -> PageContext {
    let errors = session.take_flash_error().into_iter().collect();
    let user = session.user().cloned().unwrap_or_default();

    PageContext { errors, user }
}
