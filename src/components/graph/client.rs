use super::models::{Event, EventPage, GraphUser, NewEvent, ProfilePhoto};
use super::CalendarApi;
use crate::error::{graph_error, AppResult};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, info};
use url::Url;

/// Microsoft Graph v1.0 endpoint
pub const GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// Upper bound on events shown in the week view
const CALENDAR_PAGE_SIZE: &str = "50";

/// Microsoft Graph REST client
#[derive(Clone)]
pub struct GraphClient {
    base_url: String,
    client: Client,
}

impl GraphClient {
    pub fn new() -> Self {
        Self::with_base_url(GRAPH_BASE_URL)
    }

    /// Client against another Graph-compatible endpoint
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> AppResult<Url> {
        Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| graph_error(&format!("Failed to parse URL: {}", e)))
    }

    /// Turn a non-success response into an error carrying its body
    async fn check(response: Response, what: &str) -> AppResult<Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error response".to_string());
        Err(graph_error(&format!(
            "Failed to {}: HTTP {} - {}",
            what, status, error_body
        )))
    }
}

impl Default for GraphClient {
    fn default() -> Self {
        Self::new()
    }
}

/// File extension for a photo content type
fn photo_extension(content_type: &str) -> &'static str {
    match content_type.split(';').next().map(str::trim) {
        Some("image/png") => "png",
        Some("image/gif") => "gif",
        Some("image/bmp") => "bmp",
        _ => "jpg",
    }
}

/// Photo file name derived from the user id, safe to use as a path segment
pub fn photo_file_name(user_id: &str, content_type: &str) -> String {
    let stem: String = user_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    let stem = if stem.is_empty() { "profile".to_string() } else { stem };
    format!("{}.{}", stem, photo_extension(content_type))
}

#[async_trait]
impl CalendarApi for GraphClient {
    async fn get_user(&self, token: &str) -> AppResult<GraphUser> {
        let mut url = self.url("/me")?;
        url.query_pairs_mut().append_pair(
            "$select",
            "displayName,mail,mailboxSettings,userPrincipalName,id",
        );

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| graph_error(&format!("Failed to fetch user: {}", e)))?;

        let response = Self::check(response, "fetch user").await?;
        response
            .json()
            .await
            .map_err(|e| graph_error(&format!("Failed to parse user response: {}", e)))
    }

    async fn get_photo(&self, token: &str, user: &GraphUser) -> AppResult<Option<ProfilePhoto>> {
        let url = self.url("/me/photo/$value")?;

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| graph_error(&format!("Failed to fetch photo: {}", e)))?;

        // Accounts without a photo answer 404
        if response.status() == StatusCode::NOT_FOUND {
            debug!("User {} has no profile photo", user.id);
            return Ok(None);
        }

        let response = Self::check(response, "fetch photo").await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| graph_error(&format!("Failed to read photo: {}", e)))?;
        if bytes.is_empty() {
            return Ok(None);
        }

        Ok(Some(ProfilePhoto {
            bytes,
            file_name: photo_file_name(&user.id, &content_type),
        }))
    }

    async fn get_calendar_events(
        &self,
        token: &str,
        start: &str,
        end: &str,
        time_zone: &str,
    ) -> AppResult<Vec<Event>> {
        let mut url = self.url("/me/calendarview")?;
        url.query_pairs_mut()
            .append_pair("startDateTime", start)
            .append_pair("endDateTime", end)
            .append_pair("$select", "subject,organizer,start,end")
            .append_pair("$orderby", "start/dateTime")
            .append_pair("$top", CALENDAR_PAGE_SIZE);

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .header("Prefer", format!("outlook.timezone=\"{}\"", time_zone))
            .send()
            .await
            .map_err(|e| graph_error(&format!("Failed to fetch events: {}", e)))?;

        let response = Self::check(response, "fetch events").await?;
        let page: EventPage = response
            .json()
            .await
            .map_err(|e| graph_error(&format!("Failed to parse events response: {}", e)))?;

        debug!("Fetched {} events", page.value.len());
        Ok(page.value)
    }

    async fn create_event(&self, token: &str, event: &NewEvent) -> AppResult<()> {
        let url = self.url("/me/events")?;

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&event.to_graph_json())
            .send()
            .await
            .map_err(|e| graph_error(&format!("Failed to create event: {}", e)))?;

        Self::check(response, "create event").await?;
        info!("Created event '{}'", event.subject);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_file_name() {
        assert_eq!(photo_file_name("48d31887-5fad", "image/jpeg"), "48d31887-5fad.jpg");
        assert_eq!(photo_file_name("abc", "image/png; charset=binary"), "abc.png");
        assert_eq!(photo_file_name("../../etc", "image/jpeg"), "etc.jpg");
        assert_eq!(photo_file_name("", "image/gif"), "profile.gif");
    }

    #[test]
    fn test_base_url_is_trimmed() {
        let client = GraphClient::with_base_url("http://localhost:9000/v1.0/");
        let url = client.url("/me").unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/v1.0/me");
    }
}
