mod client;
pub mod models;
pub mod timezones;

pub use client::GraphClient;
pub use models::{Event, EventView, GraphUser, NewEvent, ProfilePhoto};

use crate::error::AppResult;
use async_trait::async_trait;

/// Calendar and profile access for the signed-in user
#[async_trait]
pub trait CalendarApi: Send + Sync + 'static {
    /// Profile of the user the token belongs to
    async fn get_user(&self, token: &str) -> AppResult<GraphUser>;

    /// Profile photo, `None` when the user has not set one
    async fn get_photo(&self, token: &str, user: &GraphUser) -> AppResult<Option<ProfilePhoto>>;

    /// Events between `start` and `end`, times reported in `time_zone`
    async fn get_calendar_events(
        &self,
        token: &str,
        start: &str,
        end: &str,
        time_zone: &str,
    ) -> AppResult<Vec<Event>>;

    async fn create_event(&self, token: &str, event: &NewEvent) -> AppResult<()>;
}
