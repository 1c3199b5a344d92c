use crate::session::SessionUser;
use crate::utils::time::parse_date_time;
use bytes::Bytes;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Profile of the signed-in user as returned by `GET /me`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphUser {
    #[serde(default)]
    pub id: String,
    pub display_name: Option<String>,
    pub mail: Option<String>,
    pub user_principal_name: Option<String>,
    pub mailbox_settings: Option<MailboxSettings>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailboxSettings {
    pub time_zone: Option<String>,
}

impl GraphUser {
    /// Build the session user, personal accounts may have no `mail`
    pub fn to_session_user(&self, pfp_name: Option<String>) -> SessionUser {
        SessionUser {
            is_authenticated: true,
            display_name: self.display_name.clone().unwrap_or_default(),
            email: self
                .mail
                .clone()
                .or_else(|| self.user_principal_name.clone())
                .unwrap_or_default(),
            time_zone: self
                .mailbox_settings
                .as_ref()
                .and_then(|s| s.time_zone.clone())
                .filter(|tz| !tz.is_empty())
                .unwrap_or_else(|| "UTC".to_string()),
            pfp_name,
        }
    }
}

/// Date and time with the zone Graph interpreted it in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateTimeTimeZone {
    pub date_time: String,
    #[serde(default)]
    pub time_zone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    pub name: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub email_address: EmailAddress,
}

/// Calendar view item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub subject: Option<String>,
    pub organizer: Option<Recipient>,
    pub start: DateTimeTimeZone,
    pub end: DateTimeTimeZone,
}

/// One page of a collection response
#[derive(Debug, Clone, Deserialize)]
pub struct EventPage {
    #[serde(default)]
    pub value: Vec<Event>,
}

/// Event with its times parsed for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventView {
    pub subject: String,
    pub organizer: String,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl From<Event> for EventView {
    fn from(event: Event) -> Self {
        let organizer = event
            .organizer
            .and_then(|o| o.email_address.name.or(o.email_address.address))
            .unwrap_or_default();

        Self {
            subject: event.subject.unwrap_or_default(),
            organizer,
            start: parse_date_time(&event.start.date_time),
            end: parse_date_time(&event.end.date_time),
        }
    }
}

impl EventView {
    pub fn start_display(&self) -> String {
        format_display(self.start)
    }

    pub fn end_display(&self) -> String {
        format_display(self.end)
    }
}

fn format_display(value: Option<NaiveDateTime>) -> String {
    value
        .map(|dt| dt.format("%-m/%-d/%Y %-I:%M %p").to_string())
        .unwrap_or_default()
}

/// Event submitted through the new-event form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub subject: String,
    pub start: String,
    pub end: String,
    pub attendees: Option<Vec<String>>,
    pub body: Option<String>,
    pub time_zone: String,
}

impl NewEvent {
    /// Request body for `POST /me/events`
    pub fn to_graph_json(&self) -> Value {
        let mut event = json!({
            "subject": self.subject,
            "start": {
                "dateTime": self.start,
                "timeZone": self.time_zone,
            },
            "end": {
                "dateTime": self.end,
                "timeZone": self.time_zone,
            },
        });

        if let Some(attendees) = &self.attendees {
            event["attendees"] = attendees
                .iter()
                .map(|address| {
                    json!({
                        "emailAddress": { "address": address },
                        "type": "required",
                    })
                })
                .collect();
        }

        if let Some(body) = &self.body {
            event["body"] = json!({
                "contentType": "text",
                "content": body,
            });
        }

        event
    }
}

/// Profile photo downloaded for the signed-in user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilePhoto {
    pub bytes: Bytes,
    pub file_name: String,
}
