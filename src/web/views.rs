use crate::components::graph::EventView;
use crate::error::AppResult;
use crate::handlers::{Page, PageContext};
use askama::Template;

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub ctx: PageContext,
}

#[derive(Template)]
#[template(path = "calendar.html")]
pub struct CalendarTemplate {
    pub ctx: PageContext,
    /// False when the event fetch produced nothing to show
    pub loaded: bool,
    pub events: Vec<EventView>,
}

#[derive(Template)]
#[template(path = "newevent.html")]
pub struct NewEventTemplate {
    pub ctx: PageContext,
}

/// Render a page to HTML
pub fn render(page: Page) -> AppResult<String> {
    let html = match page {
        Page::Home(ctx) => HomeTemplate { ctx }.render()?,
        Page::Calendar { context, events } => CalendarTemplate {
            ctx: context,
            loaded: events.is_some(),
            events: events.unwrap_or_default(),
        }
        .render()?,
        Page::NewEvent(ctx) => NewEventTemplate { ctx }.render()?,
    };

    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{ErrorMessage, SessionUser};
    use chrono::NaiveDate;

    fn signed_in() -> PageContext {
        PageContext {
            errors: Vec::new(),
            user: SessionUser {
                is_authenticated: true,
                display_name: "Adele Vance".to_string(),
                email: "adele@contoso.com".to_string(),
                time_zone: "Pacific Standard Time".to_string(),
                pfp_name: Some("adele.jpg".to_string()),
            },
        }
    }

    #[test]
    fn test_home_for_anonymous_user() {
        let html = render(Page::Home(PageContext {
            errors: Vec::new(),
            user: SessionUser::anonymous(),
        }))
        .unwrap();

        assert!(html.contains("href=\"/signin\""));
        assert!(!html.contains("href=\"/signout\""));
    }

    #[test]
    fn test_home_for_signed_in_user() {
        let html = render(Page::Home(signed_in())).unwrap();

        assert!(html.contains("Welcome Adele Vance!"));
        assert!(html.contains("href=\"/signout\""));
        assert!(html.contains("/photos/adele.jpg"));
    }

    #[test]
    fn test_errors_are_escaped() {
        let mut ctx = signed_in();
        ctx.errors.push(ErrorMessage::new("<b>bad</b>", "debug text"));

        let html = render(Page::Home(ctx)).unwrap();
        assert!(html.contains("&lt;b&gt;bad&lt;/b&gt;"));
        assert!(html.contains("debug text"));
    }

    #[test]
    fn test_calendar_lists_events() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 12)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let events = vec![EventView {
            subject: "Standup".to_string(),
            organizer: "Megan Bowen".to_string(),
            start: Some(start),
            end: Some(start + chrono::Duration::minutes(15)),
        }];

        let html = render(Page::Calendar {
            context: signed_in(),
            events: Some(events),
        })
        .unwrap();

        assert!(html.contains("Standup"));
        assert!(html.contains("Megan Bowen"));
        assert!(html.contains("3/12/2024 9:15 AM"));
    }

    #[test]
    fn test_new_event_form_fields() {
        let html = render(Page::NewEvent(signed_in())).unwrap();
        for field in ["ev-subject", "ev-attendees", "ev-start", "ev-end", "ev-body"] {
            assert!(html.contains(&format!("name=\"{}\"", field)), "missing {}", field);
        }
    }
}
