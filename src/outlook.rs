//! Read-only Outlook calendar access through Microsoft Graph.
//!
//! The browser performs the OAuth flow and forwards its access token in the
//! `X-Outlook-Token` header; this module only lists events with it.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use headers::{Header, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::domain::calendar::OnCalendar;

const EVENT_FIELDS: &str = "id,subject,start,end,location,bodyPreview,isAllDay";
const PAGE_SIZE: &str = "500";

#[derive(Debug, thiserror::Error)]
pub enum OutlookError {
    #[error("Graph request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Graph returned HTTP {0}")]
    Status(u16),

    #[error("Graph event {id} has an unreadable date: {value}")]
    Date { id: String, value: String },
}

// --- Header ---

static OUTLOOK_TOKEN: HeaderName = HeaderName::from_static("x-outlook-token");

/// Graph access token forwarded by the client.
#[derive(Debug, Clone)]
pub struct OutlookToken(pub String);

impl Header for OutlookToken {
    fn name() -> &'static HeaderName {
        &OUTLOOK_TOKEN
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        I: Iterator<Item = &'i HeaderValue>,
    {
        let token = values
            .next()
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(headers::Error::invalid)?;
        Ok(OutlookToken(token.to_owned()))
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        if let Ok(value) = HeaderValue::from_str(&self.0) {
            values.extend(std::iter::once(value));
        }
    }
}

// --- Events ---

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlookEvent {
    pub id: String,
    pub subject: String,
    /// UTC, as Graph reports it without a `Prefer: outlook.timezone` header.
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub location: Option<String>,
    pub body_preview: Option<String>,
    pub is_all_day: bool,
}

impl OnCalendar for OutlookEvent {
    fn calendar_date(&self) -> Option<NaiveDate> {
        Some(self.start.date())
    }
}

#[derive(Debug, Deserialize)]
struct GraphPage {
    value: Vec<GraphEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphEvent {
    id: String,
    subject: Option<String>,
    start: GraphDateTime,
    end: GraphDateTime,
    location: Option<GraphLocation>,
    body_preview: Option<String>,
    #[serde(default)]
    is_all_day: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphDateTime {
    date_time: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphLocation {
    display_name: Option<String>,
}

impl TryFrom<GraphEvent> for OutlookEvent {
    type Error = OutlookError;

    fn try_from(event: GraphEvent) -> Result<Self, Self::Error> {
        let start = parse_graph_time(&event.id, &event.start.date_time)?;
        let end = parse_graph_time(&event.id, &event.end.date_time)?;
        Ok(OutlookEvent {
            subject: event.subject.unwrap_or_default(),
            start,
            end,
            location: event
                .location
                .and_then(|l| l.display_name)
                .filter(|n| !n.is_empty()),
            body_preview: event.body_preview.filter(|b| !b.is_empty()),
            is_all_day: event.is_all_day,
            id: event.id,
        })
    }
}

fn parse_graph_time(id: &str, value: &str) -> Result<NaiveDateTime, OutlookError> {
    // Graph sends seven fractional digits, e.g. 2025-03-14T09:30:00.0000000
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").map_err(|_| OutlookError::Date {
        id: id.to_string(),
        value: value.to_string(),
    })
}

// --- Client ---

#[derive(Debug, Clone)]
pub struct OutlookClient {
    http: reqwest::Client,
    base_url: String,
}

impl OutlookClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Events starting between `from` and `to`, both days inclusive.
    pub async fn calendar_view(
        &self,
        token: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<OutlookEvent>, OutlookError> {
        let start = from.and_time(NaiveTime::MIN).and_utc().to_rfc3339();
        let end = to
            .succ_opt()
            .unwrap_or(to)
            .and_time(NaiveTime::MIN)
            .and_utc()
            .to_rfc3339();

        let response = self
            .http
            .get(format!("{}/me/calendarView", self.base_url))
            .bearer_auth(token)
            .query(&[
                ("startDateTime", start.as_str()),
                ("endDateTime", end.as_str()),
                ("$select", EVENT_FIELDS),
                ("$orderby", "start/dateTime"),
                ("$top", PAGE_SIZE),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OutlookError::Status(status.as_u16()));
        }

        let page: GraphPage = response.json().await?;
        page.value.into_iter().map(OutlookEvent::try_from).collect()
    }
}
