//! Serde shapes of the chat backend's JSON payloads and their conversion
//! into domain records.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::{
    message::{RawAttachment, RawMessage, TicketOrigin},
    pagination::PaginationCursor,
};

/// Every response is wrapped as `{code, message, data, pagination?}`; only
/// the payload and the cursor are read.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(default)]
    pub pagination: Option<WirePagination>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct WirePagination {
    pub current_page: u32,
    pub last_page: u32,
}

impl From<WirePagination> for PaginationCursor {
    fn from(value: WirePagination) -> Self {
        PaginationCursor::new(value.current_page, value.last_page)
    }
}

#[derive(Debug, Deserialize)]
pub struct WireBroadcast {
    pub sent_count: u32,
}

#[derive(Debug, Deserialize)]
pub struct WireUnreadCount {
    pub unread_count: u32,
}

/// Error bodies carry a human-readable `message`.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WireSender {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// One chat or ticket message. Chat messages carry split attachment
/// columns; ticket messages carry a single `attachment` path or URL.
#[derive(Debug, Deserialize)]
pub struct WireMessage {
    pub id: i64,
    pub sender_id: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub attachment: Option<String>,
    #[serde(default)]
    pub attachment_url: Option<String>,
    #[serde(default)]
    pub attachment_path: Option<String>,
    #[serde(default)]
    pub attachment_name: Option<String>,
    #[serde(default)]
    pub attachment_type: Option<String>,
    #[serde(default)]
    pub read_at: Option<Value>,
    #[serde(default)]
    pub created_at: Option<Value>,
    #[serde(default)]
    pub sender: Option<WireSender>,
}

impl WireMessage {
    pub fn into_raw(self) -> RawMessage {
        let attachment = self.raw_attachment();
        let sender = self.sender.unwrap_or_default();

        RawMessage {
            id: self.id,
            sender_id: self.sender_id,
            sender_name: sender.full_name.filter(|name| !name.trim().is_empty()),
            sender_avatar: sender.avatar.filter(|avatar| !avatar.is_empty()),
            body: self.message,
            attachment,
            created_at: self.created_at.as_ref().and_then(parse_timestamp),
            read_at: self.read_at.as_ref().and_then(parse_timestamp),
        }
    }

    fn raw_attachment(&self) -> Option<RawAttachment> {
        let (mut url, mut path) = (
            non_empty(&self.attachment_url),
            non_empty(&self.attachment_path),
        );

        if let Some(single) = non_empty(&self.attachment) {
            if single.starts_with("http://") || single.starts_with("https://") {
                url = url.or(Some(single));
            } else {
                path = path.or(Some(single));
            }
        }

        let name = non_empty(&self.attachment_name).or_else(|| {
            url.as_deref()
                .or(path.as_deref())
                .and_then(|location| location.rsplit('/').next())
                .filter(|segment| !segment.is_empty())
                .map(str::to_owned)
        });

        if url.is_none() && path.is_none() && name.is_none() {
            return None;
        }

        Some(RawAttachment {
            url,
            path,
            name,
            mime_type: non_empty(&self.attachment_type),
        })
    }
}

/// A ticket with its reply thread, oldest reply first.
#[derive(Debug, Deserialize)]
pub struct WireTicket {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<Value>,
    #[serde(default)]
    pub messages: Option<Vec<WireMessage>>,
}

impl WireTicket {
    /// Replies newest-first, plus the description as the thread's origin.
    pub fn into_parts(self) -> (Vec<RawMessage>, Option<TicketOrigin>) {
        let origin = self
            .description
            .filter(|description| !description.trim().is_empty())
            .map(|description| TicketOrigin {
                description,
                created_at: self.created_at.as_ref().and_then(parse_timestamp),
            });

        let records = self
            .messages
            .unwrap_or_default()
            .into_iter()
            .rev()
            .map(WireMessage::into_raw)
            .collect();

        (records, origin)
    }
}

/// Accepts ISO-8601 strings and unix seconds. Anything else is `None`.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(number) => {
            let seconds = number
                .as_i64()
                .or_else(|| number.as_f64().map(|seconds| seconds as i64))?;
            Utc.timestamp_opt(seconds, 0).single()
        }
        Value::String(text) => parse_text_timestamp(text),
        _ => None,
    }
}

fn parse_text_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }

    // Zone-less database format, stored as UTC by the backend.
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}
