use std::fmt;

use chrono::{DateTime, Utc};

const TEMPORARY_ID_PREFIX: &str = "temp-";
const TICKET_ORIGIN_ID: &str = "ticket-desc";

/// Attachment descriptor as delivered by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawAttachment {
    /// Absolute URL, when the backend already resolved one.
    pub url: Option<String>,
    /// Storage path relative to the asset base URL.
    pub path: Option<String>,
    pub name: Option<String>,
    pub mime_type: Option<String>,
}

/// A server-side message record, normalized across conversation kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    pub id: i64,
    pub sender_id: i64,
    pub sender_name: Option<String>,
    pub sender_avatar: Option<String>,
    pub body: Option<String>,
    pub attachment: Option<RawAttachment>,
    pub created_at: Option<DateTime<Utc>>,
    pub read_at: Option<DateTime<Utc>>,
}

/// The description a ticket was opened with, shown as the first entry of its thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketOrigin {
    pub description: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Display identity of a buffered message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(String);

impl MessageId {
    pub fn server(id: i64) -> Self {
        Self(id.to_string())
    }

    /// Temporary id for an optimistic entry, stamped with unix milliseconds.
    pub fn temporary(stamp_ms: i64) -> Self {
        Self(format!("{TEMPORARY_ID_PREFIX}{stamp_ms}"))
    }

    pub fn ticket_origin() -> Self {
        Self(TICKET_ORIGIN_ID.to_owned())
    }

    pub fn is_temporary(&self) -> bool {
        self.0.starts_with(TEMPORARY_ID_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageDirection {
    Sent,
    Received,
    /// Reserved for synthetic entries that belong to neither side. Nothing
    /// maps to it today: the ticket origin is shown as `Sent`.
    System,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayAttachment {
    /// `None` while the upload is still in flight.
    pub url: Option<String>,
    pub name: String,
}

/// Render-ready projection of a raw message or an optimistic send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayMessage {
    pub id: MessageId,
    pub direction: MessageDirection,
    pub sender_label: Option<String>,
    pub sender_avatar: Option<String>,
    pub body: String,
    pub attachment: Option<DisplayAttachment>,
    pub formatted_time: String,
    pub created_at: Option<DateTime<Utc>>,
    pub is_read: bool,
}

impl DisplayMessage {
    pub fn is_optimistic(&self) -> bool {
        self.id.is_temporary()
    }

    /// Returns the body with an attachment marker, for single-line rendering.
    pub fn display_content(&self) -> String {
        match (&self.attachment, self.body.is_empty()) {
            (Some(attachment), true) => format!("[{}]", attachment.name),
            (Some(attachment), false) => format!("[{}] {}", attachment.name, self.body),
            (None, _) => self.body.clone(),
        }
    }
}
