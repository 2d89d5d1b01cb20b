//! Pure conversion of server records into render-ready messages.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Utc};

use super::{
    composer::MessageDraft,
    conversation::ConversationKind,
    message::{
        DisplayAttachment, DisplayMessage, MessageDirection, MessageId, RawAttachment,
        RawMessage, TicketOrigin,
    },
};

const TIME_FORMAT: &str = "%-I:%M %p";
const DEFAULT_ATTACHMENT_NAME: &str = "Attachment";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayMapper {
    current_user_id: i64,
    asset_base_url: String,
    offset: FixedOffset,
    kind: ConversationKind,
}

impl DisplayMapper {
    pub fn new(
        current_user_id: i64,
        asset_base_url: &str,
        offset: FixedOffset,
        kind: ConversationKind,
    ) -> Self {
        Self {
            current_user_id,
            asset_base_url: asset_base_url.trim_end_matches('/').to_owned(),
            offset,
            kind,
        }
    }

    pub fn map(&self, raw: &RawMessage) -> DisplayMessage {
        let direction = if raw.sender_id == self.current_user_id {
            MessageDirection::Sent
        } else {
            MessageDirection::Received
        };
        let received = direction == MessageDirection::Received;

        DisplayMessage {
            id: MessageId::server(raw.id),
            direction,
            sender_label: received.then(|| self.sender_label(raw.sender_name.as_deref())),
            sender_avatar: raw
                .sender_avatar
                .as_deref()
                .filter(|avatar| received && !avatar.is_empty())
                .map(|avatar| self.resolve_url(avatar)),
            body: raw.body.clone().unwrap_or_default(),
            attachment: raw
                .attachment
                .as_ref()
                .and_then(|attachment| self.attachment(attachment)),
            formatted_time: self.format_time(raw.created_at),
            created_at: raw.created_at,
            is_read: raw.read_at.is_some(),
        }
    }

    /// Builds the placeholder shown while a send is in flight.
    pub fn optimistic(
        &self,
        temp_id: MessageId,
        draft: &MessageDraft,
        now: DateTime<Utc>,
    ) -> DisplayMessage {
        DisplayMessage {
            id: temp_id,
            direction: MessageDirection::Sent,
            sender_label: None,
            sender_avatar: None,
            body: draft.body.clone().unwrap_or_default(),
            attachment: draft.attachment.as_ref().map(|attachment| DisplayAttachment {
                url: None,
                name: attachment.name.clone(),
            }),
            formatted_time: self.format_time(Some(now)),
            created_at: Some(now),
            is_read: false,
        }
    }

    /// The ticket description is rendered as if the owner had sent it.
    pub fn ticket_origin(&self, origin: &TicketOrigin) -> DisplayMessage {
        DisplayMessage {
            id: MessageId::ticket_origin(),
            direction: MessageDirection::Sent,
            sender_label: None,
            sender_avatar: None,
            body: origin.description.clone(),
            attachment: None,
            formatted_time: self.format_time(origin.created_at),
            created_at: origin.created_at,
            is_read: true,
        }
    }

    /// Label for a day separator: "Today", "Yesterday" or e.g. "Mar 4, 2025".
    pub fn day_label(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
        let day = created_at.with_timezone(&self.offset).date_naive();
        let today = now.with_timezone(&self.offset).date_naive();

        if day == today {
            "Today".to_owned()
        } else if Some(day) == today.checked_sub_signed(Duration::days(1)) {
            "Yesterday".to_owned()
        } else {
            format_calendar_day(day)
        }
    }

    fn sender_label(&self, name: Option<&str>) -> String {
        match name.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => name.to_owned(),
            None => match self.kind {
                ConversationKind::Ticket => "Support".to_owned(),
                ConversationKind::Private | ConversationKind::Group => "Unknown".to_owned(),
            },
        }
    }

    fn attachment(&self, raw: &RawAttachment) -> Option<DisplayAttachment> {
        let url = non_empty(raw.url.as_deref())
            .map(str::to_owned)
            .or_else(|| non_empty(raw.path.as_deref()).map(|path| self.resolve_url(path)));
        let name = non_empty(raw.name.as_deref());

        if url.is_none() && name.is_none() {
            return None;
        }

        Some(DisplayAttachment {
            url,
            name: name.unwrap_or(DEFAULT_ATTACHMENT_NAME).to_owned(),
        })
    }

    fn resolve_url(&self, path_or_url: &str) -> String {
        if is_absolute_url(path_or_url) {
            return path_or_url.to_owned();
        }

        format!(
            "{}/{}",
            self.asset_base_url,
            path_or_url.trim_start_matches('/')
        )
    }

    fn format_time(&self, at: Option<DateTime<Utc>>) -> String {
        at.map(|at| at.with_timezone(&self.offset).format(TIME_FORMAT).to_string())
            .unwrap_or_default()
    }
}

fn format_calendar_day(day: NaiveDate) -> String {
    format!("{} {}, {}", day.format("%b"), day.day(), day.year())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn is_absolute_url(value: &str) -> bool {
    let lowered = value.to_ascii_lowercase();
    lowered.starts_with("http://") || lowered.starts_with("https://")
}
