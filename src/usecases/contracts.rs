//! Boundary to the remote chat backend.

use async_trait::async_trait;

use crate::domain::{
    composer::{AttachmentDraft, MessageDraft},
    conversation::ConversationRef,
    message::{RawMessage, TicketOrigin},
    pagination::PaginationCursor,
};

/// One page of history, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessagePage {
    pub records: Vec<RawMessage>,
    /// `None` for conversations the backend does not paginate.
    pub pagination: Option<PaginationCursor>,
    /// Present for ticket threads only.
    pub origin: Option<TicketOrigin>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub body: Option<String>,
    pub attachment: Option<AttachmentDraft>,
}

impl From<&MessageDraft> for OutgoingMessage {
    fn from(draft: &MessageDraft) -> Self {
        Self {
            body: draft.body.clone(),
            attachment: draft.attachment.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("not authorized")]
    Unauthorized,
    #[error("conversation not found")]
    NotFound,
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("unexpected response: {0}")]
    InvalidData(String),
    #[error("request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("attachment could not be read: {0}")]
    AttachmentUnreadable(String),
}

#[async_trait]
pub trait MessageGateway: Send + Sync {
    async fn fetch_page(
        &self,
        conversation: &ConversationRef,
        page: u32,
    ) -> Result<MessagePage, GatewayError>;

    /// Submits one message. Never retried by callers.
    async fn send_message(
        &self,
        conversation: &ConversationRef,
        message: OutgoingMessage,
    ) -> Result<RawMessage, GatewayError>;

    /// Sends one text to every member of a group. Returns how many
    /// recipients the backend delivered it to.
    async fn broadcast(&self, group_id: i64, body: &str) -> Result<u32, GatewayError>;

    /// Unread private messages across all conversations of the signed-in user.
    async fn unread_count(&self) -> Result<u32, GatewayError>;
}
