//! Use case for submitting one message to a conversation.
//!
//! Validates the draft against what the conversation accepts and maps
//! gateway failures into user-facing errors. Optimistic bookkeeping lives in
//! the session, which calls into this module for the network step.

use crate::{
    domain::{conversation::ConversationRef, message::RawMessage},
    usecases::contracts::{GatewayError, MessageGateway, OutgoingMessage},
};

/// Errors that prevent a message from being sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendMessageError {
    /// Neither text nor attachment to send.
    EmptyMessage,
    /// The conversation only accepts text replies.
    AttachmentNotSupported,
    /// The staged file could not be read from disk.
    AttachmentUnreadable(String),
    Unauthorized,
    ConversationNotFound,
    TemporarilyUnavailable,
    DataContractViolation,
    Rejected(String),
}

impl SendMessageError {
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyMessage => "Type a message or pick a file to send.".to_owned(),
            Self::AttachmentNotSupported => {
                "Attachments cannot be sent in this conversation.".to_owned()
            }
            Self::AttachmentUnreadable(name) => format!("Could not read attachment {name}."),
            Self::Unauthorized => "Your session has expired. Please sign in again.".to_owned(),
            Self::ConversationNotFound => "This conversation is no longer available.".to_owned(),
            Self::TemporarilyUnavailable => {
                "Network error. Please check your internet connection.".to_owned()
            }
            Self::DataContractViolation => "Failed to send message".to_owned(),
            Self::Rejected(message) => message.clone(),
        }
    }
}

impl std::fmt::Display for SendMessageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.user_message())
    }
}

impl std::error::Error for SendMessageError {}

/// Checks that `message` can be submitted to `conversation`.
pub fn validate_outgoing(
    conversation: &ConversationRef,
    message: &OutgoingMessage,
) -> Result<(), SendMessageError> {
    let has_text = message
        .body
        .as_deref()
        .is_some_and(|body| !body.trim().is_empty());

    if !has_text && message.attachment.is_none() {
        return Err(SendMessageError::EmptyMessage);
    }

    if message.attachment.is_some() && !conversation.supports_attachments() {
        return Err(SendMessageError::AttachmentNotSupported);
    }

    Ok(())
}

/// Sends a message with exactly one gateway call, after validation.
pub async fn send_message(
    gateway: &dyn MessageGateway,
    conversation: &ConversationRef,
    message: OutgoingMessage,
) -> Result<RawMessage, SendMessageError> {
    validate_outgoing(conversation, &message)?;

    let message = OutgoingMessage {
        body: message
            .body
            .map(|body| body.trim().to_owned())
            .filter(|body| !body.is_empty()),
        attachment: message.attachment,
    };

    gateway
        .send_message(conversation, message)
        .await
        .map_err(map_gateway_error)
}

pub(crate) fn map_gateway_error(error: GatewayError) -> SendMessageError {
    match error {
        GatewayError::Unauthorized => SendMessageError::Unauthorized,
        GatewayError::NotFound => SendMessageError::ConversationNotFound,
        GatewayError::Unavailable(_) => SendMessageError::TemporarilyUnavailable,
        GatewayError::InvalidData(_) => SendMessageError::DataContractViolation,
        GatewayError::Rejected { message, .. } => SendMessageError::Rejected(message),
        GatewayError::AttachmentUnreadable(name) => SendMessageError::AttachmentUnreadable(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::composer::AttachmentDraft,
        test_support::{raw_message, ScriptedGateway},
    };

    fn group() -> ConversationRef {
        ConversationRef::Group { group_id: 3 }
    }

    fn text(body: &str) -> OutgoingMessage {
        OutgoingMessage {
            body: Some(body.to_owned()),
            attachment: None,
        }
    }

    fn attachment_only() -> OutgoingMessage {
        OutgoingMessage {
            body: None,
            attachment: Some(AttachmentDraft::from_path("/tmp/notes.pdf", None)),
        }
    }

    #[tokio::test]
    async fn rejects_empty_message_without_network_call() {
        let gateway = ScriptedGateway::default();

        let result = send_message(&gateway, &group(), text("   \n\t  ")).await;

        assert_eq!(result, Err(SendMessageError::EmptyMessage));
        assert!(gateway.sent_messages().is_empty());
    }

    #[tokio::test]
    async fn trims_whitespace_before_sending() {
        let gateway = ScriptedGateway::default();
        gateway.push_send(Ok(raw_message(10, 7)));

        send_message(&gateway, &group(), text("  hello world  "))
            .await
            .expect("send should succeed");

        assert_eq!(
            gateway.sent_messages()[0].1.body.as_deref(),
            Some("hello world")
        );
    }

    #[tokio::test]
    async fn attachment_only_message_is_accepted() {
        let gateway = ScriptedGateway::default();
        gateway.push_send(Ok(raw_message(10, 7)));

        let result = send_message(&gateway, &group(), attachment_only()).await;

        assert!(result.is_ok());
        assert_eq!(gateway.sent_messages().len(), 1);
    }

    #[tokio::test]
    async fn ticket_rejects_attachment_before_network_call() {
        let gateway = ScriptedGateway::default();

        let result = send_message(
            &gateway,
            &ConversationRef::Ticket { ticket_id: 1 },
            attachment_only(),
        )
        .await;

        assert_eq!(result, Err(SendMessageError::AttachmentNotSupported));
        assert!(gateway.sent_messages().is_empty());
    }

    #[tokio::test]
    async fn returns_confirmed_record() {
        let gateway = ScriptedGateway::default();
        gateway.push_send(Ok(raw_message(10, 7)));

        let record = send_message(&gateway, &group(), text("hello"))
            .await
            .expect("send should succeed");

        assert_eq!(record.id, 10);
    }

    #[tokio::test]
    async fn maps_unauthorized_error() {
        let gateway = ScriptedGateway::default();
        gateway.push_send(Err(GatewayError::Unauthorized));

        let result = send_message(&gateway, &group(), text("hello")).await;

        assert_eq!(result, Err(SendMessageError::Unauthorized));
    }

    #[tokio::test]
    async fn maps_unreadable_attachment_error() {
        let gateway = ScriptedGateway::default();
        gateway.push_send(Err(GatewayError::AttachmentUnreadable(
            "notes.pdf".to_owned(),
        )));

        let result = send_message(&gateway, &group(), attachment_only()).await;

        assert_eq!(
            result,
            Err(SendMessageError::AttachmentUnreadable("notes.pdf".to_owned()))
        );
    }

    #[tokio::test]
    async fn maps_unavailable_error() {
        let gateway = ScriptedGateway::default();
        gateway.push_send(Err(GatewayError::Unavailable("reset".to_owned())));

        let result = send_message(&gateway, &group(), text("hello")).await;

        assert_eq!(result, Err(SendMessageError::TemporarilyUnavailable));
    }
}
