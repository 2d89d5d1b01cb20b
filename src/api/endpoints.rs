use crate::domain::conversation::ConversationRef;

/// Path of the resource that lists a conversation's messages.
pub fn fetch_path(conversation: &ConversationRef, page: u32) -> String {
    match conversation {
        ConversationRef::Private { group_id, user_id } => {
            format!("/groups/{group_id}/messages/{user_id}?page={page}")
        }
        ConversationRef::Group { group_id } => format!("/groups/{group_id}/chat?page={page}"),
        // Ticket threads are returned whole.
        ConversationRef::Ticket { ticket_id } => format!("/tickets/{ticket_id}"),
    }
}

/// Path that accepts a new message for a conversation.
pub fn send_path(conversation: &ConversationRef) -> String {
    match conversation {
        ConversationRef::Private { group_id, user_id } => {
            format!("/groups/{group_id}/messages/{user_id}")
        }
        ConversationRef::Group { group_id } => format!("/groups/{group_id}/chat"),
        ConversationRef::Ticket { ticket_id } => format!("/tickets/{ticket_id}/reply"),
    }
}

pub const UNREAD_COUNT_PATH: &str = "/messages/unread";

pub fn broadcast_path(group_id: i64) -> String {
    format!("/groups/{group_id}/broadcast")
}

pub fn join(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}
