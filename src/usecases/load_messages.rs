use crate::{
    domain::conversation::ConversationRef,
    usecases::contracts::{GatewayError, MessageGateway, MessagePage},
};

const FIRST_PAGE: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadMessagesQuery {
    pub conversation: ConversationRef,
    pub page: u32,
}

impl LoadMessagesQuery {
    pub fn first_page(conversation: ConversationRef) -> Self {
        Self {
            conversation,
            page: FIRST_PAGE,
        }
    }

    pub fn page(conversation: ConversationRef, page: u32) -> Self {
        Self { conversation, page }
    }

    fn normalized_page(&self) -> u32 {
        self.page.max(FIRST_PAGE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadMessagesError {
    Unauthorized,
    TemporarilyUnavailable,
    DataContractViolation,
    ConversationNotFound,
    Rejected(String),
}

impl LoadMessagesError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized => "Your session has expired. Please sign in again.".to_owned(),
            Self::TemporarilyUnavailable => {
                "Network error. Please check your internet connection.".to_owned()
            }
            Self::DataContractViolation => "Failed to load messages".to_owned(),
            Self::ConversationNotFound => "This conversation is no longer available.".to_owned(),
            Self::Rejected(message) => message.clone(),
        }
    }
}

impl std::fmt::Display for LoadMessagesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.user_message())
    }
}

impl std::error::Error for LoadMessagesError {}

pub async fn load_messages(
    gateway: &dyn MessageGateway,
    query: LoadMessagesQuery,
) -> Result<MessagePage, LoadMessagesError> {
    let page = query.normalized_page();
    gateway
        .fetch_page(&query.conversation, page)
        .await
        .map_err(map_gateway_error)
}

pub(crate) fn map_gateway_error(error: GatewayError) -> LoadMessagesError {
    match error {
        GatewayError::Unauthorized => LoadMessagesError::Unauthorized,
        GatewayError::NotFound => LoadMessagesError::ConversationNotFound,
        GatewayError::Unavailable(_) => LoadMessagesError::TemporarilyUnavailable,
        GatewayError::InvalidData(_) | GatewayError::AttachmentUnreadable(_) => {
            LoadMessagesError::DataContractViolation
        }
        GatewayError::Rejected { message, .. } => LoadMessagesError::Rejected(message),
    }
}
