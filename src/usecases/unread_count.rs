use crate::usecases::{
    contracts::MessageGateway,
    load_messages::{map_gateway_error, LoadMessagesError},
};

/// Reads the signed-in user's unread private message count.
pub async fn unread_count(gateway: &dyn MessageGateway) -> Result<u32, LoadMessagesError> {
    gateway.unread_count().await.map_err(map_gateway_error)
}
