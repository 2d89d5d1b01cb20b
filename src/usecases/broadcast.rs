//! Use case for sending one text to every member of a group.

use crate::usecases::{
    contracts::MessageGateway,
    send_message::{map_gateway_error, SendMessageError},
};

/// Result of a broadcast that the backend accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReceipt {
    pub group_id: i64,
    pub sent_count: u32,
}

/// Broadcasts trimmed `text` with exactly one gateway call. Text only.
pub async fn broadcast_message(
    gateway: &dyn MessageGateway,
    group_id: i64,
    text: &str,
) -> Result<BroadcastReceipt, SendMessageError> {
    let body = text.trim();
    if body.is_empty() {
        return Err(SendMessageError::EmptyMessage);
    }

    let sent_count = gateway
        .broadcast(group_id, body)
        .await
        .map_err(map_gateway_error)?;

    tracing::info!(group_id, sent_count, "broadcast delivered");

    Ok(BroadcastReceipt {
        group_id,
        sent_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test_support::ScriptedGateway, usecases::contracts::GatewayError};

    #[tokio::test]
    async fn rejects_blank_text_without_network_call() {
        let gateway = ScriptedGateway::default();

        let result = broadcast_message(&gateway, 3, " \n ").await;

        assert_eq!(result, Err(SendMessageError::EmptyMessage));
        assert!(gateway.broadcasts().is_empty());
    }

    #[tokio::test]
    async fn sends_trimmed_text_and_returns_sent_count() {
        let gateway = ScriptedGateway::default();
        gateway.push_broadcast(Ok(12));

        let receipt = broadcast_message(&gateway, 3, "  quiz moved to Friday  ")
            .await
            .expect("broadcast should succeed");

        assert_eq!(
            receipt,
            BroadcastReceipt {
                group_id: 3,
                sent_count: 12
            }
        );
        assert_eq!(
            gateway.broadcasts(),
            vec![(3, "quiz moved to Friday".to_owned())]
        );
    }

    #[tokio::test]
    async fn maps_backend_rejection() {
        let gateway = ScriptedGateway::default();
        gateway.push_broadcast(Err(GatewayError::Rejected {
            status: 403,
            message: "Only instructors can broadcast.".to_owned(),
        }));

        let result = broadcast_message(&gateway, 3, "hello").await;

        assert_eq!(
            result,
            Err(SendMessageError::Rejected(
                "Only instructors can broadcast.".to_owned()
            ))
        );
    }
}
