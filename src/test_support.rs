use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::Semaphore;

use crate::{
    domain::{conversation::ConversationRef, message::RawMessage},
    usecases::contracts::{GatewayError, MessageGateway, MessagePage, OutgoingMessage},
};

/// Gateway double that replays scripted responses and records every call.
#[derive(Debug, Default)]
pub struct ScriptedGateway {
    pages: Mutex<VecDeque<Result<MessagePage, GatewayError>>>,
    sends: Mutex<VecDeque<Result<RawMessage, GatewayError>>>,
    fetched: Mutex<Vec<(ConversationRef, u32)>>,
    sent: Mutex<Vec<(ConversationRef, OutgoingMessage)>>,
    send_gate: Mutex<Option<Arc<Semaphore>>>,
    broadcast_results: Mutex<VecDeque<Result<u32, GatewayError>>>,
    broadcasts: Mutex<Vec<(i64, String)>>,
    unread_results: Mutex<VecDeque<Result<u32, GatewayError>>>,
}

impl ScriptedGateway {
    pub fn push_page(&self, page: Result<MessagePage, GatewayError>) {
        lock(&self.pages).push_back(page);
    }

    pub fn push_send(&self, result: Result<RawMessage, GatewayError>) {
        lock(&self.sends).push_back(result);
    }

    /// Makes sends wait until a permit is added to the returned semaphore.
    pub fn hold_sends(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *lock(&self.send_gate) = Some(Arc::clone(&gate));
        gate
    }

    pub fn push_broadcast(&self, result: Result<u32, GatewayError>) {
        lock(&self.broadcast_results).push_back(result);
    }

    pub fn push_unread(&self, result: Result<u32, GatewayError>) {
        lock(&self.unread_results).push_back(result);
    }

    pub fn broadcasts(&self) -> Vec<(i64, String)> {
        lock(&self.broadcasts).clone()
    }

    pub fn fetched_pages(&self) -> Vec<(ConversationRef, u32)> {
        lock(&self.fetched).clone()
    }

    pub fn sent_messages(&self) -> Vec<(ConversationRef, OutgoingMessage)> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl MessageGateway for ScriptedGateway {
    async fn fetch_page(
        &self,
        conversation: &ConversationRef,
        page: u32,
    ) -> Result<MessagePage, GatewayError> {
        lock(&self.fetched).push((*conversation, page));
        lock(&self.pages)
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::Unavailable("no scripted page".to_owned())))
    }

    async fn send_message(
        &self,
        conversation: &ConversationRef,
        message: OutgoingMessage,
    ) -> Result<RawMessage, GatewayError> {
        lock(&self.sent).push((*conversation, message));

        let gate = lock(&self.send_gate).clone();
        if let Some(gate) = gate {
            gate.acquire()
                .await
                .expect("send gate should stay open")
                .forget();
        }

        lock(&self.sends)
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::Unavailable("no scripted send".to_owned())))
    }

    async fn broadcast(&self, group_id: i64, body: &str) -> Result<u32, GatewayError> {
        lock(&self.broadcasts).push((group_id, body.to_owned()));
        lock(&self.broadcast_results).pop_front().unwrap_or_else(|| {
            Err(GatewayError::Unavailable(
                "no scripted broadcast".to_owned(),
            ))
        })
    }

    async fn unread_count(&self) -> Result<u32, GatewayError> {
        lock(&self.unread_results)
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::Unavailable("no scripted count".to_owned())))
    }
}

/// A record whose timestamp grows with its id, so id order is recency order.
pub fn raw_message(id: i64, sender_id: i64) -> RawMessage {
    RawMessage {
        id,
        sender_id,
        sender_name: Some(format!("User {sender_id}")),
        sender_avatar: None,
        body: Some(format!("message {id}")),
        attachment: None,
        created_at: Utc.timestamp_opt(1_700_000_000 + id, 0).single(),
        read_at: None,
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().expect("test gateway lock should not be poisoned")
}
