use std::{sync::Arc, time::Duration};

use crate::{
    domain::{conversation::ConversationRef, display_mapper::DisplayMapper},
    usecases::{
        contracts::MessageGateway, poll_loop::PollLoop, session::ConversationSession,
    },
};

/// A conversation view's lifetime: session plus its poll loop.
/// Dropping it closes the session and stops polling.
#[derive(Debug)]
pub struct OpenConversation {
    session: ConversationSession,
    _poll: PollLoop,
}

impl OpenConversation {
    /// Loads the first page and starts polling. A failed first load leaves the
    /// view in its error state; polling stays idle until a retry succeeds.
    pub async fn open(
        conversation: ConversationRef,
        gateway: Arc<dyn MessageGateway>,
        mapper: DisplayMapper,
        poll_interval: Duration,
    ) -> Self {
        let session = ConversationSession::new(conversation, gateway, mapper);
        // Failure is recorded in the session state for the view.
        let _ = session.initial_load().await;
        let poll = PollLoop::start(&session, poll_interval);

        Self {
            session,
            _poll: poll,
        }
    }

    pub fn session(&self) -> &ConversationSession {
        &self.session
    }

    pub fn close(self) {
        drop(self);
    }
}

impl Drop for OpenConversation {
    fn drop(&mut self) {
        self.session.close();
    }
}
