//! Owned state and workflows of one open conversation.
//!
//! The session mutex is never held across an `.await`: every workflow locks,
//! mutates, releases, awaits the gateway and locks again to apply the result.
//! Results are applied in the order requests resolve. Once the session is
//! closed, late completions are dropped.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
};

use chrono::Utc;
use tokio::sync::watch;

use crate::{
    domain::{
        composer::{AttachmentDraft, MessageDraft},
        conversation::ConversationRef,
        display_mapper::DisplayMapper,
        message::{DisplayMessage, MessageId, RawMessage},
        open_conversation_state::{OpenConversationState, SurfacedErrorKind},
        pagination::PaginationCursor,
    },
    usecases::{
        contracts::{MessageGateway, MessagePage, OutgoingMessage},
        load_messages::{load_messages, LoadMessagesError, LoadMessagesQuery},
        send_message::{send_message, SendMessageError},
    },
};

const SESSION_INITIAL_LOAD_FAILED: &str = "SESSION_INITIAL_LOAD_FAILED";
const SESSION_LOAD_MORE_FAILED: &str = "SESSION_LOAD_MORE_FAILED";
const SESSION_SEND_FAILED: &str = "SESSION_SEND_FAILED";
const SESSION_LATE_COMPLETION_DROPPED: &str = "SESSION_LATE_COMPLETION_DROPPED";

/// Why a send request did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendRejection {
    Closed,
    InFlight,
    /// The first page has not loaded yet, or failed to load.
    NotReady,
    EmptyDraft,
    AttachmentNotSupported,
}

impl SendRejection {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Closed => "This conversation is closed.",
            Self::InFlight => "Still sending the previous message.",
            Self::NotReady => "The conversation has not loaded yet.",
            Self::EmptyDraft => "Type a message or pick a file to send.",
            Self::AttachmentNotSupported => "Attachments cannot be sent in this conversation.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Sent(MessageId),
    /// Rolled back; the draft is back in the composer.
    Failed(SendMessageError),
    Rejected(SendRejection),
    /// The session was closed while the request was in flight.
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadMoreOutcome {
    Loaded { added: usize },
    Skipped,
    Failed(LoadMessagesError),
}

#[derive(Clone)]
pub struct ConversationSession {
    inner: Arc<SessionInner>,
}

/// Handle that does not keep the session alive.
#[derive(Clone)]
pub struct WeakConversationSession {
    inner: Weak<SessionInner>,
}

struct SessionInner {
    conversation: ConversationRef,
    gateway: Arc<dyn MessageGateway>,
    mapper: DisplayMapper,
    state: Mutex<OpenConversationState>,
    revision: watch::Sender<u64>,
}

impl fmt::Debug for ConversationSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversationSession")
            .field("conversation", &self.inner.conversation)
            .finish_non_exhaustive()
    }
}

impl WeakConversationSession {
    pub fn upgrade(&self) -> Option<ConversationSession> {
        self.inner.upgrade().map(|inner| ConversationSession { inner })
    }
}

impl ConversationSession {
    pub fn new(
        conversation: ConversationRef,
        gateway: Arc<dyn MessageGateway>,
        mapper: DisplayMapper,
    ) -> Self {
        let (revision, _) = watch::channel(0);

        Self {
            inner: Arc::new(SessionInner {
                conversation,
                gateway,
                mapper,
                state: Mutex::new(OpenConversationState::new(conversation)),
                revision,
            }),
        }
    }

    pub fn conversation(&self) -> ConversationRef {
        self.inner.conversation
    }

    pub fn mapper(&self) -> &DisplayMapper {
        &self.inner.mapper
    }

    pub fn downgrade(&self) -> WeakConversationSession {
        WeakConversationSession {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Copy of the current state for rendering.
    pub fn snapshot(&self) -> OpenConversationState {
        self.with_state(|state| state.clone())
    }

    /// Receiver that changes whenever the visible state changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        self.with_state(|state| state.is_closed())
    }

    pub fn set_input(&self, text: impl Into<String>) {
        let text = text.into();
        self.update(|state| state.composer_mut().set_text(text));
    }

    pub fn stage_attachment(&self, attachment: AttachmentDraft) {
        self.update(|state| state.composer_mut().stage_attachment(attachment));
    }

    pub fn clear_attachment(&self) {
        self.update(|state| state.composer_mut().clear_attachment());
    }

    pub fn dismiss_error(&self) {
        self.update(OpenConversationState::dismiss_error);
    }

    pub fn close(&self) {
        self.update(OpenConversationState::close);
        tracing::debug!(conversation = %self.conversation(), "conversation session closed");
    }

    /// Manual retry after a failed first load.
    pub async fn retry_initial_load(&self) -> Result<usize, LoadMessagesError> {
        self.initial_load().await
    }

    /// Loads page 1 into the view, replacing whatever it showed.
    pub async fn initial_load(&self) -> Result<usize, LoadMessagesError> {
        let started = self.update(|state| {
            if state.is_closed() {
                return false;
            }
            state.set_loading();
            true
        });
        if !started {
            return Ok(0);
        }

        let result = load_messages(
            self.inner.gateway.as_ref(),
            LoadMessagesQuery::first_page(self.conversation()),
        )
        .await;

        self.update(|state| {
            if state.is_closed() {
                return Ok(0);
            }

            match result {
                Ok(page) => {
                    let cursor = page.pagination;
                    let messages = self.first_page_messages(page);
                    let count = messages.len();
                    state.set_ready(messages, cursor);
                    tracing::debug!(
                        conversation = %self.conversation(),
                        count,
                        "conversation loaded"
                    );
                    Ok(count)
                }
                Err(error) => {
                    tracing::warn!(
                        code = SESSION_INITIAL_LOAD_FAILED,
                        conversation = %self.conversation(),
                        error = ?error,
                        "initial conversation load failed"
                    );
                    state.set_failed(error.user_message());
                    Err(error)
                }
            }
        })
    }

    /// Requests the next older page and appends it.
    pub async fn load_more(&self) -> LoadMoreOutcome {
        let Some(page) = self.with_state(OpenConversationState::begin_load_more) else {
            return LoadMoreOutcome::Skipped;
        };
        self.notify();

        let result = load_messages(
            self.inner.gateway.as_ref(),
            LoadMessagesQuery::page(self.conversation(), page),
        )
        .await;

        self.update(|state| {
            if state.is_closed() {
                return LoadMoreOutcome::Skipped;
            }

            match result {
                Ok(loaded) => {
                    let last_page = loaded
                        .pagination
                        .map_or(page, |cursor| cursor.last_page());
                    let older = self.map_records(&loaded.records);
                    let before = state.buffer().len();
                    state.finish_load_more(older, PaginationCursor::new(page, last_page));
                    LoadMoreOutcome::Loaded {
                        added: state.buffer().len() - before,
                    }
                }
                Err(error) => {
                    tracing::warn!(
                        code = SESSION_LOAD_MORE_FAILED,
                        conversation = %self.conversation(),
                        page,
                        error = ?error,
                        "loading older messages failed"
                    );
                    state.fail_load_more(error.user_message());
                    LoadMoreOutcome::Failed(error)
                }
            }
        })
    }

    /// Fetches the newest page and merges unseen records.
    /// Does nothing until the first load succeeded.
    pub async fn poll_once(&self) -> Result<usize, LoadMessagesError> {
        if !self.with_state(|state| state.is_ready() && !state.is_closed()) {
            return Ok(0);
        }

        let page = load_messages(
            self.inner.gateway.as_ref(),
            LoadMessagesQuery::first_page(self.conversation()),
        )
        .await?;

        Ok(self.merge_incoming(&page.records))
    }

    /// Entry point for newly discovered records, whatever transport found them.
    pub fn merge_incoming(&self, records: &[RawMessage]) -> usize {
        let messages = self.map_records(records);
        let added = self.with_state(|state| {
            if state.is_closed() || !state.is_ready() {
                return 0;
            }
            state.buffer_mut().merge_newer(messages)
        });

        if added > 0 {
            tracing::debug!(conversation = %self.conversation(), added, "new messages merged");
            self.notify();
        }

        added
    }

    /// Sends the composer contents with an optimistic placeholder.
    pub async fn send(&self) -> SendOutcome {
        let now = Utc::now();
        let prepared = self.with_state(|state| self.begin_send(state, now));
        let (draft, temp_id) = match prepared {
            Ok(prepared) => prepared,
            Err(reason) => return SendOutcome::Rejected(reason),
        };
        self.notify();

        let result = send_message(
            self.inner.gateway.as_ref(),
            &self.inner.conversation,
            OutgoingMessage::from(&draft),
        )
        .await;

        self.update(|state| {
            if state.is_closed() {
                tracing::debug!(
                    code = SESSION_LATE_COMPLETION_DROPPED,
                    conversation = %self.conversation(),
                    "send completed after session close"
                );
                return SendOutcome::Discarded;
            }
            state.set_sending(false);

            match result {
                Ok(record) => {
                    let real = self.inner.mapper.map(&record);
                    let id = real.id.clone();
                    state.buffer_mut().reconcile(&temp_id, real);
                    SendOutcome::Sent(id)
                }
                Err(error) => {
                    tracing::warn!(
                        code = SESSION_SEND_FAILED,
                        conversation = %self.conversation(),
                        error = ?error,
                        "message send failed; draft restored"
                    );
                    state.buffer_mut().rollback(&temp_id);
                    state.composer_mut().restore(draft);
                    state.surface(SurfacedErrorKind::Send, error.user_message());
                    SendOutcome::Failed(error)
                }
            }
        })
    }

    fn begin_send(
        &self,
        state: &mut OpenConversationState,
        now: chrono::DateTime<Utc>,
    ) -> Result<(MessageDraft, MessageId), SendRejection> {
        if state.is_closed() {
            return Err(SendRejection::Closed);
        }
        if state.is_sending() {
            return Err(SendRejection::InFlight);
        }
        if !state.is_ready() {
            return Err(SendRejection::NotReady);
        }
        if state.composer().attachment().is_some() && !self.conversation().supports_attachments()
        {
            return Err(SendRejection::AttachmentNotSupported);
        }

        let draft = state
            .composer_mut()
            .take_draft()
            .ok_or(SendRejection::EmptyDraft)?;
        let temp_id = state.next_temp_id(now);
        let optimistic = self.inner.mapper.optimistic(temp_id.clone(), &draft, now);
        state.buffer_mut().insert_optimistic(optimistic);
        state.set_sending(true);

        Ok((draft, temp_id))
    }

    fn first_page_messages(&self, page: MessagePage) -> Vec<DisplayMessage> {
        let mut messages = self.map_records(&page.records);
        if let Some(origin) = &page.origin {
            messages.push(self.inner.mapper.ticket_origin(origin));
        }
        messages
    }

    fn map_records(&self, records: &[RawMessage]) -> Vec<DisplayMessage> {
        records
            .iter()
            .map(|record| self.inner.mapper.map(record))
            .collect()
    }

    fn lock_state(&self) -> MutexGuard<'_, OpenConversationState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut OpenConversationState) -> R) -> R {
        f(&mut self.lock_state())
    }

    fn update<R>(&self, f: impl FnOnce(&mut OpenConversationState) -> R) -> R {
        let result = self.with_state(f);
        self.notify();
        result
    }

    fn notify(&self) {
        self.inner.revision.send_modify(|revision| *revision += 1);
    }
}
