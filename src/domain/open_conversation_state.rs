use chrono::{DateTime, Utc};

use super::{
    composer::ComposerState,
    conversation::ConversationRef,
    conversation_buffer::ConversationBuffer,
    message::{DisplayMessage, MessageId},
    pagination::PaginationCursor,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationUiState {
    Loading,
    Ready,
    /// Initial load failed; the view offers a manual retry.
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfacedErrorKind {
    InitialLoad,
    Pagination,
    Send,
}

/// An error shown to the user until dismissed or superseded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfacedError {
    pub kind: SurfacedErrorKind,
    pub message: String,
}

/// Everything one open conversation view owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenConversationState {
    conversation: ConversationRef,
    buffer: ConversationBuffer,
    cursor: Option<PaginationCursor>,
    ui_state: ConversationUiState,
    composer: ComposerState,
    is_loading_more: bool,
    is_sending: bool,
    closed: bool,
    last_error: Option<SurfacedError>,
    last_temp_stamp_ms: i64,
}

impl OpenConversationState {
    pub fn new(conversation: ConversationRef) -> Self {
        Self {
            conversation,
            buffer: ConversationBuffer::default(),
            cursor: None,
            ui_state: ConversationUiState::Loading,
            composer: ComposerState::default(),
            is_loading_more: false,
            is_sending: false,
            closed: false,
            last_error: None,
            last_temp_stamp_ms: 0,
        }
    }

    pub fn conversation(&self) -> ConversationRef {
        self.conversation
    }

    pub fn messages(&self) -> &[DisplayMessage] {
        self.buffer.messages()
    }

    pub fn buffer(&self) -> &ConversationBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut ConversationBuffer {
        &mut self.buffer
    }

    pub fn cursor(&self) -> Option<PaginationCursor> {
        self.cursor
    }

    pub fn ui_state(&self) -> &ConversationUiState {
        &self.ui_state
    }

    pub fn is_ready(&self) -> bool {
        self.ui_state == ConversationUiState::Ready
    }

    pub fn composer(&self) -> &ComposerState {
        &self.composer
    }

    pub fn composer_mut(&mut self) -> &mut ComposerState {
        &mut self.composer
    }

    pub fn is_loading_more(&self) -> bool {
        self.is_loading_more
    }

    pub fn is_sending(&self) -> bool {
        self.is_sending
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn last_error(&self) -> Option<&SurfacedError> {
        self.last_error.as_ref()
    }

    pub fn set_loading(&mut self) {
        self.ui_state = ConversationUiState::Loading;
        self.clear_error_of(SurfacedErrorKind::InitialLoad);
    }

    pub fn set_ready(&mut self, messages: Vec<DisplayMessage>, cursor: Option<PaginationCursor>) {
        self.buffer.initial_load(messages);
        self.cursor = cursor;
        self.ui_state = ConversationUiState::Ready;
    }

    pub fn set_failed(&mut self, message: String) {
        self.ui_state = ConversationUiState::Failed(message.clone());
        self.surface(SurfacedErrorKind::InitialLoad, message);
    }

    /// Marks a pagination request as started.
    /// Returns the page to request, or `None` when loading more is not allowed.
    pub fn begin_load_more(&mut self) -> Option<u32> {
        if self.closed || self.is_loading_more || !self.is_ready() {
            return None;
        }

        let page = self.cursor?.next_page()?;
        self.is_loading_more = true;
        Some(page)
    }

    pub fn finish_load_more(&mut self, older: Vec<DisplayMessage>, cursor: PaginationCursor) {
        self.is_loading_more = false;
        self.buffer.append_older(older);
        self.cursor = Some(cursor);
        self.clear_error_of(SurfacedErrorKind::Pagination);
    }

    pub fn fail_load_more(&mut self, message: String) {
        self.is_loading_more = false;
        self.surface(SurfacedErrorKind::Pagination, message);
    }

    pub fn set_sending(&mut self, sending: bool) {
        self.is_sending = sending;
    }

    /// Returns a temporary id unique within this state's lifetime.
    pub fn next_temp_id(&mut self, now: DateTime<Utc>) -> MessageId {
        let stamp = now.timestamp_millis().max(self.last_temp_stamp_ms + 1);
        self.last_temp_stamp_ms = stamp;
        MessageId::temporary(stamp)
    }

    pub fn surface(&mut self, kind: SurfacedErrorKind, message: String) {
        self.last_error = Some(SurfacedError { kind, message });
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    pub fn close(&mut self) {
        self.closed = true;
        self.is_loading_more = false;
        self.is_sending = false;
    }

    fn clear_error_of(&mut self, kind: SurfacedErrorKind) {
        if self.last_error.as_ref().map(|error| error.kind) == Some(kind) {
            self.last_error = None;
        }
    }
}
