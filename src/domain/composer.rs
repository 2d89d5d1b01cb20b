//! State of the message composer: input text plus one staged attachment.

use std::path::PathBuf;

/// A local file staged for upload with the next message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentDraft {
    pub path: PathBuf,
    pub name: String,
    pub mime_type: Option<String>,
}

impl AttachmentDraft {
    /// Builds a draft named after the file's last path component.
    pub fn from_path(path: impl Into<PathBuf>, mime_type: Option<String>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_owned());

        Self {
            path,
            name,
            mime_type,
        }
    }

    /// Like [`AttachmentDraft::from_path`], with the mime type inferred from
    /// the file extension.
    pub fn guess_from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mime_type = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| mime_for_extension(&ext.to_ascii_lowercase()))
            .map(str::to_owned);

        Self::from_path(path, mime_type)
    }
}

fn mime_for_extension(ext: &str) -> Option<&'static str> {
    let mime = match ext {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "txt" => "text/plain",
        "zip" => "application/zip",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        _ => return None,
    };

    Some(mime)
}

/// Contents captured from the composer at send time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    /// Trimmed text, `None` when only an attachment is sent.
    pub body: Option<String>,
    pub attachment: Option<AttachmentDraft>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComposerState {
    text: String,
    attachment: Option<AttachmentDraft>,
}

impl ComposerState {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attachment(&self) -> Option<&AttachmentDraft> {
        self.attachment.as_ref()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn stage_attachment(&mut self, attachment: AttachmentDraft) {
        self.attachment = Some(attachment);
    }

    pub fn clear_attachment(&mut self) {
        self.attachment = None;
    }

    /// Returns true when there is nothing to send.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty() && self.attachment.is_none()
    }

    /// Captures the draft and clears the composer.
    /// Returns `None` and leaves the composer untouched when it is blank.
    pub fn take_draft(&mut self) -> Option<MessageDraft> {
        if self.is_blank() {
            return None;
        }

        let trimmed = self.text.trim();
        let body = (!trimmed.is_empty()).then(|| trimmed.to_owned());
        self.text.clear();

        Some(MessageDraft {
            body,
            attachment: self.attachment.take(),
        })
    }

    /// Puts a captured draft back after a failed send. Replaces anything
    /// typed or staged while the send was in flight.
    pub fn restore(&mut self, draft: MessageDraft) {
        self.text = draft.body.unwrap_or_default();
        self.attachment = draft.attachment;
    }
}
