//! Plain-text transcript rendering.
//!
//! Handles visual formatting of a conversation for the terminal:
//! - Day separators between messages from different days
//! - Sender grouping (consecutive messages from one sender show the name once)
//! - Attachment markers and pending-send indicators

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::domain::{
    display_mapper::DisplayMapper,
    message::{DisplayMessage, MessageDirection, MessageId},
};

const INDENT: &str = "    ";

/// A visual element of a printed transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptElement {
    /// Day separator line (e.g., "——— Yesterday ———").
    DaySeparator(String),
    Message {
        time: String,
        sender: Option<String>,
        content: String,
        pending: bool,
    },
}

/// Builds transcript elements from messages ordered oldest first.
pub fn build_transcript_elements(
    messages: &[&DisplayMessage],
    mapper: &DisplayMapper,
    now: DateTime<Utc>,
) -> Vec<TranscriptElement> {
    let mut elements = Vec::new();
    let mut prev_day: Option<String> = None;
    let mut prev_sender: Option<String> = None;

    for message in messages {
        if let Some(created_at) = message.created_at {
            let day = mapper.day_label(created_at, now);
            if prev_day.as_deref() != Some(day.as_str()) {
                elements.push(TranscriptElement::DaySeparator(day.clone()));
                prev_day = Some(day);
                prev_sender = None;
            }
        }

        let sender_name = effective_sender_name(message);
        let sender = (prev_sender.as_deref() != Some(sender_name)).then(|| sender_name.to_owned());

        elements.push(TranscriptElement::Message {
            time: message.formatted_time.clone(),
            sender,
            content: message.display_content(),
            pending: message.is_optimistic(),
        });

        prev_sender = Some(sender_name.to_owned());
    }

    elements
}

/// Renders elements as terminal lines.
pub fn render_lines(elements: &[TranscriptElement]) -> Vec<String> {
    let mut lines = Vec::new();

    for element in elements {
        match element {
            TranscriptElement::DaySeparator(day) => lines.push(format!("——— {day} ———")),
            TranscriptElement::Message {
                time,
                sender,
                content,
                pending,
            } => {
                if let Some(sender) = sender {
                    lines.push(format!("{sender}:"));
                }

                let marker = if *pending { " (sending…)" } else { "" };
                let mut content_lines = content.lines();
                let first = content_lines.next().unwrap_or("[Empty message]");
                lines.push(format!("{INDENT}{time:>8}  {first}{marker}"));

                for rest in content_lines {
                    lines.push(format!("{INDENT}{:>8}  {rest}", ""));
                }
            }
        }
    }

    lines
}

/// Renders a whole newest-first buffer oldest to newest.
pub fn render_transcript(
    messages: &[DisplayMessage],
    mapper: &DisplayMapper,
    now: DateTime<Utc>,
) -> Vec<String> {
    let ordered: Vec<&DisplayMessage> = messages.iter().rev().collect();
    render_lines(&build_transcript_elements(&ordered, mapper, now))
}

/// Prints each confirmed message once while a conversation is watched.
///
/// Optimistic entries are held back until the server confirms them, so a
/// reconciled send shows up exactly once under its real id.
#[derive(Debug, Default)]
pub struct TranscriptPrinter {
    printed: HashSet<MessageId>,
}

impl TranscriptPrinter {
    /// Returns lines for messages not printed yet, oldest first.
    pub fn take_new_lines(
        &mut self,
        messages: &[DisplayMessage],
        mapper: &DisplayMapper,
        now: DateTime<Utc>,
    ) -> Vec<String> {
        let fresh: Vec<&DisplayMessage> = messages
            .iter()
            .rev()
            .filter(|message| !message.is_optimistic() && !self.printed.contains(&message.id))
            .collect();

        if fresh.is_empty() {
            return Vec::new();
        }

        self.printed
            .extend(fresh.iter().map(|message| message.id.clone()));
        render_lines(&build_transcript_elements(&fresh, mapper, now))
    }

    pub fn printed_count(&self) -> usize {
        self.printed.len()
    }
}

fn effective_sender_name(message: &DisplayMessage) -> &str {
    match message.direction {
        MessageDirection::Sent => "You",
        MessageDirection::System => "System",
        MessageDirection::Received => message.sender_label.as_deref().unwrap_or("Unknown"),
    }
}
