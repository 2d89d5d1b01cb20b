//! Interactive `watch` loop: prints the conversation as it changes and
//! sends what the user types.

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{
    domain::{
        composer::AttachmentDraft,
        open_conversation_state::{ConversationUiState, SurfacedErrorKind},
    },
    ui::transcript::TranscriptPrinter,
    usecases::session::{ConversationSession, LoadMoreOutcome, SendOutcome},
};

const HELP: &str =
    "Type a message and press Enter. Commands: /more, /attach PATH, /detach, /retry, /quit";

/// One line typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchInput {
    Message(String),
    LoadMore,
    Attach(PathBuf),
    Detach,
    Retry,
    Quit,
    Unknown(String),
    Blank,
}

pub fn parse_input(line: &str) -> WatchInput {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return WatchInput::Blank;
    }

    let Some(command) = trimmed.strip_prefix('/') else {
        return WatchInput::Message(line.trim_end_matches(['\r', '\n']).to_owned());
    };

    let (name, argument) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(name, rest)| (name, rest.trim()));

    match (name, argument) {
        ("more", _) => WatchInput::LoadMore,
        ("attach", path) if !path.is_empty() => WatchInput::Attach(PathBuf::from(path)),
        ("detach", _) => WatchInput::Detach,
        ("retry", _) => WatchInput::Retry,
        ("quit" | "q", _) => WatchInput::Quit,
        _ => WatchInput::Unknown(trimmed.to_owned()),
    }
}

/// Runs until `/quit`, end of input, or Ctrl-C.
pub async fn run(session: &ConversationSession) -> Result<()> {
    let mut printer = TranscriptPrinter::default();
    let mut revisions = session.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut view = ViewTracker::default();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    println!("{HELP}");
    view.refresh(session, &mut printer);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                tracing::debug!("interrupt received, closing conversation");
                break;
            }
            changed = revisions.changed() => {
                if changed.is_err() {
                    break;
                }
                revisions.borrow_and_update();
                view.refresh(session, &mut printer);
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };

                match parse_input(&line) {
                    WatchInput::Quit => break,
                    WatchInput::Blank => {}
                    WatchInput::Message(text) => {
                        session.set_input(text);
                        spawn_send(session);
                    }
                    WatchInput::Attach(path) => {
                        let draft = AttachmentDraft::guess_from_path(path);
                        println!("Attached {}; it goes out with the next message.", draft.name);
                        session.stage_attachment(draft);
                    }
                    WatchInput::Detach => session.clear_attachment(),
                    WatchInput::LoadMore => spawn_load_more(session),
                    WatchInput::Retry => spawn_retry(session),
                    WatchInput::Unknown(command) => eprintln!("Unknown command {command}. {HELP}"),
                }
            }
        }
    }

    Ok(())
}

fn spawn_send(session: &ConversationSession) {
    let session = session.clone();
    tokio::spawn(async move {
        match session.send().await {
            SendOutcome::Sent(_) | SendOutcome::Discarded => {}
            // Shown through the surfaced error.
            SendOutcome::Failed(_) => {}
            SendOutcome::Rejected(reason) => eprintln!("! {}", reason.user_message()),
        }
    });
}

fn spawn_load_more(session: &ConversationSession) {
    let session = session.clone();
    tokio::spawn(async move {
        match session.load_more().await {
            LoadMoreOutcome::Loaded { added } => {
                println!("——— loaded {added} earlier messages ———");
            }
            LoadMoreOutcome::Skipped => println!("No earlier messages."),
            LoadMoreOutcome::Failed(_) => {}
        }
    });
}

fn spawn_retry(session: &ConversationSession) {
    let session = session.clone();
    tokio::spawn(async move {
        let _ = session.retry_initial_load().await;
    });
}

/// Remembers what was last shown so each refresh prints only changes.
#[derive(Debug, Default)]
struct ViewTracker {
    shown_failure: Option<String>,
    shown_error: bool,
}

impl ViewTracker {
    fn refresh(&mut self, session: &ConversationSession, printer: &mut TranscriptPrinter) {
        let snapshot = session.snapshot();

        match snapshot.ui_state() {
            ConversationUiState::Loading => {}
            ConversationUiState::Failed(message) => {
                if self.shown_failure.as_deref() != Some(message.as_str()) {
                    eprintln!("! {message} Type /retry to try again.");
                    self.shown_failure = Some(message.clone());
                }
            }
            ConversationUiState::Ready => {
                self.shown_failure = None;
                for line in printer.take_new_lines(snapshot.messages(), session.mapper(), Utc::now())
                {
                    println!("{line}");
                }
            }
        }

        match snapshot.last_error() {
            // Already reported through the failed view state.
            Some(error) if error.kind == SurfacedErrorKind::InitialLoad => {}
            Some(error) if !self.shown_error => {
                eprintln!("! {}", error.message);
                self.shown_error = true;
                session.dismiss_error();
            }
            Some(_) => {}
            None => self.shown_error = false,
        }
    }
}
