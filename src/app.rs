use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use tokio::runtime::Builder;

use crate::{
    api,
    cli::{Cli, Command},
    domain::{self, composer::AttachmentDraft, conversation::ConversationRef},
    infra, ui,
    usecases::{
        self, bootstrap,
        broadcast::broadcast_message,
        context::AppContext,
        open_conversation::OpenConversation,
        session::{ConversationSession, LoadMoreOutcome, SendOutcome},
        unread_count::unread_count,
    },
};

const HISTORY_PAGE_FAILED: &str = "HISTORY_PAGE_FAILED";

pub fn run(cli: Cli) -> Result<()> {
    let context = bootstrap::bootstrap(cli.config.as_deref())?;

    tracing::debug!(
        ui = ui::module_name(),
        domain = domain::module_name(),
        api = api::module_name(),
        usecases = usecases::module_name(),
        infra = infra::module_name(),
        "module boundaries loaded"
    );

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(async {
        match cli.command {
            Command::History {
                conversation,
                pages,
            } => {
                let session = new_session(&context, conversation);
                for line in load_history(&session, pages).await? {
                    println!("{line}");
                }
            }
            Command::Send {
                conversation,
                text,
                attach,
            } => {
                let session = new_session(&context, conversation);
                let id = send_once(&session, text, attach).await?;
                println!("Sent message {id}");
            }
            Command::Watch { conversation } => {
                let open = OpenConversation::open(
                    conversation,
                    context.gateway.clone(),
                    context.mapper_for(&conversation),
                    context.poll_interval(),
                )
                .await;
                let result = ui::watch::run(open.session()).await;
                open.close();
                result?;
            }
            Command::Broadcast { group_id, text } => {
                let receipt =
                    broadcast_message(context.gateway.as_ref(), group_id, &text).await?;
                println!(
                    "Broadcast to group {} delivered to {} members",
                    receipt.group_id, receipt.sent_count
                );
            }
            Command::Unread => {
                let count = unread_count(context.gateway.as_ref()).await?;
                println!("{count} unread messages");
            }
        }

        Ok::<(), anyhow::Error>(())
    })
}

fn new_session(context: &AppContext, conversation: ConversationRef) -> ConversationSession {
    ConversationSession::new(
        conversation,
        context.gateway.clone(),
        context.mapper_for(&conversation),
    )
}

/// Loads up to `pages` pages and renders them oldest first.
async fn load_history(session: &ConversationSession, pages: u32) -> Result<Vec<String>> {
    if let Err(error) = session.initial_load().await {
        bail!("{}", error.user_message());
    }

    for _ in 1..pages {
        match session.load_more().await {
            LoadMoreOutcome::Loaded { .. } => {}
            LoadMoreOutcome::Skipped => break,
            LoadMoreOutcome::Failed(error) => {
                // Print what was loaded so far.
                tracing::warn!(code = HISTORY_PAGE_FAILED, error = ?error, "stopped loading history");
                eprintln!("! {}", error.user_message());
                break;
            }
        }
    }

    let snapshot = session.snapshot();
    Ok(ui::transcript::render_transcript(
        snapshot.messages(),
        session.mapper(),
        Utc::now(),
    ))
}

async fn send_once(
    session: &ConversationSession,
    text: Option<String>,
    attach: Option<PathBuf>,
) -> Result<String> {
    // Sends are accepted only once the conversation has loaded.
    if let Err(error) = session.initial_load().await {
        bail!("{}", error.user_message());
    }

    session.set_input(text.unwrap_or_default());
    if let Some(path) = attach {
        session.stage_attachment(AttachmentDraft::guess_from_path(path));
    }

    match session.send().await {
        SendOutcome::Sent(id) => Ok(id.to_string()),
        SendOutcome::Failed(error) => bail!("{}", error.user_message()),
        SendOutcome::Rejected(reason) => bail!("{}", reason.user_message()),
        SendOutcome::Discarded => bail!("conversation closed before the send completed"),
    }
}
