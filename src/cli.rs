use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::conversation::ConversationRef;

#[derive(Debug, Parser)]
#[command(
    name = "tutor-chat",
    about = "Terminal client for tutoring group, private and ticket conversations"
)]
pub struct Cli {
    /// Path to config file (default: ./config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print a conversation transcript, oldest message first
    History {
        /// private:<group>:<user>, group:<group> or ticket:<id>
        conversation: ConversationRef,
        /// Number of pages to load, starting from the newest
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        pages: u32,
    },
    /// Send one message
    Send {
        conversation: ConversationRef,
        #[arg(short, long)]
        text: Option<String>,
        /// File to upload with the message
        #[arg(short, long)]
        attach: Option<PathBuf>,
    },
    /// Open a conversation, print new messages as they arrive and send stdin lines
    Watch { conversation: ConversationRef },
    /// Send one text to every member of a group
    Broadcast {
        group_id: i64,
        #[arg(short, long)]
        text: String,
    },
    /// Print the number of unread private messages
    Unread,
}
