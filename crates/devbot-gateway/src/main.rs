use std::sync::Arc;

use clap::Parser;
use devbot_channels::{Activity, ChannelManager};
use devbot_core::types::{ConversationId, UserId};
use devbot_core::DevbotConfig;
use devbot_dialogs::{DialogSet, KeywordClassifier, TurnDispatcher};
use devbot_state::SqliteStorage;
use devbot_workitems::SqliteWorkItems;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

mod app;
mod console;

use app::BotRuntime;
use console::ConsoleChannel;

/// Chat with the work-item bot from the terminal.
#[derive(Parser, Debug)]
#[command(name = "devbot", version, about, long_about = None)]
struct Cli {
    /// Config file (default: ~/.devbot/devbot.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<String>,

    /// User id to chat as
    #[arg(long)]
    user: Option<String>,

    /// Conversation id to resume; a new one is generated when omitted
    #[arg(long)]
    conversation: Option<String>,

    /// SQLite database path, overrides [database] path
    #[arg(long, value_name = "PATH")]
    db: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // logs go to stderr so they don't interleave with the chat on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "devbot_gateway=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = DevbotConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        warn!("Config load failed ({}), using defaults", e);
        DevbotConfig::default()
    });
    if let Some(db) = cli.db {
        config.database.path = db;
    }
    config.validate()?;

    let db_path = &config.database.path;
    ensure_parent_dir(db_path);
    info!(path = %db_path, "opening SQLite database");

    let db = rusqlite::Connection::open(db_path)?;
    db.execute_batch("PRAGMA journal_mode=WAL;")?;
    devbot_state::db::init_db(&db)?;
    devbot_workitems::db::init_db(&db)?;
    info!("database migrations complete");

    // each subsystem gets its own connection
    let storage = Arc::new(SqliteStorage::new(rusqlite::Connection::open(db_path)?));
    let work_items = Arc::new(SqliteWorkItems::new(rusqlite::Connection::open(db_path)?));

    let dispatcher = TurnDispatcher::new(
        DialogSet::standard(),
        Arc::new(KeywordClassifier::new(&config.classifier)),
        work_items,
        &config.classifier,
    );

    let channel_name = config.channel.name.clone();
    let mut channels = ChannelManager::new();
    channels.register(Box::new(ConsoleChannel::new(channel_name.clone())));

    let runtime = BotRuntime::new(storage, channels, dispatcher);

    let user = UserId::parse(cli.user.as_deref().unwrap_or(&config.bot.default_user))?;
    let conversation = match cli.conversation.or(config.bot.default_conversation.clone()) {
        Some(id) => ConversationId::parse(&id)?,
        None => ConversationId::new(),
    };
    info!(user = %user, conversation = %conversation, channel = %channel_name, "console session started");

    let join = Activity::joined(&channel_name, conversation.clone(), user.clone());
    runtime.on_activity(&join).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if matches!(line.trim(), "/quit" | "/exit") {
            break;
        }
        let activity = Activity::message(&channel_name, conversation.clone(), user.clone(), line);
        let report = runtime.on_activity(&activity).await;
        if report.aborted {
            warn!("turn aborted, conversation state left unchanged");
        }
    }

    info!("console session closed");
    Ok(())
}

fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}
