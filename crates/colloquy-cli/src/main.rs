use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colloquy_core::Message;
use colloquy_llm::{model_ids, Config, HttpCompletionClient};
use colloquy_media::{MessageEncoder, ProviderProfile};
use colloquy_session::AsyncConversationSession;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

mod logging;

use logging::init_logging;

#[derive(Parser)]
#[command(name = "colloquy")]
#[command(about = "Multi-turn chat client with a bounded context window")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short, default_value = "false")]
    debug: bool,

    /// Attachment conventions: chatgpt or gemini
    #[arg(long, default_value = "chatgpt")]
    profile: ProviderProfile,

    /// Context size label (8k, 16k, 32k, 64k, 128k)
    #[arg(long)]
    limit: Option<String>,

    /// Model identifier, overriding the configured one
    #[arg(long)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start interactive chat
    Chat {
        /// Resume a saved conversation
        #[arg(long)]
        id: Option<String>,
    },
    /// Send a single message and save the conversation
    Send {
        /// Message content
        text: String,
        /// Image or audio file to attach (repeatable)
        #[arg(long = "attach")]
        attachments: Vec<PathBuf>,
        /// Continue and overwrite this saved conversation
        #[arg(long)]
        id: Option<String>,
    },
    /// List saved conversations
    List,
    /// Delete a saved conversation
    Delete { id: String },
    /// List models offered by the endpoint
    Models,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let mut config = Config::new();
    if let Some(limit) = &cli.limit {
        config.token_limit = limit.clone();
    }
    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    log::debug!(
        "Using {} at {} with a {} token budget",
        config.model,
        config.api_base,
        config.budget().max_tokens()
    );

    match cli.command {
        Commands::Chat { id } => run_interactive_chat(&config, cli.profile, id).await,
        Commands::Send {
            text,
            attachments,
            id,
        } => send_message(&config, cli.profile, text, attachments, id).await,
        Commands::List => list_records(&config).await,
        Commands::Delete { id } => delete_record(&config, &id).await,
        Commands::Models => list_models(&config).await,
    }
}

/// Encoding reads files and may run ffmpeg, so it stays off the runtime
/// threads.
async fn build_message(
    profile: ProviderProfile,
    text: String,
    attachments: Vec<PathBuf>,
) -> anyhow::Result<Message> {
    if attachments.is_empty() {
        return Ok(Message::user(text));
    }
    let message = tokio::task::spawn_blocking(move || {
        MessageEncoder::new(profile).build_user_message(&text, &attachments)
    })
    .await??;
    Ok(message)
}

fn print_reply(message: &Message) {
    if let Some(text) = message.text().filter(|text| !text.is_empty()) {
        println!("{} {}", "assistant>".green().bold(), text);
    }
    for call in message.tool_calls.iter().flatten() {
        println!(
            "{}",
            format!("🔧 {}({})", call.function.name, call.function.arguments).yellow()
        );
    }
}

async fn send_message(
    config: &Config,
    profile: ProviderProfile,
    text: String,
    attachments: Vec<PathBuf>,
    id: Option<String>,
) -> anyhow::Result<()> {
    let mut session = AsyncConversationSession::from_config(config)?;
    if let Some(id) = &id {
        session
            .load(id)
            .await
            .with_context(|| format!("failed to load conversation {}", id))?;
    }

    let message = build_message(profile, text, attachments).await?;
    let reply = session.send(message).await?;
    print_reply(&reply);

    if config.storage.is_some() {
        let saved = session.save(id.as_deref()).await?;
        println!("{}", format!("💾 Saved as {}", saved).dimmed());
    }
    Ok(())
}

async fn run_interactive_chat(
    config: &Config,
    profile: ProviderProfile,
    id: Option<String>,
) -> anyhow::Result<()> {
    let mut session = AsyncConversationSession::from_config(config)?;
    let mut record_id = id;
    if let Some(id) = &record_id {
        session.load(id).await?;
        println!(
            "{}",
            format!("📂 Resumed {} ({} messages)", id, session.store_history().len()).cyan()
        );
    }

    println!(
        "{}",
        "Commands: /attach <path>, /save [id], /clear, /quit".dimmed()
    );

    let mut pending: Vec<PathBuf> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"you> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('/') {
            let (name, arg) = match command.split_once(' ') {
                Some((name, arg)) => (name, Some(arg.trim())),
                None => (command, None),
            };
            match (name, arg) {
                ("quit" | "exit", _) => break,
                ("clear", _) => {
                    session.clear_history();
                    pending.clear();
                    println!("{}", "🧹 History cleared".cyan());
                }
                ("attach", Some(path)) if !path.is_empty() => {
                    pending.push(PathBuf::from(path));
                    println!("{}", format!("📎 {} queued", path).cyan());
                }
                ("save", arg) => {
                    let wanted = arg.filter(|a| !a.is_empty()).map(str::to_string);
                    match session.save(wanted.or(record_id.clone()).as_deref()).await {
                        Ok(saved) => {
                            println!("{}", format!("💾 Saved as {}", saved).green());
                            record_id = Some(saved);
                        }
                        Err(err) => eprintln!("{}", format!("❌ {}", err).red()),
                    }
                }
                _ => eprintln!("{}", format!("Unknown command: /{}", command).red()),
            }
            continue;
        }

        let attachments = std::mem::take(&mut pending);
        let message = match build_message(profile.clone(), line.to_string(), attachments).await {
            Ok(message) => message,
            Err(err) => {
                eprintln!("{}", format!("❌ {}", err).red());
                continue;
            }
        };

        match session.send(message).await {
            Ok(reply) => print_reply(&reply),
            Err(err) => eprintln!("{}", format!("❌ {}", err).red()),
        }
    }

    Ok(())
}

async fn list_records(config: &Config) -> anyhow::Result<()> {
    let session = AsyncConversationSession::from_config(config)?;
    let catalog = session.catalog().await?;
    if catalog.is_empty() {
        println!("{}", "No saved conversations".dimmed());
        return Ok(());
    }
    for entry in catalog {
        let title = entry.title.unwrap_or_else(|| "(untitled)".to_string());
        println!("{}  {}", entry.id.cyan(), title);
    }
    Ok(())
}

async fn delete_record(config: &Config, id: &str) -> anyhow::Result<()> {
    let session = AsyncConversationSession::from_config(config)?;
    if session.delete(id).await? {
        println!("{}", format!("🗑  Deleted {}", id).green());
    } else {
        println!("{}", format!("No conversation named {}", id).yellow());
    }
    Ok(())
}

async fn list_models(config: &Config) -> anyhow::Result<()> {
    let client = HttpCompletionClient::new(config)?;
    let listing = client.list_models().await?;
    for id in model_ids(&listing) {
        println!("{}", id);
    }
    Ok(())
}
