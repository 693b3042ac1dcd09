mod commands;
mod config;
mod error;
mod format;
mod genius;
mod lyrics;
mod pipeline;

use serenity::{
    async_trait,
    client::{Client, Context, EventHandler},
    framework::standard::StandardFramework,
    model::channel::Message,
    model::gateway::Ready,
    model::id::ChannelId,
    prelude::GatewayIntents,
    prelude::TypeMapKey,
};
use std::env;
use std::sync::Arc;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::mpsc;

use crate::commands::GENERAL_GROUP;
use crate::config::{load_bot_config, BotConfig};
use crate::error::LyricsError;
use crate::genius::GeniusClient;
use crate::lyrics::LyricsExtractor;
use crate::pipeline::{LyricsPipeline, Outcome, Replier};

pub type GeniusPipeline = LyricsPipeline<GeniusClient, GeniusClient>;

// TypeMap key for the shared lyrics pipeline (one HTTP client for all requests)
pub struct PipelineKey;
impl TypeMapKey for PipelineKey {
    type Value = Arc<GeniusPipeline>;
}

/// Sends pipeline replies back to the channel the query came from
struct ChannelReplier<'a> {
    ctx: &'a Context,
    channel_id: ChannelId,
}

#[async_trait]
impl Replier for ChannelReplier<'_> {
    async fn send(&self, text: &str) -> Result<(), LyricsError> {
        self.channel_id.say(&self.ctx.http, text).await?;
        Ok(())
    }
}

// Event handler implementation
struct Handler;

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _: Context, ready: Ready) {
        log::info!("✅ Bot connected as {}! (ID: {})", ready.user.name, ready.user.id);
        println!("✅ Bot connected as {}!", ready.user.name);
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let pipeline = {
            let data = ctx.data.read().await;
            data.get::<PipelineKey>().cloned()
        };
        let pipeline = match pipeline {
            Some(pipeline) => pipeline,
            None => {
                log::error!("❌ Lyrics pipeline missing from client data");
                return;
            }
        };

        // Commands are answered by the framework; blank messages are attachments or embeds
        if msg.content.trim().is_empty() || pipeline.is_command(&msg.content) {
            return;
        }

        log::info!(
            "🎵 Lyrics request from {} ({}) in channel {}: '{}'",
            msg.author.name,
            msg.author.id,
            msg.channel_id,
            msg.content
        );

        let _typing = ctx.http.start_typing(msg.channel_id.0).ok();
        let replier = ChannelReplier {
            ctx: &ctx,
            channel_id: msg.channel_id,
        };

        match pipeline.respond(&msg.content, &replier).await {
            Outcome::Failed => log::warn!("⚠️ Request from {} ended with a generic error reply", msg.author.name),
            outcome => log::debug!("🎵 Request from {} finished: {:?}", msg.author.name, outcome),
        }
    }
}

/// Operator console input, one line at a time
#[derive(Debug, PartialEq, Eq)]
enum ConsoleCommand {
    Quit,
    Help,
    Status,
    Empty,
    Unknown(String),
}

impl ConsoleCommand {
    fn parse(line: &str) -> Self {
        let command = line.trim().to_lowercase();
        match command.as_str() {
            "quit" | "q" | "exit" => Self::Quit,
            "help" | "h" => Self::Help,
            "status" => Self::Status,
            "" => Self::Empty,
            _ => Self::Unknown(command),
        }
    }
}

const CONSOLE_HELP: &str = "🤖 Available commands:\n  \
    quit, q, exit  - Stop the bot gracefully\n  \
    help, h        - Show this help message\n  \
    status         - Show lyrics settings in effect";

/// Settings the running bot actually uses, for the `status` console command
fn status_report(config: &BotConfig) -> String {
    let order = config
        .strategies
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(" → ");

    format!(
        "🤖 Bot Status: Running (prefix '{}')\n\
        🔍 Genius API: {} (timeout {}s)\n\
        🎼 Extraction order: {}\n\
        ✂️ Reply chunk size: {} chars (configured {})",
        config.prefix,
        config.genius_api_url,
        config.http_timeout.as_secs(),
        order,
        config.delivery_message_length(),
        config.max_message_length
    )
}

async fn handle_command_line(shutdown_tx: mpsc::Sender<String>, status: String) {
    use tokio::io::AsyncWriteExt;
    use tokio::time::{sleep, Duration};

    println!("📝 Command line interface active. Type 'help' for available commands.");

    // Let the connection messages print before the first prompt
    sleep(Duration::from_millis(1500)).await;

    let mut reader = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();
    let mut prompt: &[u8] = b"\n> ";

    loop {
        if stdout.write_all(prompt).await.is_err() || stdout.flush().await.is_err() {
            eprintln!("❌ Failed to write prompt");
            return;
        }
        prompt = b"> ";

        let line = match reader.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => return,
            Err(e) => {
                eprintln!("❌ Error reading command line: {}", e);
                return;
            }
        };

        match ConsoleCommand::parse(&line) {
            ConsoleCommand::Quit => {
                println!("⏹️  Shutting down bot...");
                if shutdown_tx.send("quit".to_string()).await.is_err() {
                    eprintln!("❌ Failed to send shutdown signal");
                }
                return;
            }
            ConsoleCommand::Help => println!("{}", CONSOLE_HELP),
            ConsoleCommand::Status => println!("{}", status),
            ConsoleCommand::Empty => {}
            ConsoleCommand::Unknown(command) => {
                println!("❓ Unknown command: '{}'. Type 'help' for available commands.", command);
            }
        }
    }
}

fn init_logging(config: &BotConfig) {
    if let Some(filter) = &config.log_filter {
        env::set_var("RUST_LOG", filter);
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("lyrics_bot=info"))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() {
    // Logging filter can come from botconfig.txt, so the config is read first
    let config = match load_bot_config() {
        Ok((config, path)) => {
            println!("✅ Configuration loaded from {}", path);
            config
        }
        Err(error) => {
            eprintln!("❌ Failed to load botconfig.txt: {}", error);
            eprintln!("Create a botconfig.txt file in the project root with: DISCORD_TOKEN=your_token_here and GENIUS_ACCESS_TOKEN=your_genius_token");
            return;
        }
    };

    init_logging(&config);
    log::info!("🚀 Lyrics bot starting up...");

    let genius = match GeniusClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            log::error!("❌ Failed to build HTTP client: {}", e);
            eprintln!("❌ Failed to build HTTP client: {}", e);
            return;
        }
    };

    let extractor = LyricsExtractor::new(config.strategies.clone());
    let message_length = config.delivery_message_length();
    if message_length < config.max_message_length {
        log::warn!(
            "⚠️ MAX_MESSAGE_LENGTH {} exceeds Discord's {} character limit; replies are split at {}",
            config.max_message_length,
            serenity::constants::MESSAGE_CODE_LIMIT,
            message_length
        );
    }
    let status = status_report(&config);
    log::info!("{}", status);

    let pipeline = Arc::new(LyricsPipeline::new(
        genius.clone(),
        genius,
        extractor,
        config.prefix.clone(),
        message_length,
    ));

    println!("🤖 Starting bot with prefix: '{}'", config.prefix);

    let framework = StandardFramework::new()
        .configure(|c| {
            c.prefix(&config.prefix)
                .case_insensitivity(true)
                .with_whitespace(true)
        })
        .after(|_ctx, msg, command_name, result| {
            Box::pin(async move {
                if let Err(e) = result {
                    log::error!(
                        "❌ Command '{}' failed for user {} ({}): {:?}",
                        command_name,
                        msg.author.name,
                        msg.author.id,
                        e
                    );
                }
            })
        })
        .group(&GENERAL_GROUP);

    let intents = GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT;

    let mut client = match Client::builder(&config.discord_token, intents)
        .event_handler(Handler)
        .framework(framework)
        .await
    {
        Ok(client) => client,
        Err(e) => {
            log::error!("❌ Error creating Discord client: {:?}", e);
            eprintln!("❌ Error creating Discord client: {:?}", e);
            eprintln!("Check your token in botconfig.txt file");
            return;
        }
    };

    {
        let mut data = client.data.write().await;
        data.insert::<PipelineKey>(pipeline);
    }

    let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<String>(1);

    let cmd_shutdown_tx = shutdown_tx.clone();
    let cmd_task = tokio::spawn(async move {
        handle_command_line(cmd_shutdown_tx, status).await;
    });

    println!("🚀 Bot is running...");
    println!("💡 Use 'quit' command to stop gracefully, or press Ctrl+C");
    tokio::select! {
        _ = signal::ctrl_c() => {
            println!("\n⏹️ Stopping bot gracefully...");
        }
        shutdown_signal = shutdown_rx.recv() => {
            if let Some(signal) = shutdown_signal {
                println!("📡 Received '{}' command, stopping bot gracefully...", signal);
            }
        }
        result = client.start() => {
            if let Err(why) = result {
                log::error!("❌ Client error: {:?}", why);
                eprintln!("❌ Client error: {:?}", why);
            }
        }
    }

    client.shard_manager.lock().await.shutdown_all().await;
    cmd_task.abort();

    log::info!("👋 Bot shutdown complete");
    println!("✅ Bot stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_bot_config;

    #[test]
    fn test_console_commands_parse() {
        assert_eq!(ConsoleCommand::parse("  QUIT "), ConsoleCommand::Quit);
        assert_eq!(ConsoleCommand::parse("exit"), ConsoleCommand::Quit);
        assert_eq!(ConsoleCommand::parse("h"), ConsoleCommand::Help);
        assert_eq!(ConsoleCommand::parse("status"), ConsoleCommand::Status);
        assert_eq!(ConsoleCommand::parse(""), ConsoleCommand::Empty);
        assert_eq!(
            ConsoleCommand::parse("Reload"),
            ConsoleCommand::Unknown("reload".to_string())
        );
    }

    #[test]
    fn test_status_reports_effective_settings() {
        let config = parse_bot_config(
            "DISCORD_TOKEN=a\nGENIUS_ACCESS_TOKEN=b\nLYRICS_STRATEGIES=containers,structured",
        )
        .unwrap();
        let status = status_report(&config);

        assert!(status.contains("containers → structured"));
        assert!(status.contains("2000 chars (configured 4096)"));
        assert!(status.contains("https://api.genius.com (timeout 30s)"));
    }
}
