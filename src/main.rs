mod aggregate;
mod commands;
mod config;
mod duration;
mod extract;
mod youtube;

use serenity::{
    async_trait,
    client::{Client, Context, EventHandler},
    framework::standard::{macros::group, StandardFramework},
    model::channel::Message,
    model::gateway::Ready,
    prelude::GatewayIntents,
    prelude::TypeMapKey,
};
use std::sync::Arc;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::mpsc;

use crate::aggregate::PlaylistAggregator;
use crate::commands::playlist::PlaylistAggregatorKey;
use crate::config::{load_bot_config, BotConfig};
use crate::youtube::YouTubeCatalog;

// TypeMap key for the configured command prefix
pub struct PrefixKey;
impl TypeMapKey for PrefixKey {
    type Value = String;
}

// Import all command constants generated by the #[command] macro
use crate::commands::playlist::PLAYLIST_COMMAND;
use crate::commands::start::{HELP_COMMAND, START_COMMAND};

// Command group declaration - includes all available commands
#[group]
#[commands(start, help, playlist)]
struct General;

// Event handler implementation
struct Handler {
    prefix: String,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _: Context, ready: Ready) {
        log::info!("✅ Bot connected as {} (ID: {})", ready.user.name, ready.user.id);
        println!("✅ Bot connected as {}!", ready.user.name);
    }

    async fn message(&self, ctx: Context, msg: Message) {
        // Commands are routed by the framework; never answer other bots
        if msg.author.bot || msg.content.starts_with(&self.prefix) {
            return;
        }

        // Only DMs and messages that mention the bot are addressed to it
        let bot_id = ctx.cache.current_user_id();
        if !msg.is_private() && !msg.mentions_user_id(bot_id) {
            return;
        }

        log::info!("💬 Message from user {} ({})", msg.author.name, msg.author.id);
        if let Err(e) = commands::playlist::respond(&ctx, &msg, &msg.content).await {
            log::error!("❌ Failed to reply to user {} ({}): {:?}", msg.author.name, msg.author.id, e);
        }
    }
}

// Operator console on stdin - quit/help/status
async fn handle_command_line(shutdown_tx: mpsc::Sender<String>, config: BotConfig) {
    use tokio::io::AsyncWriteExt;
    use tokio::time::{sleep, Duration};

    println!("📝 Command line interface active. Type 'help' for available commands.");

    // Let the connection banner print first
    sleep(Duration::from_millis(1500)).await;

    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin).lines();
    let mut stdout = io::stdout();

    if stdout.write_all(b"\n> ").await.is_err() || stdout.flush().await.is_err() {
        eprintln!("❌ Failed to write initial prompt");
        return;
    }

    loop {
        match reader.next_line().await {
            Ok(Some(line)) => {
                let command = line.trim().to_lowercase();

                match command.as_str() {
                    "quit" | "q" | "exit" => {
                        println!("⏹️  Shutting down bot...");
                        if shutdown_tx.send("quit".to_string()).await.is_err() {
                            eprintln!("❌ Failed to send shutdown signal");
                        }
                        break;
                    }
                    "help" | "h" => {
                        println!("🤖 Available commands:");
                        println!("  quit, q, exit  - Stop the bot gracefully");
                        println!("  help, h        - Show this help message");
                        println!("  status         - Show bot status");
                    }
                    "status" => {
                        println!("🤖 Bot Status: Running");
                        println!("🔤 Command prefix: '{}'", config.prefix);
                        println!("🌐 Catalog API: {}", config.catalog.base_url);
                        println!("⏱️  Request timeout: {}s", config.catalog.request_timeout.as_secs());
                        println!("⏱️  Playlist deadline: {}s", config.operation_deadline.as_secs());
                    }
                    "" => {}
                    _ => {
                        println!("❓ Unknown command: '{}'. Type 'help' for available commands.", command);
                    }
                }

                if stdout.write_all(b"> ").await.is_err() || stdout.flush().await.is_err() {
                    eprintln!("❌ Failed to write prompt");
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                eprintln!("❌ Error reading command line: {}", e);
                break;
            }
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize logger - must be done before any logging calls
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    log::info!("🚀 Playlist Duration Bot starting up...");

    let config = match load_bot_config() {
        Ok(config) => config,
        Err(error) => {
            log::error!("❌ Invalid configuration: {}", error);
            eprintln!("❌ Invalid configuration: {}", error);
            eprintln!("Create a botconfig.txt file in the project root with: BOT_TOKEN=your_token_here and CATALOG_API_KEY=your_key_here");
            return;
        }
    };

    let catalog = match YouTubeCatalog::new(&config.catalog) {
        Ok(catalog) => catalog,
        Err(e) => {
            log::error!("❌ Failed to create catalog HTTP client: {}", e);
            eprintln!("❌ Failed to create catalog HTTP client: {}", e);
            return;
        }
    };
    let aggregator = Arc::new(PlaylistAggregator::new(catalog, config.operation_deadline));

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
                        command_name, msg.author.name, msg.author.id, e
                    );
                }
            })
        })
        .group(&GENERAL_GROUP);

    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = match Client::builder(&config.bot_token, intents)
        .event_handler(Handler {
            prefix: config.prefix.clone(),
        })
        .framework(framework)
        .await
    {
        Ok(client) => client,
        Err(e) => {
            log::error!("❌ Error creating Discord client: {:?}", e);
            eprintln!("❌ Error creating Discord client: {:?}", e);
            eprintln!("Check BOT_TOKEN in botconfig.txt or the environment");
            return;
        }
    };

    {
        let mut data = client.data.write().await;
        data.insert::<PlaylistAggregatorKey>(aggregator);
        data.insert::<PrefixKey>(config.prefix.clone());
    }

    // Set up command line interface for graceful shutdown
    let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<String>(1);
    let cmd_task = tokio::spawn(handle_command_line(shutdown_tx, config.clone()));
    let shard_manager = client.shard_manager.clone();

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

    shard_manager.lock().await.shutdown_all().await;
    cmd_task.abort();

    log::info!("👋 Bot shutdown complete");
    println!("✅ Bot stopped");
}
