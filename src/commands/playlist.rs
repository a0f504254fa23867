// playlist.rs - Playlist Duration Command Module
// This module implements the ^playlist command and the plain-message path, both of
// which extract a playlist link from text and reply with its duration summary.
//
// Key Features:
// - Finds the playlist link anywhere in the message
// - Corrective prompt when no link is present
// - Typing indicator while pages and videos are fetched
//
// Used by: main.rs (command registration, message event handler)

use crate::aggregate::PlaylistAggregator;
use crate::commands::start::configured_prefix;
use crate::extract::extract_playlist_url;
use crate::youtube::{Catalog, YouTubeCatalog};
use log::{debug, error, info};
use serenity::{
    client::Context,
    framework::standard::{macros::command, Args, CommandResult},
    model::channel::Message,
    prelude::TypeMapKey,
};
use std::sync::Arc;

pub const NO_LINK_MESSAGE: &str =
    "I couldn't find a valid YouTube playlist link in your message. Please send a proper link!";

// TypeMap key for the shared aggregator built at startup
pub struct PlaylistAggregatorKey;
impl TypeMapKey for PlaylistAggregatorKey {
    type Value = Arc<PlaylistAggregator<YouTubeCatalog>>;
}

/// Turn inbound text into the reply the user sees.
pub async fn reply_for_text<C: Catalog>(aggregator: &PlaylistAggregator<C>, text: &str) -> String {
    match extract_playlist_url(text) {
        Some(reference) => aggregator.report(&reference).await,
        None => {
            debug!("🔗 No playlist link in message");
            NO_LINK_MESSAGE.to_string()
        }
    }
}

async fn shared_aggregator(ctx: &Context) -> Option<Arc<PlaylistAggregator<YouTubeCatalog>>> {
    let data = ctx.data.read().await;
    data.get::<PlaylistAggregatorKey>().cloned()
}

/// Reply to `msg` with the result for `text`.
pub async fn respond(ctx: &Context, msg: &Message, text: &str) -> CommandResult {
    let aggregator = match shared_aggregator(ctx).await {
        Some(aggregator) => aggregator,
        None => {
            error!("❌ Playlist aggregator missing from client data");
            msg.reply(ctx, crate::aggregate::GENERIC_ERROR_MESSAGE).await?;
            return Ok(());
        }
    };

    let _typing = ctx.http.start_typing(msg.channel_id.0)?;
    let reply = reply_for_text(&aggregator, text).await;
    msg.reply(ctx, reply).await?;
    Ok(())
}

#[command]
#[aliases("duration", "pl")]
/// Main ^playlist command handler
/// Calculates total and average video duration for a playlist
/// Supports:
///   - ^playlist <playlist link>
pub async fn playlist(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    info!("📺 Playlist command from user {} ({})", msg.author.name, msg.author.id);

    let text = args.message().trim();
    if text.is_empty() {
        let prefix = configured_prefix(ctx).await;
        msg.reply(
            ctx,
            format!(
                "Please provide a playlist link!\n\n**Usage:** `{}playlist https://www.youtube.com/playlist?list=<id>`",
                prefix
            ),
        )
        .await?;
        return Ok(());
    }

    respond(ctx, msg, text).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{GENERIC_ERROR_MESSAGE, INVALID_URL_MESSAGE};
    use crate::youtube::fake::FakeCatalog;
    use std::time::Duration;

    fn aggregator(catalog: FakeCatalog) -> PlaylistAggregator<FakeCatalog> {
        PlaylistAggregator::new(catalog, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_no_link_gets_prompt_without_catalog_calls() {
        let agg = aggregator(FakeCatalog::uniform(2, 60));
        assert_eq!(reply_for_text(&agg, "what is this bot?").await, NO_LINK_MESSAGE);
        assert_eq!(agg.catalog().page_fetches(), 0);
    }

    #[tokio::test]
    async fn test_link_in_sentence_gets_report() {
        let agg = aggregator(FakeCatalog::with_durations(&[Some(3600), Some(1800)]));
        let reply = reply_for_text(
            &agg,
            "how long is https://www.youtube.com/playlist?list=PLxyz&si=tracking please",
        )
        .await;
        assert_eq!(
            reply,
            "Playlist Duration:\n- Total: 1 hours, 30 minutes\n- Videos: 2\n- Average per Video: 45 minutes, 0 seconds"
        );
    }

    #[tokio::test]
    async fn test_operational_failure_is_generic() {
        let agg = aggregator(FakeCatalog::uniform(75, 60).failing_at("page-1"));
        let reply = reply_for_text(&agg, "https://youtube.com/playlist?list=PLxyz").await;
        assert_eq!(reply, GENERIC_ERROR_MESSAGE);
        assert_ne!(reply, INVALID_URL_MESSAGE);
    }
}
