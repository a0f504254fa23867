// start.rs - Greeting and Help Commands
// This module implements ^start and ^help, which explain what the bot does.
//
// Used by: main.rs (command registration)

use serenity::{
    client::Context,
    framework::standard::{macros::command, Args, CommandResult},
    model::channel::Message,
};

pub const GREETING: &str =
    "Hi! Send me a YouTube playlist link, and I'll calculate the total and average durations.";

/// Help text for the configured command prefix.
pub fn help_text(prefix: &str) -> String {
    format!(
        "**📺 Playlist Duration Bot**\n\n\
        **Commands:**\n\
        • `{p}start` - Say hello\n\
        • `{p}help` - Show this help message\n\
        • `{p}playlist <link>` - Total and average duration of a playlist (aliases: `{p}duration`, `{p}pl`)\n\n\
        **Without a command:**\n\
        • DM me a playlist link, or mention me next to one in a server\n\n\
        **Accepted links:**\n\
        • `https://www.youtube.com/playlist?list=<id>`\n\n\
        Unavailable videos (deleted, private, region-blocked) count as 0 seconds.",
        p = prefix
    )
}

/// Command prefix stored in client data at startup.
pub async fn configured_prefix(ctx: &Context) -> String {
    let data = ctx.data.read().await;
    data.get::<crate::PrefixKey>()
        .cloned()
        .unwrap_or_else(|| "^".to_string())
}

#[command]
#[aliases("hello")]
/// Main ^start command handler
/// Replies with the greeting
pub async fn start(ctx: &Context, msg: &Message, _args: Args) -> CommandResult {
    msg.reply(ctx, GREETING).await?;
    Ok(())
}

#[command]
#[aliases("h", "commands")]
/// Main ^help command handler
/// Shows usage with the prefix this bot was configured with
pub async fn help(ctx: &Context, msg: &Message, _args: Args) -> CommandResult {
    let prefix = configured_prefix(ctx).await;
    msg.reply(ctx, help_text(&prefix)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_text_uses_prefix() {
        let text = help_text("!");
        assert!(text.contains("`!playlist <link>`"));
        assert!(text.contains("`!start`"));
        assert!(!text.contains("^"));
    }
}
