// start.rs - Welcome Command
// Sent when a user first opens a conversation with the bot.

use serenity::{
    client::Context,
    framework::standard::{macros::command, Args, CommandResult},
    model::channel::Message,
};

pub const WELCOME_TEXT: &str = "Welcome to Radio X Lyrics fetcher! 🎵\n\n\
Just send me the name of any song, and I'll fetch the lyrics for you!\n\n\
Example:\n\
Toxic Britney Spears";

#[command]
/// Greet the user and explain how to ask for lyrics
pub async fn start(ctx: &Context, msg: &Message, _args: Args) -> CommandResult {
    msg.channel_id.say(&ctx.http, WELCOME_TEXT).await?;
    Ok(())
}
