use serenity::{
    client::Context,
    framework::standard::{macros::command, Args, CommandResult},
    model::channel::Message,
};

pub const HELP_TEXT: &str = "Just send me the name of any song, and I'll fetch the lyrics for you!\n\n\
Example:\n\
Toxic Britney Spears\n\n\
Commands:\n\
• `/start` - Welcome message\n\
• `/help` - Show this help message";

#[command]
pub async fn help(ctx: &Context, msg: &Message, _args: Args) -> CommandResult {
    let _typing = ctx.http.start_typing(msg.channel_id.0)?;
    msg.channel_id.say(&ctx.http, HELP_TEXT).await?;
    Ok(())
}
