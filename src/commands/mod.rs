// commands/mod.rs - Command Module Registry
// Declares the bot's prefix commands; everything else a user types is treated
// as a song query by the message handler in main.rs

pub mod help;           // /help - usage text
pub mod start;          // /start - welcome text

use serenity::framework::standard::macros::group;

use help::HELP_COMMAND;
use start::START_COMMAND;

#[group]
#[commands(start, help)]
pub struct General;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_start_and_help_registered() {
        let names: Vec<&str> = GENERAL_GROUP
            .options
            .commands
            .iter()
            .flat_map(|command| command.options.names.iter().copied())
            .collect();
        assert_eq!(names, vec!["start", "help"]);
    }
}
