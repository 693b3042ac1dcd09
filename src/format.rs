// format.rs - Reply Formatting
// User-facing message text and message-size splitting.

use crate::genius::SongResult;
use crate::lyrics::LyricsBlock;

pub const NOT_FOUND_MESSAGE: &str = "❌ Sorry, couldn't find that song.";
pub const GENERIC_ERROR_MESSAGE: &str = "❌ Sorry, something went wrong while fetching the lyrics.";

pub fn found_message(song: &SongResult) -> String {
    format!("✨ Found: {} by {}\n🔍 Fetching lyrics...", song.title, song.artist)
}

pub fn lyrics_header(song: &SongResult) -> String {
    format!("[ {} - {} ]\n\n", song.title, song.artist)
}

/// Header plus lyrics, split into transport-sized chunks
pub fn format_lyrics(song: &SongResult, lyrics: &LyricsBlock, max_len: usize) -> Vec<String> {
    let formatted = format!("{}{}", lyrics_header(song), lyrics);
    split_message(&formatted, max_len)
}

pub fn fallback_message(song: &SongResult) -> String {
    format!(
        "❌ Sorry, couldn't fetch the lyrics.\nYou can find them here: {}",
        song.url
    )
}

/// Split text into contiguous chunks of at most `max_len` characters.
///
/// Boundaries are fixed offsets and may land mid-line or mid-word. Joining the
/// chunks in order gives back the input exactly.
pub fn split_message(content: &str, max_len: usize) -> Vec<String> {
    let max_len = max_len.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (offset, _) in content.char_indices() {
        if count == max_len {
            chunks.push(content[start..offset].to_string());
            start = offset;
            count = 0;
        }
        count += 1;
    }

    if start < content.len() {
        chunks.push(content[start..].to_string());
    }

    chunks
}
