// pipeline.rs - Lyrics Lookup Pipeline
// query → song search → page fetch → extraction → chunked replies
//
// The pipeline owns its collaborators (search, page source, extractor) and
// never talks to the chat transport directly; replies go through `Replier`.
//
// Used by: main.rs (message handler)

use crate::error::LyricsError;
use crate::format::{
    fallback_message, format_lyrics, found_message, GENERIC_ERROR_MESSAGE, NOT_FOUND_MESSAGE,
};
use crate::genius::{PageSource, SongSearch};
use crate::lyrics::LyricsExtractor;
use async_trait::async_trait;
use log::{error, info, warn};

/// Outbound side of a conversation
#[async_trait]
pub trait Replier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), LyricsError>;
}

/// What happened to a single inbound query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Command-prefixed or blank input; nothing was sent
    Ignored,
    NotFound,
    Lyrics { chunks: usize },
    Fallback { url: String },
    Failed,
}

pub struct LyricsPipeline<S, P> {
    search: S,
    pages: P,
    extractor: LyricsExtractor,
    command_prefix: String,
    max_message_length: usize,
}

impl<S: SongSearch, P: PageSource> LyricsPipeline<S, P> {
    pub fn new(
        search: S,
        pages: P,
        extractor: LyricsExtractor,
        command_prefix: impl Into<String>,
        max_message_length: usize,
    ) -> Self {
        Self {
            search,
            pages,
            extractor,
            command_prefix: command_prefix.into(),
            max_message_length,
        }
    }

    pub fn is_command(&self, text: &str) -> bool {
        let text = text.trim_start();
        text.starts_with('/') || (!self.command_prefix.is_empty() && text.starts_with(&self.command_prefix))
    }

    /// Handle one inbound message. Every error is logged and answered with a
    /// single generic reply; nothing propagates to the caller.
    pub async fn respond<R: Replier + ?Sized>(&self, query: &str, replier: &R) -> Outcome {
        match self.handle_query(query, replier).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("❌ Lyrics lookup failed for query '{}': {}", query, e);
                if let Err(send_err) = replier.send(GENERIC_ERROR_MESSAGE).await {
                    error!("❌ Failed to send error reply: {}", send_err);
                }
                Outcome::Failed
            }
        }
    }

    pub async fn handle_query<R: Replier + ?Sized>(
        &self,
        query: &str,
        replier: &R,
    ) -> Result<Outcome, LyricsError> {
        let query = query.trim();
        if query.is_empty() || self.is_command(query) {
            return Ok(Outcome::Ignored);
        }

        let song = match self.search.search_song(query).await {
            Some(song) => song,
            None => {
                replier.send(NOT_FOUND_MESSAGE).await?;
                return Ok(Outcome::NotFound);
            }
        };

        replier.send(&found_message(&song)).await?;

        let page = self.pages.fetch_page(&song.url).await?;

        match self.extractor.extract(&page) {
            Some(lyrics) => {
                let chunks = format_lyrics(&song, &lyrics, self.max_message_length);
                for chunk in &chunks {
                    replier.send(chunk).await?;
                }
                info!(
                    "🎵 Sent lyrics for {} - {} in {} message(s)",
                    song.title,
                    song.artist,
                    chunks.len()
                );
                Ok(Outcome::Lyrics {
                    chunks: chunks.len(),
                })
            }
            None => {
                warn!("🎵 No lyrics extracted from {}", song.url);
                replier.send(&fallback_message(&song)).await?;
                Ok(Outcome::Fallback { url: song.url })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genius::SongResult;
    use crate::lyrics::ExtractionStrategy;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeSearch {
        result: Option<SongResult>,
        calls: AtomicUsize,
    }

    impl FakeSearch {
        fn returning(result: Option<SongResult>) -> Self {
            Self {
                result,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SongSearch for FakeSearch {
        async fn search_song(&self, _query: &str) -> Option<SongResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    /// Serves `page`, or a 503 when there is none
    struct FakePages {
        page: Option<String>,
        requested: Mutex<Vec<String>>,
    }

    impl FakePages {
        fn serving(page: Option<&str>) -> Self {
            Self {
                page: page.map(str::to_string),
                requested: Mutex::new(Vec::new()),
            }
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageSource for FakePages {
        async fn fetch_page(&self, url: &str) -> Result<String, LyricsError> {
            self.requested.lock().unwrap().push(url.to_string());
            self.page.clone().ok_or_else(|| LyricsError::Status {
                url: url.to_string(),
                status: StatusCode::SERVICE_UNAVAILABLE,
            })
        }
    }

    #[derive(Default)]
    struct RecordingReplier {
        sent: Mutex<Vec<String>>,
    }

    impl RecordingReplier {
        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Replier for RecordingReplier {
        async fn send(&self, text: &str) -> Result<(), LyricsError> {
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn toxic() -> SongResult {
        SongResult::new("Toxic", "Britney Spears", "http://example.com/toxic")
    }

    fn pipeline(
        song: Option<SongResult>,
        page: Option<&str>,
        max_len: usize,
    ) -> LyricsPipeline<FakeSearch, FakePages> {
        LyricsPipeline::new(
            FakeSearch::returning(song),
            FakePages::serving(page),
            LyricsExtractor::default(),
            "/",
            max_len,
        )
    }

    #[tokio::test]
    async fn test_toxic_end_to_end() {
        let page = r#"<html><body><div data-lyrics-container="true">Baby can't you see<br>I'm calling</div></body></html>"#;
        let pipeline = pipeline(Some(toxic()), Some(page), 4096);
        let replier = RecordingReplier::default();

        let outcome = pipeline.respond("Toxic Britney Spears", &replier).await;

        assert_eq!(outcome, Outcome::Lyrics { chunks: 1 });
        assert_eq!(
            replier.sent(),
            vec![
                "✨ Found: Toxic by Britney Spears\n🔍 Fetching lyrics...".to_string(),
                "[ Toxic - Britney Spears ]\n\nBaby can't you see\nI'm calling".to_string(),
            ]
        );
        assert_eq!(pipeline.pages.requested(), vec!["http://example.com/toxic".to_string()]);
    }

    #[tokio::test]
    async fn test_no_hits_means_not_found_and_no_fetch() {
        let pipeline = pipeline(None, Some("<html></html>"), 4096);
        let replier = RecordingReplier::default();

        let outcome = pipeline.respond("asdfghjkl", &replier).await;

        assert_eq!(outcome, Outcome::NotFound);
        assert_eq!(replier.sent(), vec![NOT_FOUND_MESSAGE.to_string()]);
        assert!(pipeline.pages.requested().is_empty());
    }

    #[tokio::test]
    async fn test_page_without_lyrics_sends_fallback_link() {
        let page = "<html><head><title>Toxic</title></head><body><p>Lyrics unavailable</p></body></html>";
        let pipeline = pipeline(Some(toxic()), Some(page), 4096);
        let replier = RecordingReplier::default();

        let outcome = pipeline.respond("Toxic", &replier).await;

        assert_eq!(
            outcome,
            Outcome::Fallback {
                url: "http://example.com/toxic".to_string()
            }
        );
        let sent = replier.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent[1].contains("http://example.com/toxic"));
        assert!(sent[1].starts_with("❌ Sorry, couldn't fetch the lyrics."));
    }

    #[tokio::test]
    async fn test_fetch_failure_becomes_generic_error() {
        let pipeline = pipeline(Some(toxic()), None, 4096);
        let replier = RecordingReplier::default();

        let outcome = pipeline.respond("Toxic", &replier).await;

        assert_eq!(outcome, Outcome::Failed);
        let sent = replier.sent();
        assert_eq!(sent.last().map(String::as_str), Some(GENERIC_ERROR_MESSAGE));
        assert_eq!(pipeline.pages.requested().len(), 1);
    }

    #[tokio::test]
    async fn test_commands_never_reach_search() {
        let pipeline = LyricsPipeline::new(
            FakeSearch::returning(Some(toxic())),
            FakePages::serving(Some("<html></html>")),
            LyricsExtractor::default(),
            "!",
            4096,
        );
        let replier = RecordingReplier::default();

        for input in ["/start", "/help", "/lyrics Toxic", "  /unknown", "!help", "", "   "] {
            assert_eq!(pipeline.respond(input, &replier).await, Outcome::Ignored);
        }

        assert_eq!(pipeline.search.calls.load(Ordering::SeqCst), 0);
        assert!(replier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_long_lyrics_are_chunked_in_order() {
        let verse = "There's no escape, I can't wait, I need a hit".repeat(20);
        let page = format!(
            r#"<html><body><div data-lyrics-container="true">{}</div></body></html>"#,
            verse
        );
        let pipeline = LyricsPipeline::new(
            FakeSearch::returning(Some(toxic())),
            FakePages::serving(Some(page.as_str())),
            LyricsExtractor::new(vec![ExtractionStrategy::Containers]),
            "/",
            100,
        );
        let replier = RecordingReplier::default();

        let outcome = pipeline.respond("Toxic", &replier).await;

        let sent = replier.sent();
        let lyric_chunks = &sent[1..];
        assert_eq!(outcome, Outcome::Lyrics { chunks: lyric_chunks.len() });
        assert!(lyric_chunks.len() > 1);
        assert!(lyric_chunks.iter().all(|c| c.chars().count() <= 100));
        assert_eq!(
            lyric_chunks.concat(),
            format!("[ Toxic - Britney Spears ]\n\n{}", verse)
        );
    }
}
