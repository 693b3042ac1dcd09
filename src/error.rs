use reqwest::StatusCode;
use thiserror::Error;

/// Error types for the lyrics lookup pipeline
#[derive(Debug, Error)]
pub enum LyricsError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("malformed search response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to deliver message: {0}")]
    Delivery(#[from] serenity::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_names_url() {
        let err = LyricsError::Status {
            url: "http://example.com/toxic".to_string(),
            status: StatusCode::FORBIDDEN,
        };
        let text = err.to_string();
        assert!(text.contains("http://example.com/toxic"));
        assert!(text.contains("403"));
    }
}
