use thiserror::Error;

/// Failures raised by provider calls and the image executor.
///
/// The display strings are what the classifier reads, so they keep the
/// provider's own vocabulary (status codes, response bodies) intact.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("API key is not configured")]
    MissingApiKey,
    #[error("network error: fetch failed: {0}")]
    Network(String),
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("request blocked by provider: {0}")]
    Blocked(String),
    #[error("failed to parse provider response: {0}")]
    Parse(String),
    #[error("provider returned an empty response")]
    EmptyResponse,
    #[error("No image data found in response")]
    NoImageData,
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        // Never echo the request URL back into messages.
        Self::Network(e.without_url().to_string())
    }
}
