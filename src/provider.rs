use async_trait::async_trait;

use crate::error::GenerationError;
use crate::media::InlineImage;
use crate::prompt::BannerRequest;

/// One piece of a multimodal response.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text(String),
    Image(InlineImage),
}

/// The three call shapes the engine needs from a generative provider.
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// Plain text completion.
    async fn complete_text(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Structured completion constrained to a JSON array of strings; returns the raw JSON text.
    async fn complete_string_list(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Multimodal image generation.
    async fn generate_image(&self, request: &BannerRequest) -> Result<Vec<ContentPart>, GenerationError>;
}
