use tracing::{info, warn};

use crate::provider::GenerativeProvider;

pub fn enhancement_prompt(description: &str) -> String {
    format!(
        "You are an expert prompt engineer for AI image generation. Rewrite the following product description into a highly detailed, vivid, and effective prompt for an image generator. Focus on lighting, texture, composition, and mood. Keep it under 60 words. Do not add conversational text, just return the prompt.\n\nInput: \"{description}\""
    )
}

/// Rewrites a terse description into a richer prompt. Never fails: any provider
/// error or empty reply yields the original description.
pub async fn enhance(provider: &dyn GenerativeProvider, description: &str) -> String {
    match provider.complete_text(&enhancement_prompt(description)).await {
        Ok(text) if !text.trim().is_empty() => {
            let enhanced = text.trim().to_string();
            info!("✨ Enhanced prompt ({} -> {} chars)", description.len(), enhanced.len());
            enhanced
        }
        Ok(_) => {
            warn!("⚠️ Prompt enhancement returned empty text, keeping original");
            description.to_string()
        }
        Err(e) => {
            warn!(error = %e, "⚠️ Prompt enhancement failed, keeping original");
            description.to_string()
        }
    }
}
