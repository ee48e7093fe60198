//! A/B variation planning. Fail-open: any defect degrades to repeating the base prompt.

use tracing::{info, warn};

use crate::models::VariationCount;
use crate::provider::GenerativeProvider;

pub fn variation_prompt(base: &str, count: usize) -> String {
    format!(
        "You are a creative director generating A/B testing variations for an ad campaign.\n\n\
        Base Concept: \"{base}\"\n\n\
        Generate {count} distinct prompt variations based on this concept.\n\
        - Variation 1: Focus purely on Product Details (Macro/Close-up).\n\
        - Variation 2: Focus on Lifestyle/Context/Atmosphere.\n\
        - Variation 3 (if requested): Focus on Bold Minimalism or Abstract Composition.\n\n\
        Keep each prompt under 50 words. Return ONLY a valid JSON array of strings."
    )
}

pub async fn plan(provider: &dyn GenerativeProvider, base: &str, count: VariationCount) -> Vec<String> {
    let count = count.get();
    if count == 1 {
        return vec![base.to_string()];
    }

    match provider.complete_string_list(&variation_prompt(base, count)).await {
        Ok(raw) => {
            let variants = reconcile(&raw, base, count);
            info!("🎨 Planned {} variations", variants.len());
            variants
        }
        Err(e) => {
            warn!(error = %e, "⚠️ Variation planning failed, repeating base prompt");
            vec![base.to_string(); count]
        }
    }
}

/// Coerces a raw planner reply into exactly `count` prompts.
pub fn reconcile(raw: &str, base: &str, count: usize) -> Vec<String> {
    let mut variants = match serde_json::from_str::<Vec<String>>(raw.trim()) {
        Ok(v) if !v.is_empty() => v,
        Ok(_) => {
            warn!("⚠️ Planner returned an empty list");
            Vec::new()
        }
        Err(e) => {
            warn!(error = %e, "⚠️ Planner reply is not a JSON string array");
            Vec::new()
        }
    };
    variants.truncate(count);
    variants.resize(count, base.to_string());
    variants
}
