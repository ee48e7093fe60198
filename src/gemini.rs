use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use reqwest::Client;
use tracing::{debug, error, info, instrument};

use crate::config::GeminiConfig;
use crate::error::GenerationError;
use crate::media::{InlineImage, DEFAULT_MIME_TYPE};
use crate::prompt::BannerRequest;
use crate::provider::{ContentPart, GenerativeProvider};

const LOGGED_PAYLOAD_PREFIX: usize = 50;

fn is_base64_payload(s: &str) -> bool {
    s.len() > 2 * LOGGED_PAYLOAD_PREFIX && s.bytes().all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'='))
}

/// Shortens every inline `data` payload so request and response logs stay readable.
fn shorten_inline_payloads(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                if key != "data" {
                    shorten_inline_payloads(val);
                    continue;
                }
                let shortened = val.as_str().filter(|s| is_base64_payload(s)).map(|s| {
                    format!("{}...[truncated {} chars]", &s[..LOGGED_PAYLOAD_PREFIX], s.len() - LOGGED_PAYLOAD_PREFIX)
                });
                if let Some(short) = shortened {
                    *val = Value::String(short);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(shorten_inline_payloads),
        _ => {}
    }
}

fn loggable(value: &Value) -> String {
    let mut copy = value.clone();
    shorten_inline_payloads(&mut copy);
    serde_json::to_string(&copy).unwrap_or_default()
}

/// Gemini `generateContent` client. The credential is fixed at construction.
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self { client: Client::new(), config }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.config.base_url.trim_end_matches('/'), model)
    }

    async fn perform_api_call(&self, model: &str, body: Value) -> Result<GeminiResponse, GenerationError> {
        let api_key = self.config.api_key.as_deref().ok_or(GenerationError::MissingApiKey)?;
        let url = self.endpoint(model);

        info!("🔗 Making request to: {}", url);
        debug!("📤 Request body: {}", loggable(&body));

        let response = self.client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        info!("📥 Response status: {}", status);

        let response_text = response.text().await?;
        if !status.is_success() {
            error!("❌ API Error response: {}", response_text);
            return Err(GenerationError::Http { status: status.as_u16(), body: response_text });
        }

        let raw: Value = serde_json::from_str(&response_text)
            .map_err(|e| GenerationError::Parse(e.to_string()))?;
        debug!("📥 Raw Gemini API response: {}", loggable(&raw));

        let parsed: GeminiResponse = serde_json::from_value(raw)
            .map_err(|e| GenerationError::Parse(e.to_string()))?;
        parsed.check_blocked()?;
        Ok(parsed)
    }
}

#[async_trait]
impl GenerativeProvider for GeminiClient {
    #[instrument(skip_all, fields(model = %self.config.text_model))]
    async fn complete_text(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });
        let parsed = self.perform_api_call(&self.config.text_model, body).await?;
        parsed.first_text().ok_or(GenerationError::EmptyResponse)
    }

    #[instrument(skip_all, fields(model = %self.config.text_model))]
    async fn complete_string_list(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": { "type": "ARRAY", "items": { "type": "STRING" } }
            }
        });
        let parsed = self.perform_api_call(&self.config.text_model, body).await?;
        parsed.first_text().ok_or(GenerationError::EmptyResponse)
    }

    #[instrument(skip_all, fields(model = %self.config.image_model, aspect_ratio = request.aspect_ratio.as_str()))]
    async fn generate_image(&self, request: &BannerRequest) -> Result<Vec<ContentPart>, GenerationError> {
        let mut parts = vec![json!({ "text": request.text })];
        if let Some(attachment) = &request.attachment {
            parts.push(json!({
                "inlineData": { "mimeType": attachment.mime_type, "data": attachment.to_base64() }
            }));
        }
        let body = json!({
            "contents": [{ "parts": parts }],
            "generationConfig": {
                "responseModalities": ["TEXT", "IMAGE"],
                "imageConfig": { "aspectRatio": request.aspect_ratio.as_str() }
            }
        });
        let parsed = self.perform_api_call(&self.config.image_model, body).await?;
        parsed.into_content_parts()
    }
}

// --- Response Parsing Helpers ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Content,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct Content { #[serde(default)] parts: Vec<Part> }

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Part {
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData
    },
    Text { text: String },
    Other(Value)
}

#[derive(Debug, Deserialize)]
struct InlineData {
    #[serde(default)]
    data: String,
    #[serde(rename = "mimeType", default)]
    mime_type: Option<String>,
}

const SAFETY_FINISH_REASONS: &[&str] = &["SAFETY", "PROHIBITED_CONTENT", "BLOCKLIST", "SPII", "IMAGE_SAFETY"];

impl GeminiResponse {
    /// A refusal shows up either as prompt feedback or as a safety finish with nothing in it.
    fn check_blocked(&self) -> Result<(), GenerationError> {
        if self.candidates.is_empty() {
            if let Some(reason) = self.prompt_feedback.as_ref().and_then(|f| f.block_reason.clone()) {
                return Err(GenerationError::Blocked(reason));
            }
        }
        for c in &self.candidates {
            if let Some(reason) = &c.finish_reason {
                if c.content.parts.is_empty() && SAFETY_FINISH_REASONS.contains(&reason.as_str()) {
                    return Err(GenerationError::Blocked(reason.clone()));
                }
            }
        }
        Ok(())
    }

    fn first_text(&self) -> Option<String> {
        self.candidates
            .iter()
            .flat_map(|c| &c.content.parts)
            .find_map(|p| match p {
                Part::Text { text } if !text.trim().is_empty() => Some(text.trim().to_string()),
                _ => None,
            })
    }

    fn into_content_parts(self) -> Result<Vec<ContentPart>, GenerationError> {
        let mut out = Vec::new();
        for part in self.candidates.into_iter().take(1).flat_map(|c| c.content.parts) {
            match part {
                Part::Inline { inline_data } if !inline_data.data.is_empty() => {
                    let mime = inline_data.mime_type.unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());
                    info!("🎯 Found image data with mime type: {}", mime);
                    let image = InlineImage::from_base64(mime, &inline_data.data)
                        .map_err(|e| GenerationError::Parse(e.to_string()))?;
                    out.push(ContentPart::Image(image));
                }
                Part::Text { text } => out.push(ContentPart::Text(text)),
                _ => {}
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(value: Value) -> GeminiResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn extracts_text_and_image_parts() {
        let resp = parse(json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "Here is your banner" },
                    { "inlineData": { "mimeType": "image/jpeg", "data": "/9j/AA==" } }
                ]},
                "finishReason": "STOP"
            }]
        }));
        assert!(resp.check_blocked().is_ok());
        assert_eq!(resp.first_text().as_deref(), Some("Here is your banner"));
        let parts = resp.into_content_parts().unwrap();
        assert_eq!(parts, vec![
            ContentPart::Text("Here is your banner".into()),
            ContentPart::Image(InlineImage::new("image/jpeg", vec![0xFF, 0xD8, 0xFF, 0x00])),
        ]);
    }

    #[test]
    fn missing_mime_type_defaults_to_png() {
        let resp = parse(json!({
            "candidates": [{ "content": { "parts": [{ "inlineData": { "data": "AAAA" } }] } }]
        }));
        match &resp.into_content_parts().unwrap()[0] {
            ContentPart::Image(img) => assert_eq!(img.mime_type, "image/png"),
            other => panic!("unexpected part {other:?}"),
        }
    }

    #[test]
    fn prompt_feedback_block_is_reported() {
        let resp = parse(json!({ "promptFeedback": { "blockReason": "PROHIBITED_CONTENT" } }));
        let err = resp.check_blocked().unwrap_err();
        assert_eq!(err.to_string(), "request blocked by provider: PROHIBITED_CONTENT");
    }

    #[test]
    fn empty_safety_finish_is_reported() {
        let resp = parse(json!({ "candidates": [{ "finishReason": "IMAGE_SAFETY" }] }));
        assert!(matches!(resp.check_blocked(), Err(GenerationError::Blocked(_))));
    }

    #[test]
    fn text_only_reply_has_no_image() {
        let resp = parse(json!({ "candidates": [{ "content": { "parts": [{ "text": "Sorry" }] } }] }));
        let parts = resp.into_content_parts().unwrap();
        assert_eq!(parts, vec![ContentPart::Text("Sorry".into())]);
    }

    #[test]
    fn truncates_long_base64_for_logs() {
        let data = "A".repeat(500);
        let logged = loggable(&json!({ "inlineData": { "data": data } }));
        assert!(logged.contains("[truncated 450 chars]"));
        assert!(!logged.contains(&"A".repeat(100)));
    }

    #[test]
    fn non_ascii_data_is_logged_verbatim() {
        let data = "é".repeat(120);
        let logged = loggable(&json!({ "parts": [{ "inlineData": { "data": data } }] }));
        assert!(logged.contains(&data));
        assert!(!logged.contains("truncated"));
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let client = GeminiClient::new(GeminiConfig { api_key: None, ..GeminiConfig::default() });
        let err = client.complete_text("hi").await.unwrap_err();
        assert!(matches!(err, GenerationError::MissingApiKey));
    }

    #[test]
    fn endpoint_uses_configured_base_and_model() {
        let client = GeminiClient::new(GeminiConfig {
            base_url: "http://localhost:9999/v1beta/".into(),
            ..GeminiConfig::default()
        });
        assert_eq!(client.endpoint("gemini-2.5-flash-image"), "http://localhost:9999/v1beta/models/gemini-2.5-flash-image:generateContent");
    }
}
