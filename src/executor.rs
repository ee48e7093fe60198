use tracing::{debug, warn};

use crate::error::GenerationError;
use crate::media::InlineImage;
use crate::prompt::BannerRequest;
use crate::provider::{ContentPart, GenerativeProvider};

/// Issues one image-generation call and returns the first inline image in the reply.
pub async fn execute(provider: &dyn GenerativeProvider, request: &BannerRequest) -> Result<InlineImage, GenerationError> {
    let parts = provider.generate_image(request).await?;
    let total = parts.len();
    let image = parts.into_iter().find_map(|part| match part {
        ContentPart::Image(img) if !img.data.is_empty() => Some(img),
        _ => None,
    });
    match image {
        Some(img) => {
            debug!(mime_type = %img.mime_type, bytes = img.data.len(), "🖼️ Extracted image from response");
            Ok(img)
        }
        None => {
            warn!(parts = total, "⚠️ No inline image data found in response");
            Err(GenerationError::NoImageData)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AspectRatio;
    use crate::provider::fake::{png, FakeProvider};
    use pretty_assertions::assert_eq;

    fn request() -> BannerRequest {
        BannerRequest { text: "bike".into(), attachment: None, aspect_ratio: AspectRatio::Square }
    }

    #[tokio::test]
    async fn picks_first_image_part() {
        let provider = FakeProvider::with_images(|_| Ok(vec![
            ContentPart::Text("here you go".into()),
            ContentPart::Image(InlineImage::new("image/png", Vec::<u8>::new())),
            ContentPart::Image(png("first")),
            ContentPart::Image(png("second")),
        ]));
        assert_eq!(execute(&provider, &request()).await.unwrap(), png("first"));
    }

    #[tokio::test]
    async fn text_only_reply_is_no_output() {
        let provider = FakeProvider::with_images(|_| Ok(vec![ContentPart::Text("I can't draw that".into())]));
        let err = execute(&provider, &request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::NoImageData));
    }

    #[tokio::test]
    async fn provider_errors_pass_through() {
        let provider = FakeProvider::with_images(|_| Err(GenerationError::Http { status: 503, body: "overloaded".into() }));
        let err = execute(&provider, &request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Http { status: 503, .. }));
    }
}
