use chrono::Utc;
use futures::future::join_all;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::GenerationError;
use crate::executor::execute;
use crate::models::GeneratedImage;
use crate::prompt::RenderContext;
use crate::provider::GenerativeProvider;

/// Renders every variant concurrently and waits for all of them to settle.
///
/// All-or-nothing: the first failure in variant order fails the batch, and
/// no image from a failed batch is returned.
pub async fn run(
    provider: &dyn GenerativeProvider,
    variants: &[String],
    ctx: &RenderContext<'_>,
) -> Result<Vec<GeneratedImage>, GenerationError> {
    info!("🚀 Rendering {} variant(s) at {}", variants.len(), ctx.aspect_ratio.as_str());

    let calls = variants.iter().map(|prompt| async move {
        let request = ctx.build(prompt);
        execute(provider, &request).await.map(|img| (prompt, img))
    });
    let settled = join_all(calls).await;

    let failures = settled.iter().filter(|r| r.is_err()).count();
    if failures > 0 {
        error!("❌ {} of {} variant(s) failed, discarding batch", failures, settled.len());
    }

    let rendered = settled.into_iter().collect::<Result<Vec<_>, _>>()?;
    Ok(rendered
        .into_iter()
        .map(|(prompt, img)| GeneratedImage {
            id: Uuid::new_v4(),
            url: img.to_data_uri(),
            aspect_ratio: ctx.aspect_ratio,
            prompt: prompt.clone(),
            created_at: Utc::now(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AspectRatio, GenerationRequest};
    use crate::provider::fake::{png, FakeProvider};
    use crate::provider::ContentPart;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;
    use std::time::Duration;

    fn request() -> GenerationRequest {
        let mut req = GenerationRequest::new("bike");
        req.aspect_ratio = AspectRatio::Square;
        req
    }

    fn variants() -> Vec<String> {
        vec!["macro".into(), "lifestyle".into(), "abstract".into()]
    }

    #[tokio::test]
    async fn calls_run_concurrently() {
        // Each call blocks until all three are in flight, so a sequential
        // coordinator would never finish.
        let provider = FakeProvider::default().rendezvous(3);
        let req = request();
        let ctx = RenderContext::from(&req);
        let variants = variants();
        let images = tokio::time::timeout(Duration::from_secs(5), run(&provider, &variants, &ctx))
            .await
            .expect("fan-out deadlocked")
            .unwrap();
        assert_eq!(images.len(), 3);
    }

    #[tokio::test]
    async fn results_keep_variant_order_and_prompts() {
        let provider = FakeProvider::default();
        let req = request();
        let images = run(&provider, &variants(), &RenderContext::from(&req)).await.unwrap();

        let prompts: Vec<_> = images.iter().map(|i| i.prompt.as_str()).collect();
        assert_eq!(prompts, vec!["macro", "lifestyle", "abstract"]);
        let ids: HashSet<_> = images.iter().map(|i| i.id).collect();
        assert_eq!(ids.len(), 3);
        for img in &images {
            assert!(img.url.starts_with("data:image/png;base64,"));
            assert_eq!(img.aspect_ratio, AspectRatio::Square);
        }
    }

    #[tokio::test]
    async fn one_failure_fails_the_batch_after_all_settle() {
        let provider = FakeProvider::with_images(|req| {
            if req.text.contains("\"lifestyle\"") {
                Err(GenerationError::Http { status: 429, body: "quota".into() })
            } else {
                Ok(vec![ContentPart::Image(png("ok"))])
            }
        });
        let req = request();
        let err = run(&provider, &variants(), &RenderContext::from(&req)).await.unwrap_err();
        assert!(matches!(err, GenerationError::Http { status: 429, .. }));
        assert_eq!(provider.calls().2, 3);
    }

    #[tokio::test]
    async fn each_variant_gets_its_own_request() {
        let provider = FakeProvider::default();
        let req = request();
        run(&provider, &variants(), &RenderContext::from(&req)).await.unwrap();
        let texts: HashSet<_> = provider.image_requests.lock().iter().map(|r| r.text.clone()).collect();
        assert_eq!(texts.len(), 3);
    }
}
