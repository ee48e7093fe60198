use axum::{Json, Router, extract::{Path, State}, http::{StatusCode, header}, response::{IntoResponse, Response}, routing::{get, post}};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::catalog::{self, Options, SamplePrompt};
use crate::classify::ErrorReport;
use crate::enhance::enhance;
use crate::media::{InlineImage, MediaError};
use crate::models::{EnhanceBody, EnhanceResponse, GenerateBody, GeneratedImage, GenerationRequest, ValidationError};
use crate::orchestrator::{CycleError, Forge};
use crate::progress::ProgressState;

#[derive(Clone)]
pub struct AppState {
    pub forge: Arc<Forge>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/generate", post(generate))
        .route("/api/enhance", post(enhance_prompt))
        .route("/api/images", get(list_images))
        .route("/api/images/:id", get(get_image))
        .route("/api/images/:id/download", get(download_image))
        .route("/api/progress", get(get_progress))
        .route("/api/error", get(get_last_error))
        .route("/api/options", get(get_options))
        .route("/api/samples", get(get_samples))
        .layer(
            ServiceBuilder::new().layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}

pub enum ApiError {
    Validation(ValidationError),
    Cycle(CycleError),
    Media(MediaError),
    NotFound,
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self { Self::Validation(e) }
}

impl From<CycleError> for ApiError {
    fn from(e: CycleError) -> Self { Self::Cycle(e) }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(e) => (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response(),
            Self::Cycle(CycleError::Busy) => (StatusCode::CONFLICT, Json(json!({ "error": CycleError::Busy.to_string() }))).into_response(),
            Self::Cycle(CycleError::Failed(report)) => (report.category.status_code(), Json(report)).into_response(),
            Self::Media(e) => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() }))).into_response(),
            Self::NotFound => StatusCode::NOT_FOUND.into_response(),
        }
    }
}

pub async fn generate(State(state): State<AppState>, Json(body): Json<GenerateBody>) -> Result<Json<Vec<GeneratedImage>>, ApiError> {
    // Same as the disabled button: don't bother decoding a logo for a cycle that can't start.
    if state.forge.is_busy() {
        return Err(CycleError::Busy.into());
    }
    let request = GenerationRequest::try_from(body)?;
    let images = state.forge.generate(request).await?;
    Ok(Json(images))
}

pub async fn enhance_prompt(State(state): State<AppState>, Json(body): Json<EnhanceBody>) -> Result<Json<EnhanceResponse>, ApiError> {
    if body.description.trim().is_empty() {
        return Err(ValidationError::EmptyDescription.into());
    }
    let prompt = enhance(state.forge.provider(), &body.description).await;
    Ok(Json(EnhanceResponse { prompt }))
}

pub async fn list_images(State(state): State<AppState>) -> Json<Vec<GeneratedImage>> {
    Json(state.forge.images())
}

pub async fn get_image(Path(id): Path<Uuid>, State(state): State<AppState>) -> Result<Json<GeneratedImage>, ApiError> {
    state.forge.image(id).map(Json).ok_or(ApiError::NotFound)
}

pub async fn download_image(Path(id): Path<Uuid>, State(state): State<AppState>) -> Result<Response, ApiError> {
    let entry = state.forge.image(id).ok_or(ApiError::NotFound)?;
    let image = InlineImage::from_data_uri(&entry.url).map_err(ApiError::Media)?;
    let disposition = format!("attachment; filename=\"ad-genius-{}.{}\"", id, image.file_extension());
    tracing::info!("📦 Exporting image {} ({} bytes)", id, image.data.len());
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, image.mime_type.clone()), (header::CONTENT_DISPOSITION, disposition)],
        image.data,
    ).into_response())
}

pub async fn get_progress(State(state): State<AppState>) -> Json<ProgressState> {
    Json(state.forge.progress())
}

pub async fn get_last_error(State(state): State<AppState>) -> Result<Json<ErrorReport>, StatusCode> {
    state.forge.last_error().map(Json).ok_or(StatusCode::NO_CONTENT)
}

pub async fn get_options() -> Json<Options> {
    Json(catalog::options())
}

pub async fn get_samples() -> Json<&'static [SamplePrompt]> {
    Json(catalog::SAMPLE_PROMPTS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use crate::progress::ProgressConfig;
    use crate::provider::fake::{png, FakeProvider};
    use crate::provider::ContentPart;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use std::time::Duration;
    use tower::ServiceExt;

    fn app(provider: FakeProvider) -> Router {
        let progress = ProgressConfig { completion_grace: Duration::ZERO, ..ProgressConfig::default() };
        router(AppState { forge: Arc::new(Forge::new(Arc::new(provider), progress)) })
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(v) => builder.header("content-type", "application/json").body(Body::from(v.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        app.clone().oneshot(request).await.unwrap()
    }

    async fn json_body(resp: Response) -> Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn generate_then_list_and_download() {
        let app = app(FakeProvider::with_images(|_| Ok(vec![ContentPart::Image(InlineImage::new("image/jpeg", vec![0xFF, 0xD8, 0xFF]))])));

        let resp = send(&app, "POST", "/api/generate", Some(json!({ "description": "A bike", "aspect_ratio": "1:1" }))).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let images = json_body(resp).await;
        assert_eq!(images.as_array().unwrap().len(), 1);
        assert_eq!(images[0]["aspect_ratio"], "1:1");
        let id = images[0]["id"].as_str().unwrap().to_string();

        let listed = json_body(send(&app, "GET", "/api/images", None).await).await;
        assert_eq!(listed, images);

        let resp = send(&app, "GET", &format!("/api/images/{id}/download"), None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/jpeg");
        assert_eq!(
            resp.headers()[header::CONTENT_DISPOSITION].to_str().unwrap(),
            format!("attachment; filename=\"ad-genius-{id}.jpg\"")
        );
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(bytes.as_ref(), &[0xFF, 0xD8, 0xFF]);
    }

    #[tokio::test]
    async fn failure_returns_classified_report() {
        let app = app(FakeProvider::with_images(|_| Err(GenerationError::Http { status: 429, body: "RESOURCE_EXHAUSTED".into() })));

        let resp = send(&app, "POST", "/api/generate", Some(json!({ "description": "A bike" }))).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        let report = json_body(resp).await;
        assert_eq!(report["title"], "RATE LIMIT EXCEEDED");
        assert_eq!(report["steps"].as_array().unwrap().len(), 4);

        let last = json_body(send(&app, "GET", "/api/error", None).await).await;
        assert_eq!(last, report);
        assert_eq!(json_body(send(&app, "GET", "/api/images", None).await).await, json!([]));
    }

    #[tokio::test]
    async fn invalid_url_is_rejected_before_any_call() {
        let app = app(FakeProvider::default());
        let resp = send(&app, "POST", "/api/generate", Some(json!({ "description": "A bike", "product_url": "example.com" }))).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(resp).await["error"], "URL MUST START WITH HTTP:// OR HTTPS://");
    }

    #[tokio::test]
    async fn enhance_endpoint_falls_back_to_original() {
        let app = app(FakeProvider::default());
        let resp = send(&app, "POST", "/api/enhance", Some(json!({ "description": "bike" }))).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await["prompt"], "bike");
    }

    #[tokio::test]
    async fn idle_state_endpoints() {
        let app = app(FakeProvider::with_images(|_| Ok(vec![ContentPart::Image(png("x"))])));
        assert_eq!(send(&app, "GET", "/api/error", None).await.status(), StatusCode::NO_CONTENT);
        assert_eq!(send(&app, "GET", &format!("/api/images/{}", Uuid::new_v4()), None).await.status(), StatusCode::NOT_FOUND);

        let progress = json_body(send(&app, "GET", "/api/progress", None).await).await;
        assert_eq!(progress, json!({ "fraction": 0.0, "label": "GENERATE ASSET" }));

        let options = json_body(send(&app, "GET", "/api/options", None).await).await;
        assert_eq!(options["aspect_ratios"][0], json!({ "value": "1:1", "label": "Square (1:1)" }));
        let samples = json_body(send(&app, "GET", "/api/samples", None).await).await;
        assert_eq!(samples.as_array().unwrap().len(), catalog::SAMPLE_PROMPTS.len());
    }
}
