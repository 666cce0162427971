#![allow(dead_code)]

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    routing::post,
    Json, Router,
};
use card_service::config::CardConfig;
use card_service::services::providers::gemini::{GeminiConfig, GeminiVisionProvider};
use card_service::services::VisionProvider;
use card_service::startup::{router, AppState};
use http_body_util::BodyExt;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use secrecy::Secret;
use serde_json::Value;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tower::ServiceExt;

pub const BOUNDARY: &str = "card-test-boundary-7MA4YWxkTrZu0gW";

/// One part of a multipart/form-data body.
pub struct FormPart<'a> {
    pub name: &'a str,
    pub filename: Option<&'a str>,
    pub content_type: &'a str,
    pub data: &'a [u8],
}

impl<'a> FormPart<'a> {
    pub fn image(filename: &'a str, data: &'a [u8]) -> Self {
        Self {
            name: "image",
            filename: Some(filename),
            content_type: "application/octet-stream",
            data,
        }
    }
}

/// A small but real card image encoded as `format`.
pub fn card_image(format: ImageFormat) -> Vec<u8> {
    let img = match format {
        ImageFormat::Gif => {
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(32, 18, Rgba([240, 240, 230, 255])))
        }
        _ => DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 18, Rgb([240, 240, 230]))),
    };
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format)
        .expect("Failed to encode test image");
    buf
}

pub fn card_png() -> Vec<u8> {
    card_image(ImageFormat::Png)
}

/// Encode parts into a multipart/form-data body.
pub fn multipart_body(parts: &[FormPart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        let disposition = match part.filename {
            Some(filename) => format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                part.name, filename
            ),
            None => format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.name),
        };
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", part.content_type).as_bytes());
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn extract_request(parts: &[FormPart<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/extract-card")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .expect("Failed to build request")
}

/// Router wired to the given provider with default configuration.
pub fn test_router(provider: Arc<dyn VisionProvider>) -> Router {
    router(AppState::new(CardConfig::default(), provider))
}

/// Drive one request through the router and decode the JSON body.
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("Request failed");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    let body = serde_json::from_slice(&bytes).expect("Response body is not JSON");
    (status, body)
}

/// success=true ⇔ data present ⇔ error absent.
pub fn assert_envelope_invariant(body: &Value) {
    let success = body["success"].as_bool().expect("success must be a boolean");
    let object = body.as_object().expect("envelope must be an object");
    assert!(body["message"].is_string(), "message must be a string");
    assert_eq!(success, object.contains_key("data"), "data presence: {}", body);
    assert_eq!(success, !object.contains_key("error"), "error absence: {}", body);
}

/// Stand-in for the Gemini REST API, listening on a random local port.
#[derive(Clone)]
pub struct FakeGemini {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
    last_api_key: Arc<Mutex<Option<String>>>,
    last_body: Arc<Mutex<Option<Value>>>,
}

#[derive(Clone)]
struct FakeState {
    status: StatusCode,
    reply: Value,
    hits: Arc<AtomicUsize>,
    last_api_key: Arc<Mutex<Option<String>>>,
    last_body: Arc<Mutex<Option<Value>>>,
}

async fn fake_generate(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.hits.fetch_add(1, Ordering::SeqCst);
    *state.last_api_key.lock().unwrap() = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    *state.last_body.lock().unwrap() = Some(body);
    (state.status, Json(state.reply.clone()))
}

impl FakeGemini {
    /// Answer every call with `status` and `reply`.
    pub async fn spawn(status: StatusCode, reply: Value) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let last_api_key = Arc::new(Mutex::new(None));
        let last_body = Arc::new(Mutex::new(None));

        let state = FakeState {
            status,
            reply,
            hits: hits.clone(),
            last_api_key: last_api_key.clone(),
            last_body: last_body.clone(),
        };

        let app = Router::new()
            .route("/v1beta/models/*rest", post(fake_generate))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake Gemini listener");
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        FakeGemini {
            base_url: format!("http://127.0.0.1:{}/v1beta", port),
            hits,
            last_api_key,
            last_body,
        }
    }

    /// Answer with a single candidate whose text is `text`.
    pub async fn replying_text(text: &str) -> Self {
        Self::spawn(
            StatusCode::OK,
            serde_json::json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": text}]},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 1200, "candidatesTokenCount": 80}
            }),
        )
        .await
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last_api_key(&self) -> Option<String> {
        self.last_api_key.lock().unwrap().clone()
    }

    pub fn last_body(&self) -> Option<Value> {
        self.last_body.lock().unwrap().clone()
    }

    /// Gemini provider pointed at this fake, optionally with a credential.
    pub fn provider(&self, api_key: Option<&str>) -> Arc<dyn VisionProvider> {
        let provider = GeminiVisionProvider::new(GeminiConfig {
            api_key: api_key.map(|k| Secret::new(k.to_string())),
            model: "gemini-test".to_string(),
            api_base: self.base_url.clone(),
            timeout: None,
        })
        .expect("Failed to build Gemini provider");
        Arc::new(provider)
    }
}
