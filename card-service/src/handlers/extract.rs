use crate::error::ExtractError;
use crate::models::ResponseEnvelope;
use crate::services::{normalize, preprocess};
use crate::services::upload::{self, UploadError};
use crate::startup::AppState;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use metrics::{counter, histogram};
use std::time::Instant;

pub const SUCCESS_MESSAGE: &str = "Business card processed successfully";

/// `POST /extract-card`: read the `image` part, run it through the vision
/// model and return the parsed card fields.
pub async fn extract_card(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ResponseEnvelope>, ExtractError> {
    let result = process_card(&state, multipart).await;

    let outcome = match &result {
        Ok(_) => "success",
        Err(e) => e.outcome(),
    };
    counter!("card_extractions_total", "outcome" => outcome).increment(1);

    result.map(Json)
}

async fn process_card(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<ResponseEnvelope, ExtractError> {
    // A body that is not multipart/form-data cannot carry the image part.
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!(rejection = %rejection, "Request body is not a multipart form");
        UploadError::MissingImage
    })?;

    let uploaded = upload::read_image(&mut multipart, state.config.upload.max_bytes).await?;
    let uploaded_size = uploaded.size();
    let image = preprocess::prepare_blocking(uploaded).await?;

    tracing::info!(
        filename = %image.filename,
        mime_type = %image.mime_type(),
        uploaded_size,
        size = image.size(),
        "Card upload accepted"
    );

    let started = Instant::now();
    let reply = state.provider.extract(state.prompt, &image).await;
    histogram!(
        "card_provider_latency_seconds",
        "provider" => state.provider.name()
    )
    .record(started.elapsed().as_secs_f64());

    let raw = reply?;
    let data = normalize(&raw)?;

    tracing::info!(
        filename = %image.filename,
        provider = state.provider.name(),
        "Business card processed"
    );

    Ok(ResponseEnvelope::success(SUCCESS_MESSAGE, data))
}
