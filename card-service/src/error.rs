use crate::models::ResponseEnvelope;
use crate::services::{NormalizeError, PreprocessError, ProviderError, UploadError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Every way a card extraction request can fail.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("service not configured")]
    NotConfigured,

    #[error("Error processing image: {0}")]
    Image(#[from] PreprocessError),

    #[error("Error processing image: {0}")]
    Provider(ProviderError),

    #[error(transparent)]
    Malformed(#[from] NormalizeError),

    #[error("Endpoint not found")]
    NotFound,
}

impl From<ProviderError> for ExtractError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured(_) => ExtractError::NotConfigured,
            other => ExtractError::Provider(other),
        }
    }
}

impl ExtractError {
    pub fn status(&self) -> StatusCode {
        match self {
            ExtractError::Upload(_) => StatusCode::BAD_REQUEST,
            ExtractError::NotFound => StatusCode::NOT_FOUND,
            ExtractError::NotConfigured
            | ExtractError::Image(_)
            | ExtractError::Provider(_)
            | ExtractError::Malformed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Metrics label for the `card_extractions_total` counter.
    pub fn outcome(&self) -> &'static str {
        match self {
            ExtractError::Upload(_) => "invalid_upload",
            ExtractError::NotConfigured => "not_configured",
            ExtractError::Image(_) => "undecodable_image",
            ExtractError::Provider(_) => "provider_error",
            ExtractError::Malformed(_) => "malformed_output",
            ExtractError::NotFound => "not_found",
        }
    }

    fn message(&self) -> &'static str {
        match self {
            ExtractError::NotFound => "Request failed",
            _ => "Business card processing failed",
        }
    }
}

impl IntoResponse for ExtractError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            ExtractError::Upload(err) => {
                tracing::warn!(error = %err, "Rejected card upload");
            }
            ExtractError::NotConfigured => {
                tracing::error!("Extraction requested but no Gemini API key is configured");
            }
            ExtractError::Image(err) => {
                tracing::warn!(error = %err, "Uploaded card image could not be decoded");
            }
            ExtractError::Provider(err) => {
                tracing::error!(error = %err, kind = err.kind(), "Vision provider call failed");
            }
            ExtractError::Malformed(err) => {
                tracing::warn!(error = %err, raw_response = %err.raw(), "Model returned malformed JSON");
            }
            ExtractError::NotFound => {}
        }

        let envelope = ResponseEnvelope::failure(self.message(), self.to_string());
        (status, Json(envelope)).into_response()
    }
}
