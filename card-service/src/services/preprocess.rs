//! Decoding of uploaded card images before they are sent to the model.
//!
//! The filename only decides whether an upload is allowed. What goes to the
//! model is decided by the bytes: every upload is decoded, PNG, JPEG and WebP
//! are forwarded unchanged, and the remaining formats are re-encoded as PNG.

use crate::services::upload::{ImageFormat, UploadedImage};
use axum::body::Bytes;
use image::{DynamicImage, ImageFormat as DecodedFormat};
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("cannot decode image: {0}")]
    Undecodable(#[from] image::ImageError),

    #[error("image worker failed: {0}")]
    Worker(String),
}

/// Decode `upload` and return it in a format the model accepts.
///
/// The returned image carries the format of the bytes actually sent, so its
/// MIME type never comes from the filename.
pub fn prepare(upload: UploadedImage) -> Result<UploadedImage, PreprocessError> {
    let detected = image::guess_format(&upload.data)?;
    let decoded = image::load_from_memory_with_format(&upload.data, detected)?;

    let (format, data) = match detected {
        DecodedFormat::Png => (ImageFormat::Png, upload.data),
        DecodedFormat::Jpeg => (ImageFormat::Jpeg, upload.data),
        DecodedFormat::WebP => (ImageFormat::Webp, upload.data),
        other => {
            tracing::debug!(
                filename = %upload.filename,
                source_format = ?other,
                "Re-encoding card image as PNG"
            );
            (ImageFormat::Png, encode_png(&decoded)?)
        }
    };

    Ok(UploadedImage {
        filename: upload.filename,
        format,
        data,
    })
}

/// Run [`prepare`] on the blocking pool; decoding a 16 MiB upload is CPU work.
pub async fn prepare_blocking(upload: UploadedImage) -> Result<UploadedImage, PreprocessError> {
    tokio::task::spawn_blocking(move || prepare(upload))
        .await
        .map_err(|e| PreprocessError::Worker(e.to_string()))?
}

fn encode_png(img: &DynamicImage) -> Result<Bytes, image::ImageError> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buf = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut buf), DecodedFormat::Png)?;
    Ok(Bytes::from(buf))
}
