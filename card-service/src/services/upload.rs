//! Validation of uploaded card images.
//!
//! The upload is read straight from the multipart stream into memory. It is
//! never written to disk, so dropping the [`UploadedImage`] at the end of the
//! request releases it on every exit path.

use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use thiserror::Error;

/// Multipart field that carries the card image.
pub const IMAGE_FIELD: &str = "image";

/// Image formats allowed for card uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Webp,
}

impl ImageFormat {
    /// Detect the format from a filename extension, case-insensitively.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "bmp" => Some(Self::Bmp),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Webp => "image/webp",
        }
    }
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("No image file provided")]
    MissingImage,

    #[error("No image file selected")]
    NoFileSelected,

    #[error("Invalid file type. Allowed types: png, jpg, jpeg, gif, bmp, webp")]
    UnsupportedType,

    #[error("File too large. Maximum size is {}MB", .max_bytes / (1024 * 1024))]
    TooLarge { max_bytes: usize },

    #[error("Failed to read multipart field: {0}")]
    Unreadable(String),
}

/// A validated card image, owned by the request that uploaded it.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub filename: String,
    /// Declared by the filename on upload; replaced with the decoded format
    /// by [`crate::services::preprocess::prepare`].
    pub format: ImageFormat,
    pub data: Bytes,
}

impl UploadedImage {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Check the filename of the `image` part before its body is buffered.
pub fn check_filename(filename: Option<&str>) -> Result<(String, ImageFormat), UploadError> {
    let filename = filename.ok_or(UploadError::MissingImage)?;
    if filename.is_empty() {
        return Err(UploadError::NoFileSelected);
    }

    let format = ImageFormat::from_filename(filename).ok_or(UploadError::UnsupportedType)?;
    Ok((filename.to_string(), format))
}

/// Enforce the size ceiling. A file of exactly `max_bytes` is accepted.
pub fn check_size(size: usize, max_bytes: usize) -> Result<(), UploadError> {
    if size > max_bytes {
        return Err(UploadError::TooLarge { max_bytes });
    }
    Ok(())
}

/// Pull the first `image` part out of the form and validate it.
///
/// Other parts are skipped. A body that overruns the transport limit is
/// reported as [`UploadError::TooLarge`] rather than a multipart failure.
pub async fn read_image(
    multipart: &mut Multipart,
    max_bytes: usize,
) -> Result<UploadedImage, UploadError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let (filename, format) = check_filename(field.file_name())?;

        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, max_bytes))?;
        check_size(data.len(), max_bytes)?;

        return Ok(UploadedImage {
            filename,
            format,
            data,
        });
    }

    Err(UploadError::MissingImage)
}

fn multipart_error(err: MultipartError, max_bytes: usize) -> UploadError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::TooLarge { max_bytes }
    } else {
        UploadError::Unreadable(err.body_text())
    }
}
