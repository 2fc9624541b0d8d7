use axum::extract::Multipart;

use crate::config;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::caption_service::{CaptionDetection, CaptionService};

/// POST /api/ai/detect - Caption-assist for the report form
///
/// Multipart: an `image` file plus an optional `location` text field. Returns
/// `{description, typeOfIssue, location}`. Captioning-service failure is not
/// an error here; the response degrades to synthesized text. The only 400 is
/// a request without an image.
pub async fn detect(mut multipart: Multipart) -> ApiResult<CaptionDetection> {
    let mut image: Option<(Vec<u8>, String)> = None;
    let mut location: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::bad_request("Could not read uploaded file"))?
    {
        match field.name() {
            Some("image") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::bad_request("Could not read uploaded file"))?;
                image = Some((bytes.to_vec(), filename));
            }
            Some("location") => {
                location = field.text().await.ok();
            }
            _ => {}
        }
    }

    let (bytes, filename) = image.ok_or_else(|| ApiError::bad_request("No image uploaded"))?;

    if bytes.len() > config::config().api.max_upload_bytes {
        return Err(ApiError::bad_request("Uploaded image is too large"));
    }

    // The upload stays in memory for the duration of the call; nothing is
    // spooled to disk, so there is no cleanup path to get wrong.
    let service = CaptionService::new();
    let detection = service
        .detect(&bytes, &filename, location.as_deref())
        .await;

    Ok(ApiResponse::success(detection))
}
