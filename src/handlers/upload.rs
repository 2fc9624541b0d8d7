use axum::extract::Multipart;
use chrono::Utc;
use serde_json::{json, Value};
use std::path::Path;

use crate::config;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// POST /api/upload - Store a report photo under the uploads directory
///
/// Files are saved with a timestamp prefix so names never collide, and the
/// directory is served statically at /uploads.
pub async fn upload(mut multipart: Multipart) -> ApiResult<Value> {
    let mut stored: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::bad_request("Could not read uploaded file"))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let original = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|_| ApiError::bad_request("Could not read uploaded file"))?;

        if bytes.len() > config::config().api.max_upload_bytes {
            return Err(ApiError::bad_request("Uploaded image is too large"));
        }

        let uploads_dir = &config::config().api.uploads_dir;
        tokio::fs::create_dir_all(uploads_dir)
            .await
            .map_err(|e| ApiError::internal_server_error(format!("upload dir error: {}", e)))?;

        let name = format!("{}-{}", Utc::now().timestamp_millis(), sanitize(&original));
        let path = Path::new(uploads_dir).join(&name);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| ApiError::internal_server_error(format!("upload write error: {}", e)))?;

        stored = Some(name);
        break;
    }

    let name = stored.ok_or_else(|| ApiError::bad_request("No image uploaded"))?;

    Ok(ApiResponse::success(json!({
        "message": "Image uploaded successfully",
        "imageUrl": format!("/uploads/{}", name)
    })))
}

/// Keep filenames path- and URL-safe; anything unexpected becomes '_'.
fn sanitize(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_safe_characters() {
        assert_eq!(sanitize("pothole-main_street.jpg"), "pothole-main_street.jpg");
        assert_eq!(sanitize("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize("photo 1 (new).png"), "photo_1__new_.png");
    }
}
