use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::issue_service::IssueService;

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub id: Option<String>,
    pub status: Option<String>,
}

/// POST /authority/update-status - Move an issue through the workflow
///
/// 400 when id/status are missing or the status is outside
/// {pending, in_progress, resolved}; 404 when the id resolves to nothing.
/// Setting the same status twice is idempotent.
pub async fn update_status(Json(payload): Json<UpdateStatusRequest>) -> ApiResult<Value> {
    let (id, status) = match (payload.id.as_deref(), payload.status.as_deref()) {
        (Some(id), Some(status)) if !id.is_empty() && !status.is_empty() => (id, status),
        _ => return Err(ApiError::bad_request("id and status required")),
    };

    // A malformed id cannot resolve to an issue.
    let id = Uuid::parse_str(id).map_err(|_| ApiError::not_found("Issue not found"))?;

    let service = IssueService::new().await?;
    let issue = service.update_status(id, status).await?;

    Ok(ApiResponse::success(json!({ "issue": issue })))
}
