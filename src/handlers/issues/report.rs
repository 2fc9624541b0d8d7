use axum::{response::Json, Extension};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::issue_service::IssueService;

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub title: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "typeOfIssue")]
    pub type_of_issue: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

/// POST /api/users/report - Submit an issue as the authenticated reporter
///
/// 400 when title/location/typeOfIssue are missing, 429 once the reporter's
/// daily cap is reached (nothing is created in that case).
pub async fn report(
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ReportRequest>,
) -> ApiResult<Value> {
    let identifier = user
        .identifier()
        .ok_or_else(|| ApiError::unauthorized("Credential carries no contact identifier"))?
        .to_string();

    let service = IssueService::new().await?;
    let issue = service
        .submit(
            payload.title.as_deref().unwrap_or(""),
            payload.location.as_deref().unwrap_or(""),
            payload.type_of_issue.as_deref().unwrap_or(""),
            payload.description.as_deref(),
            payload.image.as_deref(),
            &identifier,
        )
        .await?;

    Ok(ApiResponse::created(json!({
        "message": "Issue reported successfully!",
        "issue": issue
    })))
}
