use axum::{extract::Query, Extension};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::issue_service::IssueService;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "reportedBy")]
    pub reported_by: Option<String>,
}

/// GET /api/users/my-issues - The authenticated reporter's own issues
pub async fn my_issues(Extension(user): Extension<AuthUser>) -> ApiResult<Value> {
    let identifier = user
        .identifier()
        .ok_or_else(|| ApiError::unauthorized("Credential carries no contact identifier"))?
        .to_string();

    let service = IssueService::new().await?;
    let issues = service.list_by_reporter(&identifier).await?;

    Ok(ApiResponse::success(json!({ "issues": issues })))
}

/// GET /api/issues?reportedBy= - Issues for one reporter, or all of them
///
/// Citizens may only read their own reports; the unfiltered listing and other
/// reporters' listings require the authority role.
pub async fn list(
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Value> {
    let service = IssueService::new().await?;

    let issues = match query.reported_by.as_deref().map(str::trim) {
        Some(reporter) if !reporter.is_empty() => {
            if !user.is_authority() && user.identifier() != Some(reporter) {
                return Err(ApiError::forbidden(
                    "Only authorities may list another reporter's issues",
                ));
            }
            service.list_by_reporter(reporter).await?
        }
        _ => {
            if !user.is_authority() {
                return Err(ApiError::forbidden(
                    "Only authorities may list all issues",
                ));
            }
            service.list().await?
        }
    };

    Ok(ApiResponse::success(json!({ "issues": issues })))
}
