use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::user_service::UserService;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
}

/// POST /api/users/register - Create a citizen account
///
/// Accepts email+password, phone, or both. 400 when the name or both contact
/// channels are missing, or when a user with that email/phone already exists.
pub async fn register(Json(payload): Json<RegisterRequest>) -> ApiResult<Value> {
    let service = UserService::new().await?;

    let user = service
        .register(
            payload.name.as_deref().unwrap_or(""),
            payload.email.as_deref(),
            payload.password.as_deref(),
            payload.phone.as_deref(),
        )
        .await?;

    Ok(ApiResponse::created(json!({
        "message": "User registered",
        "user": user
    })))
}
