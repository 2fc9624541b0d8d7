use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{generate_jwt, Claims};
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::user_service::UserService;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PhoneLoginRequest {
    pub phone: Option<String>,
}

/// POST /api/users/login - Email+password login, returns a signed token
pub async fn login(Json(payload): Json<LoginRequest>) -> ApiResult<Value> {
    let email = payload.email.as_deref().unwrap_or("").trim();
    let password = payload.password.as_deref().unwrap_or("");

    if email.is_empty() || password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let service = UserService::new().await?;
    let user = service.login(email, password).await?;
    let token = issue_token(&user)?;

    Ok(ApiResponse::success(json!({
        "message": "Login successful",
        "token": token
    })))
}

/// POST /api/users/login-phone - Phone login (OTP verification out of scope)
pub async fn login_phone(Json(payload): Json<PhoneLoginRequest>) -> ApiResult<Value> {
    let phone = payload.phone.as_deref().unwrap_or("").trim();

    if phone.is_empty() {
        return Err(ApiError::bad_request("Phone number required"));
    }

    let service = UserService::new().await?;
    let user = service.login_phone(phone).await?;
    let token = issue_token(&user)?;

    Ok(ApiResponse::success(json!({
        "message": "Phone login successful",
        "token": token
    })))
}

fn issue_token(user: &User) -> Result<String, ApiError> {
    let claims = Claims::new(
        user.id,
        user.email.clone(),
        user.phone.clone(),
        user.role.clone(),
    );
    Ok(generate_jwt(claims)?)
}
