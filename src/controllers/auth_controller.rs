use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::models::account::NewAccount;
use crate::service::account_service::AccountService;
use crate::service::error::AuthError;
use crate::utils::auth::AuthenticatedUser;

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

#[derive(Debug, Deserialize)]
pub struct ResendOtpRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": "Auth service is running"
    }))
}

pub async fn register(
    service: web::Data<AccountService>,
    request: web::Json<NewAccount>,
) -> Result<HttpResponse, AuthError> {
    let email = request.email.trim().to_lowercase();

    if email.is_empty() || request.password.trim().is_empty() {
        return Err(AuthError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    let new_account = NewAccount {
        email,
        password: request.password.clone(),
    };
    new_account
        .validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    let email = service
        .register(&new_account.email, &new_account.password)
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "OTP sent to email. Please verify your account",
        "email": email,
    })))
}

pub async fn verify_otp(
    service: web::Data<AccountService>,
    request: web::Json<VerifyOtpRequest>,
) -> Result<HttpResponse, AuthError> {
    if request.email.trim().is_empty() || request.otp.trim().is_empty() {
        return Err(AuthError::Validation(
            "Email and OTP are required".to_string(),
        ));
    }

    service.verify_otp(&request.email, &request.otp).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Account verified successfully"
    })))
}

pub async fn resend_otp(
    service: web::Data<AccountService>,
    request: web::Json<ResendOtpRequest>,
) -> Result<HttpResponse, AuthError> {
    if request.email.trim().is_empty() {
        return Err(AuthError::Validation("Email is required".to_string()));
    }

    service.resend_otp(&request.email).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "A new OTP has been sent to your email"
    })))
}

pub async fn login(
    service: web::Data<AccountService>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AuthError> {
    if request.email.trim().is_empty() || request.password.trim().is_empty() {
        return Err(AuthError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    let (token, account) = service.login(&request.email, &request.password).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Login successful",
        "token": token,
        "user": {
            "email": account.email,
            "id": account.id,
        },
    })))
}

pub async fn landing(user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": format!("Welcome back, {}", user.email),
        "user": {
            "email": user.email,
            "userId": user.user_id,
        },
    }))
}

pub async fn profile(
    service: web::Data<AccountService>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AuthError> {
    let account = service.profile(user.user_id).await?;

    Ok(HttpResponse::Ok().json(json!({ "user": account })))
}
