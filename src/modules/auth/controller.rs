use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use tracing::instrument;
use utoipa::ToSchema;

use crate::modules::two_factor::model::ChallengeContext;
use crate::modules::two_factor::service::TwoFactorService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

use super::model::{
    ChallengeResponse, ForgotPasswordRequest, LoginRequest, MessageResponse, ResendRequest,
    ResetPasswordRequest, VerifyRequest, VerifyResponse,
};
use super::service::AuthService;

#[derive(ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Client address and user agent, as seen at the edge.
fn challenge_context(headers: &HeaderMap) -> ChallengeContext {
    let ip = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string());

    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    ChallengeContext { ip, user_agent }
}

/// Check credentials and send a verification code
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Verification code sent", body = ChallengeResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 400, description = "Bad request - validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, headers, dto))]
pub async fn login_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<ChallengeResponse>, AppError> {
    let context = challenge_context(&headers);
    let challenge = AuthService::login(
        &state.db,
        &state.two_factor_config,
        &state.email_config,
        dto,
        context,
    )
    .await?;

    Ok(Json(ChallengeResponse {
        success: true,
        msg: "Verification code sent to your email".to_string(),
        challenge_id: challenge.challenge_id,
        expires_at: challenge.expires_at,
    }))
}

/// Resend the verification code for a pending challenge
#[utoipa::path(
    post,
    path = "/auth/2fa/resend",
    request_body = ResendRequest,
    responses(
        (status = 200, description = "Code resent", body = ChallengeResponse),
        (status = 400, description = "Challenge consumed or cooldown active", body = ErrorResponse),
        (status = 404, description = "Challenge not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state))]
pub async fn resend_code(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<ResendRequest>,
) -> Result<Json<ChallengeResponse>, AppError> {
    let challenge = TwoFactorService::resend_challenge(
        &state.db,
        &state.two_factor_config,
        &state.email_config,
        dto.challenge_id,
    )
    .await?;

    Ok(Json(ChallengeResponse {
        success: true,
        msg: "Code resent".to_string(),
        challenge_id: challenge.challenge_id,
        expires_at: challenge.expires_at,
    }))
}

/// Verify the emailed code and receive a JWT
#[utoipa::path(
    post,
    path = "/auth/2fa/verify",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Verification successful", body = VerifyResponse),
        (status = 400, description = "Invalid, expired or exhausted challenge", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, headers, dto))]
pub async fn verify_code(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedJson(dto): ValidatedJson<VerifyRequest>,
) -> Result<Json<VerifyResponse>, AppError> {
    let context = challenge_context(&headers);
    let response = AuthService::complete_login(
        &state.db,
        &state.jwt_config,
        &state.two_factor_config,
        dto.challenge_id,
        &dto.code,
        context,
    )
    .await?;

    Ok(Json(response))
}

/// Request password reset email
#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Password reset email sent", body = MessageResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 400, description = "Bad request - validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state))]
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    AuthService::forgot_password(&state.db, &state.email_config, dto).await?;
    Ok(Json(MessageResponse {
        success: true,
        msg: "Password reset instructions sent".to_string(),
    }))
}

/// Reset password using token
#[utoipa::path(
    post,
    path = "/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset successful", body = MessageResponse),
        (status = 400, description = "Bad request - invalid or expired token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    AuthService::reset_password(&state.db, dto).await?;
    Ok(Json(MessageResponse {
        success: true,
        msg: "Password reset successful".to_string(),
    }))
}
