use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, extract::State};
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

use super::model::{
    CreateUserRequest, CreateUserResponse, RegisterSuperadminRequest, RegisterSuperadminResponse,
    RegisterTenantRequest, RegisterTenantResponse, SuperadminProfile, TenantProfile, UserProfile,
};
use super::service::AccountService;

/// Register a platform superadmin
#[utoipa::path(
    post,
    path = "/register/superadmin",
    request_body = RegisterSuperadminRequest,
    responses(
        (status = 201, description = "SuperAdmin created", body = RegisterSuperadminResponse),
        (status = 409, description = "SuperAdmin with this email already exists", body = ErrorResponse),
        (status = 400, description = "Bad request - validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Registration"
)]
#[instrument(skip(state, dto))]
pub async fn register_superadmin(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterSuperadminRequest>,
) -> Result<(StatusCode, Json<RegisterSuperadminResponse>), AppError> {
    let user = AccountService::register_superadmin(&state.db, dto).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterSuperadminResponse {
            success: true,
            msg: "SuperAdmin created".to_string(),
            user,
        }),
    ))
}

/// Register a tenant with its root login and default licenses
#[utoipa::path(
    post,
    path = "/register/tenant",
    request_body = RegisterTenantRequest,
    responses(
        (status = 200, description = "Tenant created", body = RegisterTenantResponse),
        (status = 400, description = "Tenant already exists", body = ErrorResponse),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Forbidden - superadmin only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Registration"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn register_tenant(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<RegisterTenantRequest>,
) -> Result<Json<RegisterTenantResponse>, AppError> {
    let creator_id = auth_user.user_id()?;
    let (tenant, tenant_user) = AccountService::register_tenant(&state.db, dto, creator_id).await?;

    Ok(Json(RegisterTenantResponse {
        success: true,
        msg: "Tenant created with tenant user and default licenses".to_string(),
        tenant,
        tenant_user,
    }))
}

/// Create a user inside the caller's tenant
#[utoipa::path(
    post,
    path = "/register/user",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = CreateUserResponse),
        (status = 400, description = "Bad request - duplicate email or missing tenant binding", body = ErrorResponse),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Forbidden - role not allowed or license exhausted", body = ErrorResponse),
        (status = 404, description = "Tenant not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Registration"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreateUserResponse>), AppError> {
    let caller_id = auth_user.user_id()?;
    let user = AccountService::create_user(
        &state.db,
        dto,
        auth_user.role(),
        auth_user.tenant_id,
        caller_id,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            success: true,
            msg: "User created".to_string(),
            user,
        }),
    ))
}

/// Get the caller's profile, shaped by role
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Superadmin profile", body = SuperadminProfile),
        (status = 200, description = "Tenant profile", body = TenantProfile),
        (status = 200, description = "User profile", body = UserProfile),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Tenant or user not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Profile"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Response, AppError> {
    match auth_user.role().to_lowercase().as_str() {
        "superadmin" => {
            let profile =
                AccountService::superadmin_profile(&state.db, auth_user.email()).await?;
            Ok(Json(profile).into_response())
        }
        "tenant" => {
            let profile = AccountService::tenant_profile(&state.db, auth_user.tenant_id).await?;
            Ok(Json(profile).into_response())
        }
        _ => {
            let user_id = auth_user.user_id()?;
            let profile =
                AccountService::user_profile(&state.db, user_id, auth_user.email()).await?;
            Ok(Json(profile).into_response())
        }
    }
}
