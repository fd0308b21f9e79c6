use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;
use uuid::Uuid;

use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

use super::model::{LicenseInfo, UpdateLicensesRequest, UpdateLicensesResponse};
use super::service::LicenseService;

/// List a tenant's licenses
#[utoipa::path(
    get,
    path = "/licenses/{tenant_id}",
    params(
        ("tenant_id" = Uuid, Path, description = "Tenant ID")
    ),
    responses(
        (status = 200, description = "Licenses for the tenant", body = Vec<LicenseInfo>),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Forbidden - superadmin only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Licenses"
)]
#[instrument(skip(state))]
pub async fn list_licenses(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> Result<Json<Vec<LicenseInfo>>, AppError> {
    let licenses = LicenseService::list_for_tenant(&state.db, tenant_id).await?;
    Ok(Json(licenses))
}

/// Update a tenant's seat caps
#[utoipa::path(
    put,
    path = "/licenses/{tenant_id}",
    params(
        ("tenant_id" = Uuid, Path, description = "Tenant ID")
    ),
    request_body = UpdateLicensesRequest,
    responses(
        (status = 200, description = "Licenses updated", body = UpdateLicensesResponse),
        (status = 400, description = "Bad request - validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Forbidden - superadmin only", body = ErrorResponse),
        (status = 404, description = "License not found for a requested role", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Licenses"
)]
#[instrument(skip(state, dto))]
pub async fn update_licenses(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateLicensesRequest>,
) -> Result<Json<UpdateLicensesResponse>, AppError> {
    let licenses = LicenseService::update_licenses(&state.db, tenant_id, dto).await?;

    Ok(Json(UpdateLicensesResponse {
        success: true,
        msg: "Licenses updated".to_string(),
        licenses,
    }))
}
