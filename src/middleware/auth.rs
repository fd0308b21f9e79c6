use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use uuid::Uuid;

use crate::modules::auth::model::Claims;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::verify_token;

/// Header carrying the tenant a request operates on.
pub const TENANT_HEADER: &str = "x-tenant-id";

/// Roles that may act without (or across) the tenant header check.
const TENANT_EXEMPT_ROLES: [&str; 3] = ["superadmin", "admin", "tenant"];

/// Extractor that validates the JWT and resolves the request's tenant scope.
///
/// Tenant-scoped roles must send an `X-Tenant-Id` header matching the tenant
/// in their token. Exempt roles (superadmin, admin, tenant root) may omit the
/// header; for them the effective tenant falls back to the token's scope.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub claims: Claims,
    /// Tenant the request is acting on, once the header/token check passed
    pub tenant_id: Option<Uuid>,
}

impl AuthUser {
    /// Get the user ID as UUID
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.claims.sub)
            .map_err(|_| AppError::unauthorized("Invalid user ID in token".to_string()))
    }

    /// Get the user's email
    pub fn email(&self) -> &str {
        &self.claims.email
    }

    /// Get the user's role name
    pub fn role(&self) -> &str {
        &self.claims.role
    }
}

/// Decides the effective tenant for a request.
///
/// Enforced roles must present a header that matches the token's tenant.
/// Exempt roles (and deployments with enforcement switched off) may select a
/// tenant via the header, defaulting to the token's own scope.
fn resolve_tenant_scope(
    role: &str,
    token_tenant: Option<Uuid>,
    header_tenant: Option<Uuid>,
    enforce: bool,
) -> Result<Option<Uuid>, AppError> {
    let exempt = TENANT_EXEMPT_ROLES.contains(&role.to_lowercase().as_str());

    if !enforce || exempt {
        return Ok(header_tenant.or(token_tenant));
    }

    let header = header_tenant.ok_or_else(|| {
        AppError::forbidden("Tenant header required. Provide X-Tenant-Id.".to_string())
    })?;
    let claimed = token_tenant
        .ok_or_else(|| AppError::forbidden("Token missing tenant scope.".to_string()))?;

    if header != claimed {
        return Err(AppError::forbidden(
            "Tenant mismatch. Provide correct X-Tenant-Id header.".to_string(),
        ));
    }

    Ok(Some(claimed))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Invalid or expired token".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Invalid or expired token".to_string()))?;

        let claims = verify_token(token, &state.jwt_config)?;

        let header_tenant = parts
            .headers
            .get(TENANT_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value.trim()).ok());

        let tenant_id = resolve_tenant_scope(
            &claims.role,
            claims.tenant_id,
            header_tenant,
            state.tenancy_config.enforce_tenant_header,
        )?;

        Ok(AuthUser { claims, tenant_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn claims_with_role(role: &str, tenant_id: Option<Uuid>) -> Claims {
        Claims {
            sub: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: role.to_string(),
            tenant_id,
            exp: 9999999999,
            iat: 1234567890,
        }
    }

    #[test]
    fn test_user_id() {
        let user_id = Uuid::new_v4();
        let mut claims = claims_with_role("agent", None);
        claims.sub = user_id.to_string();
        let auth_user = AuthUser {
            claims,
            tenant_id: None,
        };

        assert_eq!(auth_user.user_id().unwrap(), user_id);
    }

    #[test]
    fn test_invalid_user_id_rejected() {
        let mut claims = claims_with_role("agent", None);
        claims.sub = "not-a-uuid".to_string();
        let auth_user = AuthUser {
            claims,
            tenant_id: None,
        };

        assert!(auth_user.user_id().is_err());
    }

    #[test]
    fn enforced_role_needs_header() {
        let tenant = Uuid::new_v4();
        let err = resolve_tenant_scope("agent", Some(tenant), None, true).unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(
            err.error.to_string(),
            "Tenant header required. Provide X-Tenant-Id."
        );
    }

    #[test]
    fn enforced_role_needs_token_scope() {
        let tenant = Uuid::new_v4();
        let err = resolve_tenant_scope("agent", None, Some(tenant), true).unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.error.to_string(), "Token missing tenant scope.");
    }

    #[test]
    fn enforced_role_header_must_match() {
        let err = resolve_tenant_scope(
            "reviewer",
            Some(Uuid::new_v4()),
            Some(Uuid::new_v4()),
            true,
        )
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(
            err.error.to_string(),
            "Tenant mismatch. Provide correct X-Tenant-Id header."
        );
    }

    #[test]
    fn enforced_role_matching_header_passes() {
        let tenant = Uuid::new_v4();
        let scope = resolve_tenant_scope("agent", Some(tenant), Some(tenant), true).unwrap();
        assert_eq!(scope, Some(tenant));
    }

    #[test]
    fn superadmin_skips_header_check() {
        let scope = resolve_tenant_scope("superadmin", None, None, true).unwrap();
        assert_eq!(scope, None);
    }

    #[test]
    fn superadmin_header_selects_tenant() {
        let tenant = Uuid::new_v4();
        let scope = resolve_tenant_scope("superadmin", None, Some(tenant), true).unwrap();
        assert_eq!(scope, Some(tenant));
    }

    #[test]
    fn exempt_roles_fall_back_to_token_scope() {
        let tenant = Uuid::new_v4();
        for role in ["admin", "tenant", "Admin", "TENANT"] {
            let scope = resolve_tenant_scope(role, Some(tenant), None, true).unwrap();
            assert_eq!(scope, Some(tenant));
        }
    }

    #[test]
    fn enforcement_off_falls_back_to_token_scope() {
        let tenant = Uuid::new_v4();
        let scope = resolve_tenant_scope("agent", Some(tenant), None, false).unwrap();
        assert_eq!(scope, Some(tenant));
    }
}
