//! Role-based authorization middleware for Axum.
//!
//! Route groups attach these gates with `route_layer` and
//! `middleware::from_fn_with_state`. The gate runs the [`AuthUser`] extractor
//! first, so tenant header enforcement happens before the role check.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::middleware::auth::AuthUser;
use crate::modules::accounts::model::UserRole;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Middleware function that checks if the authenticated user has one of the
/// required roles.
///
/// # Usage with axum::middleware::from_fn_with_state
///
/// ```rust,ignore
/// use axum::{Router, middleware};
/// use crate::middleware::role::require_roles;
/// use crate::modules::accounts::model::UserRole;
///
/// let protected_routes = Router::new()
///     .route("/licenses", get(list_handler))
///     .layer(middleware::from_fn_with_state(
///         state.clone(),
///         |state, req, next| require_roles(state, req, next, vec![UserRole::Superadmin])
///     ));
/// ```
pub async fn require_roles(
    State(state): State<AppState>,
    req: Request,
    next: Next,
    allowed_roles: Vec<UserRole>,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;

    let user_role = parse_role_from_string(auth_user.role())?;

    if !allowed_roles.contains(&user_role) {
        return Err(AppError::forbidden(
            "Forbidden: insufficient role".to_string(),
        ));
    }

    let req = Request::from_parts(parts, body);
    Ok(next.run(req).await)
}

/// Gate for superadmin-only routes.
///
/// # Example
///
/// ```rust,ignore
/// use axum::{Router, middleware};
/// use crate::middleware::role::require_superadmin;
///
/// let license_routes = init_licenses_router()
///     .route_layer(middleware::from_fn_with_state(state.clone(), require_superadmin));
/// ```
pub async fn require_superadmin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    match require_roles(State(state), req, next, vec![UserRole::Superadmin]).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Gate for user-provisioning routes (tenant root and tenant admins).
pub async fn require_tenant_or_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    match require_roles(
        State(state),
        req,
        next,
        vec![UserRole::Tenant, UserRole::Admin],
    )
    .await
    {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Parse a role string into a UserRole enum.
///
/// Role names that are not system roles fail the gate rather than erroring
/// out, since a stale token is a caller problem, not a server one.
fn parse_role_from_string(role_str: &str) -> Result<UserRole, AppError> {
    UserRole::parse(role_str)
        .ok_or_else(|| AppError::forbidden("Forbidden: insufficient role".to_string()))
}
