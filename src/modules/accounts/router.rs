use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::middleware::role::{require_superadmin, require_tenant_or_admin};
use crate::state::AppState;

use super::controller::{create_user, get_profile, register_superadmin, register_tenant};

/// Registration routes. `/superadmin` is open; the other routes carry
/// role gates, which is why the router needs the state up front.
pub fn init_register_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/superadmin", post(register_superadmin))
        .merge(
            Router::new().route("/tenant", post(register_tenant)).route_layer(
                middleware::from_fn_with_state(state.clone(), require_superadmin),
            ),
        )
        .merge(
            Router::new().route("/user", post(create_user)).route_layer(
                middleware::from_fn_with_state(state, require_tenant_or_admin),
            ),
        )
}

/// The `/me` profile route. Any authenticated role may call it.
pub fn init_profile_router() -> Router<AppState> {
    Router::new().route("/me", get(get_profile))
}
