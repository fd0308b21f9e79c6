use crate::state::AppState;
use axum::{
    Router,
    routing::{get, put},
};

use super::controller::{list_licenses, update_licenses};

pub fn init_licenses_router() -> Router<AppState> {
    Router::new()
        .route("/{tenant_id}", get(list_licenses))
        .route("/{tenant_id}", put(update_licenses))
}
