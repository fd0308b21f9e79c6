use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::metrics_middleware;
use crate::middleware::auth::TENANT_HEADER;
use crate::middleware::role::require_superadmin;
use crate::modules::accounts::router::{init_profile_router, init_register_router};
use crate::modules::auth::router::init_auth_router;
use crate::modules::licenses::router::init_licenses_router;
use crate::state::AppState;
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::{Json, Router, middleware};
use serde_json::json;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .route("/health", get(health_check))
        .nest("/auth", init_auth_router())
        .nest("/register", init_register_router(state.clone()))
        .merge(init_profile_router())
        .nest(
            "/licenses",
            init_licenses_router()
                .route_layer(middleware::from_fn_with_state(state.clone(), require_superadmin)),
        )
        .with_state(state.clone())
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                    axum::http::HeaderName::from_static(TENANT_HEADER),
                ])
                .expose_headers([
                    axum::http::header::AUTHORIZATION,
                    axum::http::HeaderName::from_static(TENANT_HEADER),
                ])
                .allow_credentials(true)
        })
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}
