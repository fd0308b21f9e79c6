use crate::state::AppState;
use axum::{Router, routing::post};

use super::controller::{forgot_password, login_user, resend_code, reset_password, verify_code};

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login_user))
        .route("/2fa/resend", post(resend_code))
        .route("/2fa/verify", post(verify_code))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
}
