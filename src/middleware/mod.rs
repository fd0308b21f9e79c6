//! Middleware modules for request processing.
//!
//! This module contains middleware and extractors for handling cross-cutting
//! concerns like authentication, tenancy enforcement, and role checking.
//!
//! # Modules
//!
//! - [`auth`]: JWT extractor with tenant scope resolution
//! - [`role`]: Role gate middleware for route groups
//!
//! # Authentication Flow
//!
//! 1. Client sends request with `Authorization: Bearer <token>` header
//! 2. `AuthUser` extractor validates the JWT and extracts claims
//! 3. Tenant-scoped roles must present a matching `X-Tenant-Id` header
//! 4. Role gates reject callers whose role is not on the route's allowlist
//! 5. Handler executes if all checks pass
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::auth::AuthUser;
//!
//! // Basic authentication (any valid token)
//! async fn get_profile(auth_user: AuthUser) -> impl IntoResponse {
//!     let user_id = auth_user.user_id()?;
//!     // ...
//! }
//! ```
//!
//! # Role Gates
//!
//! Route groups are gated with `route_layer`:
//!
//! ```ignore
//! use crate::middleware::role::require_superadmin;
//!
//! let admin_routes = init_licenses_router()
//!     .route_layer(middleware::from_fn_with_state(state.clone(), require_superadmin));
//! ```

pub mod auth;
pub mod role;
