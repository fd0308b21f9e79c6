use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::accounts::model::{
    CreateUserRequest, CreateUserResponse, CreatorSummary, PermissionEntry,
    RegisterSuperadminRequest, RegisterSuperadminResponse, RegisterTenantRequest,
    RegisterTenantResponse, SuperadminAccount, SuperadminIdentity, SuperadminPlaceholder,
    SuperadminProfile, TenantProfile, TenantSummary, TenantUserSummary, UserProfile, UserSummary,
};
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::auth::model::{
    ChallengeResponse, ForgotPasswordRequest, LoginRequest, MessageResponse, ResendRequest,
    ResetPasswordRequest, TokenPayload, VerifyRequest, VerifyResponse,
};
use crate::modules::licenses::model::{
    LicenseInfo, LicenseSummary, UpdateLicensesRequest, UpdateLicensesResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::resend_code,
        crate::modules::auth::controller::verify_code,
        crate::modules::auth::controller::forgot_password,
        crate::modules::auth::controller::reset_password,
        crate::modules::accounts::controller::register_superadmin,
        crate::modules::accounts::controller::register_tenant,
        crate::modules::accounts::controller::create_user,
        crate::modules::accounts::controller::get_profile,
        crate::modules::licenses::controller::list_licenses,
        crate::modules::licenses::controller::update_licenses,
    ),
    components(
        schemas(
            LoginRequest,
            ResendRequest,
            VerifyRequest,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            ChallengeResponse,
            TokenPayload,
            VerifyResponse,
            MessageResponse,
            RegisterSuperadminRequest,
            RegisterSuperadminResponse,
            RegisterTenantRequest,
            RegisterTenantResponse,
            CreateUserRequest,
            CreateUserResponse,
            TenantSummary,
            UserSummary,
            CreatorSummary,
            TenantUserSummary,
            PermissionEntry,
            SuperadminIdentity,
            SuperadminAccount,
            SuperadminPlaceholder,
            SuperadminProfile,
            TenantProfile,
            UserProfile,
            LicenseInfo,
            LicenseSummary,
            UpdateLicensesRequest,
            UpdateLicensesResponse,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login, two-factor verification and password reset"),
        (name = "Registration", description = "Superadmin, tenant and user provisioning"),
        (name = "Profile", description = "Role-shaped profile of the calling identity"),
        (name = "Licenses", description = "Per-tenant per-role seat licensing")
    ),
    info(
        title = "TenAuth API",
        version = "0.1.0",
        description = "A multi-tenant authentication backend built with Rust, Axum, and PostgreSQL featuring email two-factor login and seat licensing.",
        contact(
            name = "API Support",
            email = "support@tenauth.com"
        ),
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
