use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// JWT Claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub email: String,
    pub role: String,
    pub tenant_id: Option<Uuid>,
    pub exp: usize,
    pub iat: usize,
}

/// The identity a correct password resolves to.
///
/// Login never trusts the caller about who they are; this is derived from the
/// credential tables. App users and tenant root accounts live in different
/// tables, and superadmins are app users without a tenant.
#[derive(Debug, Clone)]
pub enum AuthSubject {
    SuperAdmin {
        id: Uuid,
        email: String,
        name: Option<String>,
    },
    TenantUser {
        id: Uuid,
        email: String,
        name: Option<String>,
        role: String,
        tenant_id: Option<Uuid>,
    },
    TenantRoot {
        id: Uuid,
        email: String,
        name: Option<String>,
    },
}

impl AuthSubject {
    pub fn id(&self) -> Uuid {
        match self {
            AuthSubject::SuperAdmin { id, .. } => *id,
            AuthSubject::TenantUser { id, .. } => *id,
            AuthSubject::TenantRoot { id, .. } => *id,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            AuthSubject::SuperAdmin { email, .. } => email,
            AuthSubject::TenantUser { email, .. } => email,
            AuthSubject::TenantRoot { email, .. } => email,
        }
    }

    /// Role name recorded on the challenge and later baked into the JWT.
    pub fn role_name(&self) -> &str {
        match self {
            AuthSubject::SuperAdmin { .. } => "superadmin",
            AuthSubject::TenantUser { role, .. } => role,
            AuthSubject::TenantRoot { .. } => "tenant",
        }
    }

    /// Tenant scope. A tenant root account is scoped to itself.
    pub fn tenant_id(&self) -> Option<Uuid> {
        match self {
            AuthSubject::SuperAdmin { .. } => None,
            AuthSubject::TenantUser { tenant_id, .. } => *tenant_id,
            AuthSubject::TenantRoot { id, .. } => Some(*id),
        }
    }
}

// Login request structure
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email)]
    #[schema(example = "agent@acme.com")]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

// Resend request structure
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResendRequest {
    pub challenge_id: Uuid,
}

// Verify request structure
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub challenge_id: Uuid,
    #[validate(length(min = 4, max = 10))]
    #[schema(example = "123456")]
    pub code: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(length(min = 6))]
    pub new_password: String,
}

/// Response for login and resend: a challenge handle, never a token.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    pub success: bool,
    pub msg: String,
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub challenge_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Claims echoed back beside the token after verification.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenPayload {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub tenant_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyResponse {
    pub success: bool,
    pub token: String,
    pub payload: TokenPayload,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub msg: String,
}
