//! Account data models and DTOs.
//!
//! This module contains all data structures related to tenant and user
//! provisioning, including registration DTOs, profile response types, and
//! system role definitions.
//!
//! # Core Types
//!
//! - [`UserRole`] - Enum of the six system roles, parsed case-insensitively
//! - [`TenantSummary`] - Tenant account as exposed in API responses
//! - [`UserSummary`] - Provisioned user as exposed in API responses
//!
//! # Request DTOs
//!
//! - [`RegisterSuperadminRequest`] - Create a platform superadmin
//! - [`RegisterTenantRequest`] - Create a tenant with its root login
//! - [`CreateUserRequest`] - Create a user inside a tenant
//!
//! # System Roles
//!
//! The [`system_roles`] module provides constants and utilities for working
//! with the six system-defined roles:
//!
//! - Superadmin (platform-wide access, no tenant binding)
//! - Tenant (root login of a tenant account)
//! - Admin (tenant-scoped management)
//! - Agent / Auditor / Reviewer (tenant-scoped, seat-licensed)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A system role.
///
/// Role names are stored lowercase; parsing accepts any casing. Roles
/// outside this set exist only as database rows and never pass a role gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Superadmin,
    Tenant,
    Admin,
    Agent,
    Auditor,
    Reviewer,
}

impl UserRole {
    /// Parse a role name, ignoring case and surrounding whitespace.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            system_roles::slugs::SUPERADMIN => Some(Self::Superadmin),
            system_roles::slugs::TENANT => Some(Self::Tenant),
            system_roles::slugs::ADMIN => Some(Self::Admin),
            system_roles::slugs::AGENT => Some(Self::Agent),
            system_roles::slugs::AUDITOR => Some(Self::Auditor),
            system_roles::slugs::REVIEWER => Some(Self::Reviewer),
            _ => None,
        }
    }

    /// Canonical lowercase name, as stored in the roles table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Superadmin => system_roles::slugs::SUPERADMIN,
            Self::Tenant => system_roles::slugs::TENANT,
            Self::Admin => system_roles::slugs::ADMIN,
            Self::Agent => system_roles::slugs::AGENT,
            Self::Auditor => system_roles::slugs::AUDITOR,
            Self::Reviewer => system_roles::slugs::REVIEWER,
        }
    }

    /// Whether provisioning a user of this role consumes a license seat.
    #[allow(dead_code)]
    pub fn is_licensed(&self) -> bool {
        matches!(
            self,
            Self::Admin | Self::Agent | Self::Auditor | Self::Reviewer
        )
    }
}

/// DTO for registering a platform superadmin.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSuperadminRequest {
    #[validate(email)]
    #[schema(example = "root@platform.com")]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    #[validate(length(min = 1))]
    pub user_name: String,
}

/// DTO for registering a tenant account.
///
/// Creates the tenant record, its root login user, and the default set of
/// seat licenses in one operation. Only superadmins may call this.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterTenantRequest {
    #[validate(length(min = 1))]
    #[schema(example = "Acme Corp")]
    pub account_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    pub reg_address: Option<String>,
    pub official_email: Option<String>,
    pub official_contact_number: Option<String>,
}

/// DTO for creating a user inside a tenant.
///
/// The target tenant always comes from the caller's token, never from the
/// request body. Which roles may be assigned depends on the caller's role.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    #[validate(length(min = 1))]
    pub user_name: String,
    #[validate(length(min = 1))]
    #[schema(example = "agent")]
    pub role: String,
}

/// Tenant account as exposed in API responses.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenantSummary {
    pub id: Uuid,
    pub account_name: String,
    #[sqlx(rename = "created_at")]
    pub creation_date: DateTime<Utc>,
    pub reg_address: Option<String>,
    pub official_email: Option<String>,
    pub official_contact_number: Option<String>,
}

/// Provisioned user as exposed in API responses.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub tenant_id: Option<Uuid>,
    pub enabled: bool,
    pub user_name: Option<String>,
    #[sqlx(rename = "created_at")]
    pub creation_date: DateTime<Utc>,
}

/// Minimal identification of the user who created a record.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatorSummary {
    pub id: Uuid,
    pub email: String,
    pub user_name: Option<String>,
}

/// A tenant's user in listing responses, with role and creator attached.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenantUserSummary {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub user_name: Option<String>,
    pub enabled: bool,
    pub creation_date: DateTime<Utc>,
    pub created_by: Option<CreatorSummary>,
}

/// A permission flag attached to a role.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct PermissionEntry {
    pub access: String,
    pub enabled: bool,
}

/// Response for superadmin registration.
#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterSuperadminResponse {
    pub success: bool,
    pub msg: String,
    pub user: UserSummary,
}

/// Response for tenant registration.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterTenantResponse {
    pub success: bool,
    pub msg: String,
    pub tenant: TenantSummary,
    pub tenant_user: UserSummary,
}

/// Response for user creation.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateUserResponse {
    pub success: bool,
    pub msg: String,
    pub user: UserSummary,
}

/// Superadmin identity in the profile response.
///
/// The seeded superadmin may predate its own user row; in that case the
/// profile falls back to a static placeholder instead of failing.
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum SuperadminIdentity {
    Known(SuperadminAccount),
    Placeholder(SuperadminPlaceholder),
}

/// A superadmin user resolved from the database.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuperadminAccount {
    pub id: Uuid,
    pub email: String,
    pub user_name: Option<String>,
    pub tenant_id: Option<Uuid>,
    pub enabled: bool,
    pub creation_date: DateTime<Utc>,
    pub created_by: Option<CreatorSummary>,
}

/// Static identity used when no superadmin user row exists.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuperadminPlaceholder {
    pub id: String,
    pub account_name: String,
    pub email: String,
}

/// Profile response for a superadmin: own identity plus every tenant.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuperadminProfile {
    pub success: bool,
    pub role: String,
    pub super_admin: SuperadminIdentity,
    pub tenants: Vec<TenantSummary>,
}

/// Profile response for a tenant root login: account plus its users.
#[derive(Debug, Serialize, ToSchema)]
pub struct TenantProfile {
    pub success: bool,
    pub role: String,
    pub tenant: TenantSummary,
    pub users: Vec<TenantUserSummary>,
}

/// Profile response for a provisioned user.
///
/// `tenant_users` is only present for admins and lists the tenant's other
/// users, excluding the root login and the admin themselves.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub success: bool,
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub role_id: Option<Uuid>,
    pub tenant: Option<TenantSummary>,
    pub enabled: bool,
    pub user_name: Option<String>,
    pub creation_date: DateTime<Utc>,
    pub created_by: Option<CreatorSummary>,
    pub permissions: Vec<PermissionEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_users: Option<Vec<TenantUserSummary>>,
}

/// Well-known system role names and IDs.
///
/// This module provides constants and helper functions for working with
/// the six system-defined roles. These roles are seeded by the initial
/// migration with fixed UUIDs and cannot be deleted or modified.
///
/// # Role Hierarchy
///
/// ```text
/// Superadmin (platform-wide, creates tenants)
///     └── Tenant (root login, creates admins and staff)
///             └── Admin (creates agents, auditors, reviewers)
///                     └── Agent / Auditor / Reviewer (seat-licensed)
/// ```
///
/// # Example
///
/// ```ignore
/// use crate::modules::accounts::model::system_roles;
///
/// // Check if a role is a system role
/// if system_roles::is_system_role(&role_id) {
///     // Handle system role
/// }
///
/// // Get role label for display
/// if let Some(name) = system_roles::get_name(&role_id) {
///     println!("Role: {}", name);
/// }
/// ```
pub mod system_roles {
    use uuid::Uuid;

    /// Role names - use these for lookups instead of hardcoded strings
    pub mod slugs {
        pub const SUPERADMIN: &str = "superadmin";
        pub const TENANT: &str = "tenant";
        pub const ADMIN: &str = "admin";
        pub const AGENT: &str = "agent";
        pub const AUDITOR: &str = "auditor";
        pub const REVIEWER: &str = "reviewer";
    }

    /// Superadmin role - platform-wide access, no tenant binding
    pub const SUPERADMIN: Uuid = Uuid::from_u128(0x00000000_0000_0000_0000_000000000001);
    /// Tenant role - root login of a tenant account
    pub const TENANT: Uuid = Uuid::from_u128(0x00000000_0000_0000_0000_000000000002);
    /// Admin role - tenant-scoped management
    pub const ADMIN: Uuid = Uuid::from_u128(0x00000000_0000_0000_0000_000000000003);
    /// Agent role - tenant-scoped, seat-licensed
    pub const AGENT: Uuid = Uuid::from_u128(0x00000000_0000_0000_0000_000000000004);
    /// Auditor role - tenant-scoped, seat-licensed
    pub const AUDITOR: Uuid = Uuid::from_u128(0x00000000_0000_0000_0000_000000000005);
    /// Reviewer role - tenant-scoped, seat-licensed
    pub const REVIEWER: Uuid = Uuid::from_u128(0x00000000_0000_0000_0000_000000000006);

    /// Get all system role IDs
    pub fn all() -> Vec<Uuid> {
        vec![SUPERADMIN, TENANT, ADMIN, AGENT, AUDITOR, REVIEWER]
    }

    /// Get all system role names
    pub fn all_slugs() -> Vec<&'static str> {
        vec![
            slugs::SUPERADMIN,
            slugs::TENANT,
            slugs::ADMIN,
            slugs::AGENT,
            slugs::AUDITOR,
            slugs::REVIEWER,
        ]
    }

    /// Check if a role ID is a system role
    pub fn is_system_role(role_id: &Uuid) -> bool {
        all().contains(role_id)
    }

    /// Check if a name is a system role name
    #[allow(dead_code)]
    pub fn is_system_role_slug(slug: &str) -> bool {
        all_slugs().contains(&slug)
    }

    /// Get role label by ID
    pub fn get_name(role_id: &Uuid) -> Option<&'static str> {
        match *role_id {
            id if id == SUPERADMIN => Some("Super Admin"),
            id if id == TENANT => Some("Tenant"),
            id if id == ADMIN => Some("Admin"),
            id if id == AGENT => Some("Agent"),
            id if id == AUDITOR => Some("Auditor"),
            id if id == REVIEWER => Some("Reviewer"),
            _ => None,
        }
    }

    /// Get role name by ID
    #[allow(dead_code)]
    pub fn get_slug(role_id: &Uuid) -> Option<&'static str> {
        match *role_id {
            id if id == SUPERADMIN => Some(slugs::SUPERADMIN),
            id if id == TENANT => Some(slugs::TENANT),
            id if id == ADMIN => Some(slugs::ADMIN),
            id if id == AGENT => Some(slugs::AGENT),
            id if id == AUDITOR => Some(slugs::AUDITOR),
            id if id == REVIEWER => Some(slugs::REVIEWER),
            _ => None,
        }
    }

    /// Get role ID by name
    pub fn get_id_by_slug(slug: &str) -> Option<Uuid> {
        match slug {
            slugs::SUPERADMIN => Some(SUPERADMIN),
            slugs::TENANT => Some(TENANT),
            slugs::ADMIN => Some(ADMIN),
            slugs::AGENT => Some(AGENT),
            slugs::AUDITOR => Some(AUDITOR),
            slugs::REVIEWER => Some(REVIEWER),
            _ => None,
        }
    }
}
