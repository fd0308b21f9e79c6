use anyhow::anyhow;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::metrics;
use crate::utils::errors::AppError;
use crate::utils::password::hash_password;

use super::model::{
    CreateUserRequest, CreatorSummary, PermissionEntry, RegisterSuperadminRequest,
    RegisterTenantRequest, SuperadminAccount, SuperadminIdentity, SuperadminPlaceholder,
    SuperadminProfile, TenantProfile, TenantSummary, TenantUserSummary, UserProfile, UserSummary,
};

/// Seat licenses granted to every new tenant.
const DEFAULT_LICENSES: [(&str, i32); 4] = [
    ("admin", 11),
    ("auditor", 11),
    ("agent", 100),
    ("reviewer", 11),
];

/// Roles a tenant root login may assign when creating users.
const TENANT_CREATABLE: [&str; 4] = ["admin", "agent", "auditor", "reviewer"];
/// Roles an admin may assign when creating users.
const ADMIN_CREATABLE: [&str; 3] = ["agent", "auditor", "reviewer"];

pub struct AccountService;

impl AccountService {
    /// Register a platform superadmin.
    ///
    /// Superadmins carry no tenant binding. The email must not collide with
    /// another tenant-less user.
    #[instrument(skip(db, dto))]
    pub async fn register_superadmin(
        db: &PgPool,
        dto: RegisterSuperadminRequest,
    ) -> Result<UserSummary, AppError> {
        let role_id = Self::get_role_id(db, "superadmin").await?;

        let existing = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM app_users WHERE lower(email) = lower($1) AND tenant_id IS NULL)",
        )
        .bind(&dto.email)
        .fetch_one(db)
        .await?;

        if existing {
            return Err(AppError::conflict(
                "SuperAdmin with this email already exists".to_string(),
            ));
        }

        let password_hash = hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, UserSummary>(
            r#"
            INSERT INTO app_users
                (email, password, user_name, contact_details, contact_email, enabled, role_id)
            VALUES ($1, $2, $3, '', $1, TRUE, $4)
            RETURNING id, email, tenant_id, enabled, user_name, created_at
            "#,
        )
        .bind(&dto.email)
        .bind(&password_hash)
        .bind(&dto.user_name)
        .bind(role_id)
        .fetch_one(db)
        .await?;

        metrics::track_user_created("superadmin");

        Ok(user)
    }

    /// Register a tenant account.
    ///
    /// One unit of work creates the tenant row, a root login user carrying
    /// the tenant role, and the default seat licenses. Nothing is persisted
    /// if any of the three steps fails.
    #[instrument(skip(db, dto))]
    pub async fn register_tenant(
        db: &PgPool,
        dto: RegisterTenantRequest,
        creator_id: Uuid,
    ) -> Result<(TenantSummary, UserSummary), AppError> {
        let existing = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM tenant_accounts WHERE lower(email) = lower($1))",
        )
        .bind(&dto.email)
        .fetch_one(db)
        .await?;

        if existing {
            return Err(AppError::bad_request(anyhow!("Tenant already exists")));
        }

        let role_id = Self::get_role_id(db, "tenant").await?;
        let created_by = Self::resolve_creator(db, creator_id).await?;
        let password_hash = hash_password(&dto.password)?;

        let reg_address = dto.reg_address.unwrap_or_default();
        let official_email = dto.official_email.unwrap_or_else(|| dto.email.clone());
        let official_contact_number = dto.official_contact_number.unwrap_or_default();

        let mut tx = db.begin().await?;

        let tenant = sqlx::query_as::<_, TenantSummary>(
            r#"
            INSERT INTO tenant_accounts
                (account_name, reg_address, official_email, official_contact_number, email, password)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, account_name, created_at, reg_address, official_email,
                      official_contact_number
            "#,
        )
        .bind(&dto.account_name)
        .bind(&reg_address)
        .bind(&official_email)
        .bind(&official_contact_number)
        .bind(&dto.email)
        .bind(&password_hash)
        .fetch_one(&mut *tx)
        .await?;

        // The root login shares the tenant's email and password.
        let root_user = sqlx::query_as::<_, UserSummary>(
            r#"
            INSERT INTO app_users
                (email, password, user_name, contact_details, contact_email, enabled,
                 role_id, tenant_id, created_by)
            VALUES ($1, $2, $3, '', $1, TRUE, $4, $5, $6)
            RETURNING id, email, tenant_id, enabled, user_name, created_at
            "#,
        )
        .bind(&dto.email)
        .bind(&password_hash)
        .bind(format!("{} TenantUser", dto.account_name))
        .bind(role_id)
        .bind(tenant.id)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        for (role, max_users) in DEFAULT_LICENSES {
            sqlx::query(
                r#"
                INSERT INTO tenant_licenses (tenant_id, role, max_users, used_users, active)
                VALUES ($1, $2, $3, 0, TRUE)
                "#,
            )
            .bind(tenant.id)
            .bind(role)
            .bind(max_users)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        metrics::track_tenant_created();

        Ok((tenant, root_user))
    }

    /// Create a user inside the caller's tenant.
    ///
    /// The caller's role bounds which roles can be assigned, and the target
    /// role must have a free seat on an active license. Taking the seat and
    /// creating the user happen in one transaction; the seat counter uses a
    /// conditional update so concurrent calls cannot oversubscribe it.
    #[instrument(skip(db, dto))]
    pub async fn create_user(
        db: &PgPool,
        dto: CreateUserRequest,
        caller_role: &str,
        caller_tenant_id: Option<Uuid>,
        caller_id: Uuid,
    ) -> Result<UserSummary, AppError> {
        let caller_role = caller_role.to_lowercase();
        let new_role = dto.role.trim().to_lowercase();

        if caller_role == "tenant" && !TENANT_CREATABLE.contains(&new_role.as_str()) {
            return Err(AppError::forbidden(
                "Tenant can create only admin/agent/auditor/reviewer".to_string(),
            ));
        }
        if caller_role == "admin" && !ADMIN_CREATABLE.contains(&new_role.as_str()) {
            return Err(AppError::forbidden(
                "Admin can create only agent/auditor/reviewer".to_string(),
            ));
        }
        if new_role == "superadmin" || new_role == "tenant" {
            return Err(AppError::forbidden(
                "Cannot create superadmin/tenant users here".to_string(),
            ));
        }

        let tenant_id = caller_tenant_id.ok_or_else(|| {
            AppError::bad_request(anyhow!("Caller must be bound to a tenant"))
        })?;

        let tenant_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM tenant_accounts WHERE id = $1)",
        )
        .bind(tenant_id)
        .fetch_one(db)
        .await?;

        if !tenant_exists {
            return Err(AppError::not_found(anyhow!("Tenant not found")));
        }

        #[derive(sqlx::FromRow)]
        struct LicenseRow {
            active: bool,
            used_users: i32,
            max_users: i32,
        }

        let license = sqlx::query_as::<_, LicenseRow>(
            "SELECT active, used_users, max_users FROM tenant_licenses WHERE tenant_id = $1 AND role = $2",
        )
        .bind(tenant_id)
        .bind(&new_role)
        .fetch_optional(db)
        .await?;

        match license {
            None => {
                return Err(AppError::forbidden(format!(
                    "License inactive for role: {new_role}"
                )));
            }
            Some(license) if !license.active => {
                return Err(AppError::forbidden(format!(
                    "License inactive for role: {new_role}"
                )));
            }
            Some(license) if license.used_users >= license.max_users => {
                return Err(AppError::forbidden(format!(
                    "{new_role} license limit exceeded"
                )));
            }
            Some(_) => {}
        }

        let duplicate = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM app_users WHERE lower(email) = lower($1) AND tenant_id = $2)",
        )
        .bind(&dto.email)
        .bind(tenant_id)
        .fetch_one(db)
        .await?;

        if duplicate {
            return Err(AppError::bad_request(anyhow!(
                "Email already used in this tenant"
            )));
        }

        let role_id = Self::get_role_id(db, &new_role).await?;
        let created_by = Self::resolve_creator(db, caller_id).await?;
        let password_hash = hash_password(&dto.password)?;

        let mut tx = db.begin().await?;

        // Conditional seat take. Zero rows means another request won the last
        // seat between the pre-check and here.
        let seat = sqlx::query(
            r#"
            UPDATE tenant_licenses
            SET used_users = used_users + 1, updated_at = NOW()
            WHERE tenant_id = $1 AND role = $2 AND active = TRUE AND used_users < max_users
            "#,
        )
        .bind(tenant_id)
        .bind(&new_role)
        .execute(&mut *tx)
        .await?;

        if seat.rows_affected() == 0 {
            return Err(AppError::forbidden(format!(
                "{new_role} license limit exceeded"
            )));
        }

        let user = sqlx::query_as::<_, UserSummary>(
            r#"
            INSERT INTO app_users
                (email, password, user_name, contact_details, contact_email, enabled,
                 role_id, tenant_id, created_by)
            VALUES ($1, $2, $3, '', $1, TRUE, $4, $5, $6)
            RETURNING id, email, tenant_id, enabled, user_name, created_at
            "#,
        )
        .bind(&dto.email)
        .bind(&password_hash)
        .bind(&dto.user_name)
        .bind(role_id)
        .bind(tenant_id)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        metrics::track_user_created(&new_role);

        Ok(user)
    }

    /// Profile for a superadmin: own identity plus every tenant account.
    #[instrument(skip(db))]
    pub async fn superadmin_profile(
        db: &PgPool,
        email: &str,
    ) -> Result<SuperadminProfile, AppError> {
        #[derive(sqlx::FromRow)]
        struct SuperadminRow {
            id: Uuid,
            email: String,
            user_name: Option<String>,
            tenant_id: Option<Uuid>,
            enabled: bool,
            created_at: DateTime<Utc>,
            created_by_id: Option<Uuid>,
            created_by_email: Option<String>,
            created_by_user_name: Option<String>,
        }

        let row = sqlx::query_as::<_, SuperadminRow>(
            r#"
            SELECT u.id, u.email, u.user_name, u.tenant_id, u.enabled, u.created_at,
                   cb.id AS created_by_id, cb.email AS created_by_email,
                   cb.user_name AS created_by_user_name
            FROM app_users u
            LEFT JOIN app_users cb ON cb.id = u.created_by
            WHERE lower(u.email) = lower($1)
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;

        let super_admin = match row {
            Some(row) => SuperadminIdentity::Known(SuperadminAccount {
                id: row.id,
                email: row.email,
                user_name: row.user_name,
                tenant_id: row.tenant_id,
                enabled: row.enabled,
                creation_date: row.created_at,
                created_by: Self::creator_from_parts(
                    row.created_by_id,
                    row.created_by_email,
                    row.created_by_user_name,
                ),
            }),
            None => SuperadminIdentity::Placeholder(SuperadminPlaceholder {
                id: "superadmin".to_string(),
                account_name: "System SuperAdmin".to_string(),
                email: email.to_string(),
            }),
        };

        let tenants = sqlx::query_as::<_, TenantSummary>(
            r#"
            SELECT id, account_name, created_at, reg_address, official_email,
                   official_contact_number
            FROM tenant_accounts
            ORDER BY created_at
            "#,
        )
        .fetch_all(db)
        .await?;

        Ok(SuperadminProfile {
            success: true,
            role: "superadmin".to_string(),
            super_admin,
            tenants,
        })
    }

    /// Profile for a tenant root login: the account and its users.
    ///
    /// The root login itself is hidden from the user list.
    #[instrument(skip(db))]
    pub async fn tenant_profile(
        db: &PgPool,
        tenant_id: Option<Uuid>,
    ) -> Result<TenantProfile, AppError> {
        let tenant_id =
            tenant_id.ok_or_else(|| AppError::not_found(anyhow!("Tenant not found")))?;

        let tenant = sqlx::query_as::<_, TenantSummary>(
            r#"
            SELECT id, account_name, created_at, reg_address, official_email,
                   official_contact_number
            FROM tenant_accounts
            WHERE id = $1
            "#,
        )
        .bind(tenant_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Tenant not found")))?;

        let users = Self::list_tenant_users(db, tenant_id, None).await?;

        Ok(TenantProfile {
            success: true,
            role: "tenant".to_string(),
            tenant,
            users,
        })
    }

    /// Profile for a provisioned user, with role permissions attached.
    ///
    /// Admins additionally receive the tenant's other users.
    #[instrument(skip(db))]
    pub async fn user_profile(
        db: &PgPool,
        user_id: Uuid,
        email: &str,
    ) -> Result<UserProfile, AppError> {
        #[derive(sqlx::FromRow)]
        struct UserRow {
            id: Uuid,
            email: String,
            enabled: bool,
            user_name: Option<String>,
            created_at: DateTime<Utc>,
            role_id: Option<Uuid>,
            role_name: Option<String>,
            tenant_id: Option<Uuid>,
            tenant_account_name: Option<String>,
            tenant_created_at: Option<DateTime<Utc>>,
            tenant_reg_address: Option<String>,
            tenant_official_email: Option<String>,
            tenant_official_contact_number: Option<String>,
            created_by_id: Option<Uuid>,
            created_by_email: Option<String>,
            created_by_user_name: Option<String>,
        }

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id, u.email, u.enabled, u.user_name, u.created_at, u.role_id,
                   r.name AS role_name,
                   t.id AS tenant_id, t.account_name AS tenant_account_name,
                   t.created_at AS tenant_created_at, t.reg_address AS tenant_reg_address,
                   t.official_email AS tenant_official_email,
                   t.official_contact_number AS tenant_official_contact_number,
                   cb.id AS created_by_id, cb.email AS created_by_email,
                   cb.user_name AS created_by_user_name
            FROM app_users u
            LEFT JOIN roles r ON r.id = u.role_id
            LEFT JOIN tenant_accounts t ON t.id = u.tenant_id
            LEFT JOIN app_users cb ON cb.id = u.created_by
            WHERE u.id = $1 OR lower(u.email) = lower($2)
            "#,
        )
        .bind(user_id)
        .bind(email)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

        let role_name = row.role_name.unwrap_or_else(|| "unknown".to_string());

        let permissions = match row.role_id {
            Some(role_id) => {
                sqlx::query_as::<_, PermissionEntry>(
                    "SELECT access, enabled FROM permissions WHERE role_id = $1 ORDER BY access",
                )
                .bind(role_id)
                .fetch_all(db)
                .await?
            }
            None => Vec::new(),
        };

        let tenant = row.tenant_id.map(|id| TenantSummary {
            id,
            account_name: row.tenant_account_name.unwrap_or_default(),
            creation_date: row.tenant_created_at.unwrap_or(row.created_at),
            reg_address: row.tenant_reg_address,
            official_email: row.tenant_official_email,
            official_contact_number: row.tenant_official_contact_number,
        });

        let tenant_users = match (&tenant, role_name.as_str()) {
            (Some(tenant), "admin") => {
                Some(Self::list_tenant_users(db, tenant.id, Some(row.id)).await?)
            }
            _ => None,
        };

        Ok(UserProfile {
            success: true,
            id: row.id,
            email: row.email,
            role: role_name,
            role_id: row.role_id,
            tenant,
            enabled: row.enabled,
            user_name: row.user_name,
            creation_date: row.created_at,
            created_by: Self::creator_from_parts(
                row.created_by_id,
                row.created_by_email,
                row.created_by_user_name,
            ),
            permissions,
            tenant_users,
        })
    }

    // Private helper methods

    /// List a tenant's users, always excluding the root login and optionally
    /// one further user (the caller, for admin listings).
    async fn list_tenant_users(
        db: &PgPool,
        tenant_id: Uuid,
        exclude_user_id: Option<Uuid>,
    ) -> Result<Vec<TenantUserSummary>, AppError> {
        #[derive(sqlx::FromRow)]
        struct TenantUserRow {
            id: Uuid,
            email: String,
            role_name: Option<String>,
            user_name: Option<String>,
            enabled: bool,
            created_at: DateTime<Utc>,
            created_by_id: Option<Uuid>,
            created_by_email: Option<String>,
            created_by_user_name: Option<String>,
        }

        let rows = sqlx::query_as::<_, TenantUserRow>(
            r#"
            SELECT u.id, u.email, r.name AS role_name, u.user_name, u.enabled, u.created_at,
                   cb.id AS created_by_id, cb.email AS created_by_email,
                   cb.user_name AS created_by_user_name
            FROM app_users u
            LEFT JOIN roles r ON r.id = u.role_id
            LEFT JOIN app_users cb ON cb.id = u.created_by
            WHERE u.tenant_id = $1
              AND (r.name IS NULL OR r.name <> 'tenant')
              AND ($2::uuid IS NULL OR u.id <> $2)
            ORDER BY u.created_at
            "#,
        )
        .bind(tenant_id)
        .bind(exclude_user_id)
        .fetch_all(db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| TenantUserSummary {
                id: row.id,
                email: row.email,
                role: row.role_name.unwrap_or_else(|| "unknown".to_string()),
                user_name: row.user_name,
                enabled: row.enabled,
                creation_date: row.created_at,
                created_by: Self::creator_from_parts(
                    row.created_by_id,
                    row.created_by_email,
                    row.created_by_user_name,
                ),
            })
            .collect())
    }

    /// Look up a role id by name. Missing system roles are a deployment
    /// problem, reported as a client-visible 400 to match the provisioning
    /// endpoints' contract.
    async fn get_role_id(db: &PgPool, name: &str) -> Result<Uuid, AppError> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::bad_request(anyhow!("Role missing: {name}")))
    }

    /// Resolve the creator's user row, tolerating a stale token whose user
    /// no longer exists.
    async fn resolve_creator(db: &PgPool, creator_id: Uuid) -> Result<Option<Uuid>, AppError> {
        let id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM app_users WHERE id = $1")
            .bind(creator_id)
            .fetch_optional(db)
            .await?;

        Ok(id)
    }

    fn creator_from_parts(
        id: Option<Uuid>,
        email: Option<String>,
        user_name: Option<String>,
    ) -> Option<CreatorSummary> {
        id.map(|id| CreatorSummary {
            id,
            email: email.unwrap_or_default(),
            user_name,
        })
    }
}
