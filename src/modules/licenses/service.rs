use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::utils::errors::AppError;

use super::model::{LicenseInfo, LicenseSummary, UpdateLicensesRequest};

pub struct LicenseService;

impl LicenseService {
    /// All licenses held by a tenant. An unknown tenant yields an empty
    /// list rather than an error.
    #[instrument(skip(db))]
    pub async fn list_for_tenant(
        db: &PgPool,
        tenant_id: Uuid,
    ) -> Result<Vec<LicenseInfo>, AppError> {
        let licenses = sqlx::query_as::<_, LicenseInfo>(
            r#"
            SELECT id, role, max_users, used_users, active, created_at, updated_at
            FROM tenant_licenses
            WHERE tenant_id = $1
            ORDER BY role
            "#,
        )
        .bind(tenant_id)
        .fetch_all(db)
        .await?;

        Ok(licenses)
    }

    /// Apply new seat caps role by role.
    ///
    /// Updates are applied in map order and stop at the first role without
    /// a license row; earlier updates in the same request stay applied.
    #[instrument(skip(db, dto))]
    pub async fn update_licenses(
        db: &PgPool,
        tenant_id: Uuid,
        dto: UpdateLicensesRequest,
    ) -> Result<Vec<LicenseSummary>, AppError> {
        let mut updated = Vec::with_capacity(dto.licenses.len());

        for (role, max_users) in dto.licenses {
            let license = sqlx::query_as::<_, LicenseSummary>(
                r#"
                UPDATE tenant_licenses
                SET max_users = $3, updated_at = NOW()
                WHERE tenant_id = $1 AND role = $2
                RETURNING id, role, max_users, used_users, active
                "#,
            )
            .bind(tenant_id)
            .bind(role.to_lowercase())
            .bind(max_users)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| {
                AppError::not_found(anyhow::anyhow!("License not found for role: {role}"))
            })?;

            updated.push(license);
        }

        Ok(updated)
    }
}
