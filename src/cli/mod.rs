use sqlx::PgPool;

use crate::modules::accounts::model::system_roles;
use crate::utils::password::hash_password;

pub async fn create_superadmin(
    db: &PgPool,
    email: &str,
    user_name: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let hashed_password = hash_password(password)
        .map_err(|e| format!("Failed to hash password: {}", e.error))?;

    let result = sqlx::query(
        "INSERT INTO app_users (email, password, user_name, role_id, tenant_id, enabled)
         VALUES ($1, $2, $3, $4, NULL, TRUE)
         ON CONFLICT (email) DO NOTHING",
    )
    .bind(email.trim().to_lowercase())
    .bind(hashed_password)
    .bind(user_name)
    .bind(system_roles::SUPERADMIN)
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        return Err("User with this email already exists".into());
    }

    Ok(())
}
