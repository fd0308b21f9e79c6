//! Database startup tasks: migrations and bootstrap seeding.
//!
//! Both functions run once from `main` before the server starts accepting
//! requests. Migrations are embedded from the `migrations/` directory, so a
//! fresh database only needs a valid `DATABASE_URL`.

use sqlx::PgPool;
use tracing::{info, warn};

use crate::modules::accounts::model::system_roles;
use crate::utils::password::hash_password;

/// Applies any pending migrations from the embedded `migrations/` directory.
///
/// # Panics
///
/// Panics if a migration fails, since the schema must be current before the
/// server can serve requests.
pub async fn run_migrations(pool: &PgPool) {
    sqlx::migrate!()
        .run(pool)
        .await
        .expect("Failed to run database migrations");
    info!("Database migrations applied");
}

/// Seeds an initial superadmin account when `BOOTSTRAP_SUPERADMIN_EMAIL` and
/// `BOOTSTRAP_SUPERADMIN_PASSWORD` are both set.
///
/// A no-op when either variable is missing or when a user with that email
/// already exists, so it is safe to run on every startup. The CLI
/// (`tenauth-cli create-superadmin`) covers the interactive path.
pub async fn seed_superadmin_from_env(pool: &PgPool) {
    let (email, password) = match (
        std::env::var("BOOTSTRAP_SUPERADMIN_EMAIL"),
        std::env::var("BOOTSTRAP_SUPERADMIN_PASSWORD"),
    ) {
        (Ok(email), Ok(password)) if !email.is_empty() && !password.is_empty() => (email, password),
        _ => return,
    };

    let email = email.trim().to_lowercase();

    let password_hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => {
            warn!("Superadmin bootstrap skipped, hashing failed: {:?}", e);
            return;
        }
    };

    let result = sqlx::query(
        r#"
        INSERT INTO app_users (email, password, user_name, role_id, enabled)
        VALUES ($1, $2, 'Super Admin', $3, TRUE)
        ON CONFLICT (email) DO NOTHING
        "#,
    )
    .bind(&email)
    .bind(&password_hash)
    .bind(system_roles::SUPERADMIN)
    .execute(pool)
    .await;

    match result {
        Ok(done) if done.rows_affected() > 0 => {
            info!(email = %email, "Bootstrapped superadmin account");
        }
        Ok(_) => {}
        Err(e) => warn!("Superadmin bootstrap failed: {}", e),
    }
}
