use anyhow::anyhow;
use chrono::{Duration, Utc};
use rand::RngCore;
use sqlx::PgPool;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::config::email::EmailConfig;
use crate::config::jwt::JwtConfig;
use crate::config::two_factor::TwoFactorConfig;
use crate::metrics;
use crate::modules::two_factor::model::{ChallengeContext, IssuedChallenge};
use crate::modules::two_factor::service::TwoFactorService;
use crate::utils::email::EmailService;
use crate::utils::errors::AppError;
use crate::utils::jwt::create_access_token;
use crate::utils::password::{hash_password, verify_password};

use super::model::{
    AuthSubject, ForgotPasswordRequest, LoginRequest, ResetPasswordRequest, TokenPayload,
    VerifyResponse,
};

/// Lifetime of a password reset token.
const RESET_TOKEN_TTL_MINUTES: i64 = 15;

pub struct AuthService;

impl AuthService {
    /// Resolve credentials to an identity, without issuing anything.
    ///
    /// App users are checked first. When an app user exists for the email,
    /// that outcome is final: a wrong password or a disabled account yields
    /// `None` rather than falling through to a tenant root account with the
    /// same email. A superadmin is an app user with the superadmin role and
    /// no tenant binding.
    #[instrument(skip(db, password))]
    pub async fn find_auth_subject(
        db: &PgPool,
        email: &str,
        password: &str,
    ) -> Result<Option<AuthSubject>, AppError> {
        let normalized = email.trim().to_lowercase();

        #[derive(sqlx::FromRow)]
        struct AppUserRow {
            id: Uuid,
            email: String,
            password: String,
            user_name: Option<String>,
            enabled: bool,
            tenant_id: Option<Uuid>,
            role_name: Option<String>,
        }

        let app_user = sqlx::query_as::<_, AppUserRow>(
            r#"
            SELECT u.id, u.email, u.password, u.user_name, u.enabled, u.tenant_id,
                   r.name AS role_name
            FROM app_users u
            LEFT JOIN roles r ON r.id = u.role_id
            WHERE lower(u.email) = $1
            "#,
        )
        .bind(&normalized)
        .fetch_optional(db)
        .await?;

        if let Some(user) = app_user {
            if !user.enabled || !verify_password(password, &user.password)? {
                return Ok(None);
            }

            let role_name = user.role_name.unwrap_or_else(|| "user".to_string());

            if role_name == "superadmin" && user.tenant_id.is_none() {
                return Ok(Some(AuthSubject::SuperAdmin {
                    id: user.id,
                    email: user.email,
                    name: user.user_name,
                }));
            }

            return Ok(Some(AuthSubject::TenantUser {
                id: user.id,
                email: user.email,
                name: user.user_name,
                role: role_name,
                tenant_id: user.tenant_id,
            }));
        }

        #[derive(sqlx::FromRow)]
        struct TenantRow {
            id: Uuid,
            email: Option<String>,
            password: Option<String>,
            account_name: String,
        }

        let tenant = sqlx::query_as::<_, TenantRow>(
            r#"
            SELECT id, email, password, account_name
            FROM tenant_accounts
            WHERE lower(email) = $1
            "#,
        )
        .bind(&normalized)
        .fetch_optional(db)
        .await?;

        if let Some(tenant) = tenant {
            let Some(stored_hash) = tenant.password else {
                return Ok(None);
            };
            if !verify_password(password, &stored_hash)? {
                return Ok(None);
            }

            return Ok(Some(AuthSubject::TenantRoot {
                id: tenant.id,
                email: tenant.email.unwrap_or(normalized),
                name: Some(tenant.account_name),
            }));
        }

        Ok(None)
    }

    /// Step one of login: check the password and issue a challenge.
    ///
    /// Never returns a token. The response only confirms that a code went
    /// out and when the challenge expires.
    #[instrument(skip(db, two_factor_config, email_config, dto, context))]
    pub async fn login(
        db: &PgPool,
        two_factor_config: &TwoFactorConfig,
        email_config: &EmailConfig,
        dto: LoginRequest,
        context: ChallengeContext,
    ) -> Result<IssuedChallenge, AppError> {
        let subject = Self::find_auth_subject(db, &dto.email, &dto.password)
            .await?
            .ok_or_else(|| {
                metrics::track_user_login_failure("invalid_credentials");
                AppError::unauthorized("Invalid credentials".to_string())
            })?;

        TwoFactorService::create_challenge(
            db,
            two_factor_config,
            email_config,
            &subject.id().to_string(),
            subject.email(),
            subject.role_name(),
            subject.tenant_id(),
            context,
        )
        .await
    }

    /// Step two of login: consume the challenge and issue the JWT.
    #[instrument(skip(db, jwt_config, two_factor_config, code, context))]
    pub async fn complete_login(
        db: &PgPool,
        jwt_config: &JwtConfig,
        two_factor_config: &TwoFactorConfig,
        challenge_id: Uuid,
        code: &str,
        context: ChallengeContext,
    ) -> Result<VerifyResponse, AppError> {
        let verified =
            TwoFactorService::verify_challenge(db, two_factor_config, challenge_id, code).await?;

        let role = verified.role.unwrap_or_else(|| "user".to_string());

        let user_id = Uuid::parse_str(&verified.user_id)
            .map_err(|_| AppError::internal_error("Malformed user id on challenge".to_string()))?;

        let token = create_access_token(
            user_id,
            &verified.email,
            &role,
            verified.tenant_id,
            jwt_config,
        )?;

        // Best effort; a bookkeeping miss must not block the login.
        if role != "tenant" {
            if let Err(e) = Self::record_login(db, user_id, &context).await {
                warn!(user_id = %user_id, "Login metadata update skipped: {:?}", e);
            }
        }

        metrics::track_user_login_success(&role);
        metrics::track_jwt_issued();

        Ok(VerifyResponse {
            success: true,
            token,
            payload: TokenPayload {
                sub: verified.user_id,
                email: verified.email,
                role,
                tenant_id: verified.tenant_id,
            },
        })
    }

    async fn record_login(
        db: &PgPool,
        user_id: Uuid,
        context: &ChallengeContext,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE app_users
            SET last_login_at = NOW(),
                last_login_ip = $2,
                last_login_user_agent = $3,
                login_count = login_count + 1
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(&context.ip)
        .bind(&context.user_agent)
        .execute(db)
        .await?;

        Ok(())
    }

    /// Issue a password reset token and email the reset link.
    #[instrument(skip(db, email_config))]
    pub async fn forgot_password(
        db: &PgPool,
        email_config: &EmailConfig,
        dto: ForgotPasswordRequest,
    ) -> Result<(), AppError> {
        #[derive(sqlx::FromRow)]
        struct UserRow {
            id: Uuid,
            email: String,
            user_name: Option<String>,
        }

        let user = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, user_name FROM app_users WHERE lower(email) = lower($1)",
        )
        .bind(dto.email.trim())
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

        let token = Self::generate_reset_token();
        let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);

        sqlx::query(
            "INSERT INTO password_resets (user_id, token, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(user.id)
        .bind(&token)
        .bind(expires_at)
        .execute(db)
        .await?;

        let name = user.user_name.unwrap_or_else(|| user.email.clone());
        EmailService::new(email_config.clone())
            .send_password_reset_email(&user.email, &name, &token)
            .await?;

        Ok(())
    }

    /// Apply a new password for a valid, unused, unexpired reset token.
    #[instrument(skip(db, dto))]
    pub async fn reset_password(db: &PgPool, dto: ResetPasswordRequest) -> Result<(), AppError> {
        #[derive(sqlx::FromRow)]
        struct ResetRow {
            id: Uuid,
            user_id: Uuid,
            expires_at: chrono::DateTime<Utc>,
            used: bool,
        }

        let reset = sqlx::query_as::<_, ResetRow>(
            "SELECT id, user_id, expires_at, used FROM password_resets WHERE token = $1",
        )
        .bind(&dto.token)
        .fetch_optional(db)
        .await?;

        let reset = match reset {
            Some(reset) if !reset.used => reset,
            _ => return Err(AppError::bad_request(anyhow!("Invalid or used token"))),
        };

        if reset.expires_at <= Utc::now() {
            return Err(AppError::bad_request(anyhow!("Token expired")));
        }

        let password_hash = hash_password(&dto.new_password)?;

        let mut tx = db.begin().await?;

        sqlx::query("UPDATE app_users SET password = $2 WHERE id = $1")
            .bind(reset.user_id)
            .bind(&password_hash)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE password_resets SET used = TRUE WHERE id = $1")
            .bind(reset.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// 32 random bytes, hex encoded.
    fn generate_reset_token() -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}
