use anyhow::anyhow;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::config::email::EmailConfig;
use crate::config::two_factor::TwoFactorConfig;
use crate::metrics;
use crate::utils::email::EmailService;
use crate::utils::errors::AppError;
use crate::utils::password::{hash_password, verify_password};

use super::model::{ChallengeContext, IssuedChallenge, TwoFactorChallenge, VerifiedChallenge};

pub struct TwoFactorService;

impl TwoFactorService {
    /// Create a login challenge and email the one-time code.
    ///
    /// The code is hashed before it touches the database and travels only by
    /// email. Email dispatch is fire-and-forget: a delivery failure is logged
    /// but never turns a correct password into a login error.
    #[instrument(skip(db, config, email_config, user_id, context))]
    pub async fn create_challenge(
        db: &PgPool,
        config: &TwoFactorConfig,
        email_config: &EmailConfig,
        user_id: &str,
        email: &str,
        role: &str,
        tenant_id: Option<Uuid>,
        context: ChallengeContext,
    ) -> Result<IssuedChallenge, AppError> {
        let code = Self::generate_code(config);
        let code_hash = hash_password(&code)?;

        let now = Utc::now();
        let expires_at = now + Duration::minutes(config.ttl_minutes);

        #[derive(sqlx::FromRow)]
        struct Inserted {
            id: Uuid,
            expires_at: DateTime<Utc>,
        }

        let inserted = sqlx::query_as::<_, Inserted>(
            r#"
            INSERT INTO two_factor_challenges
                (user_id, email, code_hash, expires_at, last_sent_at, tenant_id, role, ip, user_agent)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, expires_at
            "#,
        )
        .bind(user_id)
        .bind(email)
        .bind(&code_hash)
        .bind(expires_at)
        .bind(now)
        .bind(tenant_id)
        .bind(role)
        .bind(&context.ip)
        .bind(&context.user_agent)
        .fetch_one(db)
        .await?;

        Self::dispatch_code_email(email_config, config, inserted.id, email, code);

        metrics::track_challenge_issued();

        Ok(IssuedChallenge {
            challenge_id: inserted.id,
            expires_at: inserted.expires_at,
        })
    }

    /// Replace the code on an existing challenge and email it again.
    ///
    /// Resending resets the attempt counter and extends the expiry, so it
    /// also revives an expired or locked challenge. Consumed challenges stay
    /// consumed, and sends inside the cooldown window are rejected.
    #[instrument(skip(db, config, email_config))]
    pub async fn resend_challenge(
        db: &PgPool,
        config: &TwoFactorConfig,
        email_config: &EmailConfig,
        challenge_id: Uuid,
    ) -> Result<IssuedChallenge, AppError> {
        let code = Self::generate_code(config);
        let code_hash = hash_password(&code)?;

        let now = Utc::now();
        let expires_at = now + Duration::minutes(config.ttl_minutes);
        let cooldown_cutoff = now - Duration::seconds(config.resend_cooldown_secs);

        #[derive(sqlx::FromRow)]
        struct Updated {
            id: Uuid,
            email: String,
            expires_at: DateTime<Utc>,
        }

        // The WHERE clause makes the cooldown check atomic with the update,
        // so two concurrent resends cannot both go through.
        let updated = sqlx::query_as::<_, Updated>(
            r#"
            UPDATE two_factor_challenges
            SET code_hash = $2, attempts = 0, expires_at = $3, last_sent_at = $4
            WHERE id = $1 AND consumed_at IS NULL AND last_sent_at <= $5
            RETURNING id, email, expires_at
            "#,
        )
        .bind(challenge_id)
        .bind(&code_hash)
        .bind(expires_at)
        .bind(now)
        .bind(cooldown_cutoff)
        .fetch_optional(db)
        .await?;

        let Some(updated) = updated else {
            let challenge = Self::get_challenge(db, challenge_id)
                .await?
                .ok_or_else(|| AppError::not_found(anyhow!("Challenge not found")))?;

            if challenge.consumed_at.is_some() {
                return Err(AppError::bad_request(anyhow!("Challenge already consumed")));
            }
            return Err(AppError::bad_request(anyhow!("Please wait before resending")));
        };

        Self::dispatch_code_email(email_config, config, updated.id, &updated.email, code);

        metrics::track_challenge_resent();

        Ok(IssuedChallenge {
            challenge_id: updated.id,
            expires_at: updated.expires_at,
        })
    }

    /// Check a submitted code and consume the challenge on success.
    ///
    /// Failure order when several states apply: consumed, expired, attempts
    /// exhausted, code mismatch. A mismatch burns one attempt.
    #[instrument(skip(db, config, code))]
    pub async fn verify_challenge(
        db: &PgPool,
        config: &TwoFactorConfig,
        challenge_id: Uuid,
        code: &str,
    ) -> Result<VerifiedChallenge, AppError> {
        let code = code.trim();

        let challenge = Self::get_challenge(db, challenge_id)
            .await?
            .ok_or_else(|| AppError::bad_request(anyhow!("Challenge not found")))?;

        Self::check_live(&challenge, config)?;

        if !verify_password(code, &challenge.code_hash)? {
            // Attempts only advance while the challenge is still consumable
            sqlx::query(
                r#"
                UPDATE two_factor_challenges
                SET attempts = attempts + 1
                WHERE id = $1 AND consumed_at IS NULL AND attempts < $2
                "#,
            )
            .bind(challenge_id)
            .bind(config.max_attempts)
            .execute(db)
            .await?;

            return Err(AppError::bad_request(anyhow!("Invalid code")));
        }

        #[derive(sqlx::FromRow)]
        struct Consumed {
            user_id: String,
            email: String,
            role: Option<String>,
            tenant_id: Option<Uuid>,
        }

        // Conditional consume: exactly one verification can win, even when
        // several requests race with the same code.
        let consumed = sqlx::query_as::<_, Consumed>(
            r#"
            UPDATE two_factor_challenges
            SET consumed_at = NOW()
            WHERE id = $1 AND consumed_at IS NULL AND attempts < $2 AND expires_at > NOW()
            RETURNING user_id, email, role, tenant_id
            "#,
        )
        .bind(challenge_id)
        .bind(config.max_attempts)
        .fetch_optional(db)
        .await?;

        let Some(consumed) = consumed else {
            // Lost a race between the pre-checks and the consume; re-read for
            // the precise state.
            let current = Self::get_challenge(db, challenge_id)
                .await?
                .ok_or_else(|| AppError::bad_request(anyhow!("Challenge not found")))?;
            Self::check_live(&current, config)?;
            return Err(AppError::bad_request(anyhow!("Invalid code")));
        };

        Ok(VerifiedChallenge {
            user_id: consumed.user_id,
            email: consumed.email,
            role: consumed.role,
            tenant_id: consumed.tenant_id,
        })
    }

    // Private helper methods

    /// Reject a challenge that can no longer be verified.
    fn check_live(
        challenge: &TwoFactorChallenge,
        config: &TwoFactorConfig,
    ) -> Result<(), AppError> {
        if challenge.consumed_at.is_some() {
            return Err(AppError::bad_request(anyhow!("Already verified")));
        }
        if challenge.expires_at <= Utc::now() {
            return Err(AppError::bad_request(anyhow!("Code expired")));
        }
        if challenge.attempts >= config.max_attempts {
            return Err(AppError::bad_request(anyhow!("Too many attempts")));
        }
        Ok(())
    }

    async fn get_challenge(
        db: &PgPool,
        challenge_id: Uuid,
    ) -> Result<Option<TwoFactorChallenge>, AppError> {
        let challenge = sqlx::query_as::<_, TwoFactorChallenge>(
            r#"
            SELECT id, user_id, email, code_hash, expires_at, consumed_at, attempts,
                   purpose, last_sent_at, tenant_id, role, ip, user_agent, created_at
            FROM two_factor_challenges
            WHERE id = $1
            "#,
        )
        .bind(challenge_id)
        .fetch_optional(db)
        .await?;

        Ok(challenge)
    }

    /// Generate a 6-digit code, or the fixed development code when configured.
    fn generate_code(config: &TwoFactorConfig) -> String {
        if let Some(code) = &config.fixed_code {
            return code.clone();
        }

        use rand::Rng as _;
        let mut rng = rand::thread_rng();
        (0..6)
            .map(|_| {
                let digit = rng.gen_range(0..10);
                (b'0' + digit) as char
            })
            .collect()
    }

    /// Send the code email in the background. The code never goes to logs.
    fn dispatch_code_email(
        email_config: &EmailConfig,
        config: &TwoFactorConfig,
        challenge_id: Uuid,
        email: &str,
        code: String,
    ) {
        let mailer = EmailService::new(email_config.clone());
        let to_email = email.to_string();
        let ttl_minutes = config.ttl_minutes;

        tokio::spawn(async move {
            if let Err(e) = mailer
                .send_two_factor_code(&to_email, &code, ttl_minutes)
                .await
            {
                warn!(
                    challenge_id = %challenge_id,
                    "Failed to send two-factor code email: {:?}", e
                );
            }
        });
    }
}
