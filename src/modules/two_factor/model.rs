//! Two-factor challenge data models.
//!
//! A challenge is created after a successful password check and holds the
//! bcrypt hash of the emailed one-time code together with the identity the
//! code will release once verified.
//!
//! # Core Types
//!
//! - [`TwoFactorChallenge`] - Challenge row from the database
//! - [`IssuedChallenge`] - Handle produced by challenge creation or resend
//! - [`VerifiedChallenge`] - Identity released by a successful verification
//! - [`ChallengeContext`] - Request metadata captured at login time
//!
//! # Lifecycle
//!
//! ```text
//! created ──resend*──▶ (code replaced, attempts reset, expiry extended)
//!    │
//!    ├── verified   (code matched before expiry, within attempt budget)
//!    ├── expired    (TTL elapsed; resend revives it)
//!    └── locked     (attempt budget exhausted; resend revives it)
//! ```

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A single emailed-code challenge.
///
/// `user_id` is text rather than a UUID column because challenges are issued
/// for both app users and tenant root accounts, which live in separate tables.
#[derive(Debug, Clone, FromRow)]
pub struct TwoFactorChallenge {
    pub id: Uuid,
    pub user_id: String,
    pub email: String,
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
    pub attempts: i32,
    pub purpose: String,
    pub last_sent_at: DateTime<Utc>,
    pub tenant_id: Option<Uuid>,
    pub role: Option<String>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request metadata recorded when a challenge is issued.
#[derive(Debug, Clone, Default)]
pub struct ChallengeContext {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

/// Handle produced when a challenge is created or resent.
///
/// Never carries the code itself; that only travels by email.
#[derive(Debug, Clone)]
pub struct IssuedChallenge {
    pub challenge_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Identity released by a successfully verified challenge.
#[derive(Debug, Clone)]
pub struct VerifiedChallenge {
    pub user_id: String,
    pub email: String,
    pub role: Option<String>,
    pub tenant_id: Option<Uuid>,
}
