use std::env;

/// Two-factor challenge lifecycle configuration.
#[derive(Clone, Debug)]
pub struct TwoFactorConfig {
    /// Minutes until a freshly created (or resent) challenge expires
    pub ttl_minutes: i64,
    /// Seconds a challenge must wait between code sends
    pub resend_cooldown_secs: i64,
    /// Failed verification attempts before a challenge is locked out
    pub max_attempts: i32,
    /// When set, every challenge uses this code instead of a random one.
    /// Meant for local development and test environments only.
    pub fixed_code: Option<String>,
}

impl Default for TwoFactorConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: 10,
            resend_cooldown_secs: 30,
            max_attempts: 5,
            fixed_code: None,
        }
    }
}

impl TwoFactorConfig {
    pub fn from_env() -> Self {
        Self {
            ttl_minutes: env::var("TWO_FACTOR_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            resend_cooldown_secs: env::var("TWO_FACTOR_RESEND_COOLDOWN_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            max_attempts: env::var("TWO_FACTOR_MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            fixed_code: env::var("TWO_FACTOR_FIXED_CODE")
                .ok()
                .filter(|v| !v.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = TwoFactorConfig::default();
        assert_eq!(config.ttl_minutes, 10);
        assert_eq!(config.resend_cooldown_secs, 30);
        assert_eq!(config.max_attempts, 5);
        assert!(config.fixed_code.is_none());
    }
}
