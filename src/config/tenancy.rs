use std::env;

/// Tenant scoping configuration.
///
/// When `enforce_tenant_header` is on, tenant-scoped requests must carry an
/// `X-Tenant-Id` header matching the tenant baked into the JWT. Superadmin,
/// admin, and tenant root tokens are exempt from the header check.
#[derive(Clone, Debug)]
pub struct TenancyConfig {
    pub enforce_tenant_header: bool,
}

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            enforce_tenant_header: true,
        }
    }
}

impl TenancyConfig {
    pub fn from_env() -> Self {
        Self {
            enforce_tenant_header: env::var("ENFORCE_TENANT_HEADER")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),
        }
    }
}
