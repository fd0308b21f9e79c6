//! License data models and DTOs.
//!
//! Licenses cap how many users of a given role a tenant may provision.
//! Each tenant+role pair has at most one license row; the default set is
//! created alongside the tenant and adjusted here by superadmins.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A seat license as stored, used in listing responses.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LicenseInfo {
    pub id: Uuid,
    pub role: String,
    pub max_users: i32,
    pub used_users: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for bulk-updating a tenant's seat caps.
///
/// Maps role name to the new `max_users` value, e.g.
/// `{"licenses": {"admin": 20, "reviewer": 15}}`. Role names are matched
/// case-insensitively. A sorted map keeps the update order deterministic.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateLicensesRequest {
    #[validate(length(min = 1))]
    pub licenses: BTreeMap<String, i32>,
}

/// A license after an update, without timestamps.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LicenseSummary {
    pub id: Uuid,
    pub role: String,
    pub max_users: i32,
    pub used_users: i32,
    pub active: bool,
}

/// Response for a bulk license update.
#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateLicensesResponse {
    pub success: bool,
    pub msg: String,
    pub licenses: Vec<LicenseSummary>,
}
