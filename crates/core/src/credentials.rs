//! Per-location CRM OAuth credentials.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored OAuth credentials for one CRM location (sync scope).
///
/// The refresh flow itself lives in the client crate; the core only reads
/// the access token and hands refreshed rows back to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrmCredentials {
    pub location_id: String,
    pub user_id: Option<String>,
    pub company_id: Option<String>,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: Option<i64>,
    pub scope: Option<String>,
    pub user_type: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}
