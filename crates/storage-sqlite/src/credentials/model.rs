//! Database model for stored OAuth credentials.

use diesel::prelude::*;

use leadmirror_core::credentials::CrmCredentials;

use crate::convert::{datetime_from_db, datetime_to_db};

#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone,
)]
#[diesel(table_name = crate::schema::crm_credentials)]
#[diesel(primary_key(location_id))]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CrmCredentialDB {
    pub location_id: String,
    pub user_id: Option<String>,
    pub company_id: Option<String>,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: Option<i64>,
    pub scope: Option<String>,
    pub user_type: Option<String>,
    pub updated_at: Option<String>,
}

impl From<CrmCredentials> for CrmCredentialDB {
    fn from(creds: CrmCredentials) -> Self {
        Self {
            location_id: creds.location_id,
            user_id: creds.user_id,
            company_id: creds.company_id,
            access_token: creds.access_token,
            refresh_token: creds.refresh_token,
            expires_in: creds.expires_in,
            scope: creds.scope,
            user_type: creds.user_type,
            updated_at: datetime_to_db(creds.updated_at),
        }
    }
}

impl From<CrmCredentialDB> for CrmCredentials {
    fn from(db: CrmCredentialDB) -> Self {
        CrmCredentials {
            location_id: db.location_id,
            user_id: db.user_id,
            company_id: db.company_id,
            access_token: db.access_token,
            refresh_token: db.refresh_token,
            expires_in: db.expires_in,
            scope: db.scope,
            user_type: db.user_type,
            updated_at: datetime_from_db(db.updated_at.as_deref()),
        }
    }
}
