//! Repository for per-location OAuth credentials.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;

use leadmirror_core::credentials::CrmCredentials;
use leadmirror_core::sync::CredentialStore;
use leadmirror_core::Result;

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::crm_credentials;

use super::model::CrmCredentialDB;

pub struct CredentialRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl CredentialRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        CredentialRepository { pool, writer }
    }
}

#[async_trait]
impl CredentialStore for CredentialRepository {
    async fn get_by_location(&self, location_id: &str) -> Result<Option<CrmCredentials>> {
        let mut conn = get_connection(&self.pool)?;
        let row = crm_credentials::table
            .find(location_id)
            .first::<CrmCredentialDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(CrmCredentials::from))
    }

    async fn upsert(&self, credentials: CrmCredentials) -> Result<()> {
        self.writer
            .exec(move |conn| {
                let row = CrmCredentialDB::from(credentials);
                diesel::insert_into(crm_credentials::table)
                    .values(&row)
                    .on_conflict(crm_credentials::location_id)
                    .do_update()
                    .set(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}
