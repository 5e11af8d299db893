//! Scheduled OAuth refresh.
//!
//! Access tokens expire on the order of a day; a periodic job calls
//! [`CredentialRefreshService::refresh`] per location to keep the stored
//! token usable between sync passes.

use std::sync::Arc;

use chrono::Utc;
use log::info;

use crate::credentials::CrmCredentials;
use crate::errors::{Error, Result};

use super::traits::{CredentialStore, CrmSource};

pub struct CredentialRefreshService {
    source: Arc<dyn CrmSource>,
    store: Arc<dyn CredentialStore>,
}

impl CredentialRefreshService {
    pub fn new(source: Arc<dyn CrmSource>, store: Arc<dyn CredentialStore>) -> Self {
        Self { source, store }
    }

    /// Exchange the stored refresh token and persist the rotated pair.
    ///
    /// The token endpoint echoes the location id; when it omits one the
    /// requested location is kept so the row stays addressable.
    pub async fn refresh(&self, location_id: &str) -> Result<CrmCredentials> {
        let current = self
            .store
            .get_by_location(location_id)
            .await?
            .ok_or_else(|| Error::MissingCredentials(location_id.to_string()))?;

        let mut refreshed = self
            .source
            .refresh_credentials(&current.refresh_token)
            .await?;
        if refreshed.location_id.trim().is_empty() {
            refreshed.location_id = current.location_id;
        }
        refreshed.updated_at = Some(Utc::now());

        self.store.upsert(refreshed.clone()).await?;
        info!("Rotated credentials for location {}", refreshed.location_id);
        Ok(refreshed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{
        CustomFieldCatalog, FetchOutcome, PagingConfig, RemoteContact, RemoteInvoice,
    };
    use crate::errors::RemoteError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RefreshOnlySource {
        issued: CrmCredentials,
    }

    #[async_trait]
    impl CrmSource for RefreshOnlySource {
        async fn fetch_all_contacts(
            &self,
            _access_token: &str,
            _location_id: &str,
            _paging: &PagingConfig,
        ) -> Result<FetchOutcome<RemoteContact>> {
            unimplemented!("not used by refresh")
        }

        async fn fetch_contact_detail(
            &self,
            _access_token: &str,
            _contact_id: &str,
        ) -> Result<RemoteContact> {
            unimplemented!("not used by refresh")
        }

        async fn fetch_custom_field_catalog(
            &self,
            _access_token: &str,
            _location_id: &str,
        ) -> Result<CustomFieldCatalog> {
            unimplemented!("not used by refresh")
        }

        async fn fetch_all_invoices(
            &self,
            _access_token: &str,
            _location_id: &str,
            _paging: &PagingConfig,
        ) -> Result<FetchOutcome<RemoteInvoice>> {
            unimplemented!("not used by refresh")
        }

        async fn fetch_invoice_detail(
            &self,
            _access_token: &str,
            _location_id: &str,
            _invoice_id: &str,
        ) -> Result<RemoteInvoice> {
            unimplemented!("not used by refresh")
        }

        async fn refresh_credentials(&self, refresh_token: &str) -> Result<CrmCredentials> {
            if refresh_token != "refresh-old" {
                return Err(RemoteError::Auth("unknown refresh token".to_string()).into());
            }
            Ok(self.issued.clone())
        }
    }

    #[derive(Default)]
    struct InMemoryCredentialStore {
        row: Mutex<Option<CrmCredentials>>,
    }

    #[async_trait]
    impl CredentialStore for InMemoryCredentialStore {
        async fn get_by_location(&self, location_id: &str) -> Result<Option<CrmCredentials>> {
            Ok(self
                .row
                .lock()
                .unwrap()
                .clone()
                .filter(|c| c.location_id == location_id))
        }

        async fn upsert(&self, credentials: CrmCredentials) -> Result<()> {
            *self.row.lock().unwrap() = Some(credentials);
            Ok(())
        }
    }

    fn seed_store() -> Arc<InMemoryCredentialStore> {
        let store = InMemoryCredentialStore::default();
        *store.row.lock().unwrap() = Some(CrmCredentials {
            location_id: "loc-1".to_string(),
            access_token: "access-old".to_string(),
            refresh_token: "refresh-old".to_string(),
            ..Default::default()
        });
        Arc::new(store)
    }

    #[tokio::test]
    async fn rotates_and_persists_both_tokens() {
        let store = seed_store();
        let source = Arc::new(RefreshOnlySource {
            issued: CrmCredentials {
                location_id: "loc-1".to_string(),
                access_token: "access-new".to_string(),
                refresh_token: "refresh-new".to_string(),
                expires_in: Some(86_399),
                ..Default::default()
            },
        });

        let refreshed = CredentialRefreshService::new(source, store.clone())
            .refresh("loc-1")
            .await
            .expect("refresh");

        assert_eq!(refreshed.access_token, "access-new");
        assert!(refreshed.updated_at.is_some());
        let stored = store.row.lock().unwrap().clone().expect("stored row");
        assert_eq!(stored.refresh_token, "refresh-new");
    }

    #[tokio::test]
    async fn keeps_requested_location_when_endpoint_omits_it() {
        let store = seed_store();
        let source = Arc::new(RefreshOnlySource {
            issued: CrmCredentials {
                access_token: "access-new".to_string(),
                refresh_token: "refresh-new".to_string(),
                ..Default::default()
            },
        });

        let refreshed = CredentialRefreshService::new(source, store)
            .refresh("loc-1")
            .await
            .expect("refresh");

        assert_eq!(refreshed.location_id, "loc-1");
    }

    #[tokio::test]
    async fn missing_row_is_reported() {
        let store = Arc::new(InMemoryCredentialStore::default());
        let source = Arc::new(RefreshOnlySource {
            issued: CrmCredentials::default(),
        });

        let err = CredentialRefreshService::new(source, store)
            .refresh("loc-unknown")
            .await
            .expect_err("no stored credentials");
        assert!(matches!(err, Error::MissingCredentials(_)));
    }
}
