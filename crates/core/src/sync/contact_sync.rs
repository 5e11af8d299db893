//! Contact sync service.
//!
//! A full pass fetches every contact in the location, reconciles the batch
//! against local state, then enriches each fetched contact with its address
//! children from the detail endpoint. Enrichment is best-effort per contact;
//! a single failed detail fetch must not abort the pass.

use std::sync::Arc;

use log::{info, warn};

use crate::contacts::{address_drafts, ContactDraft, SlotIndex};
use crate::credentials::CrmCredentials;
use crate::errors::{RemoteError, Result};
use crate::remote::{CustomFieldCatalog, PagingConfig};

use super::plan::{partition, SyncReport};
use super::traits::{ContactStore, CredentialStore, CrmSource};

pub struct ContactSyncService {
    source: Arc<dyn CrmSource>,
    store: Arc<dyn ContactStore>,
    credentials: Arc<dyn CredentialStore>,
    paging: PagingConfig,
}

impl ContactSyncService {
    pub fn new(
        source: Arc<dyn CrmSource>,
        store: Arc<dyn ContactStore>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            source,
            store,
            credentials,
            paging: PagingConfig::default(),
        }
    }

    pub fn with_paging(mut self, paging: PagingConfig) -> Self {
        self.paging = paging;
        self
    }

    async fn require_credentials(&self, location_id: &str) -> Result<CrmCredentials> {
        self.credentials
            .get_by_location(location_id)
            .await?
            .ok_or_else(|| crate::errors::Error::MissingCredentials(location_id.to_string()))
    }

    /// Mirror every contact in the location, then refresh address children.
    pub async fn sync_all(&self, location_id: &str) -> Result<SyncReport> {
        let credentials = self.require_credentials(location_id).await?;
        let outcome = self
            .source
            .fetch_all_contacts(&credentials.access_token, location_id, &self.paging)
            .await?;
        info!(
            "Fetched {} contacts over {} pages for location {}",
            outcome.records.len(),
            outcome.pages,
            location_id
        );

        let drafts: Vec<ContactDraft> = outcome
            .records
            .iter()
            .filter_map(|record| ContactDraft::from_remote(record, location_id))
            .collect();
        let fetched_ids: Vec<String> = drafts.iter().map(|d| d.id.clone()).collect();

        let existing = self.store.list_contact_ids(location_id).await?;
        let mut plan = partition(drafts, &existing, |d| d.id.as_str());
        if outcome.truncated {
            warn!(
                "Contact fetch for location {location_id} hit the page cap; \
                 suppressing deletions this pass"
            );
            plan.stale_ids.clear();
        }

        let mut report = self.store.apply_contacts(location_id, plan).await?;
        report.truncated = outcome.truncated;

        // A missing catalog makes every demux result wrong, so this one is
        // fatal; individual detail fetches are not.
        let catalog = self
            .source
            .fetch_custom_field_catalog(&credentials.access_token, location_id)
            .await?;
        let slots = SlotIndex::builtin();
        for contact_id in &fetched_ids {
            if let Err(err) = self
                .enrich_addresses(&credentials.access_token, contact_id, &catalog, &slots)
                .await
            {
                warn!("Address enrichment failed for contact {contact_id}: {err}");
            }
        }

        info!(
            "Contact sync completed for {location_id}: {} total, {} created, \
             {} updated, {} deleted",
            report.total, report.created, report.updated, report.deleted
        );
        Ok(report)
    }

    /// Mirror a single contact and its addresses.
    pub async fn sync_one(&self, location_id: &str, contact_id: &str) -> Result<SyncReport> {
        let credentials = self.require_credentials(location_id).await?;
        let detail = self
            .source
            .fetch_contact_detail(&credentials.access_token, contact_id)
            .await?;
        let draft = ContactDraft::from_remote(&detail, location_id).ok_or_else(|| {
            RemoteError::Payload(format!("contact {contact_id} detail carries no id"))
        })?;

        let created = self.store.upsert_contact(draft).await?;

        let catalog = self
            .source
            .fetch_custom_field_catalog(&credentials.access_token, location_id)
            .await?;
        let drafts = address_drafts(&detail, &catalog, &SlotIndex::builtin());
        self.store.replace_addresses(contact_id, drafts).await?;

        Ok(SyncReport {
            total: 1,
            created: usize::from(created),
            updated: usize::from(!created),
            ..Default::default()
        })
    }

    /// Remove one locally-mirrored contact. Addresses cascade.
    pub async fn delete_one(&self, location_id: &str, contact_id: &str) -> Result<usize> {
        let deleted = self.store.delete_contact(location_id, contact_id).await?;
        if deleted == 0 {
            info!("Contact {contact_id} was not mirrored for location {location_id}");
        }
        Ok(deleted)
    }

    async fn enrich_addresses(
        &self,
        access_token: &str,
        contact_id: &str,
        catalog: &CustomFieldCatalog,
        slots: &SlotIndex,
    ) -> Result<()> {
        let detail = self
            .source
            .fetch_contact_detail(access_token, contact_id)
            .await?;
        let drafts = address_drafts(&detail, catalog, slots);
        self.store.replace_addresses(contact_id, drafts).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::AddressDraft;
    use crate::errors::Error;
    use crate::remote::{FetchOutcome, RemoteContact, RemoteInvoice};
    use crate::sync::plan::SyncPlan;
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    struct MockSource {
        pub contacts: Vec<RemoteContact>,
        pub details: HashMap<String, RemoteContact>,
        pub catalog: CustomFieldCatalog,
        pub invoices: Vec<RemoteInvoice>,
        pub truncated: bool,
        pub failing_details: HashSet<String>,
    }

    impl Default for MockSource {
        fn default() -> Self {
            Self {
                contacts: Vec::new(),
                details: HashMap::new(),
                catalog: CustomFieldCatalog::new(),
                invoices: Vec::new(),
                truncated: false,
                failing_details: HashSet::new(),
            }
        }
    }

    #[async_trait]
    impl CrmSource for MockSource {
        async fn fetch_all_contacts(
            &self,
            _access_token: &str,
            _location_id: &str,
            _paging: &PagingConfig,
        ) -> Result<FetchOutcome<RemoteContact>> {
            Ok(FetchOutcome {
                records: self.contacts.clone(),
                pages: 1,
                truncated: self.truncated,
            })
        }

        async fn fetch_contact_detail(
            &self,
            _access_token: &str,
            contact_id: &str,
        ) -> Result<RemoteContact> {
            if self.failing_details.contains(contact_id) {
                return Err(RemoteError::Status {
                    status: 500,
                    message: "boom".to_string(),
                }
                .into());
            }
            self.details.get(contact_id).cloned().ok_or_else(|| {
                Error::from(RemoteError::Status {
                    status: 404,
                    message: format!("contact {contact_id} not found"),
                })
            })
        }

        async fn fetch_custom_field_catalog(
            &self,
            _access_token: &str,
            _location_id: &str,
        ) -> Result<CustomFieldCatalog> {
            Ok(self.catalog.clone())
        }

        async fn fetch_all_invoices(
            &self,
            _access_token: &str,
            _location_id: &str,
            _paging: &PagingConfig,
        ) -> Result<FetchOutcome<RemoteInvoice>> {
            Ok(FetchOutcome {
                records: self.invoices.clone(),
                pages: 1,
                truncated: self.truncated,
            })
        }

        async fn fetch_invoice_detail(
            &self,
            _access_token: &str,
            _location_id: &str,
            invoice_id: &str,
        ) -> Result<RemoteInvoice> {
            self.invoices
                .iter()
                .find(|i| i.id.as_deref() == Some(invoice_id))
                .cloned()
                .ok_or_else(|| {
                    Error::from(RemoteError::Status {
                        status: 404,
                        message: format!("invoice {invoice_id} not found"),
                    })
                })
        }

        async fn refresh_credentials(&self, _refresh_token: &str) -> Result<CrmCredentials> {
            Ok(CrmCredentials {
                access_token: "fresh-token".to_string(),
                refresh_token: "fresh-refresh".to_string(),
                ..Default::default()
            })
        }
    }

    #[derive(Default)]
    struct MockContactStore {
        pub existing: Mutex<HashSet<String>>,
        pub applied_plans: Mutex<Vec<SyncPlan<ContactDraft>>>,
        pub replaced: Mutex<Vec<(String, Vec<AddressDraft>)>>,
    }

    #[async_trait]
    impl ContactStore for MockContactStore {
        async fn list_contact_ids(&self, _location_id: &str) -> Result<HashSet<String>> {
            Ok(self.existing.lock().unwrap().clone())
        }

        async fn apply_contacts(
            &self,
            _location_id: &str,
            plan: SyncPlan<ContactDraft>,
        ) -> Result<SyncReport> {
            let report = SyncReport {
                total: plan.to_create.len() + plan.to_update.len(),
                created: plan.to_create.len(),
                updated: plan.to_update.len(),
                deleted: plan.stale_ids.len(),
                truncated: false,
            };
            let mut existing = self.existing.lock().unwrap();
            for draft in &plan.to_create {
                existing.insert(draft.id.clone());
            }
            for stale in &plan.stale_ids {
                existing.remove(stale);
            }
            drop(existing);
            self.applied_plans.lock().unwrap().push(plan);
            Ok(report)
        }

        async fn upsert_contact(&self, draft: ContactDraft) -> Result<bool> {
            Ok(self.existing.lock().unwrap().insert(draft.id))
        }

        async fn replace_addresses(
            &self,
            contact_id: &str,
            drafts: Vec<AddressDraft>,
        ) -> Result<usize> {
            let count = drafts.len();
            self.replaced
                .lock()
                .unwrap()
                .push((contact_id.to_string(), drafts));
            Ok(count)
        }

        async fn delete_contact(&self, _location_id: &str, contact_id: &str) -> Result<usize> {
            Ok(usize::from(self.existing.lock().unwrap().remove(contact_id)))
        }
    }

    struct MockCredentialStore;

    #[async_trait]
    impl CredentialStore for MockCredentialStore {
        async fn get_by_location(&self, location_id: &str) -> Result<Option<CrmCredentials>> {
            Ok(Some(CrmCredentials {
                location_id: location_id.to_string(),
                access_token: "token".to_string(),
                refresh_token: "refresh".to_string(),
                ..Default::default()
            }))
        }

        async fn upsert(&self, _credentials: CrmCredentials) -> Result<()> {
            Ok(())
        }
    }

    fn contact(id: &str) -> RemoteContact {
        RemoteContact {
            id: Some(id.to_string()),
            ..Default::default()
        }
    }

    fn service(
        source: MockSource,
        store: Arc<MockContactStore>,
    ) -> ContactSyncService {
        ContactSyncService::new(Arc::new(source), store, Arc::new(MockCredentialStore))
    }

    #[tokio::test]
    async fn full_pass_creates_updates_and_deletes() {
        let source = MockSource {
            contacts: vec![contact("c-1"), contact("c-2")],
            details: [("c-1", contact("c-1")), ("c-2", contact("c-2"))]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            ..Default::default()
        };
        let store = Arc::new(MockContactStore::default());
        store
            .existing
            .lock()
            .unwrap()
            .extend(["c-2".to_string(), "c-gone".to_string()]);

        let report = service(source, store.clone())
            .sync_all("loc-1")
            .await
            .expect("sync");

        assert_eq!(report.created, 1);
        assert_eq!(report.updated, 1);
        assert_eq!(report.deleted, 1);
        assert!(!report.truncated);

        let plans = store.applied_plans.lock().unwrap();
        assert_eq!(plans[0].stale_ids, vec!["c-gone"]);
        // Both fetched contacts got their address set refreshed.
        assert_eq!(store.replaced.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn truncated_fetch_suppresses_deletions() {
        let source = MockSource {
            contacts: vec![contact("c-1")],
            details: [("c-1".to_string(), contact("c-1"))].into_iter().collect(),
            truncated: true,
            ..Default::default()
        };
        let store = Arc::new(MockContactStore::default());
        store.existing.lock().unwrap().insert("c-gone".to_string());

        let report = service(source, store.clone())
            .sync_all("loc-1")
            .await
            .expect("sync");

        assert!(report.truncated);
        assert_eq!(report.deleted, 0);
        assert!(store.applied_plans.lock().unwrap()[0].stale_ids.is_empty());
        // The absent contact survives the pass.
        assert!(store.existing.lock().unwrap().contains("c-gone"));
    }

    #[tokio::test]
    async fn failed_enrichment_does_not_abort_the_pass() {
        let source = MockSource {
            contacts: vec![contact("c-1"), contact("c-2")],
            details: [("c-2".to_string(), contact("c-2"))].into_iter().collect(),
            failing_details: ["c-1".to_string()].into_iter().collect(),
            ..Default::default()
        };
        let store = Arc::new(MockContactStore::default());

        let report = service(source, store.clone())
            .sync_all("loc-1")
            .await
            .expect("sync");

        assert_eq!(report.created, 2);
        let replaced = store.replaced.lock().unwrap();
        assert_eq!(replaced.len(), 1);
        assert_eq!(replaced[0].0, "c-2");
    }

    #[tokio::test]
    async fn second_pass_is_idempotent() {
        let source = || MockSource {
            contacts: vec![contact("c-1")],
            details: [("c-1".to_string(), contact("c-1"))].into_iter().collect(),
            ..Default::default()
        };
        let store = Arc::new(MockContactStore::default());

        let first = service(source(), store.clone())
            .sync_all("loc-1")
            .await
            .expect("first pass");
        let second = service(source(), store.clone())
            .sync_all("loc-1")
            .await
            .expect("second pass");

        assert_eq!(first.created, 1);
        assert_eq!(second.created, 0);
        assert_eq!(second.updated, 1);
        assert_eq!(second.deleted, 0);
    }

    #[tokio::test]
    async fn sync_one_upserts_and_replaces_addresses() {
        let mut detail = contact("c-1");
        detail.city = Some("Springfield".to_string());
        let source = MockSource {
            details: [("c-1".to_string(), detail)].into_iter().collect(),
            ..Default::default()
        };
        let store = Arc::new(MockContactStore::default());

        let report = service(source, store.clone())
            .sync_one("loc-1", "c-1")
            .await
            .expect("sync one");

        assert_eq!(report.created, 1);
        let replaced = store.replaced.lock().unwrap();
        assert_eq!(replaced[0].1.len(), 1);
        assert_eq!(replaced[0].1[0].city.as_deref(), Some("Springfield"));
    }
}
