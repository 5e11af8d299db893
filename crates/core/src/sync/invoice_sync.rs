//! Invoice sync service.
//!
//! Invoices need no per-record enrichment: the listing endpoint already
//! returns line items inline, so a full pass is fetch, normalize, reconcile.

use std::sync::Arc;

use log::{info, warn};

use crate::credentials::CrmCredentials;
use crate::errors::{RemoteError, Result};
use crate::invoices::{invoice_draft, InvoiceDraft};
use crate::remote::PagingConfig;

use super::plan::{partition, SyncReport};
use super::traits::{CredentialStore, CrmSource, InvoiceStore};

pub struct InvoiceSyncService {
    source: Arc<dyn CrmSource>,
    store: Arc<dyn InvoiceStore>,
    credentials: Arc<dyn CredentialStore>,
    paging: PagingConfig,
}

impl InvoiceSyncService {
    pub fn new(
        source: Arc<dyn CrmSource>,
        store: Arc<dyn InvoiceStore>,
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

    /// Mirror every invoice in the location, replacing line items per parent.
    pub async fn sync_all(&self, location_id: &str) -> Result<SyncReport> {
        let credentials = self.require_credentials(location_id).await?;
        let outcome = self
            .source
            .fetch_all_invoices(&credentials.access_token, location_id, &self.paging)
            .await?;
        info!(
            "Fetched {} invoices over {} pages for location {}",
            outcome.records.len(),
            outcome.pages,
            location_id
        );

        let drafts: Vec<InvoiceDraft> = outcome
            .records
            .iter()
            .filter_map(|record| invoice_draft(record, location_id))
            .collect();

        let existing = self.store.list_invoice_ids(location_id).await?;
        let mut plan = partition(drafts, &existing, |d| d.id.as_str());
        if outcome.truncated {
            warn!(
                "Invoice fetch for location {location_id} hit the page cap; \
                 suppressing deletions this pass"
            );
            plan.stale_ids.clear();
        }

        let mut report = self.store.apply_invoices(location_id, plan).await?;
        report.truncated = outcome.truncated;

        info!(
            "Invoice sync completed for {location_id}: {} total, {} created, \
             {} updated, {} deleted",
            report.total, report.created, report.updated, report.deleted
        );
        Ok(report)
    }

    /// Mirror a single invoice and its line items.
    pub async fn sync_one(&self, location_id: &str, invoice_id: &str) -> Result<SyncReport> {
        let credentials = self.require_credentials(location_id).await?;
        let detail = self
            .source
            .fetch_invoice_detail(&credentials.access_token, location_id, invoice_id)
            .await?;
        let draft = invoice_draft(&detail, location_id).ok_or_else(|| {
            RemoteError::Payload(format!("invoice {invoice_id} detail carries no id"))
        })?;

        let created = self.store.upsert_invoice(draft).await?;
        Ok(SyncReport {
            total: 1,
            created: usize::from(created),
            updated: usize::from(!created),
            ..Default::default()
        })
    }

    /// Remove one locally-mirrored invoice. Line items cascade.
    pub async fn delete_one(&self, location_id: &str, invoice_id: &str) -> Result<usize> {
        let deleted = self.store.delete_invoice(location_id, invoice_id).await?;
        if deleted == 0 {
            info!("Invoice {invoice_id} was not mirrored for location {location_id}");
        }
        Ok(deleted)
    }
}
