//! Seams between the sync services, the remote client, and local storage.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::contacts::{AddressDraft, ContactDraft};
use crate::credentials::CrmCredentials;
use crate::errors::Result;
use crate::invoices::InvoiceDraft;
use crate::remote::{CustomFieldCatalog, FetchOutcome, PagingConfig, RemoteContact, RemoteInvoice};

use super::plan::{SyncPlan, SyncReport};

/// Read access to the remote CRM API.
#[async_trait]
pub trait CrmSource: Send + Sync {
    /// Fetch every contact in a location via cursor pagination.
    async fn fetch_all_contacts(
        &self,
        access_token: &str,
        location_id: &str,
        paging: &PagingConfig,
    ) -> Result<FetchOutcome<RemoteContact>>;

    /// Fetch one contact's detail record, which carries the full
    /// custom-field list the listing endpoint omits.
    async fn fetch_contact_detail(
        &self,
        access_token: &str,
        contact_id: &str,
    ) -> Result<RemoteContact>;

    /// Fetch the location's contact custom-field catalog.
    async fn fetch_custom_field_catalog(
        &self,
        access_token: &str,
        location_id: &str,
    ) -> Result<CustomFieldCatalog>;

    /// Fetch every invoice in a location via offset pagination.
    async fn fetch_all_invoices(
        &self,
        access_token: &str,
        location_id: &str,
        paging: &PagingConfig,
    ) -> Result<FetchOutcome<RemoteInvoice>>;

    /// Fetch one invoice by id.
    async fn fetch_invoice_detail(
        &self,
        access_token: &str,
        location_id: &str,
        invoice_id: &str,
    ) -> Result<RemoteInvoice>;

    /// Exchange a refresh token for fresh credentials.
    async fn refresh_credentials(&self, refresh_token: &str) -> Result<CrmCredentials>;
}

/// Persistence for mirrored contacts and their address children.
#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn list_contact_ids(&self, location_id: &str) -> Result<HashSet<String>>;

    /// Apply a full reconciliation plan in one transaction.
    async fn apply_contacts(
        &self,
        location_id: &str,
        plan: SyncPlan<ContactDraft>,
    ) -> Result<SyncReport>;

    /// Upsert a single contact. Returns true when the row was created.
    async fn upsert_contact(&self, draft: ContactDraft) -> Result<bool>;

    /// Replace the full address set of one contact. Returns the number of
    /// addresses inserted; a no-op when the parent does not exist.
    async fn replace_addresses(&self, contact_id: &str, drafts: Vec<AddressDraft>)
        -> Result<usize>;

    /// Delete one contact within a location scope. Returns rows deleted.
    async fn delete_contact(&self, location_id: &str, contact_id: &str) -> Result<usize>;
}

/// Persistence for mirrored invoices and their line items.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    async fn list_invoice_ids(&self, location_id: &str) -> Result<HashSet<String>>;

    /// Apply a full reconciliation plan, replacing each touched invoice's
    /// line items, in one transaction.
    async fn apply_invoices(
        &self,
        location_id: &str,
        plan: SyncPlan<InvoiceDraft>,
    ) -> Result<SyncReport>;

    /// Upsert a single invoice and replace its items. Returns true when the
    /// row was created.
    async fn upsert_invoice(&self, draft: InvoiceDraft) -> Result<bool>;

    /// Delete one invoice within a location scope. Returns rows deleted.
    async fn delete_invoice(&self, location_id: &str, invoice_id: &str) -> Result<usize>;
}

/// Persistence for per-location OAuth credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get_by_location(&self, location_id: &str) -> Result<Option<CrmCredentials>>;

    async fn upsert(&self, credentials: CrmCredentials) -> Result<()>;
}
