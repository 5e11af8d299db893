//! Sync orchestration: reconciliation planning, service loops, and the
//! seams they depend on.

mod contact_sync;
mod invoice_sync;
mod plan;
mod refresh;
mod traits;

pub use contact_sync::ContactSyncService;
pub use invoice_sync::InvoiceSyncService;
pub use plan::{partition, SyncPlan, SyncReport};
pub use refresh::CredentialRefreshService;
pub use traits::{ContactStore, CredentialStore, CrmSource, InvoiceStore};
