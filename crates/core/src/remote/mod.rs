//! Remote record shapes and the generic pagination loop.

pub mod paging;
pub mod records;

pub use paging::{fetch_all_pages, Advance, CursorSeed, FetchOutcome, Page, PageQuery, PagingConfig};
pub use records::{
    contact_cursor_seed, CustomFieldCatalog, CustomFieldMeta, CustomFieldValue, RemoteContact,
    RemoteInvoice, RemoteInvoiceContact, RemoteInvoiceDiscount, RemoteInvoiceItem, RemoteSentFrom,
};
