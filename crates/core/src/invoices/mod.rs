//! Invoice mirroring domain: models and payload normalization.

mod model;
mod normalizer;

pub use model::{Invoice, InvoiceDraft, InvoiceItemDraft};
pub use normalizer::invoice_draft;
