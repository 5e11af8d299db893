//! Contact domain: models, custom-field demultiplexing, address slots.

pub mod demux;
mod model;
mod slots;

pub use demux::{address_drafts, demux_address_fields, primary_address_draft};
pub use model::{AddressDraft, Contact, ContactDraft};
pub use slots::{AddressSlot, SlotIndex, PRIMARY_ADDRESS_SLOT};
