//! Core of the CRM mirror: domain models, payload normalization, the
//! custom-field demultiplexer, and the sync services that drive a pass.
//!
//! The core is storage- and transport-agnostic; the client and storage
//! crates plug in through the traits in [`sync`].

pub mod contacts;
pub mod credentials;
pub mod errors;
pub mod invoices;
pub mod remote;
pub mod sync;
pub mod utils;

pub use errors::{DatabaseError, Error, RemoteError, Result};
