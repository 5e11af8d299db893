//! Diesel/SQLite persistence for the CRM mirror: embedded migrations, a
//! single-writer actor, and repositories implementing the core's store
//! traits.

pub mod contacts;
mod convert;
pub mod credentials;
pub mod db;
pub mod errors;
pub mod invoices;
pub mod schema;

pub use contacts::ContactRepository;
pub use credentials::CredentialRepository;
pub use db::{create_pool, get_connection, init, run_migrations, spawn_writer, DbPool, WriteHandle};
pub use errors::StorageError;
pub use invoices::InvoiceRepository;
