//! Reqwest-backed client for the hosted CRM API, implementing the core's
//! `CrmSource` seam.

mod client;
mod error;
mod wire;

pub use client::{CrmClient, OauthConfig};
pub use error::{ApiRetryClass, CrmApiError};
