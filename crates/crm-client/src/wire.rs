//! Response envelopes for the CRM REST API.
//!
//! The listing endpoints wrap their records differently (contacts nest the
//! total under `meta`, invoices carry it at the top level) and the invoice
//! detail endpoint sometimes wraps the record and sometimes returns it bare.

use serde::Deserialize;

use leadmirror_core::remote::{
    CustomFieldCatalog, CustomFieldMeta, RemoteContact, RemoteInvoice,
};

/// Structured error body returned by the CRM on failures.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub message: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiErrorResponse {
    /// Flatten the error body into one displayable message.
    pub fn display(&self) -> String {
        let message = self
            .message
            .as_ref()
            .map(|m| match m {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_default();
        match (&self.error, message.is_empty()) {
            (Some(error), false) => format!("{error}: {message}"),
            (Some(error), true) => error.clone(),
            (None, _) => message,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ContactListMeta {
    #[serde(default)]
    pub total: Option<u64>,
}

/// GET /contacts/ envelope.
#[derive(Debug, Deserialize)]
pub struct ContactListResponse {
    #[serde(default)]
    pub contacts: Vec<RemoteContact>,
    #[serde(default)]
    pub meta: ContactListMeta,
}

/// GET /contacts/{id} envelope.
#[derive(Debug, Deserialize)]
pub struct ContactDetailResponse {
    pub contact: RemoteContact,
}

/// GET /invoices/ envelope.
#[derive(Debug, Deserialize)]
pub struct InvoiceListResponse {
    #[serde(default)]
    pub invoices: Vec<RemoteInvoice>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// GET /invoices/{id} payload, wrapped or bare depending on the endpoint
/// revision.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum InvoiceDetailResponse {
    Wrapped { invoice: RemoteInvoice },
    Bare(RemoteInvoice),
}

impl InvoiceDetailResponse {
    pub fn into_invoice(self) -> RemoteInvoice {
        match self {
            Self::Wrapped { invoice } => invoice,
            Self::Bare(invoice) => invoice,
        }
    }
}

/// One entry from GET /locations/{id}/customFields.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomFieldEntry {
    pub id: Option<String>,
    pub name: Option<String>,
    pub field_key: Option<String>,
    pub parent_id: Option<String>,
}

/// GET /locations/{id}/customFields envelope.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomFieldsResponse {
    #[serde(default)]
    pub custom_fields: Vec<CustomFieldEntry>,
}

impl CustomFieldsResponse {
    /// Index the catalog by field id, dropping id-less entries.
    pub fn into_catalog(self) -> CustomFieldCatalog {
        self.custom_fields
            .into_iter()
            .filter_map(|entry| {
                let id = entry.id?;
                Some((
                    id,
                    CustomFieldMeta {
                        name: entry.name,
                        field_key: entry.field_key,
                        parent_id: entry.parent_id,
                    },
                ))
            })
            .collect()
    }
}

/// POST /oauth/token response. Token fields are snake_case while the
/// identity fields are camelCase; the mix is the endpoint's, not ours.
#[derive(Debug, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default, rename = "locationId")]
    pub location_id: Option<String>,
    #[serde(default, rename = "userId")]
    pub user_id: Option<String>,
    #[serde(default, rename = "companyId")]
    pub company_id: Option<String>,
    #[serde(default, rename = "userType")]
    pub user_type: Option<String>,
}
