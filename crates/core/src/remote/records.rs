//! Validated intermediate shapes for raw CRM payloads.
//!
//! The remote API returns loosely-shaped JSON; deserializing it into these
//! structs (every field optional, collections defaulting to empty) makes
//! malformed payloads fail predictably at one boundary instead of producing
//! scattered attribute-access errors downstream. Fields the API reports as
//! either numbers or strings are kept as `serde_json::Value` and coerced by
//! the normalizers.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::paging::CursorSeed;

/// One `{id, value}` custom field entry on a contact.
///
/// Kept serializable because the raw list is persisted verbatim alongside
/// the structured address rows derived from it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomFieldValue {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub value: Value,
}

/// Metadata for one custom field definition, resolved by field id.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomFieldMeta {
    pub name: Option<String>,
    pub field_key: Option<String>,
    pub parent_id: Option<String>,
}

/// Lookup table from custom field id to its metadata.
///
/// Fetched once per sync scope and held for the duration of the pass only.
#[derive(Debug, Clone, Default)]
pub struct CustomFieldCatalog {
    fields: HashMap<String, CustomFieldMeta>,
}

impl CustomFieldCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, meta: CustomFieldMeta) {
        self.fields.insert(id.into(), meta);
    }

    pub fn get(&self, id: &str) -> Option<&CustomFieldMeta> {
        self.fields.get(id)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, CustomFieldMeta)> for CustomFieldCatalog {
    fn from_iter<I: IntoIterator<Item = (String, CustomFieldMeta)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// A contact as returned by the CRM listing or detail endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteContact {
    pub id: Option<String>,
    pub location_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub dnd: Option<bool>,
    pub country: Option<String>,
    /// ISO datetime string or epoch milliseconds, depending on the endpoint.
    pub date_added: Option<Value>,
    pub tags: Vec<Value>,
    pub custom_fields: Vec<CustomFieldValue>,
    // Top-level primary address fields, present on the detail endpoint.
    pub address1: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
}

/// Cursor seed for contact pagination: the id plus the raw added-at
/// timestamp of the last record of the previous page.
pub fn contact_cursor_seed(contact: &RemoteContact) -> CursorSeed {
    CursorSeed {
        id: contact.id.clone(),
        raw_timestamp: contact.date_added.clone(),
    }
}

/// Contact details embedded in an invoice payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteInvoiceContact {
    pub id: Option<String>,
    #[serde(rename = "_id")]
    pub legacy_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_no: Option<String>,
}

/// Discount block on an invoice.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteInvoiceDiscount {
    pub value: Option<Value>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Sender block on an invoice.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteSentFrom {
    pub from_name: Option<String>,
    pub from_email: Option<String>,
}

/// One line item inside an invoice payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteInvoiceItem {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub product_id: Option<String>,
    pub price_id: Option<String>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub currency: Option<String>,
    pub qty: Option<Value>,
    pub amount: Option<Value>,
    pub tax_inclusive: Option<bool>,
    pub taxes: Vec<Value>,
}

/// An invoice as returned by the CRM listing or detail endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteInvoice {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    /// Number or string depending on the endpoint.
    pub invoice_number: Option<Value>,
    pub alt_id: Option<String>,
    pub alt_type: Option<String>,
    pub company_id: Option<String>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub status: Option<String>,
    pub live_mode: Option<bool>,
    pub contact_details: Option<RemoteInvoiceContact>,
    pub discount: Option<RemoteInvoiceDiscount>,
    pub currency: Option<String>,
    pub currency_options: Option<Value>,
    pub sub_total: Option<Value>,
    pub total: Option<Value>,
    pub amount_paid: Option<Value>,
    pub amount_due: Option<Value>,
    pub issue_date: Option<Value>,
    pub due_date: Option<Value>,
    pub sent_at: Option<Value>,
    pub created_at: Option<Value>,
    pub updated_at: Option<Value>,
    pub sent_from: Option<RemoteSentFrom>,
    pub terms_notes: Option<String>,
    pub attachments: Vec<Value>,
    pub payment_schedule: Option<Value>,
    pub total_summary: Option<Value>,
    pub invoice_items: Vec<RemoteInvoiceItem>,
}

impl RemoteInvoice {
    /// Look up a key inside the `totalSummary` blob.
    pub fn total_summary_field(&self, key: &str) -> Option<&Value> {
        self.total_summary.as_ref()?.get(key)
    }
}
