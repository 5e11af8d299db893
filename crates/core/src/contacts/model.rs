//! Contact and address models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::remote::RemoteContact;
use crate::utils::coerce::parse_datetime_flexible;

/// A mirrored contact row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub location_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub dnd: bool,
    pub country: Option<String>,
    pub date_added: Option<DateTime<Utc>>,
    pub tags: Vec<Value>,
    pub custom_fields: Vec<Value>,
    pub synced_at: Option<DateTime<Utc>>,
}

/// Normalized contact attributes, ready for reconcile.
///
/// Field translation from the remote vocabulary is the explicit mapping in
/// [`ContactDraft::from_remote`]; there is no convention-based guessing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDraft {
    pub id: String,
    pub location_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub dnd: bool,
    pub country: Option<String>,
    pub date_added: Option<DateTime<Utc>>,
    pub tags: Vec<Value>,
    /// Raw custom-field list, persisted verbatim for downstream consumers.
    pub custom_fields: Vec<Value>,
}

impl ContactDraft {
    /// Normalize one raw contact record. Returns `None` when the record has
    /// no remote id; identity-less records are dropped from the batch.
    pub fn from_remote(record: &RemoteContact, location_id: &str) -> Option<Self> {
        let id = record.id.as_deref()?.trim();
        if id.is_empty() {
            return None;
        }

        let custom_fields = record
            .custom_fields
            .iter()
            .filter_map(|f| serde_json::to_value(f).ok())
            .collect();

        Some(Self {
            id: id.to_string(),
            location_id: location_id.to_string(),
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            email: record.email.clone(),
            phone: record.phone.clone(),
            dnd: record.dnd.unwrap_or(false),
            country: record.country.clone(),
            date_added: parse_datetime_flexible(record.date_added.as_ref()),
            tags: record.tags.clone(),
            custom_fields,
        })
    }
}

/// A drafted address child row, produced by the demultiplexer and consumed
/// by the child replacer inside the parent's transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDraft {
    /// Slot id, scoped to the parent contact.
    pub slot_id: String,
    pub name: Option<String>,
    pub position: i32,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub gate_code: Option<String>,
    pub number_of_floors: Option<i32>,
    pub property_sqft: Option<i32>,
    pub property_type: Option<String>,
}
