//! Custom-field demultiplexer.
//!
//! The CRM stores extra addresses as a flat `{fieldId, value}` list on the
//! contact. Each field id resolves through the location's custom-field
//! catalog to a `(fieldKey, parentId)` pair; fields whose parent folder is a
//! configured address slot are regrouped into one address draft per slot.
//! Field keys carry a `contact.` namespace prefix and a positional suffix
//! (`street_address_2`), both of which are stripped to recover the logical
//! attribute key.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::remote::{CustomFieldCatalog, CustomFieldValue, RemoteContact};
use crate::utils::coerce::{as_clean_string, parse_int};

use super::model::AddressDraft;
use super::slots::{SlotIndex, PRIMARY_ADDRESS_SLOT};

/// Strip the `contact.` namespace and any trailing `_<digits>` suffix from a
/// field key, yielding the logical attribute key.
fn logical_key(field_key: &str) -> String {
    let key = field_key.strip_prefix("contact.").unwrap_or(field_key);
    match key.rfind('_') {
        Some(idx) if idx + 1 < key.len() && key[idx + 1..].bytes().all(|b| b.is_ascii_digit()) => {
            key[..idx].to_string()
        }
        _ => key.to_string(),
    }
}

/// Regroup flat custom fields into per-slot attribute maps.
///
/// Fields that do not resolve through the catalog, or whose parent folder is
/// not a configured slot, are discarded. On key collision within a slot the
/// later-processed value wins. Slots with zero populated keys yield nothing.
pub fn demux_address_fields(
    custom_fields: &[CustomFieldValue],
    catalog: &CustomFieldCatalog,
    slots: &SlotIndex,
) -> BTreeMap<i32, (String, BTreeMap<String, Value>)> {
    let mut grouped: BTreeMap<i32, (String, BTreeMap<String, Value>)> = BTreeMap::new();

    for field in custom_fields {
        let Some(field_id) = field.id.as_deref() else {
            continue;
        };
        let Some(meta) = catalog.get(field_id) else {
            continue;
        };
        let Some(parent_id) = meta.parent_id.as_deref() else {
            continue;
        };
        // The primary slot is fed from top-level record fields only.
        if parent_id == PRIMARY_ADDRESS_SLOT {
            continue;
        }
        let Some(position) = slots.position(parent_id) else {
            continue;
        };
        let Some(field_key) = meta.field_key.as_deref().or(meta.name.as_deref()) else {
            continue;
        };
        if field.value.is_null() {
            continue;
        }

        let key = logical_key(field_key);
        grouped
            .entry(position)
            .or_insert_with(|| (parent_id.to_string(), BTreeMap::new()))
            .1
            .insert(key, field.value.clone());
    }

    grouped
}

fn draft_from_fields(
    slot_id: String,
    position: i32,
    fields: &BTreeMap<String, Value>,
) -> AddressDraft {
    AddressDraft {
        slot_id,
        name: Some(format!("Address {position}")),
        position,
        street_address: fields.get("street_address").and_then(as_clean_string),
        city: fields.get("city").and_then(as_clean_string),
        state: fields.get("state").and_then(as_clean_string),
        postal_code: fields.get("postal_code").and_then(as_clean_string),
        gate_code: fields.get("gate_code").and_then(as_clean_string),
        number_of_floors: fields.get("number_of_floors").and_then(|v| parse_int(v)),
        property_sqft: fields.get("property_sqft").and_then(|v| parse_int(v)),
        property_type: fields.get("property_type").and_then(as_clean_string),
    }
}

/// Build the primary address draft from top-level detail fields.
///
/// Considered populated iff at least one of street, city, state, or postal
/// code is non-empty.
pub fn primary_address_draft(detail: &RemoteContact) -> Option<AddressDraft> {
    let clean = |s: &Option<String>| {
        s.as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let street_address = clean(&detail.address1);
    let city = clean(&detail.city);
    let state = clean(&detail.state);
    let postal_code = clean(&detail.postal_code);

    if street_address.is_none() && city.is_none() && state.is_none() && postal_code.is_none() {
        return None;
    }

    Some(AddressDraft {
        slot_id: PRIMARY_ADDRESS_SLOT.to_string(),
        name: Some("Address 0".to_string()),
        position: 0,
        street_address,
        city,
        state,
        postal_code,
        ..Default::default()
    })
}

/// Full child-draft set for one contact detail record: the primary address
/// followed by the demultiplexed custom-field addresses, in slot order.
pub fn address_drafts(
    detail: &RemoteContact,
    catalog: &CustomFieldCatalog,
    slots: &SlotIndex,
) -> Vec<AddressDraft> {
    let mut drafts = Vec::new();
    if let Some(primary) = primary_address_draft(detail) {
        drafts.push(primary);
    }
    for (position, (slot_id, fields)) in demux_address_fields(&detail.custom_fields, catalog, slots)
    {
        drafts.push(draft_from_fields(slot_id, position, &fields));
    }
    drafts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::CustomFieldMeta;
    use serde_json::json;

    const SLOT_1: &str = "QmYk134LkK2hownvL1sE";
    const SLOT_2: &str = "6K2aY5ghsAeCNhNJBcTt";

    fn catalog(entries: &[(&str, &str, &str)]) -> CustomFieldCatalog {
        entries
            .iter()
            .map(|(id, key, parent)| {
                (
                    id.to_string(),
                    CustomFieldMeta {
                        name: None,
                        field_key: Some(key.to_string()),
                        parent_id: Some(parent.to_string()),
                    },
                )
            })
            .collect()
    }

    fn field(id: &str, value: Value) -> CustomFieldValue {
        CustomFieldValue {
            id: Some(id.to_string()),
            value,
        }
    }

    #[test]
    fn strips_namespace_and_index_suffix() {
        assert_eq!(logical_key("contact.street_address_2"), "street_address");
        assert_eq!(logical_key("contact.city_10"), "city");
        assert_eq!(logical_key("contact.gate_code"), "gate_code");
        assert_eq!(logical_key("street_address"), "street_address");
        // A trailing underscore segment that is not all digits stays.
        assert_eq!(logical_key("contact.property_type"), "property_type");
    }

    #[test]
    fn groups_fields_by_slot() {
        let catalog = catalog(&[
            ("f-street", "contact.street_address_1", SLOT_1),
            ("f-city", "contact.city_1", SLOT_1),
            ("f-street2", "contact.street_address_2", SLOT_2),
        ]);
        let fields = vec![
            field("f-street", json!("12 Elm St")),
            field("f-city", json!("Springfield")),
            field("f-street2", json!("9 Oak Ave")),
        ];
        let drafts = address_drafts(
            &RemoteContact {
                custom_fields: fields,
                ..Default::default()
            },
            &catalog,
            &SlotIndex::builtin(),
        );
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].position, 1);
        assert_eq!(drafts[0].street_address.as_deref(), Some("12 Elm St"));
        assert_eq!(drafts[0].city.as_deref(), Some("Springfield"));
        assert_eq!(drafts[1].position, 2);
        assert_eq!(drafts[1].street_address.as_deref(), Some("9 Oak Ave"));
    }

    #[test]
    fn later_value_wins_on_key_collision() {
        let catalog = catalog(&[
            ("f-a", "contact.street_address_1", SLOT_1),
            ("f-b", "contact.street_address_1", SLOT_1),
        ]);
        let fields = vec![
            field("f-a", json!("first write")),
            field("f-b", json!("second write")),
        ];
        let grouped = demux_address_fields(&fields, &catalog, &SlotIndex::builtin());
        let (_, slot_fields) = grouped.get(&1).expect("slot 1 populated");
        assert_eq!(slot_fields["street_address"], json!("second write"));
    }

    #[test]
    fn unknown_slot_or_field_is_discarded() {
        let catalog = catalog(&[
            ("f-known", "contact.city_1", SLOT_1),
            ("f-orphan", "contact.city_3", "not-a-configured-folder"),
        ]);
        let fields = vec![
            field("f-known", json!("Springfield")),
            field("f-orphan", json!("Shelbyville")),
            field("f-unlisted", json!("ignored")),
        ];
        let grouped = demux_address_fields(&fields, &catalog, &SlotIndex::builtin());
        assert_eq!(grouped.len(), 1);
        assert!(grouped.contains_key(&1));
    }

    #[test]
    fn empty_slots_are_not_materialized() {
        let catalog = catalog(&[("f-null", "contact.city_1", SLOT_1)]);
        let fields = vec![field("f-null", Value::Null)];
        let grouped = demux_address_fields(&fields, &catalog, &SlotIndex::builtin());
        assert!(grouped.is_empty());
    }

    #[test]
    fn integer_attributes_parse_leniently() {
        let catalog = catalog(&[
            ("f-floors", "contact.number_of_floors_1", SLOT_1),
            ("f-sqft", "contact.property_sqft_1", SLOT_1),
        ]);
        let fields = vec![
            field("f-floors", json!("2")),
            field("f-sqft", json!("lots")),
        ];
        let drafts = address_drafts(
            &RemoteContact {
                custom_fields: fields,
                ..Default::default()
            },
            &catalog,
            &SlotIndex::builtin(),
        );
        assert_eq!(drafts[0].number_of_floors, Some(2));
        assert_eq!(drafts[0].property_sqft, None);
    }

    #[test]
    fn primary_address_requires_one_core_attribute() {
        let empty = RemoteContact::default();
        assert!(primary_address_draft(&empty).is_none());

        let populated = RemoteContact {
            city: Some("Springfield".to_string()),
            ..Default::default()
        };
        let draft = primary_address_draft(&populated).expect("primary draft");
        assert_eq!(draft.slot_id, PRIMARY_ADDRESS_SLOT);
        assert_eq!(draft.position, 0);
        assert_eq!(draft.city.as_deref(), Some("Springfield"));
    }

    #[test]
    fn primary_slot_never_fed_from_custom_fields() {
        let catalog = catalog(&[("f-street", "contact.street_address", PRIMARY_ADDRESS_SLOT)]);
        let fields = vec![field("f-street", json!("should be ignored"))];
        let grouped = demux_address_fields(&fields, &catalog, &SlotIndex::builtin());
        assert!(grouped.is_empty());
    }
}
