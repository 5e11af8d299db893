//! Database models for mirrored contacts and addresses.

use chrono::Utc;
use diesel::prelude::*;

use leadmirror_core::contacts::{AddressDraft, Contact, ContactDraft};

use crate::convert::{datetime_from_db, datetime_to_db, json_list_from_db, json_list_to_db};

/// Mirror row for one contact. Updates write every column so a remote edit
/// that blanks a field blanks it locally too.
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone,
)]
#[diesel(table_name = crate::schema::contacts)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ContactDB {
    pub id: String,
    pub location_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub dnd: bool,
    pub country: Option<String>,
    pub date_added: Option<String>,
    pub tags: String,
    pub custom_fields: String,
    pub synced_at: Option<String>,
}

impl ContactDB {
    pub fn from_draft(draft: &ContactDraft, synced_at: &str) -> Self {
        Self {
            id: draft.id.clone(),
            location_id: draft.location_id.clone(),
            first_name: draft.first_name.clone(),
            last_name: draft.last_name.clone(),
            email: draft.email.clone(),
            phone: draft.phone.clone(),
            dnd: draft.dnd,
            country: draft.country.clone(),
            date_added: datetime_to_db(draft.date_added),
            tags: json_list_to_db(&draft.tags),
            custom_fields: json_list_to_db(&draft.custom_fields),
            synced_at: Some(synced_at.to_string()),
        }
    }
}

impl From<ContactDB> for Contact {
    fn from(db: ContactDB) -> Self {
        Contact {
            id: db.id,
            location_id: db.location_id,
            first_name: db.first_name,
            last_name: db.last_name,
            email: db.email,
            phone: db.phone,
            dnd: db.dnd,
            country: db.country,
            date_added: datetime_from_db(db.date_added.as_deref()),
            tags: json_list_from_db(&db.tags),
            custom_fields: json_list_from_db(&db.custom_fields),
            synced_at: datetime_from_db(db.synced_at.as_deref()),
        }
    }
}

/// Child row for one address slot of a contact.
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone,
)]
#[diesel(table_name = crate::schema::addresses)]
#[diesel(primary_key(contact_id, slot_id))]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AddressDB {
    pub contact_id: String,
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

impl AddressDB {
    pub fn from_draft(contact_id: &str, draft: &AddressDraft) -> Self {
        Self {
            contact_id: contact_id.to_string(),
            slot_id: draft.slot_id.clone(),
            name: draft.name.clone(),
            position: draft.position,
            street_address: draft.street_address.clone(),
            city: draft.city.clone(),
            state: draft.state.clone(),
            postal_code: draft.postal_code.clone(),
            gate_code: draft.gate_code.clone(),
            number_of_floors: draft.number_of_floors,
            property_sqft: draft.property_sqft,
            property_type: draft.property_type.clone(),
        }
    }
}

impl From<AddressDB> for AddressDraft {
    fn from(db: AddressDB) -> Self {
        AddressDraft {
            slot_id: db.slot_id,
            name: db.name,
            position: db.position,
            street_address: db.street_address,
            city: db.city,
            state: db.state,
            postal_code: db.postal_code,
            gate_code: db.gate_code,
            number_of_floors: db.number_of_floors,
            property_sqft: db.property_sqft,
            property_type: db.property_type,
        }
    }
}

pub(crate) fn now_stamp() -> String {
    Utc::now().to_rfc3339()
}
