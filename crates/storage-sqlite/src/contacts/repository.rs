//! Repository for mirrored contacts and their address children.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;

use leadmirror_core::contacts::{AddressDraft, Contact, ContactDraft};
use leadmirror_core::sync::{ContactStore, SyncPlan, SyncReport};
use leadmirror_core::Result;

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{addresses, contacts};

use super::model::{now_stamp, AddressDB, ContactDB};

pub struct ContactRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl ContactRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        ContactRepository { pool, writer }
    }

    pub fn get_contact_impl(&self, contact_id: &str) -> Result<Option<Contact>> {
        let mut conn = get_connection(&self.pool)?;
        let row = contacts::table
            .find(contact_id)
            .first::<ContactDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(Contact::from))
    }

    /// Addresses of one contact in slot order.
    pub fn list_addresses_impl(&self, contact_id: &str) -> Result<Vec<AddressDraft>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = addresses::table
            .filter(addresses::contact_id.eq(contact_id))
            .order(addresses::position.asc())
            .load::<AddressDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(AddressDraft::from).collect())
    }
}

#[async_trait]
impl ContactStore for ContactRepository {
    async fn list_contact_ids(&self, location_id: &str) -> Result<HashSet<String>> {
        let mut conn = get_connection(&self.pool)?;
        let ids = contacts::table
            .filter(contacts::location_id.eq(location_id))
            .select(contacts::id)
            .load::<String>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(ids.into_iter().collect())
    }

    async fn apply_contacts(
        &self,
        location_id: &str,
        plan: SyncPlan<ContactDraft>,
    ) -> Result<SyncReport> {
        let location = location_id.to_string();
        self.writer
            .exec(move |conn| {
                let now = now_stamp();

                let new_rows: Vec<ContactDB> = plan
                    .to_create
                    .iter()
                    .map(|draft| ContactDB::from_draft(draft, &now))
                    .collect();
                let created = if new_rows.is_empty() {
                    0
                } else {
                    diesel::insert_or_ignore_into(contacts::table)
                        .values(&new_rows)
                        .execute(conn)
                        .map_err(StorageError::from)?
                };

                let mut updated = 0;
                for draft in &plan.to_update {
                    let row = ContactDB::from_draft(draft, &now);
                    updated += diesel::update(contacts::table.find(&draft.id))
                        .set(&row)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }

                let deleted = if plan.stale_ids.is_empty() {
                    0
                } else {
                    diesel::delete(
                        contacts::table
                            .filter(contacts::location_id.eq(&location))
                            .filter(contacts::id.eq_any(&plan.stale_ids)),
                    )
                    .execute(conn)
                    .map_err(StorageError::from)?
                };

                Ok(SyncReport {
                    total: created + updated,
                    created,
                    updated,
                    deleted,
                    truncated: false,
                })
            })
            .await
    }

    async fn upsert_contact(&self, draft: ContactDraft) -> Result<bool> {
        self.writer
            .exec(move |conn| {
                let now = now_stamp();
                let row = ContactDB::from_draft(&draft, &now);
                let exists: i64 = contacts::table
                    .filter(contacts::id.eq(&draft.id))
                    .count()
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                if exists > 0 {
                    diesel::update(contacts::table.find(&draft.id))
                        .set(&row)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                    Ok(false)
                } else {
                    diesel::insert_into(contacts::table)
                        .values(&row)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                    Ok(true)
                }
            })
            .await
    }

    async fn replace_addresses(
        &self,
        contact_id: &str,
        drafts: Vec<AddressDraft>,
    ) -> Result<usize> {
        let contact = contact_id.to_string();
        self.writer
            .exec(move |conn| {
                let parent: i64 = contacts::table
                    .filter(contacts::id.eq(&contact))
                    .count()
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                // Orphan address rows would violate the parent-driven
                // child invariant; skip quietly.
                if parent == 0 {
                    return Ok(0);
                }

                diesel::delete(addresses::table.filter(addresses::contact_id.eq(&contact)))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                let rows: Vec<AddressDB> = drafts
                    .iter()
                    .filter(|draft| !draft.slot_id.trim().is_empty())
                    .map(|draft| AddressDB::from_draft(&contact, draft))
                    .collect();
                if rows.is_empty() {
                    return Ok(0);
                }
                let inserted = diesel::insert_into(addresses::table)
                    .values(&rows)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(inserted)
            })
            .await
    }

    async fn delete_contact(&self, location_id: &str, contact_id: &str) -> Result<usize> {
        let location = location_id.to_string();
        let contact = contact_id.to_string();
        self.writer
            .exec(move |conn| {
                let deleted = diesel::delete(
                    contacts::table
                        .filter(contacts::location_id.eq(&location))
                        .filter(contacts::id.eq(&contact)),
                )
                .execute(conn)
                .map_err(StorageError::from)?;
                Ok(deleted)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use serde_json::json;
    use tempfile::TempDir;

    fn repo() -> (TempDir, ContactRepository) {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("contacts.db");
        let pool = db::init(path.to_str().expect("utf8 path")).expect("init db");
        let writer = db::spawn_writer(pool.clone());
        (dir, ContactRepository::new(pool, writer))
    }

    fn draft(id: &str, location: &str) -> ContactDraft {
        ContactDraft {
            id: id.to_string(),
            location_id: location.to_string(),
            first_name: Some("Ada".to_string()),
            last_name: None,
            email: None,
            phone: None,
            dnd: false,
            country: None,
            date_added: None,
            tags: vec![json!("vip")],
            custom_fields: Vec::new(),
        }
    }

    fn address(slot: &str, position: i32) -> AddressDraft {
        AddressDraft {
            slot_id: slot.to_string(),
            name: Some(format!("Address {position}")),
            position,
            street_address: Some("12 Elm St".to_string()),
            ..Default::default()
        }
    }

    fn plan_for(
        drafts: Vec<ContactDraft>,
        existing: &HashSet<String>,
    ) -> SyncPlan<ContactDraft> {
        leadmirror_core::sync::partition(drafts, existing, |d| d.id.as_str())
    }

    #[tokio::test]
    async fn apply_mirrors_the_fetched_set() {
        let (_dir, repo) = repo();
        let existing = repo.list_contact_ids("loc-1").await.expect("ids");
        let report = repo
            .apply_contacts(
                "loc-1",
                plan_for(vec![draft("c-1", "loc-1"), draft("c-2", "loc-1")], &existing),
            )
            .await
            .expect("apply");

        assert_eq!(report.created, 2);
        assert_eq!(report.deleted, 0);
        let ids = repo.list_contact_ids("loc-1").await.expect("ids");
        assert_eq!(ids.len(), 2);
    }

    #[tokio::test]
    async fn second_identical_pass_only_updates() {
        let (_dir, repo) = repo();
        let batch = || vec![draft("c-1", "loc-1"), draft("c-2", "loc-1")];

        let existing = repo.list_contact_ids("loc-1").await.expect("ids");
        repo.apply_contacts("loc-1", plan_for(batch(), &existing))
            .await
            .expect("first pass");

        let existing = repo.list_contact_ids("loc-1").await.expect("ids");
        let report = repo
            .apply_contacts("loc-1", plan_for(batch(), &existing))
            .await
            .expect("second pass");

        assert_eq!(report.created, 0);
        assert_eq!(report.updated, 2);
        assert_eq!(report.deleted, 0);
    }

    #[tokio::test]
    async fn update_overwrites_blanked_fields() {
        let (_dir, repo) = repo();
        let existing = repo.list_contact_ids("loc-1").await.expect("ids");
        repo.apply_contacts("loc-1", plan_for(vec![draft("c-1", "loc-1")], &existing))
            .await
            .expect("seed");

        let mut edited = draft("c-1", "loc-1");
        edited.first_name = None;
        edited.tags = Vec::new();
        let existing = repo.list_contact_ids("loc-1").await.expect("ids");
        repo.apply_contacts("loc-1", plan_for(vec![edited], &existing))
            .await
            .expect("update");

        let stored = repo
            .get_contact_impl("c-1")
            .expect("read")
            .expect("present");
        assert!(stored.first_name.is_none());
        assert!(stored.tags.is_empty());
        assert!(stored.synced_at.is_some());
    }

    #[tokio::test]
    async fn deletion_is_scoped_to_the_location() {
        let (_dir, repo) = repo();
        let existing = HashSet::new();
        repo.apply_contacts("loc-a", plan_for(vec![draft("c-a", "loc-a")], &existing))
            .await
            .expect("seed a");
        repo.apply_contacts("loc-b", plan_for(vec![draft("c-b", "loc-b")], &existing))
            .await
            .expect("seed b");

        // An empty fetch for loc-a deletes only loc-a rows.
        let existing_a = repo.list_contact_ids("loc-a").await.expect("ids");
        let report = repo
            .apply_contacts("loc-a", plan_for(Vec::new(), &existing_a))
            .await
            .expect("empty pass");

        assert_eq!(report.deleted, 1);
        assert!(repo.list_contact_ids("loc-a").await.expect("ids").is_empty());
        assert_eq!(repo.list_contact_ids("loc-b").await.expect("ids").len(), 1);
    }

    #[tokio::test]
    async fn replace_addresses_swaps_the_full_child_set() {
        let (_dir, repo) = repo();
        repo.upsert_contact(draft("c-1", "loc-1")).await.expect("parent");

        let inserted = repo
            .replace_addresses(
                "c-1",
                vec![address("address_0", 0), address("slot-a", 1), address("slot-b", 2)],
            )
            .await
            .expect("first set");
        assert_eq!(inserted, 3);

        let inserted = repo
            .replace_addresses("c-1", vec![address("slot-b", 2)])
            .await
            .expect("shrunk set");
        assert_eq!(inserted, 1);

        let stored = repo.list_addresses_impl("c-1").expect("addresses");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].slot_id, "slot-b");
    }

    #[tokio::test]
    async fn replace_addresses_without_parent_is_a_noop() {
        let (_dir, repo) = repo();
        let inserted = repo
            .replace_addresses("ghost", vec![address("address_0", 0)])
            .await
            .expect("no parent");
        assert_eq!(inserted, 0);
    }

    #[tokio::test]
    async fn blank_slot_ids_are_skipped() {
        let (_dir, repo) = repo();
        repo.upsert_contact(draft("c-1", "loc-1")).await.expect("parent");

        let inserted = repo
            .replace_addresses(
                "c-1",
                vec![address("", 0), address("slot-a", 1)],
            )
            .await
            .expect("insert");
        assert_eq!(inserted, 1);
    }

    #[tokio::test]
    async fn deleting_a_contact_cascades_to_addresses() {
        let (_dir, repo) = repo();
        repo.upsert_contact(draft("c-1", "loc-1")).await.expect("parent");
        repo.replace_addresses("c-1", vec![address("address_0", 0)])
            .await
            .expect("children");

        let deleted = repo.delete_contact("loc-1", "c-1").await.expect("delete");
        assert_eq!(deleted, 1);
        assert!(repo.list_addresses_impl("c-1").expect("addresses").is_empty());
    }

    #[tokio::test]
    async fn upsert_reports_create_then_update() {
        let (_dir, repo) = repo();
        assert!(repo.upsert_contact(draft("c-1", "loc-1")).await.expect("first"));
        assert!(!repo.upsert_contact(draft("c-1", "loc-1")).await.expect("second"));
    }
}
