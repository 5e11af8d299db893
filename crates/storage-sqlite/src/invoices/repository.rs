//! Repository for mirrored invoices and their line items.
//!
//! Remote line-item ids are not stable across edits, so every touched
//! invoice gets its item set deleted and recreated rather than diffed.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;

use leadmirror_core::invoices::{Invoice, InvoiceDraft, InvoiceItemDraft};
use leadmirror_core::sync::{InvoiceStore, SyncPlan, SyncReport};
use leadmirror_core::Result;

use crate::contacts::model::now_stamp;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{invoice_items, invoices};

use super::model::{InvoiceDB, InvoiceItemDB};

pub struct InvoiceRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl InvoiceRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        InvoiceRepository { pool, writer }
    }

    pub fn get_invoice_impl(&self, invoice_id: &str) -> Result<Option<Invoice>> {
        let mut conn = get_connection(&self.pool)?;
        let row = invoices::table
            .find(invoice_id)
            .first::<InvoiceDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(Invoice::from))
    }

    /// Line items of one invoice in remote order.
    pub fn list_items_impl(&self, invoice_id: &str) -> Result<Vec<InvoiceItemDraft>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = invoice_items::table
            .filter(invoice_items::invoice_id.eq(invoice_id))
            .order(invoice_items::position.asc())
            .load::<InvoiceItemDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(InvoiceItemDraft::from).collect())
    }
}

/// Replace the item sets of every invoice in `drafts`. Runs inside the
/// caller's transaction.
fn replace_items(conn: &mut SqliteConnection, drafts: &[InvoiceDraft]) -> Result<()> {
    let touched: Vec<&str> = drafts.iter().map(|d| d.id.as_str()).collect();
    if touched.is_empty() {
        return Ok(());
    }

    diesel::delete(invoice_items::table.filter(invoice_items::invoice_id.eq_any(&touched)))
        .execute(conn)
        .map_err(StorageError::from)?;

    let rows: Vec<InvoiceItemDB> = drafts
        .iter()
        .flat_map(|draft| {
            draft
                .items
                .iter()
                .map(|item| InvoiceItemDB::from_draft(&draft.id, item))
        })
        .collect();
    if rows.is_empty() {
        return Ok(());
    }
    // Defends the composite key against a remote payload repeating an item
    // id within one invoice.
    diesel::insert_or_ignore_into(invoice_items::table)
        .values(&rows)
        .execute(conn)
        .map_err(StorageError::from)?;
    Ok(())
}

#[async_trait]
impl InvoiceStore for InvoiceRepository {
    async fn list_invoice_ids(&self, location_id: &str) -> Result<HashSet<String>> {
        let mut conn = get_connection(&self.pool)?;
        let ids = invoices::table
            .filter(invoices::location_id.eq(location_id))
            .select(invoices::id)
            .load::<String>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(ids.into_iter().collect())
    }

    async fn apply_invoices(
        &self,
        location_id: &str,
        plan: SyncPlan<InvoiceDraft>,
    ) -> Result<SyncReport> {
        let location = location_id.to_string();
        self.writer
            .exec(move |conn| {
                let now = now_stamp();

                let new_rows: Vec<InvoiceDB> = plan
                    .to_create
                    .iter()
                    .map(|draft| InvoiceDB::from_draft(draft, &now))
                    .collect();
                let created = if new_rows.is_empty() {
                    0
                } else {
                    diesel::insert_or_ignore_into(invoices::table)
                        .values(&new_rows)
                        .execute(conn)
                        .map_err(StorageError::from)?
                };

                let mut updated = 0;
                for draft in &plan.to_update {
                    let row = InvoiceDB::from_draft(draft, &now);
                    updated += diesel::update(invoices::table.find(&draft.id))
                        .set(&row)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }

                replace_items(conn, &plan.to_create)?;
                replace_items(conn, &plan.to_update)?;

                // Stale parents cascade to their items.
                let deleted = if plan.stale_ids.is_empty() {
                    0
                } else {
                    diesel::delete(
                        invoices::table
                            .filter(invoices::location_id.eq(&location))
                            .filter(invoices::id.eq_any(&plan.stale_ids)),
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

    async fn upsert_invoice(&self, draft: InvoiceDraft) -> Result<bool> {
        self.writer
            .exec(move |conn| {
                let now = now_stamp();
                let row = InvoiceDB::from_draft(&draft, &now);
                let exists: i64 = invoices::table
                    .filter(invoices::id.eq(&draft.id))
                    .count()
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                let created = if exists > 0 {
                    diesel::update(invoices::table.find(&draft.id))
                        .set(&row)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                    false
                } else {
                    diesel::insert_into(invoices::table)
                        .values(&row)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                    true
                };

                replace_items(conn, std::slice::from_ref(&draft))?;
                Ok(created)
            })
            .await
    }

    async fn delete_invoice(&self, location_id: &str, invoice_id: &str) -> Result<usize> {
        let location = location_id.to_string();
        let invoice = invoice_id.to_string();
        self.writer
            .exec(move |conn| {
                let deleted = diesel::delete(
                    invoices::table
                        .filter(invoices::location_id.eq(&location))
                        .filter(invoices::id.eq(&invoice)),
                )
                .execute(conn)
                .map_err(StorageError::from)?;
                Ok(deleted)
            })
            .await
    }
}
