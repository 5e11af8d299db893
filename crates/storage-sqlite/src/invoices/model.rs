//! Database models for mirrored invoices and line items.

use diesel::prelude::*;

use leadmirror_core::invoices::{Invoice, InvoiceDraft, InvoiceItemDraft};

use crate::convert::{
    datetime_from_db, datetime_to_db, decimal_from_db, decimal_to_db, json_list_from_db,
    json_list_to_db, json_opt_from_db, json_opt_to_db,
};

/// Mirror row for one invoice. Updates write every column.
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone,
)]
#[diesel(table_name = crate::schema::invoices)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InvoiceDB {
    pub id: String,
    pub location_id: String,
    pub invoice_number: Option<String>,
    pub alt_id: Option<String>,
    pub alt_type: Option<String>,
    pub company_id: Option<String>,
    pub name: String,
    pub title: String,
    pub status: String,
    pub live_mode: bool,
    pub contact_id: String,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub currency: String,
    pub currency_symbol: String,
    pub sub_total: String,
    pub discount_value: String,
    pub discount_type: String,
    pub total: String,
    pub amount_paid: String,
    pub amount_due: String,
    pub tax_total: String,
    pub issue_date: Option<String>,
    pub due_date: Option<String>,
    pub sent_at: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub sent_from_name: Option<String>,
    pub sent_from_email: Option<String>,
    pub terms_notes: String,
    pub attachments: String,
    pub payment_schedule: Option<String>,
    pub total_summary: Option<String>,
    pub synced_at: Option<String>,
}

impl InvoiceDB {
    pub fn from_draft(draft: &InvoiceDraft, synced_at: &str) -> Self {
        Self {
            id: draft.id.clone(),
            location_id: draft.location_id.clone(),
            invoice_number: draft.invoice_number.clone(),
            alt_id: draft.alt_id.clone(),
            alt_type: draft.alt_type.clone(),
            company_id: draft.company_id.clone(),
            name: draft.name.clone(),
            title: draft.title.clone(),
            status: draft.status.clone(),
            live_mode: draft.live_mode,
            contact_id: draft.contact_id.clone(),
            contact_name: draft.contact_name.clone(),
            contact_email: draft.contact_email.clone(),
            contact_phone: draft.contact_phone.clone(),
            currency: draft.currency.clone(),
            currency_symbol: draft.currency_symbol.clone(),
            sub_total: decimal_to_db(draft.sub_total),
            discount_value: decimal_to_db(draft.discount_value),
            discount_type: draft.discount_type.clone(),
            total: decimal_to_db(draft.total),
            amount_paid: decimal_to_db(draft.amount_paid),
            amount_due: decimal_to_db(draft.amount_due),
            tax_total: decimal_to_db(draft.tax_total),
            issue_date: datetime_to_db(draft.issue_date),
            due_date: datetime_to_db(draft.due_date),
            sent_at: datetime_to_db(draft.sent_at),
            created_at: datetime_to_db(draft.created_at),
            updated_at: datetime_to_db(draft.updated_at),
            sent_from_name: draft.sent_from_name.clone(),
            sent_from_email: draft.sent_from_email.clone(),
            terms_notes: draft.terms_notes.clone(),
            attachments: json_list_to_db(&draft.attachments),
            payment_schedule: json_opt_to_db(&draft.payment_schedule),
            total_summary: json_opt_to_db(&draft.total_summary),
            synced_at: Some(synced_at.to_string()),
        }
    }
}

impl From<InvoiceDB> for Invoice {
    fn from(db: InvoiceDB) -> Self {
        Invoice {
            id: db.id,
            location_id: db.location_id,
            invoice_number: db.invoice_number,
            alt_id: db.alt_id,
            alt_type: db.alt_type,
            company_id: db.company_id,
            name: db.name,
            title: db.title,
            status: db.status,
            live_mode: db.live_mode,
            contact_id: db.contact_id,
            contact_name: db.contact_name,
            contact_email: db.contact_email,
            contact_phone: db.contact_phone,
            currency: db.currency,
            currency_symbol: db.currency_symbol,
            sub_total: decimal_from_db(&db.sub_total),
            discount_value: decimal_from_db(&db.discount_value),
            discount_type: db.discount_type,
            total: decimal_from_db(&db.total),
            amount_paid: decimal_from_db(&db.amount_paid),
            amount_due: decimal_from_db(&db.amount_due),
            tax_total: decimal_from_db(&db.tax_total),
            issue_date: datetime_from_db(db.issue_date.as_deref()),
            due_date: datetime_from_db(db.due_date.as_deref()),
            sent_at: datetime_from_db(db.sent_at.as_deref()),
            created_at: datetime_from_db(db.created_at.as_deref()),
            updated_at: datetime_from_db(db.updated_at.as_deref()),
            sent_from_name: db.sent_from_name,
            sent_from_email: db.sent_from_email,
            terms_notes: db.terms_notes,
            attachments: json_list_from_db(&db.attachments),
            payment_schedule: json_opt_from_db(db.payment_schedule.as_deref()),
            total_summary: json_opt_from_db(db.total_summary.as_deref()),
            synced_at: datetime_from_db(db.synced_at.as_deref()),
        }
    }
}

/// Child row for one invoice line item.
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone,
)]
#[diesel(table_name = crate::schema::invoice_items)]
#[diesel(primary_key(invoice_id, item_id))]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InvoiceItemDB {
    pub invoice_id: String,
    pub item_id: String,
    pub product_id: Option<String>,
    pub price_id: Option<String>,
    pub name: String,
    pub description: String,
    pub currency: String,
    pub qty: String,
    pub amount: String,
    pub tax_inclusive: bool,
    pub taxes: String,
    pub position: i32,
}

impl InvoiceItemDB {
    pub fn from_draft(invoice_id: &str, draft: &InvoiceItemDraft) -> Self {
        Self {
            invoice_id: invoice_id.to_string(),
            item_id: draft.item_id.clone(),
            product_id: draft.product_id.clone(),
            price_id: draft.price_id.clone(),
            name: draft.name.clone(),
            description: draft.description.clone(),
            currency: draft.currency.clone(),
            qty: decimal_to_db(draft.qty),
            amount: decimal_to_db(draft.amount),
            tax_inclusive: draft.tax_inclusive,
            taxes: json_list_to_db(&draft.taxes),
            position: draft.position,
        }
    }
}

impl From<InvoiceItemDB> for InvoiceItemDraft {
    fn from(db: InvoiceItemDB) -> Self {
        InvoiceItemDraft {
            item_id: db.item_id,
            product_id: db.product_id,
            price_id: db.price_id,
            name: db.name,
            description: db.description,
            currency: db.currency,
            qty: decimal_from_db(&db.qty),
            amount: decimal_from_db(&db.amount),
            tax_inclusive: db.tax_inclusive,
            taxes: json_list_from_db(&db.taxes),
            position: db.position,
        }
    }
}
