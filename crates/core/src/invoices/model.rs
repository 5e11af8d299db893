//! Invoice and line-item models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A mirrored invoice row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
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
    pub sub_total: Decimal,
    pub discount_value: Decimal,
    pub discount_type: String,
    pub total: Decimal,
    pub amount_paid: Decimal,
    pub amount_due: Decimal,
    pub tax_total: Decimal,
    pub issue_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub sent_from_name: Option<String>,
    pub sent_from_email: Option<String>,
    pub terms_notes: String,
    pub attachments: Vec<Value>,
    pub payment_schedule: Option<Value>,
    pub total_summary: Option<Value>,
    pub synced_at: Option<DateTime<Utc>>,
}

/// Normalized invoice attributes plus the full drafted line-item set.
///
/// The item set travels with the parent so the store can replace children
/// inside the same transaction as the parent upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDraft {
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
    pub sub_total: Decimal,
    pub discount_value: Decimal,
    pub discount_type: String,
    pub total: Decimal,
    pub amount_paid: Decimal,
    pub amount_due: Decimal,
    pub tax_total: Decimal,
    pub issue_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub sent_from_name: Option<String>,
    pub sent_from_email: Option<String>,
    pub terms_notes: String,
    pub attachments: Vec<Value>,
    pub payment_schedule: Option<Value>,
    pub total_summary: Option<Value>,
    pub items: Vec<InvoiceItemDraft>,
}

/// A drafted line item, identified by `item_id` within its parent invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItemDraft {
    pub item_id: String,
    pub product_id: Option<String>,
    pub price_id: Option<String>,
    pub name: String,
    pub description: String,
    pub currency: String,
    pub qty: Decimal,
    pub amount: Decimal,
    pub tax_inclusive: bool,
    pub taxes: Vec<Value>,
    pub position: i32,
}
