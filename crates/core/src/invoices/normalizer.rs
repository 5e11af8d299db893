//! Raw-invoice normalization.
//!
//! Invoice payloads are the messiest the CRM produces: monetary fields arrive
//! as numbers or strings, several totals are duplicated between top-level
//! fields and the `totalSummary` blob, and dates may be date-only. Every
//! coercion here is total; a malformed field degrades to its documented
//! default instead of dropping the invoice.

use rust_decimal::Decimal;

use crate::remote::{RemoteInvoice, RemoteInvoiceItem};
use crate::utils::coerce::{parse_datetime_flexible, parse_decimal};

use super::model::{InvoiceDraft, InvoiceItemDraft};

const DEFAULT_CURRENCY: &str = "USD";
const DEFAULT_CURRENCY_SYMBOL: &str = "$";

/// Normalize one raw invoice record. Returns `None` when the record carries
/// no remote id.
pub fn invoice_draft(record: &RemoteInvoice, location_id: &str) -> Option<InvoiceDraft> {
    let id = record.id.as_deref()?.trim();
    if id.is_empty() {
        return None;
    }

    let contact = record.contact_details.as_ref();
    let discount = record.discount.as_ref();
    let sent_from = record.sent_from.as_ref();

    // Sub-total and discount live in two places depending on the endpoint;
    // the summary blob wins when present. An explicit JSON null does not
    // count as present and falls through to the next source.
    let sub_total = parse_decimal(
        record
            .total_summary_field("subTotal")
            .filter(|v| !v.is_null())
            .or(record.sub_total.as_ref()),
        Decimal::ZERO,
    );
    let discount_value = parse_decimal(
        discount
            .and_then(|d| d.value.as_ref())
            .filter(|v| !v.is_null())
            .or_else(|| record.total_summary_field("discount")),
        Decimal::ZERO,
    );
    let tax_total = parse_decimal(record.total_summary_field("tax"), Decimal::ZERO);

    let contact_id = contact
        .and_then(|c| c.id.as_deref().or(c.legacy_id.as_deref()))
        .unwrap_or_default()
        .to_string();

    let currency_symbol = record
        .currency_options
        .as_ref()
        .and_then(|o| o.get("symbol"))
        .and_then(|s| s.as_str())
        .unwrap_or(DEFAULT_CURRENCY_SYMBOL)
        .to_string();

    let items = record
        .invoice_items
        .iter()
        .enumerate()
        .filter_map(|(position, item)| item_draft(item, position as i32))
        .collect();

    Some(InvoiceDraft {
        id: id.to_string(),
        location_id: location_id.to_string(),
        invoice_number: record.invoice_number.as_ref().map(|n| match n {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }),
        alt_id: record.alt_id.clone(),
        alt_type: record.alt_type.clone(),
        company_id: record.company_id.clone(),
        name: record.name.clone().unwrap_or_default(),
        title: record.title.clone().unwrap_or_else(|| "INVOICE".to_string()),
        status: record.status.clone().unwrap_or_else(|| "draft".to_string()),
        live_mode: record.live_mode.unwrap_or(true),
        contact_id,
        contact_name: contact.and_then(|c| c.name.clone()),
        contact_email: contact.and_then(|c| c.email.clone()),
        contact_phone: contact.and_then(|c| c.phone_no.clone()),
        currency: record
            .currency
            .clone()
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        currency_symbol,
        sub_total,
        discount_value,
        discount_type: discount
            .and_then(|d| d.kind.clone())
            .unwrap_or_else(|| "fixed".to_string()),
        total: parse_decimal(record.total.as_ref(), Decimal::ZERO),
        amount_paid: parse_decimal(record.amount_paid.as_ref(), Decimal::ZERO),
        amount_due: parse_decimal(record.amount_due.as_ref(), Decimal::ZERO),
        tax_total,
        issue_date: parse_datetime_flexible(record.issue_date.as_ref()),
        due_date: parse_datetime_flexible(record.due_date.as_ref()),
        sent_at: parse_datetime_flexible(record.sent_at.as_ref()),
        created_at: parse_datetime_flexible(record.created_at.as_ref()),
        updated_at: parse_datetime_flexible(record.updated_at.as_ref()),
        sent_from_name: sent_from.and_then(|s| s.from_name.clone()),
        sent_from_email: sent_from.and_then(|s| s.from_email.clone()),
        terms_notes: record.terms_notes.clone().unwrap_or_default(),
        attachments: record.attachments.clone(),
        payment_schedule: record.payment_schedule.clone(),
        total_summary: record.total_summary.clone(),
        items,
    })
}

/// Normalize one line item. Items without a remote id are dropped silently;
/// a malformed item must not abort its parent invoice.
fn item_draft(item: &RemoteInvoiceItem, position: i32) -> Option<InvoiceItemDraft> {
    let item_id = item.id.as_deref()?.trim();
    if item_id.is_empty() {
        return None;
    }

    Some(InvoiceItemDraft {
        item_id: item_id.to_string(),
        product_id: item.product_id.clone(),
        price_id: item.price_id.clone(),
        name: item
            .name
            .clone()
            .or_else(|| item.title.clone())
            .unwrap_or_default(),
        description: item.description.clone().unwrap_or_default(),
        currency: item
            .currency
            .clone()
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        qty: parse_decimal(item.qty.as_ref(), Decimal::ONE),
        amount: parse_decimal(item.amount.as_ref(), Decimal::ZERO),
        tax_inclusive: item.tax_inclusive.unwrap_or(false),
        taxes: item.taxes.clone(),
        position,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn invoice_json(body: &str) -> RemoteInvoice {
        serde_json::from_str(body).expect("parse invoice")
    }

    #[test]
    fn draft_requires_remote_id() {
        assert!(invoice_draft(&invoice_json(r#"{"status": "sent"}"#), "loc-1").is_none());
        assert!(invoice_draft(&invoice_json(r#"{"_id": "  "}"#), "loc-1").is_none());
    }

    #[test]
    fn summary_blob_wins_over_top_level_totals() {
        let record = invoice_json(
            r#"{
                "_id": "inv-1",
                "subTotal": "100.00",
                "totalSummary": {"subTotal": "95.00", "tax": "5.25", "discount": 10}
            }"#,
        );
        let draft = invoice_draft(&record, "loc-1").expect("draft");
        assert_eq!(draft.sub_total, dec!(95.00));
        assert_eq!(draft.tax_total, dec!(5.25));
        assert_eq!(draft.discount_value, dec!(10));
    }

    #[test]
    fn null_in_summary_falls_back_to_top_level() {
        let record = invoice_json(
            r#"{
                "_id": "inv-1",
                "subTotal": "100.00",
                "totalSummary": {"subTotal": null}
            }"#,
        );
        let draft = invoice_draft(&record, "loc-1").expect("draft");
        assert_eq!(draft.sub_total, dec!(100.00));
    }

    #[test]
    fn null_discount_value_falls_back_to_summary() {
        let record = invoice_json(
            r#"{
                "_id": "inv-1",
                "discount": {"value": null, "type": "fixed"},
                "totalSummary": {"discount": "2.50"}
            }"#,
        );
        let draft = invoice_draft(&record, "loc-1").expect("draft");
        assert_eq!(draft.discount_value, dec!(2.50));
    }

    #[test]
    fn discount_block_wins_over_summary() {
        let record = invoice_json(
            r#"{
                "_id": "inv-1",
                "discount": {"value": "7.50", "type": "percentage"},
                "totalSummary": {"discount": 10}
            }"#,
        );
        let draft = invoice_draft(&record, "loc-1").expect("draft");
        assert_eq!(draft.discount_value, dec!(7.50));
        assert_eq!(draft.discount_type, "percentage");
    }

    #[test]
    fn malformed_money_degrades_to_defaults() {
        let record = invoice_json(
            r#"{
                "_id": "inv-1",
                "total": "a lot",
                "invoiceItems": [{"_id": "it-1", "qty": "several", "amount": null}]
            }"#,
        );
        let draft = invoice_draft(&record, "loc-1").expect("draft");
        assert_eq!(draft.total, Decimal::ZERO);
        assert_eq!(draft.items[0].qty, Decimal::ONE);
        assert_eq!(draft.items[0].amount, Decimal::ZERO);
    }

    #[test]
    fn items_without_id_are_dropped() {
        let record = invoice_json(
            r#"{
                "_id": "inv-1",
                "invoiceItems": [
                    {"_id": "it-1", "name": "Service call"},
                    {"name": "anonymous"},
                    {"_id": "it-2", "title": "Fallback name"}
                ]
            }"#,
        );
        let draft = invoice_draft(&record, "loc-1").expect("draft");
        assert_eq!(draft.items.len(), 2);
        assert_eq!(draft.items[0].position, 0);
        assert_eq!(draft.items[1].item_id, "it-2");
        assert_eq!(draft.items[1].name, "Fallback name");
        // Position reflects remote order, including skipped slots.
        assert_eq!(draft.items[1].position, 2);
    }

    #[test]
    fn contact_id_falls_back_to_legacy_field() {
        let record = invoice_json(
            r#"{"_id": "inv-1", "contactDetails": {"_id": "c-legacy", "name": "Ada"}}"#,
        );
        let draft = invoice_draft(&record, "loc-1").expect("draft");
        assert_eq!(draft.contact_id, "c-legacy");
        assert_eq!(draft.contact_name.as_deref(), Some("Ada"));
    }

    #[test]
    fn invoice_number_is_stringified() {
        let record = invoice_json(r#"{"_id": "inv-1", "invoiceNumber": 1042}"#);
        let draft = invoice_draft(&record, "loc-1").expect("draft");
        assert_eq!(draft.invoice_number.as_deref(), Some("1042"));
        assert_eq!(draft.title, "INVOICE");
        assert_eq!(draft.status, "draft");
        assert!(draft.live_mode);
        assert_eq!(draft.currency, "USD");
        assert_eq!(draft.currency_symbol, "$");
    }
}
