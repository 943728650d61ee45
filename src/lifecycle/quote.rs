use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::config::ReminderConfig;
use crate::error::EngineError;
use crate::model::{
    Actor, HistoryEntry, Invoice, InvoiceStatus, InvoiceTimestamps, LaborLine, LineItem, Quote,
    QuoteStatus, QuoteTimestamps, ReminderState, Totals, WorkOrder, WorkOrderStatus,
    WorkOrderTimestamps, next_invoice_number,
};
use crate::validate;

use super::{labor_hours, required_inventory_from_items};

/// Fields for a new quote. Totals are derived here, at origination;
/// afterwards they travel verbatim through every conversion.
#[derive(Debug, Clone)]
pub struct NewQuote {
    pub customer_id: String,
    pub items: Vec<LineItem>,
    pub labor: Vec<LaborLine>,
    pub vat_rate: Decimal,
    pub valid_until: NaiveDate,
}

/// Replaceable business fields of an existing quote.
#[derive(Debug, Clone)]
pub struct QuoteUpdate {
    pub items: Vec<LineItem>,
    pub labor: Vec<LaborLine>,
    pub vat_rate: Decimal,
    pub valid_until: NaiveDate,
}

fn transition_allowed(from: QuoteStatus, to: QuoteStatus) -> bool {
    use QuoteStatus::*;
    from == to
        || matches!(
            (from, to),
            (Draft, Sent)
                | (Draft, Approved)
                | (Draft, Rejected)
                | (Sent, Approved)
                | (Sent, Rejected)
                | (Sent, Expired)
                | (Approved, Rejected)
        )
}

/// Creates a new draft quote.
pub fn create(input: NewQuote, actor: &Actor, now: DateTime<Utc>) -> Quote {
    let totals = Totals::from_lines(&input.items, &input.labor, input.vat_rate);
    let timestamps = QuoteTimestamps {
        created: Some(now),
        ..QuoteTimestamps::default()
    };
    Quote {
        id: Uuid::new_v4().to_string(),
        customer_id: input.customer_id,
        items: input.items,
        labor: input.labor,
        totals,
        status: QuoteStatus::Draft,
        valid_until: input.valid_until,
        created_date: now.date_naive(),
        timestamps,
        work_order_id: None,
        invoice_id: None,
        history: vec![HistoryEntry::action(now, actor, "created", "Offerte aangemaakt")],
        notes: vec![],
    }
}

/// Replaces the quote's business fields, guarded by the edit lock.
pub fn update(
    quote: &Quote,
    changes: QuoteUpdate,
    linked_work_order: Option<&WorkOrder>,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<Quote, EngineError> {
    let outcome = validate::check_edit_quote(quote, linked_work_order);
    if !outcome.can_proceed {
        return Err(EngineError::validation(outcome.message, outcome.suggested_action));
    }

    let mut next = quote.clone();
    next.totals = Totals::from_lines(&changes.items, &changes.labor, changes.vat_rate);
    next.items = changes.items;
    next.labor = changes.labor;
    next.valid_until = changes.valid_until;
    next.history
        .push(HistoryEntry::action(now, actor, "updated", "Offerte bewerkt"));
    Ok(next)
}

/// Moves the quote to `new_status`.
///
/// Appends a history entry and stamps the matching lifecycle timestamp,
/// which is written at most once: repeating a transition to the same
/// status leaves the original timestamp untouched.
pub fn change_status(
    quote: &Quote,
    new_status: QuoteStatus,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<Quote, EngineError> {
    if !transition_allowed(quote.status, new_status) {
        return Err(EngineError::validation(
            format!("Ongeldige statusovergang: {} → {}", quote.status, new_status),
            None,
        ));
    }

    let mut next = quote.clone();
    next.history.push(HistoryEntry::transition(
        now,
        actor,
        quote.status.as_str(),
        new_status.as_str(),
        format!("Status gewijzigd van {} naar {}", quote.status, new_status),
    ));
    next.status = new_status;
    next.timestamps.mark_status(new_status, now);
    Ok(next)
}

/// Appends a free-text note. Notes bypass the edit lock.
pub fn add_note(quote: &Quote, note: impl Into<String>) -> Quote {
    let mut next = quote.clone();
    next.notes.push(note.into());
    next
}

/// Deep-copies the quote into a fresh draft: new identity, copied lines and
/// totals, cleared links, `timestamps = {created}` only, and a note
/// pointing back at the origin.
pub fn clone_quote(quote: &Quote, actor: &Actor, now: DateTime<Utc>) -> Quote {
    let timestamps = QuoteTimestamps {
        created: Some(now),
        ..QuoteTimestamps::default()
    };
    Quote {
        id: Uuid::new_v4().to_string(),
        customer_id: quote.customer_id.clone(),
        items: quote.items.clone(),
        labor: quote.labor.clone(),
        totals: quote.totals.clone(),
        status: QuoteStatus::Draft,
        valid_until: quote.valid_until,
        created_date: now.date_naive(),
        timestamps,
        work_order_id: None,
        invoice_id: None,
        history: vec![HistoryEntry::action(
            now,
            actor,
            "cloned",
            format!("Gekopieerd van offerte {}", quote.id),
        )],
        notes: vec![format!("Kopie van offerte {}", quote.id)],
    }
}

/// Converts an approved quote into a work order, linking both sides.
pub fn convert_to_work_order(
    quote: &Quote,
    existing_work_order: Option<&WorkOrder>,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<(Quote, WorkOrder), EngineError> {
    let outcome = validate::check_quote_to_work_order(quote, existing_work_order);
    if !outcome.can_proceed {
        return Err(EngineError::validation(outcome.message, outcome.suggested_action));
    }

    let timestamps = WorkOrderTimestamps {
        created: Some(now),
        ..WorkOrderTimestamps::default()
    };
    let order = WorkOrder {
        id: Uuid::new_v4().to_string(),
        customer_id: quote.customer_id.clone(),
        assigned_to: None,
        status: WorkOrderStatus::ToDo,
        required_inventory: required_inventory_from_items(&quote.items),
        estimated_hours: labor_hours(&quote.labor),
        estimated_cost: quote.totals.total,
        timestamps,
        quote_id: Some(quote.id.clone()),
        invoice_id: None,
        notes: vec![format!("Aangemaakt vanuit offerte {}", quote.id)],
    };

    let mut next = quote.clone();
    next.work_order_id = Some(order.id.clone());
    crate::model::set_once(&mut next.timestamps.converted_to_work_order, now);
    next.history.push(HistoryEntry::action(
        now,
        actor,
        "converted_to_work_order",
        format!("Omgezet naar werkbon {}", order.id),
    ));
    Ok((next, order))
}

/// Converts an approved quote directly into a draft invoice.
///
/// Line and monetary data are copied verbatim; the invoice number is the
/// next gap-free number for the current year.
pub fn convert_to_invoice<'a>(
    quote: &Quote,
    existing_invoice: Option<&Invoice>,
    linked_work_order: Option<&WorkOrder>,
    existing_numbers: impl IntoIterator<Item = &'a str>,
    reminder: &ReminderConfig,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<(Quote, Invoice), EngineError> {
    let outcome = validate::check_quote_to_invoice(quote, existing_invoice, linked_work_order);
    if !outcome.can_proceed {
        return Err(EngineError::validation(outcome.message, outcome.suggested_action));
    }

    let today = now.date_naive();
    let timestamps = InvoiceTimestamps {
        created: Some(now),
        ..InvoiceTimestamps::default()
    };
    let invoice = Invoice {
        id: Uuid::new_v4().to_string(),
        invoice_number: next_invoice_number(now.year(), existing_numbers),
        customer_id: quote.customer_id.clone(),
        items: quote.items.clone(),
        labor: quote.labor.clone(),
        totals: quote.totals.clone(),
        status: InvoiceStatus::Draft,
        issue_date: today,
        due_date: today + Duration::days(reminder.payment_term_days),
        paid_date: None,
        timestamps,
        reminders: ReminderState::default(),
        quote_id: Some(quote.id.clone()),
        work_order_id: quote.work_order_id.clone(),
        history: vec![HistoryEntry::action(
            now,
            actor,
            "created",
            format!("Aangemaakt vanuit offerte {}", quote.id),
        )],
        notes: vec![],
    };

    let mut next = quote.clone();
    next.invoice_id = Some(invoice.id.clone());
    crate::model::set_once(&mut next.timestamps.converted_to_invoice, now);
    next.history.push(HistoryEntry::action(
        now,
        actor,
        "converted_to_invoice",
        format!("Omgezet naar factuur {}", invoice.invoice_number),
    ));
    Ok((next, invoice))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn actor() -> Actor {
        Actor {
            user_id: "emp-1".into(),
            user_name: "Joke".into(),
        }
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 10, 0, 0).unwrap()
    }

    fn new_quote() -> NewQuote {
        NewQuote {
            customer_id: "c-1".into(),
            items: vec![LineItem {
                description: "Kozijn".into(),
                quantity: dec!(2),
                unit_price: dec!(150),
                inventory_id: Some("art-12".into()),
            }],
            labor: vec![LaborLine {
                description: "Montage".into(),
                hours: dec!(3),
                rate: dec!(60),
            }],
            vat_rate: dec!(21),
            valid_until: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        }
    }

    fn approved_quote() -> Quote {
        let q = create(new_quote(), &actor(), at(1));
        let q = change_status(&q, QuoteStatus::Sent, &actor(), at(2)).unwrap();
        change_status(&q, QuoteStatus::Approved, &actor(), at(3)).unwrap()
    }

    #[test]
    fn create_builds_draft_with_derived_totals() {
        let quote = create(new_quote(), &actor(), at(1));
        assert_eq!(quote.status, QuoteStatus::Draft);
        assert_eq!(quote.totals.subtotal, dec!(480));
        assert_eq!(quote.totals.total, dec!(580.80));
        assert_eq!(quote.timestamps.created, Some(at(1)));
        assert_eq!(quote.history.len(), 1);
    }

    #[test]
    fn change_status_appends_history_and_stamps_once() {
        let quote = create(new_quote(), &actor(), at(1));
        let sent = change_status(&quote, QuoteStatus::Sent, &actor(), at(2)).unwrap();
        assert_eq!(sent.status, QuoteStatus::Sent);
        assert_eq!(sent.timestamps.sent, Some(at(2)));

        let entry = sent.history.last().unwrap();
        assert_eq!(entry.from_status.as_deref(), Some("draft"));
        assert_eq!(entry.to_status.as_deref(), Some("sent"));
    }

    #[test]
    fn repeated_approval_is_idempotent_on_timestamp() {
        let approved = approved_quote();
        let again = change_status(&approved, QuoteStatus::Approved, &actor(), at(9)).unwrap();
        assert_eq!(again.timestamps.approved, approved.timestamps.approved);
        assert_eq!(again.timestamps.approved, Some(at(3)));
    }

    #[test]
    fn illegal_transition_rejected() {
        let quote = create(new_quote(), &actor(), at(1));
        let err = change_status(&quote, QuoteStatus::Expired, &actor(), at(2)).unwrap_err();
        assert!(matches!(err, EngineError::Validation { .. }));
    }

    #[test]
    fn expired_is_terminal() {
        let quote = create(new_quote(), &actor(), at(1));
        let sent = change_status(&quote, QuoteStatus::Sent, &actor(), at(2)).unwrap();
        let expired = change_status(&sent, QuoteStatus::Expired, &actor(), at(3)).unwrap();
        assert!(change_status(&expired, QuoteStatus::Sent, &actor(), at(4)).is_err());
    }

    #[test]
    fn update_blocked_after_linked_work_order_completed() {
        let quote = approved_quote();
        let (quote, mut order) = convert_to_work_order(&quote, None, &actor(), at(4)).unwrap();
        order.status = WorkOrderStatus::Completed;

        let changes = QuoteUpdate {
            items: vec![],
            labor: vec![],
            vat_rate: dec!(21),
            valid_until: quote.valid_until,
        };
        let err = update(&quote, changes, Some(&order), &actor(), at(5)).unwrap_err();
        assert!(matches!(err, EngineError::Validation { .. }));
    }

    #[test]
    fn update_recomputes_totals() {
        let quote = create(new_quote(), &actor(), at(1));
        let changes = QuoteUpdate {
            items: vec![LineItem {
                description: "Deur".into(),
                quantity: dec!(1),
                unit_price: dec!(300),
                inventory_id: None,
            }],
            labor: vec![],
            vat_rate: dec!(21),
            valid_until: quote.valid_until,
        };
        let updated = update(&quote, changes, None, &actor(), at(2)).unwrap();
        assert_eq!(updated.totals.subtotal, dec!(300));
        assert_eq!(updated.history.len(), 2);
    }

    #[test]
    fn notes_bypass_the_lock() {
        let quote = approved_quote();
        let noted = add_note(&quote, "Klant belt volgende week terug");
        assert_eq!(noted.notes.len(), 1);
    }

    #[test]
    fn clone_resets_identity_status_and_timestamps() {
        let quote = approved_quote();
        let copy = clone_quote(&quote, &actor(), at(10));

        assert_ne!(copy.id, quote.id);
        assert_eq!(copy.status, QuoteStatus::Draft);
        assert_eq!(copy.items, quote.items);
        assert_eq!(copy.totals, quote.totals);
        assert_eq!(copy.timestamps.created, Some(at(10)));
        assert!(copy.timestamps.sent.is_none());
        assert!(copy.timestamps.approved.is_none());
        assert!(copy.work_order_id.is_none());
        assert!(copy.notes[0].contains(&quote.id));
    }

    #[test]
    fn convert_to_work_order_links_both_sides() {
        let quote = approved_quote();
        let (quote, order) = convert_to_work_order(&quote, None, &actor(), at(4)).unwrap();

        assert_eq!(quote.work_order_id.as_deref(), Some(order.id.as_str()));
        assert_eq!(order.quote_id.as_deref(), Some(quote.id.as_str()));
        assert_eq!(order.status, WorkOrderStatus::ToDo);
        assert_eq!(order.estimated_hours, dec!(3));
        assert_eq!(order.estimated_cost, quote.totals.total);
        assert_eq!(order.required_inventory.len(), 1);
        assert_eq!(quote.timestamps.converted_to_work_order, Some(at(4)));
    }

    #[test]
    fn convert_to_work_order_requires_approval() {
        let quote = create(new_quote(), &actor(), at(1));
        assert!(convert_to_work_order(&quote, None, &actor(), at(2)).is_err());
    }

    #[test]
    fn convert_to_invoice_copies_monetary_data_verbatim() {
        let quote = approved_quote();
        let (quote, invoice) = convert_to_invoice(
            &quote,
            None,
            None,
            ["2024-001"],
            &ReminderConfig::default(),
            &actor(),
            at(5),
        )
        .unwrap();

        assert_eq!(invoice.invoice_number, "2024-002");
        assert_eq!(invoice.status, InvoiceStatus::Draft);
        assert_eq!(invoice.totals, quote.totals);
        assert_eq!(invoice.items, quote.items);
        assert_eq!(invoice.quote_id.as_deref(), Some(quote.id.as_str()));
        assert_eq!(quote.invoice_id.as_deref(), Some(invoice.id.as_str()));
        assert_eq!(
            invoice.due_date,
            NaiveDate::from_ymd_opt(2024, 1, 19).unwrap()
        );
        assert_eq!(quote.timestamps.converted_to_invoice, Some(at(5)));
    }

    #[test]
    fn second_conversion_to_invoice_is_rejected() {
        let quote = approved_quote();
        let (quote, invoice) = convert_to_invoice(
            &quote,
            None,
            None,
            [],
            &ReminderConfig::default(),
            &actor(),
            at(5),
        )
        .unwrap();

        let err = convert_to_invoice(
            &quote,
            Some(&invoice),
            None,
            [],
            &ReminderConfig::default(),
            &actor(),
            at(6),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation { .. }));
    }

    #[test]
    fn convert_to_invoice_blocked_by_open_work_order() {
        let quote = approved_quote();
        let (quote, order) = convert_to_work_order(&quote, None, &actor(), at(4)).unwrap();

        let err = convert_to_invoice(
            &quote,
            None,
            Some(&order),
            [],
            &ReminderConfig::default(),
            &actor(),
            at(5),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation { .. }));
    }
}
