use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::config::ReminderConfig;
use crate::error::EngineError;
use crate::model::{
    Actor, HistoryEntry, Invoice, InvoiceStatus, InvoiceTimestamps, LaborLine, LineItem,
    ReminderState, Totals, WorkOrder, WorkOrderStatus, WorkOrderTimestamps, next_invoice_number,
};
use crate::validate;

use super::{labor_hours, required_inventory_from_items};

/// Fields for a new stand-alone invoice (one not born from a conversion).
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub customer_id: String,
    pub items: Vec<LineItem>,
    pub labor: Vec<LaborLine>,
    pub vat_rate: Decimal,
}

/// Replaceable business fields of an existing invoice.
#[derive(Debug, Clone)]
pub struct InvoiceUpdate {
    pub items: Vec<LineItem>,
    pub labor: Vec<LaborLine>,
    pub vat_rate: Decimal,
    pub due_date: NaiveDate,
}

fn transition_allowed(from: InvoiceStatus, to: InvoiceStatus) -> bool {
    use InvoiceStatus::*;
    from == to
        || matches!(
            (from, to),
            (Draft, Sent)
                | (Draft, Cancelled)
                | (Sent, Paid)
                | (Sent, Overdue)
                | (Sent, Cancelled)
                | (Overdue, Paid)
                | (Overdue, Cancelled)
        )
}

/// Creates a new draft invoice with the next gap-free number for the year.
pub fn create<'a>(
    input: NewInvoice,
    existing_numbers: impl IntoIterator<Item = &'a str>,
    reminder: &ReminderConfig,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Invoice {
    let today = now.date_naive();
    let totals = Totals::from_lines(&input.items, &input.labor, input.vat_rate);
    let timestamps = InvoiceTimestamps {
        created: Some(now),
        ..InvoiceTimestamps::default()
    };
    Invoice {
        id: Uuid::new_v4().to_string(),
        invoice_number: next_invoice_number(now.year(), existing_numbers),
        customer_id: input.customer_id,
        items: input.items,
        labor: input.labor,
        totals,
        status: InvoiceStatus::Draft,
        issue_date: today,
        due_date: today + Duration::days(reminder.payment_term_days),
        paid_date: None,
        timestamps,
        reminders: ReminderState::default(),
        quote_id: None,
        work_order_id: None,
        history: vec![HistoryEntry::action(now, actor, "created", "Factuur aangemaakt")],
        notes: vec![],
    }
}

/// Replaces the invoice's business fields, guarded by the edit lock.
pub fn update(
    invoice: &Invoice,
    changes: InvoiceUpdate,
    linked_work_order: Option<&WorkOrder>,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<Invoice, EngineError> {
    let outcome = validate::check_edit_invoice(invoice, linked_work_order);
    if !outcome.can_proceed {
        return Err(EngineError::validation(outcome.message, outcome.suggested_action));
    }

    let mut next = invoice.clone();
    next.totals = Totals::from_lines(&changes.items, &changes.labor, changes.vat_rate);
    next.items = changes.items;
    next.labor = changes.labor;
    next.due_date = changes.due_date;
    next.history
        .push(HistoryEntry::action(now, actor, "updated", "Factuur bewerkt"));
    Ok(next)
}

/// Moves the invoice to `new_status`.
///
/// Going to `sent` schedules both payment reminders from the due date;
/// going to `paid` records the payment date. Lifecycle timestamps are
/// written at most once.
pub fn change_status(
    invoice: &Invoice,
    new_status: InvoiceStatus,
    reminder: &ReminderConfig,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<Invoice, EngineError> {
    if !transition_allowed(invoice.status, new_status) {
        return Err(EngineError::validation(
            format!(
                "Ongeldige statusovergang: {} → {}",
                invoice.status, new_status
            ),
            None,
        ));
    }

    let mut next = invoice.clone();
    next.history.push(HistoryEntry::transition(
        now,
        actor,
        invoice.status.as_str(),
        new_status.as_str(),
        format!("Status gewijzigd van {} naar {}", invoice.status, new_status),
    ));
    next.status = new_status;
    next.timestamps.mark_status(new_status, now);

    match new_status {
        InvoiceStatus::Sent if next.reminders.reminder1_date.is_none() => {
            next.reminders = ReminderState::schedule(
                next.due_date,
                reminder.reminder1_offset_days,
                reminder.reminder2_offset_days,
            );
        }
        InvoiceStatus::Paid if next.paid_date.is_none() => {
            next.paid_date = Some(now.date_naive());
        }
        _ => {}
    }
    Ok(next)
}

/// Appends a free-text note. Notes bypass the edit lock, also on a paid
/// invoice.
pub fn add_note(invoice: &Invoice, note: impl Into<String>) -> Invoice {
    let mut next = invoice.clone();
    next.notes.push(note.into());
    next
}

/// Deep-copies the invoice into a fresh draft: new identity and number,
/// copied lines and totals, cleared links and reminder state,
/// `timestamps = {created}` only.
pub fn clone_invoice<'a>(
    invoice: &Invoice,
    existing_numbers: impl IntoIterator<Item = &'a str>,
    reminder: &ReminderConfig,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Invoice {
    let today = now.date_naive();
    let timestamps = InvoiceTimestamps {
        created: Some(now),
        ..InvoiceTimestamps::default()
    };
    Invoice {
        id: Uuid::new_v4().to_string(),
        invoice_number: next_invoice_number(now.year(), existing_numbers),
        customer_id: invoice.customer_id.clone(),
        items: invoice.items.clone(),
        labor: invoice.labor.clone(),
        totals: invoice.totals.clone(),
        status: InvoiceStatus::Draft,
        issue_date: today,
        due_date: today + Duration::days(reminder.payment_term_days),
        paid_date: None,
        timestamps,
        reminders: ReminderState::default(),
        quote_id: None,
        work_order_id: None,
        history: vec![HistoryEntry::action(
            now,
            actor,
            "cloned",
            format!("Gekopieerd van factuur {}", invoice.invoice_number),
        )],
        notes: vec![format!("Kopie van factuur {}", invoice.invoice_number)],
    }
}

/// Creates a work order from a draft or sent invoice, linking both sides.
pub fn convert_to_work_order(
    invoice: &Invoice,
    existing_work_order: Option<&WorkOrder>,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<(Invoice, WorkOrder), EngineError> {
    let outcome = validate::check_invoice_to_work_order(invoice, existing_work_order);
    if !outcome.can_proceed {
        return Err(EngineError::validation(outcome.message, outcome.suggested_action));
    }

    let timestamps = WorkOrderTimestamps {
        created: Some(now),
        ..WorkOrderTimestamps::default()
    };
    let order = WorkOrder {
        id: Uuid::new_v4().to_string(),
        customer_id: invoice.customer_id.clone(),
        assigned_to: None,
        status: WorkOrderStatus::ToDo,
        required_inventory: required_inventory_from_items(&invoice.items),
        estimated_hours: labor_hours(&invoice.labor),
        estimated_cost: invoice.totals.total,
        timestamps,
        quote_id: invoice.quote_id.clone(),
        invoice_id: Some(invoice.id.clone()),
        notes: vec![format!(
            "Aangemaakt vanuit factuur {}",
            invoice.invoice_number
        )],
    };

    let mut next = invoice.clone();
    next.work_order_id = Some(order.id.clone());
    next.history.push(HistoryEntry::action(
        now,
        actor,
        "converted_to_work_order",
        format!("Werkbon {} aangemaakt", order.id),
    ));
    Ok((next, order))
}
