use chrono::{DateTime, Datelike, Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::config::ReminderConfig;
use crate::error::EngineError;
use crate::model::{
    Actor, HistoryEntry, Invoice, InvoiceStatus, InvoiceTimestamps, LaborLine, LineItem, Quote,
    ReminderState, RequiredItem, Totals, WorkOrder, WorkOrderStatus, WorkOrderTimestamps,
    next_invoice_number,
};
use crate::validate;

use super::{labor_hours, required_inventory_from_items};

/// Fields for a new stand-alone work order.
#[derive(Debug, Clone)]
pub struct NewWorkOrder {
    pub customer_id: String,
    pub assigned_to: Option<String>,
    pub required_inventory: Vec<RequiredItem>,
    pub estimated_hours: Decimal,
    pub estimated_cost: Decimal,
}

/// Replaceable business fields of an existing work order.
#[derive(Debug, Clone)]
pub struct WorkOrderUpdate {
    pub assigned_to: Option<String>,
    pub required_inventory: Vec<RequiredItem>,
    pub estimated_hours: Decimal,
    pub estimated_cost: Decimal,
}

fn transition_allowed(from: WorkOrderStatus, to: WorkOrderStatus) -> bool {
    use WorkOrderStatus::*;
    from == to
        || matches!(
            (from, to),
            (ToDo, InProgress) | (ToDo, Completed) | (InProgress, Completed) | (InProgress, ToDo)
        )
}

/// Creates a new work order in `To Do`.
pub fn create(input: NewWorkOrder, _actor: &Actor, now: DateTime<Utc>) -> WorkOrder {
    let timestamps = WorkOrderTimestamps {
        created: Some(now),
        ..WorkOrderTimestamps::default()
    };
    WorkOrder {
        id: Uuid::new_v4().to_string(),
        customer_id: input.customer_id,
        assigned_to: input.assigned_to,
        status: WorkOrderStatus::ToDo,
        required_inventory: input.required_inventory,
        estimated_hours: input.estimated_hours,
        estimated_cost: input.estimated_cost,
        timestamps,
        quote_id: None,
        invoice_id: None,
        notes: vec![],
    }
}

/// Replaces the work order's business fields, guarded by the edit lock.
/// Editing an order in progress proceeds; the warning is surfaced through
/// [`validate::check_edit_work_order`] for the UI to act on.
pub fn update(
    order: &WorkOrder,
    changes: WorkOrderUpdate,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<WorkOrder, EngineError> {
    let outcome = validate::check_edit_work_order(order);
    if !outcome.can_proceed {
        return Err(EngineError::validation(outcome.message, outcome.suggested_action));
    }

    let mut next = order.clone();
    next.assigned_to = changes.assigned_to;
    next.required_inventory = changes.required_inventory;
    next.estimated_hours = changes.estimated_hours;
    next.estimated_cost = changes.estimated_cost;
    next.notes.push(note_line(now, actor, "Werkbon bewerkt"));
    Ok(next)
}

/// Moves the work order to `new_status`, recording the step in the notes
/// trail (work orders carry no separate history log) and stamping
/// `completed` at most once.
pub fn change_status(
    order: &WorkOrder,
    new_status: WorkOrderStatus,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<WorkOrder, EngineError> {
    if !transition_allowed(order.status, new_status) {
        return Err(EngineError::validation(
            format!("Ongeldige statusovergang: {} → {}", order.status, new_status),
            None,
        ));
    }

    let mut next = order.clone();
    next.notes.push(note_line(
        now,
        actor,
        format!("Status {} → {}", order.status, new_status),
    ));
    next.status = new_status;
    next.timestamps.mark_status(new_status, now);
    Ok(next)
}

/// Appends a free-text note. The notes trail stays writable on a completed
/// order; it is the one field the invoice conversion may still touch.
pub fn add_note(order: &WorkOrder, note: impl Into<String>) -> WorkOrder {
    let mut next = order.clone();
    next.notes.push(note.into());
    next
}

/// Converts a completed work order into an invoice.
///
/// Line data comes from the originating quote when one is linked; without
/// one, a single line is synthesized from the order's estimated cost. When
/// the linked quote already has an invoice the conversion updates that
/// invoice in place instead of minting a second one.
#[allow(clippy::too_many_arguments)]
pub fn convert_to_invoice<'a>(
    order: &WorkOrder,
    existing_invoice: Option<&Invoice>,
    source_quote: Option<&Quote>,
    quote_invoice: Option<&Invoice>,
    existing_numbers: impl IntoIterator<Item = &'a str>,
    reminder: &ReminderConfig,
    default_vat_rate: Decimal,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<(WorkOrder, Invoice), EngineError> {
    let outcome = validate::check_work_order_to_invoice(order, existing_invoice, quote_invoice);
    if !outcome.can_proceed {
        return Err(EngineError::validation(outcome.message, outcome.suggested_action));
    }

    let (items, labor, totals) = invoice_lines(order, source_quote, default_vat_rate);

    if let Some(existing) = quote_invoice {
        // Update-in-place: the quote was invoiced before the work order
        // finished. The invoice keeps its number, status and reminders.
        if existing.status == InvoiceStatus::Paid {
            return Err(EngineError::validation(
                format!("Factuur {} is betaald en vergrendeld", existing.invoice_number),
                None,
            ));
        }
        let mut invoice = existing.clone();
        invoice.items = items;
        invoice.labor = labor;
        invoice.totals = totals;
        invoice.work_order_id = Some(order.id.clone());
        invoice.history.push(HistoryEntry::action(
            now,
            actor,
            "updated_from_work_order",
            format!("Bijgewerkt vanuit werkbon {}", order.id),
        ));

        let mut next = order.clone();
        next.invoice_id = Some(invoice.id.clone());
        next.notes
            .push(note_line(now, actor, format!("Factuur {} bijgewerkt", invoice.invoice_number)));
        return Ok((next, invoice));
    }

    let timestamps = InvoiceTimestamps {
        created: Some(now),
        ..InvoiceTimestamps::default()
    };
    let today = now.date_naive();
    let invoice = Invoice {
        id: Uuid::new_v4().to_string(),
        invoice_number: next_invoice_number(now.year(), existing_numbers),
        customer_id: order.customer_id.clone(),
        items,
        labor,
        totals,
        status: InvoiceStatus::Draft,
        issue_date: today,
        due_date: today + Duration::days(reminder.payment_term_days),
        paid_date: None,
        timestamps,
        reminders: ReminderState::default(),
        quote_id: order.quote_id.clone(),
        work_order_id: Some(order.id.clone()),
        history: vec![HistoryEntry::action(
            now,
            actor,
            "created",
            format!("Aangemaakt vanuit werkbon {}", order.id),
        )],
        notes: vec![],
    };

    let mut next = order.clone();
    next.invoice_id = Some(invoice.id.clone());
    next.notes
        .push(note_line(now, actor, format!("Factuur {} aangemaakt", invoice.invoice_number)));
    Ok((next, invoice))
}

/// Pushes an edited quote's or invoice's line data back into its linked
/// work order.
///
/// Refused outright when the order is completed: finished work is never
/// silently overwritten. The rewrite is recorded in the order's own notes
/// trail so the side effect stays visible.
pub fn sync_from_source(
    order: &WorkOrder,
    source_label: &str,
    items: &[LineItem],
    labor: &[LaborLine],
    source_total: Decimal,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<WorkOrder, EngineError> {
    if order.status == WorkOrderStatus::Completed {
        return Err(EngineError::SyncRefused(order.id.clone()));
    }

    let mut next = order.clone();
    next.required_inventory = required_inventory_from_items(items);
    next.estimated_hours = labor_hours(labor);
    next.estimated_cost = source_total;
    next.notes.push(note_line(
        now,
        actor,
        format!("Bijgewerkt vanuit {source_label}"),
    ));
    Ok(next)
}

// Invoice line data: the originating quote verbatim when linked, otherwise
// a single synthesized line from the order's estimate.
fn invoice_lines(
    order: &WorkOrder,
    source_quote: Option<&Quote>,
    default_vat_rate: Decimal,
) -> (Vec<LineItem>, Vec<LaborLine>, Totals) {
    match source_quote {
        Some(quote) => (quote.items.clone(), quote.labor.clone(), quote.totals.clone()),
        None => {
            let items = vec![LineItem {
                description: format!("Werkzaamheden volgens werkbon {}", order.id),
                quantity: Decimal::ONE,
                unit_price: order.estimated_cost,
                inventory_id: None,
            }];
            let totals = Totals::from_lines(&items, &[], default_vat_rate);
            (items, vec![], totals)
        }
    }
}

// Notes-trail line in place of a history entry.
fn note_line(now: DateTime<Utc>, actor: &Actor, text: impl Into<String>) -> String {
    format!("[{}] {}: {}", now.format("%Y-%m-%d"), actor.user_name, text.into())
}
