//! Pure transition guards for the document lifecycle.
//!
//! Every function here is a side-effect-free predicate over read snapshots:
//! it receives the source document plus the already-resolved sibling
//! documents and returns a [`ValidationOutcome`]. Business rejections are
//! values, never errors. Callers resolve link fields against the store
//! first; a dangling link resolves to `None` and is treated as absent.

use serde::{Deserialize, Serialize};

use crate::model::{Invoice, InvoiceStatus, Quote, QuoteStatus, WorkOrder, WorkOrderStatus};

/// Weight of a guard verdict. `Error` and a blocking `Warning` stop the
/// operation; `Info` annotates but proceeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Result of evaluating a requested transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub can_proceed: bool,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

impl ValidationOutcome {
    fn ok() -> Self {
        Self {
            can_proceed: true,
            severity: Severity::Info,
            message: String::new(),
            suggested_action: None,
        }
    }

    fn info(message: impl Into<String>) -> Self {
        Self {
            can_proceed: true,
            severity: Severity::Info,
            message: message.into(),
            suggested_action: None,
        }
    }

    /// Non-blocking warning: the operation proceeds, the UI flags it.
    fn advisory(message: impl Into<String>) -> Self {
        Self {
            can_proceed: true,
            severity: Severity::Warning,
            message: message.into(),
            suggested_action: None,
        }
    }

    fn blocked(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            can_proceed: false,
            severity,
            message: message.into(),
            suggested_action: None,
        }
    }

    fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggested_action = Some(suggestion.into());
        self
    }
}

/// Quote → WorkOrder.
///
/// Requires an approved quote and no resolving work order yet. An existing
/// invoice link is only flagged: in this trade the invoice usually follows
/// the work order, so the reversed order is suspicious but not forbidden.
pub fn check_quote_to_work_order(
    quote: &Quote,
    existing_work_order: Option<&WorkOrder>,
) -> ValidationOutcome {
    if quote.status != QuoteStatus::Approved {
        return ValidationOutcome::blocked(
            Severity::Error,
            format!(
                "Alleen een goedgekeurde offerte kan worden omgezet naar een werkbon (status is nu: {})",
                quote.status
            ),
        )
        .with_suggestion("Zet de offerte eerst op goedgekeurd");
    }
    if let Some(order) = existing_work_order {
        return ValidationOutcome::blocked(
            Severity::Error,
            format!("Offerte {} heeft al een werkbon ({})", quote.id, order.id),
        )
        .with_suggestion("Open de bestaande werkbon");
    }
    if quote.invoice_id.is_some() {
        return ValidationOutcome::advisory(
            "Er bestaat al een factuur voor deze offerte; een werkbon volgt gewoonlijk vóór de factuur",
        );
    }
    ValidationOutcome::ok()
}

/// WorkOrder → Invoice.
///
/// Requires a completed work order. When the work order's quote already has
/// an invoice, the conversion becomes an update-in-place of that invoice
/// (`Info`, proceeds) instead of minting a second one.
pub fn check_work_order_to_invoice(
    work_order: &WorkOrder,
    existing_invoice: Option<&Invoice>,
    quote_invoice: Option<&Invoice>,
) -> ValidationOutcome {
    if work_order.status != WorkOrderStatus::Completed {
        return ValidationOutcome::blocked(
            Severity::Error,
            format!(
                "Alleen een afgeronde werkbon kan worden gefactureerd (status is nu: {})",
                work_order.status
            ),
        )
        .with_suggestion("Rond de werkbon eerst af");
    }
    if let Some(invoice) = existing_invoice {
        return ValidationOutcome::blocked(
            Severity::Error,
            format!(
                "Werkbon {} is al gefactureerd ({})",
                work_order.id, invoice.invoice_number
            ),
        );
    }
    if let Some(invoice) = quote_invoice {
        return ValidationOutcome::info(format!(
            "Bestaande factuur {} wordt bijgewerkt met de werkbongegevens",
            invoice.invoice_number
        ));
    }
    ValidationOutcome::ok()
}

/// Quote → Invoice, without an intermediate work order.
///
/// A linked work order that is not yet completed blocks the conversion
/// (warning): invoicing unfinished work is a process error here, not a
/// hard data error.
pub fn check_quote_to_invoice(
    quote: &Quote,
    existing_invoice: Option<&Invoice>,
    linked_work_order: Option<&WorkOrder>,
) -> ValidationOutcome {
    if quote.status != QuoteStatus::Approved {
        return ValidationOutcome::blocked(
            Severity::Error,
            format!(
                "Alleen een goedgekeurde offerte kan worden gefactureerd (status is nu: {})",
                quote.status
            ),
        )
        .with_suggestion("Zet de offerte eerst op goedgekeurd");
    }
    if let Some(invoice) = existing_invoice {
        return ValidationOutcome::blocked(
            Severity::Error,
            format!(
                "Offerte {} is al gefactureerd ({})",
                quote.id, invoice.invoice_number
            ),
        );
    }
    if let Some(order) = linked_work_order
        && order.status != WorkOrderStatus::Completed
    {
        return ValidationOutcome::blocked(
            Severity::Warning,
            format!("De gekoppelde werkbon {} is nog niet afgerond", order.id),
        )
        .with_suggestion("Rond de werkbon af en factureer daarna");
    }
    ValidationOutcome::ok()
}

/// Invoice → WorkOrder.
pub fn check_invoice_to_work_order(
    invoice: &Invoice,
    existing_work_order: Option<&WorkOrder>,
) -> ValidationOutcome {
    if let Some(order) = existing_work_order {
        return ValidationOutcome::blocked(
            Severity::Error,
            format!("Factuur {} heeft al een werkbon ({})", invoice.invoice_number, order.id),
        )
        .with_suggestion("Open de bestaande werkbon");
    }
    match invoice.status {
        InvoiceStatus::Draft | InvoiceStatus::Sent => ValidationOutcome::ok(),
        other => ValidationOutcome::blocked(
            Severity::Error,
            format!(
                "Een factuur met status {} kan geen werkbon meer starten",
                other
            ),
        ),
    }
}

/// Edit guard for a quote: locked once the linked work order is completed.
/// Notes are excepted; note appends do not pass through this guard.
pub fn check_edit_quote(quote: &Quote, linked_work_order: Option<&WorkOrder>) -> ValidationOutcome {
    if let Some(order) = linked_work_order
        && order.status == WorkOrderStatus::Completed
    {
        return ValidationOutcome::blocked(
            Severity::Error,
            format!(
                "Offerte {} is vergrendeld: de gekoppelde werkbon is afgerond",
                quote.id
            ),
        )
        .with_suggestion("Alleen notities kunnen nog worden toegevoegd");
    }
    ValidationOutcome::ok()
}

/// Edit guard for an invoice: a paid invoice is unconditionally locked, and
/// a completed linked work order locks it as well.
pub fn check_edit_invoice(
    invoice: &Invoice,
    linked_work_order: Option<&WorkOrder>,
) -> ValidationOutcome {
    if invoice.status == InvoiceStatus::Paid {
        return ValidationOutcome::blocked(
            Severity::Error,
            format!("Factuur {} is betaald en vergrendeld", invoice.invoice_number),
        )
        .with_suggestion("Alleen notities kunnen nog worden toegevoegd");
    }
    if let Some(order) = linked_work_order
        && order.status == WorkOrderStatus::Completed
    {
        return ValidationOutcome::blocked(
            Severity::Error,
            format!(
                "Factuur {} is vergrendeld: de gekoppelde werkbon is afgerond",
                invoice.invoice_number
            ),
        )
        .with_suggestion("Alleen notities kunnen nog worden toegevoegd");
    }
    ValidationOutcome::ok()
}

/// Edit guard for a work order: completed orders are read-mostly; editing
/// one that is in progress proceeds with a warning so the responsible
/// employee can be notified.
pub fn check_edit_work_order(work_order: &WorkOrder) -> ValidationOutcome {
    match work_order.status {
        WorkOrderStatus::Completed => ValidationOutcome::blocked(
            Severity::Error,
            format!(
                "Werkbon {} is afgerond en kan niet meer worden bewerkt",
                work_order.id
            ),
        ),
        WorkOrderStatus::InProgress => ValidationOutcome::advisory(format!(
            "Werkbon {} is in uitvoering; informeer de verantwoordelijke medewerker",
            work_order.id
        )),
        WorkOrderStatus::ToDo => ValidationOutcome::ok(),
    }
}
