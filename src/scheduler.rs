//! Pure computation of due reminder and expiry actions.
//!
//! [`compute_due_actions`] is a deterministic report generator over read
//! snapshots: no mutation, no I/O. That is what makes it safe to run on
//! every UI render as well as on the periodic tick. Idempotence across
//! ticks comes from the documents themselves (`reminders.*_sent` flags,
//! quote status), never from remembering what an earlier tick produced.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ReminderConfig;
use crate::model::{Customer, Invoice, InvoiceStatus, Quote, QuoteStatus, find_customer};

/// Due actions for one invoice, most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceActionKind {
    /// Second payment reminder. Does not require the first to have fired.
    Reminder2,
    /// First payment reminder.
    Reminder1,
    /// Candidate for the automatic `sent` → `overdue` status flip.
    MarkOverdue,
}

/// Due actions for one quote, most urgent first. Expiry short-circuits the
/// other checks for that quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteActionKind {
    /// Candidate for the automatic `sent` → `expired` transition.
    Expired,
    /// Validity ends within the warning window.
    ExpiryWarning,
    /// Second follow-up on a quote that stayed unanswered.
    Followup2,
    /// First follow-up.
    Followup1,
}

/// A computed, transient action on an invoice. Never persisted: the owning
/// invoice's reminder flags are the only sent-state of record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceAction {
    pub invoice_id: String,
    pub invoice_number: String,
    pub customer_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_email: Option<String>,
    pub kind: InvoiceActionKind,
    pub days_overdue: i64,
    pub amount: Decimal,
    pub due_date: NaiveDate,
}

/// A computed, transient action on a quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteAction {
    pub quote_id: String,
    pub customer_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_email: Option<String>,
    pub kind: QuoteActionKind,
    pub days_until_expiry: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_since_sent: Option<i64>,
    pub total: Decimal,
    pub valid_until: NaiveDate,
}

/// The combined result of one scheduler pass, ordered most urgent first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DueActions {
    pub quote_actions: Vec<QuoteAction>,
    pub invoice_actions: Vec<InvoiceAction>,
}

impl DueActions {
    pub fn is_empty(&self) -> bool {
        self.quote_actions.is_empty() && self.invoice_actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.quote_actions.len() + self.invoice_actions.len()
    }
}

/// Computes every action due at `today` over the given read snapshots.
///
/// At most one action per invoice is surfaced when several apply, ranked
/// `reminder2 > reminder1 > overdue-flip`; quotes rank
/// `expired > expiry_warning > followup2 > followup1`. Invoice actions are
/// ordered by days overdue, descending, so a bounded "next N actions" view
/// always shows the most urgent items first.
pub fn compute_due_actions(
    today: NaiveDate,
    invoices: &[Invoice],
    quotes: &[Quote],
    customers: &[Customer],
    config: &ReminderConfig,
) -> DueActions {
    let mut invoice_actions: Vec<InvoiceAction> = invoices
        .iter()
        .filter_map(|invoice| invoice_action(today, invoice, customers, config))
        .collect();
    invoice_actions.sort_by(|a, b| b.days_overdue.cmp(&a.days_overdue).then(a.kind.cmp(&b.kind)));

    let mut quote_actions: Vec<QuoteAction> = quotes
        .iter()
        .filter_map(|quote| quote_action(today, quote, customers, config))
        .collect();
    quote_actions.sort_by(|a, b| {
        a.kind
            .cmp(&b.kind)
            .then(a.days_until_expiry.cmp(&b.days_until_expiry))
    });

    DueActions {
        quote_actions,
        invoice_actions,
    }
}

fn invoice_action(
    today: NaiveDate,
    invoice: &Invoice,
    customers: &[Customer],
    config: &ReminderConfig,
) -> Option<InvoiceAction> {
    if !matches!(invoice.status, InvoiceStatus::Sent | InvoiceStatus::Overdue) {
        return None;
    }

    let days_overdue = invoice.days_overdue(today);
    let kind = if days_overdue >= config.reminder2_offset_days && !invoice.reminders.reminder2_sent
    {
        InvoiceActionKind::Reminder2
    } else if days_overdue >= config.reminder1_offset_days && !invoice.reminders.reminder1_sent {
        InvoiceActionKind::Reminder1
    } else if days_overdue >= config.reminder1_offset_days && invoice.status == InvoiceStatus::Sent
    {
        InvoiceActionKind::MarkOverdue
    } else {
        return None;
    };

    let customer = find_customer(customers, &invoice.customer_id);
    Some(InvoiceAction {
        invoice_id: invoice.id.clone(),
        invoice_number: invoice.invoice_number.clone(),
        customer_id: invoice.customer_id.clone(),
        customer_name: customer.map(|c| c.name.clone()),
        recipient_email: customer.map(|c| c.email.clone()),
        kind,
        days_overdue,
        amount: invoice.totals.total,
        due_date: invoice.due_date,
    })
}

fn quote_action(
    today: NaiveDate,
    quote: &Quote,
    customers: &[Customer],
    config: &ReminderConfig,
) -> Option<QuoteAction> {
    if quote.status != QuoteStatus::Sent {
        return None;
    }

    let days_until_expiry = quote.days_until_expiry(today);
    let days_since_sent = quote.days_since_sent(today);

    let kind = if days_until_expiry < 0 {
        QuoteActionKind::Expired
    } else if days_until_expiry <= config.expiry_warning_days {
        QuoteActionKind::ExpiryWarning
    } else {
        // A sent quote without a sent timestamp cannot be measured for
        // staleness; it simply yields no follow-up.
        match days_since_sent {
            Some(days) if days >= config.followup2_days => QuoteActionKind::Followup2,
            Some(days) if days >= config.followup1_days => QuoteActionKind::Followup1,
            _ => return None,
        }
    };

    let customer = find_customer(customers, &quote.customer_id);
    Some(QuoteAction {
        quote_id: quote.id.clone(),
        customer_id: quote.customer_id.clone(),
        customer_name: customer.map(|c| c.name.clone()),
        recipient_email: customer.map(|c| c.email.clone()),
        kind,
        days_until_expiry,
        days_since_sent,
        total: quote.totals.total,
        valid_until: quote.valid_until,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InvoiceTimestamps, QuoteTimestamps, ReminderState, Totals};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn cfg() -> ReminderConfig {
        ReminderConfig::default()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn customers() -> Vec<Customer> {
        vec![Customer {
            id: "c-1".into(),
            name: "Bakkerij Jansen".into(),
            email: "info@bakkerijjansen.nl".into(),
        }]
    }

    fn invoice(number: &str, status: InvoiceStatus, due: NaiveDate) -> Invoice {
        Invoice {
            id: format!("inv-{number}"),
            invoice_number: number.into(),
            customer_id: "c-1".into(),
            items: vec![],
            labor: vec![],
            totals: Totals {
                subtotal: dec!(100),
                vat_rate: dec!(21),
                vat_amount: dec!(21),
                total: dec!(121),
            },
            status,
            issue_date: due - chrono::Duration::days(14),
            due_date: due,
            paid_date: None,
            timestamps: InvoiceTimestamps::default(),
            reminders: ReminderState::schedule(due, 7, 14),
            quote_id: None,
            work_order_id: None,
            history: vec![],
            notes: vec![],
        }
    }

    fn sent_quote(id: &str, valid_until: NaiveDate, sent_on: Option<NaiveDate>) -> Quote {
        let timestamps = QuoteTimestamps {
            sent: sent_on.map(|d| Utc.from_utc_datetime(&d.and_hms_opt(9, 0, 0).unwrap())),
            ..QuoteTimestamps::default()
        };
        Quote {
            id: id.into(),
            customer_id: "c-1".into(),
            items: vec![],
            labor: vec![],
            totals: Totals {
                subtotal: dec!(500),
                vat_rate: dec!(21),
                vat_amount: dec!(105),
                total: dec!(605),
            },
            status: QuoteStatus::Sent,
            valid_until,
            created_date: day(2024, 1, 1),
            timestamps,
            work_order_id: None,
            invoice_id: None,
            history: vec![],
            notes: vec![],
        }
    }

    // --- invoice actions ---

    #[test]
    fn reminder1_at_eight_days_overdue() {
        // dueDate 2024-01-01, now 2024-01-09: exactly one reminder1, not
        // reminder2 (8 < 14) and not the overdue flip (reminder1 outranks).
        let invoices = vec![invoice("2024-001", InvoiceStatus::Sent, day(2024, 1, 1))];
        let actions = compute_due_actions(day(2024, 1, 9), &invoices, &[], &customers(), &cfg());

        assert_eq!(actions.invoice_actions.len(), 1);
        let action = &actions.invoice_actions[0];
        assert_eq!(action.kind, InvoiceActionKind::Reminder1);
        assert_eq!(action.days_overdue, 8);
        assert_eq!(action.invoice_number, "2024-001");
    }

    #[test]
    fn no_action_before_first_offset() {
        let invoices = vec![invoice("2024-001", InvoiceStatus::Sent, day(2024, 1, 1))];
        let actions = compute_due_actions(day(2024, 1, 7), &invoices, &[], &customers(), &cfg());
        assert!(actions.invoice_actions.is_empty());
    }

    #[test]
    fn reminder1_fires_exactly_at_offset() {
        let invoices = vec![invoice("2024-001", InvoiceStatus::Sent, day(2024, 1, 1))];
        let actions = compute_due_actions(day(2024, 1, 8), &invoices, &[], &customers(), &cfg());
        assert_eq!(actions.invoice_actions[0].kind, InvoiceActionKind::Reminder1);
        assert_eq!(actions.invoice_actions[0].days_overdue, 7);
    }

    #[test]
    fn reminder2_outranks_reminder1() {
        let invoices = vec![invoice("2024-001", InvoiceStatus::Sent, day(2024, 1, 1))];
        let actions = compute_due_actions(day(2024, 1, 16), &invoices, &[], &customers(), &cfg());

        // Both reminders are unsent at 15 days overdue; only the most
        // urgent surfaces.
        assert_eq!(actions.invoice_actions.len(), 1);
        assert_eq!(actions.invoice_actions[0].kind, InvoiceActionKind::Reminder2);
    }

    #[test]
    fn reminder2_does_not_require_reminder1_sent() {
        let mut inv = invoice("2024-001", InvoiceStatus::Overdue, day(2024, 1, 1));
        inv.reminders.reminder1_sent = false;
        let actions =
            compute_due_actions(day(2024, 2, 1), &[inv], &[], &customers(), &cfg());
        assert_eq!(actions.invoice_actions[0].kind, InvoiceActionKind::Reminder2);
    }

    #[test]
    fn sent_flags_suppress_reminders() {
        let mut inv = invoice("2024-001", InvoiceStatus::Overdue, day(2024, 1, 1));
        inv.reminders.mark_sent(1, Utc::now());
        inv.reminders.mark_sent(2, Utc::now());
        let actions = compute_due_actions(day(2024, 2, 1), &[inv], &[], &customers(), &cfg());

        // Overdue status + both reminders sent: nothing left to do.
        assert!(actions.invoice_actions.is_empty());
    }

    #[test]
    fn overdue_flip_when_reminders_exhausted_but_status_sent() {
        let mut inv = invoice("2024-001", InvoiceStatus::Sent, day(2024, 1, 1));
        inv.reminders.mark_sent(1, Utc::now());
        inv.reminders.mark_sent(2, Utc::now());
        let actions = compute_due_actions(day(2024, 2, 1), &[inv], &[], &customers(), &cfg());

        assert_eq!(actions.invoice_actions.len(), 1);
        assert_eq!(actions.invoice_actions[0].kind, InvoiceActionKind::MarkOverdue);
    }

    #[test]
    fn paid_and_draft_invoices_are_ignored() {
        let invoices = vec![
            invoice("2024-001", InvoiceStatus::Paid, day(2024, 1, 1)),
            invoice("2024-002", InvoiceStatus::Draft, day(2024, 1, 1)),
            invoice("2024-003", InvoiceStatus::Cancelled, day(2024, 1, 1)),
        ];
        let actions = compute_due_actions(day(2024, 3, 1), &invoices, &[], &customers(), &cfg());
        assert!(actions.invoice_actions.is_empty());
    }

    #[test]
    fn invoice_actions_ordered_by_days_overdue_descending() {
        let invoices = vec![
            invoice("2024-001", InvoiceStatus::Sent, day(2024, 1, 20)),
            invoice("2024-002", InvoiceStatus::Sent, day(2024, 1, 1)),
            invoice("2024-003", InvoiceStatus::Sent, day(2024, 1, 10)),
        ];
        let actions = compute_due_actions(day(2024, 2, 1), &invoices, &[], &customers(), &cfg());

        let overdue: Vec<i64> = actions.invoice_actions.iter().map(|a| a.days_overdue).collect();
        assert_eq!(overdue, vec![31, 22, 12]);
    }

    #[test]
    fn action_carries_recipient_from_customer_snapshot() {
        let invoices = vec![invoice("2024-001", InvoiceStatus::Sent, day(2024, 1, 1))];
        let actions = compute_due_actions(day(2024, 1, 9), &invoices, &[], &customers(), &cfg());
        let action = &actions.invoice_actions[0];
        assert_eq!(action.customer_name.as_deref(), Some("Bakkerij Jansen"));
        assert_eq!(
            action.recipient_email.as_deref(),
            Some("info@bakkerijjansen.nl")
        );
    }

    #[test]
    fn unknown_customer_yields_action_without_recipient() {
        let mut inv = invoice("2024-001", InvoiceStatus::Sent, day(2024, 1, 1));
        inv.customer_id = "c-onbekend".into();
        let actions = compute_due_actions(day(2024, 1, 9), &[inv], &[], &customers(), &cfg());
        assert!(actions.invoice_actions[0].recipient_email.is_none());
    }

    // --- quote actions ---

    #[test]
    fn expiry_outranks_followup() {
        // Q1: sent 2024-01-01, validUntil 2024-01-10, now 2024-01-20.
        // daysSinceSent = 19 ≥ 14, but expiry wins.
        let quotes = vec![sent_quote("q-1", day(2024, 1, 10), Some(day(2024, 1, 1)))];
        let actions = compute_due_actions(day(2024, 1, 20), &[], &quotes, &customers(), &cfg());

        assert_eq!(actions.quote_actions.len(), 1);
        assert_eq!(actions.quote_actions[0].kind, QuoteActionKind::Expired);
        assert_eq!(actions.quote_actions[0].days_until_expiry, -10);
    }

    #[test]
    fn expiry_warning_within_window() {
        let quotes = vec![sent_quote("q-1", day(2024, 1, 22), Some(day(2024, 1, 19)))];
        let actions = compute_due_actions(day(2024, 1, 20), &[], &quotes, &customers(), &cfg());
        assert_eq!(actions.quote_actions[0].kind, QuoteActionKind::ExpiryWarning);

        // Boundary: expiring today still warns, not expires.
        let quotes = vec![sent_quote("q-2", day(2024, 1, 20), Some(day(2024, 1, 19)))];
        let actions = compute_due_actions(day(2024, 1, 20), &[], &quotes, &customers(), &cfg());
        assert_eq!(actions.quote_actions[0].kind, QuoteActionKind::ExpiryWarning);
    }

    #[test]
    fn followup_tiers_by_days_since_sent() {
        // 8 days since sent, expiry far away: first follow-up.
        let quotes = vec![sent_quote("q-1", day(2024, 3, 1), Some(day(2024, 1, 12)))];
        let actions = compute_due_actions(day(2024, 1, 20), &[], &quotes, &customers(), &cfg());
        assert_eq!(actions.quote_actions[0].kind, QuoteActionKind::Followup1);

        // 15 days since sent: second follow-up.
        let quotes = vec![sent_quote("q-2", day(2024, 3, 1), Some(day(2024, 1, 5)))];
        let actions = compute_due_actions(day(2024, 1, 20), &[], &quotes, &customers(), &cfg());
        assert_eq!(actions.quote_actions[0].kind, QuoteActionKind::Followup2);
    }

    #[test]
    fn fresh_quote_yields_nothing() {
        let quotes = vec![sent_quote("q-1", day(2024, 3, 1), Some(day(2024, 1, 18)))];
        let actions = compute_due_actions(day(2024, 1, 20), &[], &quotes, &customers(), &cfg());
        assert!(actions.quote_actions.is_empty());
    }

    #[test]
    fn missing_sent_timestamp_suppresses_followups_not_expiry() {
        // No sent timestamp: staleness is unmeasurable, no follow-up.
        let quotes = vec![sent_quote("q-1", day(2024, 3, 1), None)];
        let actions = compute_due_actions(day(2024, 1, 20), &[], &quotes, &customers(), &cfg());
        assert!(actions.quote_actions.is_empty());

        // Expiry still applies.
        let quotes = vec![sent_quote("q-2", day(2024, 1, 10), None)];
        let actions = compute_due_actions(day(2024, 1, 20), &[], &quotes, &customers(), &cfg());
        assert_eq!(actions.quote_actions[0].kind, QuoteActionKind::Expired);
    }

    #[test]
    fn only_sent_quotes_are_considered() {
        let mut expired = sent_quote("q-1", day(2024, 1, 10), Some(day(2024, 1, 1)));
        expired.status = QuoteStatus::Expired;
        let mut approved = sent_quote("q-2", day(2024, 1, 10), Some(day(2024, 1, 1)));
        approved.status = QuoteStatus::Approved;

        let actions =
            compute_due_actions(day(2024, 1, 20), &[], &[expired, approved], &customers(), &cfg());
        assert!(actions.quote_actions.is_empty());
    }

    #[test]
    fn quote_actions_ordered_by_kind_priority() {
        let quotes = vec![
            sent_quote("q-followup", day(2024, 3, 1), Some(day(2024, 1, 1))),
            sent_quote("q-expired", day(2024, 1, 10), Some(day(2024, 1, 1))),
            sent_quote("q-warning", day(2024, 1, 21), Some(day(2024, 1, 18))),
        ];
        let actions = compute_due_actions(day(2024, 1, 20), &[], &quotes, &customers(), &cfg());

        let kinds: Vec<QuoteActionKind> = actions.quote_actions.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![
                QuoteActionKind::Expired,
                QuoteActionKind::ExpiryWarning,
                QuoteActionKind::Followup2,
            ]
        );
    }

    #[test]
    fn scheduler_is_read_only() {
        let invoices = vec![invoice("2024-001", InvoiceStatus::Sent, day(2024, 1, 1))];
        let quotes = vec![sent_quote("q-1", day(2024, 1, 10), Some(day(2024, 1, 1)))];
        let before_inv = invoices.clone();
        let before_q = quotes.clone();

        let _ = compute_due_actions(day(2024, 1, 20), &invoices, &quotes, &customers(), &cfg());
        assert_eq!(invoices, before_inv);
        assert_eq!(quotes, before_q);
    }

    #[test]
    fn custom_offsets_are_respected() {
        let config = ReminderConfig {
            reminder1_offset_days: 3,
            reminder2_offset_days: 6,
            ..ReminderConfig::default()
        };
        let invoices = vec![invoice("2024-001", InvoiceStatus::Sent, day(2024, 1, 1))];
        let actions = compute_due_actions(day(2024, 1, 5), &invoices, &[], &customers(), &config);
        assert_eq!(actions.invoice_actions[0].kind, InvoiceActionKind::Reminder1);
    }
}
