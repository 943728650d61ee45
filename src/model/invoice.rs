use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::history::HistoryEntry;
use super::money::{LaborLine, LineItem, Totals};
use super::set_once;

/// The five states of an invoice's lifecycle. `Paid` is terminal: a paid
/// invoice accepts no further mutation besides notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sparse lifecycle timestamps of an invoice, written at most once each.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTimestamps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid: Option<DateTime<Utc>>,
}

impl InvoiceTimestamps {
    pub fn mark_status(&mut self, status: InvoiceStatus, at: DateTime<Utc>) {
        match status {
            InvoiceStatus::Sent => set_once(&mut self.sent, at),
            InvoiceStatus::Paid => set_once(&mut self.paid, at),
            InvoiceStatus::Draft | InvoiceStatus::Overdue | InvoiceStatus::Cancelled => {}
        }
    }
}

/// Payment-reminder bookkeeping on an invoice.
///
/// The `*_sent` flags are the at-most-once guard for the reminder pipeline:
/// the scheduler re-derives candidates from document state on every tick, so
/// a flag that is already `true` suppresses the action. Flags only ever move
/// from `false` to `true`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder1_date: Option<NaiveDate>,
    #[serde(default)]
    pub reminder1_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder1_sent_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder2_date: Option<NaiveDate>,
    #[serde(default)]
    pub reminder2_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder2_sent_date: Option<DateTime<Utc>>,
}

impl ReminderState {
    /// Populates the reminder due dates, called when the invoice goes out.
    pub fn schedule(due_date: NaiveDate, offset1_days: i64, offset2_days: i64) -> Self {
        Self {
            reminder1_date: Some(due_date + chrono::Duration::days(offset1_days)),
            reminder2_date: Some(due_date + chrono::Duration::days(offset2_days)),
            ..Self::default()
        }
    }

    /// Marks reminder `n` (1 or 2) as sent. Monotonic: once set, a flag and
    /// its sent-date are never overwritten.
    pub fn mark_sent(&mut self, n: u8, at: DateTime<Utc>) {
        match n {
            1 if !self.reminder1_sent => {
                self.reminder1_sent = true;
                self.reminder1_sent_date = Some(at);
            }
            2 if !self.reminder2_sent => {
                self.reminder2_sent = true;
                self.reminder2_sent_date = Some(at);
            }
            _ => {}
        }
    }
}

/// A billing document with a due date and payment tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub invoice_number: String,
    pub customer_id: String,
    pub items: Vec<LineItem>,
    pub labor: Vec<LaborLine>,
    pub totals: Totals,
    pub status: InvoiceStatus,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_date: Option<NaiveDate>,
    #[serde(default)]
    pub timestamps: InvoiceTimestamps,
    #[serde(default)]
    pub reminders: ReminderState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_order_id: Option<String>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl Invoice {
    /// Whole days past the due date; zero or negative while not yet due.
    pub fn days_overdue(&self, today: NaiveDate) -> i64 {
        (today - self.due_date).num_days()
    }
}

/// Produces the next human-facing invoice number for `year`.
///
/// Numbers are sequential and gap-free within a year (`2024-001`,
/// `2024-002`, ...). Numbers from other years are ignored, so the sequence
/// restarts at 001 each January.
pub fn next_invoice_number<'a>(year: i32, existing: impl IntoIterator<Item = &'a str>) -> String {
    let prefix = format!("{year}-");
    let highest = existing
        .into_iter()
        .filter_map(|number| number.strip_prefix(&prefix))
        .filter_map(|seq| seq.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("{year}-{:03}", highest + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_invoice() -> Invoice {
        Invoice {
            id: "inv-1".into(),
            invoice_number: "2024-001".into(),
            customer_id: "c-1".into(),
            items: vec![],
            labor: vec![],
            totals: Totals::from_lines(&[], &[], rust_decimal::Decimal::from(21)),
            status: InvoiceStatus::Draft,
            issue_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            paid_date: None,
            timestamps: InvoiceTimestamps::default(),
            reminders: ReminderState::default(),
            quote_id: None,
            work_order_id: None,
            history: vec![],
            notes: vec![],
        }
    }

    #[test]
    fn days_overdue_date_only() {
        let invoice = sample_invoice();
        assert_eq!(invoice.days_overdue(NaiveDate::from_ymd_opt(2024, 1, 23).unwrap()), 8);
        assert_eq!(invoice.days_overdue(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()), -5);
    }

    #[test]
    fn reminder_schedule_from_due_date() {
        let due = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let state = ReminderState::schedule(due, 7, 14);
        assert_eq!(state.reminder1_date, Some(NaiveDate::from_ymd_opt(2024, 1, 22).unwrap()));
        assert_eq!(state.reminder2_date, Some(NaiveDate::from_ymd_opt(2024, 1, 29).unwrap()));
        assert!(!state.reminder1_sent);
        assert!(!state.reminder2_sent);
    }

    #[test]
    fn mark_sent_is_monotonic() {
        let mut state = ReminderState::schedule(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(), 7, 14);
        let first = Utc.with_ymd_and_hms(2024, 1, 22, 8, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap();

        state.mark_sent(1, first);
        state.mark_sent(1, later);
        assert!(state.reminder1_sent);
        assert_eq!(state.reminder1_sent_date, Some(first));

        // Reminder 2 is independent of reminder 1.
        state.mark_sent(2, later);
        assert!(state.reminder2_sent);
        assert_eq!(state.reminder2_sent_date, Some(later));
    }

    #[test]
    fn mark_sent_ignores_unknown_index() {
        let mut state = ReminderState::default();
        state.mark_sent(3, Utc::now());
        assert_eq!(state, ReminderState::default());
    }

    #[test]
    fn invoice_number_sequence() {
        assert_eq!(next_invoice_number(2024, []), "2024-001");
        assert_eq!(
            next_invoice_number(2024, ["2024-001", "2024-002"]),
            "2024-003"
        );
    }

    #[test]
    fn invoice_number_restarts_each_year() {
        let existing = ["2023-041", "2023-042", "2024-001"];
        assert_eq!(next_invoice_number(2024, existing), "2024-002");
        assert_eq!(next_invoice_number(2025, existing), "2025-001");
    }

    #[test]
    fn invoice_number_ignores_malformed_entries() {
        let existing = ["2024-abc", "factuur", "2024-007"];
        assert_eq!(next_invoice_number(2024, existing), "2024-008");
    }

    #[test]
    fn invoice_serialization_roundtrip() {
        let invoice = sample_invoice();
        let json = serde_json::to_string(&invoice).unwrap();
        let parsed: Invoice = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, invoice);
    }
}
