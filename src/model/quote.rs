use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::history::HistoryEntry;
use super::money::{LaborLine, LineItem, Totals};
use super::set_once;

/// The five states of a quote's lifecycle.
///
/// `Approved` is the gateway state: only approved quotes may be converted
/// to a work order or invoice. `Rejected` and `Expired` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Draft,
    Sent,
    Approved,
    Rejected,
    Expired,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Sent => "sent",
            QuoteStatus::Approved => "approved",
            QuoteStatus::Rejected => "rejected",
            QuoteStatus::Expired => "expired",
        }
    }
}

impl std::fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sparse lifecycle timestamps of a quote. Each field is written at most
/// once; repeated transitions to the same status leave the original value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteTimestamps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expired: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converted_to_invoice: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converted_to_work_order: Option<DateTime<Utc>>,
}

impl QuoteTimestamps {
    /// Records the timestamp belonging to `status`, if any and not yet set.
    pub fn mark_status(&mut self, status: QuoteStatus, at: DateTime<Utc>) {
        match status {
            QuoteStatus::Sent => set_once(&mut self.sent, at),
            QuoteStatus::Approved => set_once(&mut self.approved, at),
            QuoteStatus::Expired => set_once(&mut self.expired, at),
            QuoteStatus::Draft | QuoteStatus::Rejected => {}
        }
    }
}

/// A priced proposal sent to a customer, pending approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: String,
    pub customer_id: String,
    pub items: Vec<LineItem>,
    pub labor: Vec<LaborLine>,
    pub totals: Totals,
    pub status: QuoteStatus,
    pub valid_until: NaiveDate,
    pub created_date: NaiveDate,
    #[serde(default)]
    pub timestamps: QuoteTimestamps,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<String>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl Quote {
    /// Whole days until this quote expires, negative once past `valid_until`.
    pub fn days_until_expiry(&self, today: NaiveDate) -> i64 {
        (self.valid_until - today).num_days()
    }

    /// Whole days since the quote was sent, if it ever was.
    pub fn days_since_sent(&self, today: NaiveDate) -> Option<i64> {
        self.timestamps
            .sent
            .map(|sent| (today - sent.date_naive()).num_days())
    }
}
